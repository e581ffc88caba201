//! Error types shared across the engine.

/// Errors raised while resolving paths, propagating changes, or loading
/// templates and configuration.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The expression could not be parsed into a property path.
    #[error("invalid path expression `{0}`")]
    InvalidPath(String),

    /// A segment of the path does not exist on the object it was read from.
    #[error("path `{path}` not found: missing segment `{segment}`")]
    PathNotFound { path: String, segment: String },

    /// A segment was read through a value that is not an object.
    #[error("path `{path}` traverses non-object at `{segment}`")]
    NotAnObject { path: String, segment: String },

    /// A subscriber tried to resolve while another resolution was in flight.
    #[error("re-entrant resolution of `{0}` while another binding is resolving")]
    ReentrantResolution(String),

    /// Write-triggered notifications nested deeper than the configured bound.
    #[error("change propagation exceeded maximum depth of {0}")]
    PropagationDepthExceeded(usize),

    /// A render callback or event method reported a failure.
    #[error("handler failed: {0}")]
    Handler(String),

    /// The JSON template could not be decoded.
    #[error("template parse error: {0}")]
    Template(#[source] serde_json::Error),

    /// The engine configuration could not be decoded.
    #[error("config parse error: {0}")]
    Config(#[source] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BindError>;
