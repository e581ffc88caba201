//! Property Paths
//!
//! A [`Path`] is a parsed dot-separated expression such as `user.name`.
//! Resolution walks the reactive object graph one segment at a time; when a
//! context is supplied every traversed segment is a tracked read, so the
//! resolving subscriber ends up registered on each property along the way.
//!
//! # Missing Segments
//!
//! A missing leaf always resolves to [`Value::Undefined`]. Reading *through*
//! a missing or non-object intermediate resolves to `Undefined` in
//! permissive mode and fails in strict mode.

use std::fmt;

use smallvec::SmallVec;

use super::context::ReactiveContext;
use super::object::ReactiveObject;
use super::value::Value;
use crate::error::{BindError, Result};

/// A parsed dot-path expression.
#[derive(Clone, PartialEq, Eq)]
pub struct Path {
    expr: String,
    segments: SmallVec<[String; 4]>,
}

impl Path {
    /// Parse `a.b.c`. Whitespace around the expression and around each
    /// segment is ignored; empty segments are rejected.
    pub fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(BindError::InvalidPath(expr.to_string()));
        }

        let mut segments = SmallVec::new();
        for segment in trimmed.split('.') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(BindError::InvalidPath(expr.to_string()));
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            expr: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve against `root`.
    ///
    /// With `tracker`, each segment read registers the tracker's resolving
    /// subscriber.
    pub fn resolve(
        &self,
        root: &ReactiveObject,
        tracker: Option<&ReactiveContext>,
        strict: bool,
    ) -> Result<Value> {
        let mut current = Value::Object(root.clone());
        // The segment `current` was read from; errors name it.
        let mut read_from = "";

        for segment in &self.segments {
            let obj = match &current {
                Value::Object(obj) => obj.clone(),
                Value::Undefined | Value::Null => {
                    if strict {
                        return Err(BindError::PathNotFound {
                            path: self.expr.clone(),
                            segment: read_from.to_string(),
                        });
                    }
                    return Ok(Value::Undefined);
                }
                _ => {
                    if strict {
                        return Err(BindError::NotAnObject {
                            path: self.expr.clone(),
                            segment: read_from.to_string(),
                        });
                    }
                    return Ok(Value::Undefined);
                }
            };

            let next = match tracker {
                Some(ctx) => obj.get_tracked(segment, ctx),
                None => obj.get(segment),
            };
            current = next.unwrap_or_default();
            read_from = segment.as_str();
        }

        Ok(current)
    }

    /// Write `value` to the leaf, going through the reactive proxy.
    ///
    /// Every intermediate must exist and be an object. Returns whether the
    /// stored value changed.
    pub fn assign(&self, root: &ReactiveObject, value: Value) -> Result<bool> {
        let (leaf, parents) = self
            .segments
            .split_last()
            .ok_or_else(|| BindError::InvalidPath(self.expr.clone()))?;

        let mut target = root.clone();
        for segment in parents {
            target = match target.get(segment) {
                Some(Value::Object(obj)) => obj,
                Some(Value::Undefined) | Some(Value::Null) | None => {
                    return Err(BindError::PathNotFound {
                        path: self.expr.clone(),
                        segment: segment.clone(),
                    })
                }
                Some(_) => {
                    return Err(BindError::NotAnObject {
                        path: self.expr.clone(),
                        segment: segment.clone(),
                    })
                }
            };
        }

        target.set(leaf, value)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({:?})", self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> ReactiveObject {
        ReactiveObject::from_json(&json!({
            "user": { "name": "a", "address": { "city": "x" } },
            "count": 3,
            "nothing": null
        }))
    }

    #[test]
    fn parse_trims_segments() {
        let path = Path::parse("  user . name ").unwrap();
        assert_eq!(path.segments(), ["user", "name"]);
        assert_eq!(path.as_str(), "user . name");
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(matches!(Path::parse(""), Err(BindError::InvalidPath(_))));
        assert!(matches!(Path::parse("a..b"), Err(BindError::InvalidPath(_))));
        assert!(matches!(Path::parse(".a"), Err(BindError::InvalidPath(_))));
    }

    #[test]
    fn resolves_nested_values() {
        let root = data();
        let path = Path::parse("user.address.city").unwrap();
        assert_eq!(path.resolve(&root, None, true).unwrap(), Value::from("x"));
    }

    #[test]
    fn missing_leaf_is_undefined_even_when_strict() {
        let root = data();
        let path = Path::parse("user.age").unwrap();
        assert!(path.resolve(&root, None, true).unwrap().is_undefined());
    }

    #[test]
    fn missing_intermediate_depends_on_mode() {
        let root = data();
        let path = Path::parse("profile.name").unwrap();
        assert!(path.resolve(&root, None, false).unwrap().is_undefined());
        assert!(matches!(
            path.resolve(&root, None, true),
            Err(BindError::PathNotFound { segment, .. }) if segment == "profile"
        ));

        let through_null = Path::parse("nothing.x").unwrap();
        assert!(through_null.resolve(&root, None, true).is_err());

        let through_number = Path::parse("count.x").unwrap();
        assert!(matches!(
            through_number.resolve(&root, None, true),
            Err(BindError::NotAnObject { segment, .. }) if segment == "count"
        ));
    }

    #[test]
    fn resolve_and_assign_name_the_same_segment() {
        let root = data();
        let deep = Path::parse("user.profile.name").unwrap();
        let read = deep.resolve(&root, None, true).unwrap_err();
        let write = deep.assign(&root, Value::from("b")).unwrap_err();

        for err in [read, write] {
            assert!(matches!(
                err,
                BindError::PathNotFound { segment, .. } if segment == "profile"
            ));
        }

        let through_number = Path::parse("count.x").unwrap();
        assert!(matches!(
            through_number.assign(&root, Value::from(1)),
            Err(BindError::NotAnObject { segment, .. }) if segment == "count"
        ));
    }

    #[test]
    fn tracked_resolution_registers_every_segment() {
        let root = data();
        let ctx = ReactiveContext::default();
        let path = Path::parse("user.name").unwrap();

        struct Stub(crate::reactive::SubscriberId);
        impl crate::reactive::Reactive for Stub {
            fn subscriber_id(&self) -> crate::reactive::SubscriberId {
                self.0
            }
            fn update(&self) -> Result<()> {
                Ok(())
            }
        }

        let stub: std::rc::Rc<dyn crate::reactive::Reactive> =
            std::rc::Rc::new(Stub(crate::reactive::SubscriberId::new()));
        {
            let _guard = ctx.enter(stub.clone(), "user.name").unwrap();
            path.resolve(&root, Some(&ctx), false).unwrap();
        }

        assert_eq!(root.subscriber_count("user"), 1);
        let user = root.get("user").unwrap();
        assert_eq!(user.as_object().unwrap().subscriber_count("name"), 1);
        assert_eq!(root.subscriber_count("count"), 0);
    }

    #[test]
    fn assign_writes_leaf() {
        let root = data();
        let path = Path::parse("user.name").unwrap();
        assert!(path.assign(&root, Value::from("b")).unwrap());
        assert_eq!(path.resolve(&root, None, false).unwrap(), Value::from("b"));
        assert!(!path.assign(&root, Value::from("b")).unwrap());
    }

    #[test]
    fn assign_through_missing_intermediate_fails() {
        let root = data();
        let path = Path::parse("profile.name").unwrap();
        assert!(matches!(
            path.assign(&root, Value::from("b")),
            Err(BindError::PathNotFound { segment, .. }) if segment == "profile"
        ));
    }
}
