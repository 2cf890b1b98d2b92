//! The generic structural matcher.
//!
//! Validation is a depth-first walk over a [`Shape`] and a value. It stops at the first
//! mismatch, never coerces types, and never mutates the value it inspects.

use crate::error::ValidationError;
use crate::shape::Shape;
use itertools::Itertools;
use serde_json::Value;
use std::fmt;

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// The chain of keys and indices leading from the document root to a value.
///
/// Displays as `definitions.op1.properties.type.enum` or `inputs[2].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: &str) -> Self {
        self.push_key(key);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn push_key(&mut self, key: &str) {
        self.0.push(PathSegment::Key(key.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Checks `value` against `shape`, returning the value untouched on success.
pub fn validate<'v>(shape: &Shape, value: &'v Value) -> Result<&'v Value, ValidationError> {
    validate_at(shape, value, FieldPath::root()).map(|()| value)
}

/// Like [`validate`], but reports errors relative to `base`.
pub fn validate_at(shape: &Shape, value: &Value, base: FieldPath) -> Result<(), ValidationError> {
    let mut path = base;
    check(shape, value, &mut path)
}

fn check(shape: &Shape, value: &Value, path: &mut FieldPath) -> Result<(), ValidationError> {
    match shape {
        Shape::Scalar { kind, nullable } => {
            if kind.matches(value) || (*nullable && value.is_null()) {
                Ok(())
            } else {
                Err(reject(shape, value, path))
            }
        }
        Shape::StringChoice { allowed } => match value.as_str() {
            Some(s) if allowed.contains(s) => Ok(()),
            _ => Err(reject(shape, value, path)),
        },
        Shape::EnumeratedString { allowed, min, max } => {
            let Some(items) = value.as_array() else {
                return Err(reject(shape, value, path));
            };
            if items.len() < *min || items.len() > *max {
                return Err(reject(shape, value, path));
            }
            for (index, item) in items.iter().enumerate() {
                let accepted = match (item.as_str(), allowed) {
                    (Some(s), Some(allowed)) => allowed.contains(s),
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                if !accepted {
                    path.push_index(index);
                    return Err(reject(shape, item, path));
                }
            }
            Ok(())
        }
        Shape::FixedKeyMapping { fields, closed } => {
            let Some(map) = value.as_object() else {
                return Err(reject(shape, value, path));
            };
            if *closed {
                if let Some((key, unknown)) = map
                    .iter()
                    .find(|(key, _)| !fields.iter().any(|field| &field.name == *key))
                {
                    path.push_key(key);
                    return Err(ValidationError::new(
                        path.clone(),
                        format!(
                            "no key `{key}` (allowed: {})",
                            fields.iter().map(|field| format!("`{}`", field.name)).join(", ")
                        ),
                        describe(unknown),
                    ));
                }
            }
            for field in fields {
                path.push_key(&field.name);
                match map.get(&field.name) {
                    Some(present) => check(&field.shape, present, path)?,
                    None if field.required => {
                        return Err(ValidationError::new(
                            path.clone(),
                            field.shape.expectation(),
                            "nothing (key is missing)",
                        ));
                    }
                    None => {}
                }
                path.pop();
            }
            Ok(())
        }
        Shape::KeyedMapping { key, value: inner } => {
            let Some(map) = value.as_object() else {
                return Err(reject(shape, value, path));
            };
            for (name, entry) in map {
                path.push_key(name);
                if !key.matches(name) {
                    return Err(ValidationError::new(
                        path.clone(),
                        key.describe(),
                        format!("key `{name}`"),
                    ));
                }
                check(inner, entry, path)?;
                path.pop();
            }
            Ok(())
        }
        Shape::Sequence { element, min, max } => {
            let Some(items) = value.as_array() else {
                return Err(reject(shape, value, path));
            };
            if items.len() < *min || max.is_some_and(|max| items.len() > max) {
                return Err(reject(shape, value, path));
            }
            for (index, item) in items.iter().enumerate() {
                path.push_index(index);
                check(element, item, path)?;
                path.pop();
            }
            Ok(())
        }
        Shape::Union(variants) => {
            let mut failures = Vec::with_capacity(variants.len());
            for variant in variants {
                let mut attempt = path.clone();
                match check(variant, value, &mut attempt) {
                    Ok(()) => return Ok(()),
                    Err(err) => failures.push(err),
                }
            }
            let mut failures = failures.into_iter();
            match failures.next() {
                Some(first) => Err(first.with_alternatives(failures.collect())),
                // An empty union accepts nothing.
                None => Err(reject(shape, value, path)),
            }
        }
        Shape::Nullable(inner) => {
            if value.is_null() {
                Ok(())
            } else {
                check(inner, value, path)
            }
        }
        Shape::Opaque => {
            if value.is_object() {
                Ok(())
            } else {
                Err(reject(shape, value, path))
            }
        }
    }
}

fn reject(shape: &Shape, value: &Value, path: &FieldPath) -> ValidationError {
    ValidationError::new(path.clone(), shape.expectation(), describe(value))
}

const MAX_DESCRIBED_CHARS: usize = 40;

/// Short description of a value for the `actual` slot of a [`ValidationError`].
pub fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => {
            if s.chars().count() > MAX_DESCRIBED_CHARS {
                let head: String = s.chars().take(MAX_DESCRIBED_CHARS).collect();
                format!("string {head:?}...")
            } else {
                format!("string {s:?}")
            }
        }
        Value::Array(items) if items.is_empty() => "an empty list".to_string(),
        Value::Array(items) => format!("a list of {} elements", items.len()),
        Value::Object(map) if map.is_empty() => "an empty mapping".to_string(),
        Value::Object(map) => format!(
            "a mapping with keys {}",
            map.keys().map(|key| format!("`{key}`")).join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Field;
    use serde_json::json;

    #[test]
    fn path_display() {
        assert_eq!(FieldPath::root().to_string(), "<root>");
        let path = FieldPath::root().key("inputs").index(2).key("name");
        assert_eq!(path.to_string(), "inputs[2].name");
        let path = FieldPath::root().key("definitions").key("op1");
        assert_eq!(path.to_string(), "definitions.op1");
    }

    #[test]
    fn describe_values() {
        assert_eq!(describe(&json!(null)), "null");
        assert_eq!(describe(&json!([])), "an empty list");
        assert_eq!(describe(&json!(["a", "b"])), "a list of 2 elements");
        assert_eq!(describe(&json!("x")), "string \"x\"");
        assert_eq!(describe(&json!({"b": 1, "a": 2})), "a mapping with keys `a`, `b`");
        let long = "y".repeat(100);
        assert!(describe(&json!(long)).ends_with("..."));
    }

    #[test]
    fn path_is_restored_between_siblings() {
        let shape = Shape::mapping([
            Field::required("a", Shape::mapping([Field::required("x", Shape::number())])),
            Field::required("b", Shape::string()),
        ]);
        let err = validate(&shape, &json!({"a": {"x": 1}, "b": 2})).unwrap_err();
        assert_eq!(err.path.to_string(), "b");
    }

    #[test]
    fn missing_required_key_reports_field_path() {
        let shape = Shape::mapping([Field::required("title", Shape::string())]);
        let err = validate(&shape, &json!({})).unwrap_err();
        assert_eq!(err.path.to_string(), "title");
        assert_eq!(err.expected, "a string");
        assert!(err.actual.contains("missing"));
    }
}
