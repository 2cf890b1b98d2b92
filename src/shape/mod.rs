//! Declarative structural contracts over JSON values.
//!
//! A [`Shape`] describes which values are acceptable for a field or a whole document.
//! Shapes are plain data: they are built once (usually inside a `LazyLock`), never
//! mutated afterwards, and checked by the generic matcher in [`crate::validator`].
//!
//! Every mapping shape built through [`Shape::mapping`] is closed: keys that are not
//! declared as fields are rejected.

use ahash::AHashSet;
use itertools::Itertools;
use serde_json::Value;

/// The runtime kind a [`Shape::Scalar`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    /// A string with at least one character.
    NonEmptyString,
    Boolean,
    Number,
}

impl ScalarKind {
    /// Checks the runtime kind of `value`. Never coerces: `"1"` is not a number.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::NonEmptyString => value.as_str().is_some_and(|s| !s.is_empty()),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::NonEmptyString => "a non-empty string",
            Self::Boolean => "a boolean",
            Self::Number => "a number",
        }
    }
}

/// A condition every key of a [`Shape::KeyedMapping`] must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPredicate {
    Any,
    Exactly(String),
    Not(String),
}

impl KeyPredicate {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(expected) => key == expected,
            Self::Not(excluded) => key != excluded,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Any => "any key".to_string(),
            Self::Exactly(expected) => format!("key `{expected}`"),
            Self::Not(excluded) => format!("keys other than `{excluded}`"),
        }
    }
}

/// A declared key of a [`Shape::FixedKeyMapping`].
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
    /// Required fields must be present. Whether `null` is accepted is up to `shape`.
    pub required: bool,
}

impl Field {
    pub fn required(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            shape,
            required: true,
        }
    }

    pub fn optional(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            shape,
            required: false,
        }
    }
}

/// A recursive structural contract.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A single value of the given kind, optionally `null`.
    Scalar { kind: ScalarKind, nullable: bool },
    /// A single string drawn from a fixed set.
    StringChoice { allowed: AHashSet<String> },
    /// A list of strings with `min..=max` elements. `allowed: None` accepts any string.
    EnumeratedString {
        allowed: Option<AHashSet<String>>,
        min: usize,
        max: usize,
    },
    /// A mapping with declared keys.
    FixedKeyMapping { fields: Vec<Field>, closed: bool },
    /// A mapping whose keys satisfy `key` and whose values all match `value`.
    KeyedMapping { key: KeyPredicate, value: Box<Shape> },
    /// A list whose elements all match `element`.
    Sequence {
        element: Box<Shape>,
        min: usize,
        max: Option<usize>,
    },
    /// Accepts if any variant accepts. Variants are tried in order.
    Union(Vec<Shape>),
    /// `null` or whatever the inner shape accepts.
    Nullable(Box<Shape>),
    /// Any mapping, contents unchecked.
    ///
    /// This is a validation boundary: nested JSON-Schema fragments such as `items`
    /// carry no structure this crate relies on, so they are not descended into.
    Opaque,
}

impl Shape {
    pub fn string() -> Self {
        Self::Scalar {
            kind: ScalarKind::String,
            nullable: false,
        }
    }

    pub fn nullable_string() -> Self {
        Self::string().nullable()
    }

    pub fn non_empty_string() -> Self {
        Self::Scalar {
            kind: ScalarKind::NonEmptyString,
            nullable: false,
        }
    }

    pub fn boolean() -> Self {
        Self::Scalar {
            kind: ScalarKind::Boolean,
            nullable: false,
        }
    }

    pub fn number() -> Self {
        Self::Scalar {
            kind: ScalarKind::Number,
            nullable: false,
        }
    }

    pub fn choice<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringChoice {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// A list of strings with a length in `min..=max`.
    pub fn enumerated<I, S>(allowed: Option<I>, min: usize, max: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::EnumeratedString {
            allowed: allowed.map(|set| set.into_iter().map(Into::into).collect()),
            min,
            max,
        }
    }

    /// A list of arbitrary strings with a length in `min..=max`.
    pub fn strings(min: usize, max: usize) -> Self {
        Self::EnumeratedString {
            allowed: None,
            min,
            max,
        }
    }

    /// A closed mapping with the given fields.
    pub fn mapping(fields: impl IntoIterator<Item = Field>) -> Self {
        Self::FixedKeyMapping {
            fields: fields.into_iter().collect(),
            closed: true,
        }
    }

    pub fn keyed(key: KeyPredicate, value: Shape) -> Self {
        Self::KeyedMapping {
            key,
            value: Box::new(value),
        }
    }

    pub fn list(element: Shape) -> Self {
        Self::Sequence {
            element: Box::new(element),
            min: 0,
            max: None,
        }
    }

    pub fn list_bounded(element: Shape, min: usize, max: Option<usize>) -> Self {
        Self::Sequence {
            element: Box::new(element),
            min,
            max,
        }
    }

    pub fn union(variants: impl IntoIterator<Item = Shape>) -> Self {
        Self::Union(variants.into_iter().collect())
    }

    pub fn opaque() -> Self {
        Self::Opaque
    }

    /// Makes the shape accept `null` as well.
    pub fn nullable(self) -> Self {
        match self {
            Self::Scalar { kind, .. } => Self::Scalar {
                kind,
                nullable: true,
            },
            nullable @ Self::Nullable(_) => nullable,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Returns `true` if `value` satisfies this shape.
    pub fn matches(&self, value: &Value) -> bool {
        crate::validator::validate(self, value).is_ok()
    }

    /// Human-readable description of what this shape accepts, used in rejection messages.
    pub fn expectation(&self) -> String {
        match self {
            Self::Scalar { kind, nullable } => {
                if *nullable {
                    format!("{} or null", kind.noun())
                } else {
                    kind.noun().to_string()
                }
            }
            Self::StringChoice { allowed } => format!("one of {}", quoted_sorted(allowed)),
            Self::EnumeratedString { allowed, min, max } => {
                let noun = plural("string", *min, Some(*max));
                let elements = match allowed {
                    Some(allowed) => format!("{noun} from {}", quoted_sorted(allowed)),
                    None => noun.to_string(),
                };
                format!("a list of {} {}", bounds(*min, Some(*max)), elements)
            }
            Self::FixedKeyMapping { fields, .. } => match fields.as_slice() {
                [] => "an empty mapping".to_string(),
                [single] => format!("a mapping with key `{}`", single.name),
                many => format!(
                    "a mapping with keys {}",
                    many.iter().map(|f| format!("`{}`", f.name)).join(", ")
                ),
            },
            Self::KeyedMapping { key, value } => {
                format!("a mapping of {} to {}", key.describe(), value.expectation())
            }
            Self::Sequence { element, min, max } => {
                if *min == 0 && max.is_none() {
                    format!("a list of {}", element.expectation())
                } else {
                    format!(
                        "a list of {} {}, each {}",
                        bounds(*min, *max),
                        plural("element", *min, *max),
                        element.expectation()
                    )
                }
            }
            Self::Union(variants) => variants.iter().map(Shape::expectation).join(" or "),
            Self::Nullable(inner) => format!("{} or null", inner.expectation()),
            Self::Opaque => "a mapping".to_string(),
        }
    }
}

fn quoted_sorted(allowed: &AHashSet<String>) -> String {
    allowed.iter().sorted().map(|s| format!("\"{s}\"")).join(", ")
}

fn plural(noun: &str, min: usize, max: Option<usize>) -> String {
    if min == 1 && max == Some(1) {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

fn bounds(min: usize, max: Option<usize>) -> String {
    match max {
        Some(max) if max == min => format!("exactly {min}"),
        Some(max) => format!("{min} to {max}"),
        None => format!("at least {min}"),
    }
}
