//! Shapes and typed forms of the documents the editor consumes.
//!
//! Two representations exist side by side, one per deployment generation:
//! the schema-facing [`EditorSchema`] (a catalog of datatype and operator
//! definitions) and the editor-native [`WorkflowOperatorList`].

pub mod catalog;
pub mod datatype;
pub mod operator;
pub mod report;
pub mod workflow_operator;

pub use catalog::*;
pub use datatype::*;
pub use operator::*;
pub use report::*;
pub use workflow_operator::*;

use crate::error::ValidationError;
use crate::shape::Shape;
use crate::validator::{FieldPath, validate_at};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A document type with a static shape.
///
/// Parsing validates against [`ShapedDefinition::shape`] first, so any error carries a
/// precise path; the typed conversion afterwards only fails if the shape and the
/// struct disagree.
pub trait ShapedDefinition: DeserializeOwned {
    fn shape() -> &'static Shape;

    fn parse(value: &Value) -> Result<Self, ValidationError> {
        Self::parse_at(value, FieldPath::root())
    }

    fn parse_at(value: &Value, path: FieldPath) -> Result<Self, ValidationError> {
        validate_at(Self::shape(), value, path.clone())?;
        decode(value, path, Self::shape())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(
    value: &Value,
    path: FieldPath,
    shape: &Shape,
) -> Result<T, ValidationError> {
    T::deserialize(value)
        .map_err(|err| ValidationError::new(path, shape.expectation(), err.to_string()))
}
