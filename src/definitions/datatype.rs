use super::ShapedDefinition;
use crate::shape::{Field, Shape};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `{"$ref": string}`
pub fn json_schema_ref_shape() -> Shape {
    Shape::mapping([Field::required("$ref", Shape::string())])
}

/// A type alias expressed as a union of references: `{"oneOf": [{"$ref": ...}, ...]}`.
pub static DATATYPE_DEFINITION: LazyLock<Shape> = LazyLock::new(|| {
    Shape::mapping([Field::required(
        "oneOf",
        Shape::list(json_schema_ref_shape()),
    )])
});

/// A JSON-Schema reference such as `#/definitions/RasterDataType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonSchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl JsonSchemaRef {
    pub const DEFINITIONS_PREFIX: &'static str = "#/definitions/";

    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    /// The referenced definition's identifier, without the `#/definitions/` prefix.
    pub fn definition_name(&self) -> &str {
        self.reference
            .strip_prefix(Self::DEFINITIONS_PREFIX)
            .unwrap_or(&self.reference)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatatypeDefinition {
    #[serde(rename = "oneOf")]
    pub one_of: Vec<JsonSchemaRef>,
}

impl DatatypeDefinition {
    /// Identifiers of the definitions this alias stands for.
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.one_of.iter().map(JsonSchemaRef::definition_name)
    }
}

impl ShapedDefinition for DatatypeDefinition {
    fn shape() -> &'static Shape {
        &DATATYPE_DEFINITION
    }
}
