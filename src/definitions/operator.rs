use super::ShapedDefinition;
use super::datatype::{JsonSchemaRef, json_schema_ref_shape};
use crate::shape::{Field, KeyPredicate, Shape};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// The description shown when an operator definition has none.
pub const DEFAULT_OPERATOR_DESCRIPTION: &str = "Workflow Operator";

fn param_shape() -> Shape {
    Shape::mapping([
        Field::required("type", Shape::string()),
        Field::optional("title", Shape::nullable_string()),
        Field::optional("help_text", Shape::nullable_string()),
        Field::optional("format", Shape::nullable_string()),
        Field::optional("items", Shape::opaque().nullable()),
        Field::optional("properties", Shape::opaque().nullable()),
    ])
}

fn source_shape() -> Shape {
    Shape::union([
        json_schema_ref_shape(),
        Shape::mapping([Field::required("items", json_schema_ref_shape())]),
        Shape::mapping([Field::required(
            "anyOf",
            Shape::list(json_schema_ref_shape()),
        )]),
    ])
}

/// The schema-facing description of one operator.
pub static OPERATOR_DEFINITION: LazyLock<Shape> = LazyLock::new(|| {
    let names = Shape::list(Shape::string()).nullable();
    Shape::mapping([
        Field::optional("title", Shape::nullable_string()),
        Field::optional("description", Shape::nullable_string()),
        Field::optional("help_text", Shape::nullable_string()),
        Field::required(
            "properties",
            Shape::mapping([
                Field::required(
                    "type",
                    // The single element is the operator's type tag.
                    Shape::mapping([Field::required(
                        "enum",
                        Shape::strings(1, 1),
                    )]),
                ),
                Field::required(
                    "params",
                    Shape::mapping([
                        Field::optional(
                            "properties",
                            Shape::keyed(KeyPredicate::Any, param_shape()).nullable(),
                        ),
                        Field::optional("required", names.clone()),
                    ]),
                ),
                // Same layout as `params`, with source declarations as values.
                Field::optional(
                    "sources",
                    Shape::mapping([
                        Field::optional(
                            "properties",
                            Shape::keyed(KeyPredicate::Any, source_shape()).nullable(),
                        ),
                        Field::optional("required", names),
                    ])
                    .nullable(),
                ),
            ]),
        ),
    ])
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub properties: OperatorProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorProperties {
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    pub params: OperatorParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<OperatorSources>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeTag {
    #[serde(rename = "enum")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ParamDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDefinition {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

impl ParamDefinition {
    /// `true` when the parameter carries more than the meta-only keys
    /// `title`, `help_text` and `type`, i.e. it needs a structured editor.
    pub fn has_schema_restrictions(&self) -> bool {
        self.format.is_some() || self.items.is_some() || self.properties.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorSources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SourceDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// What an operator input slot accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceDefinition {
    /// A single raster, vector or plot source.
    Single(JsonSchemaRef),
    /// A list of sources of one type.
    Array(SourceArray),
    /// A source of any of several types.
    AnyOf(SourceUnion),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceArray {
    pub items: JsonSchemaRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceUnion {
    #[serde(rename = "anyOf")]
    pub any_of: Vec<JsonSchemaRef>,
}

impl SourceDefinition {
    /// The connection type of the input pin.
    pub fn pin_type(&self) -> String {
        match self {
            Self::Single(reference) => reference.definition_name().to_string(),
            Self::Array(_) => "array".to_string(),
            Self::AnyOf(union) => union
                .any_of
                .iter()
                .map(JsonSchemaRef::definition_name)
                .join(","),
        }
    }

    /// Element type for array sources.
    pub fn inner_type(&self) -> Option<&str> {
        match self {
            Self::Array(array) => Some(array.items.definition_name()),
            _ => None,
        }
    }
}

impl OperatorDefinition {
    /// The operator's type tag. Validation guarantees exactly one element.
    pub fn id(&self) -> &str {
        self.properties
            .type_tag
            .values
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.id())
    }

    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or(DEFAULT_OPERATOR_DESCRIPTION)
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn params(&self) -> Option<&BTreeMap<String, ParamDefinition>> {
        self.properties.params.properties.as_ref()
    }

    pub fn sources(&self) -> Option<&BTreeMap<String, SourceDefinition>> {
        self.properties
            .sources
            .as_ref()
            .and_then(|sources| sources.properties.as_ref())
    }

    pub fn is_param_required(&self, name: &str) -> bool {
        contains(self.properties.params.required.as_deref(), name)
    }

    pub fn is_source_required(&self, name: &str) -> bool {
        contains(
            self.properties
                .sources
                .as_ref()
                .and_then(|sources| sources.required.as_deref()),
            name,
        )
    }
}

fn contains(names: Option<&[String]>, name: &str) -> bool {
    names.is_some_and(|names| names.iter().any(|n| n == name))
}

impl ShapedDefinition for OperatorDefinition {
    fn shape() -> &'static Shape {
        &OPERATOR_DEFINITION
    }
}
