use super::decode;
use crate::error::ValidationError;
use crate::shape::{Field, Shape};
use crate::validator::{FieldPath, validate, validate_at};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

/// Revision of the editor-native operator format.
///
/// * `V1`: `outputType` is one of [`OutputType::FIXED`]; inputs may set `forceAsSource`.
/// * `V2`: `outputType` is any non-empty string; `forceAsSource` is gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V1,
    #[default]
    V2,
}

static V1_OPERATOR: LazyLock<Shape> = LazyLock::new(|| operator_shape(SchemaVersion::V1));
static V2_OPERATOR: LazyLock<Shape> = LazyLock::new(|| operator_shape(SchemaVersion::V2));
static V1_LIST: LazyLock<Shape> = LazyLock::new(|| Shape::list(operator_shape(SchemaVersion::V1)));
static V2_LIST: LazyLock<Shape> = LazyLock::new(|| Shape::list(operator_shape(SchemaVersion::V2)));

impl SchemaVersion {
    pub fn operator_shape(self) -> &'static Shape {
        match self {
            Self::V1 => &V1_OPERATOR,
            Self::V2 => &V2_OPERATOR,
        }
    }

    pub fn list_shape(self) -> &'static Shape {
        match self {
            Self::V1 => &V1_LIST,
            Self::V2 => &V2_LIST,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

fn operator_shape(version: SchemaVersion) -> Shape {
    let mut input_fields = vec![
        Field::required("name", Shape::string()),
        Field::required("type", Shape::string()),
        Field::optional("schema", Shape::opaque()),
    ];
    let output_type = match version {
        SchemaVersion::V1 => {
            input_fields.push(Field::optional("forceAsSource", Shape::boolean()));
            Shape::choice(OutputType::FIXED)
        }
        SchemaVersion::V2 => Shape::non_empty_string(),
    };
    Shape::mapping([
        Field::required("title", Shape::string()),
        Field::optional("desc", Shape::string()),
        Field::optional("description", Shape::string()),
        Field::optional("helpUrl", Shape::string()),
        Field::optional("inputs", Shape::list(Shape::mapping(input_fields)).nullable()),
        Field::optional("required", Shape::list(Shape::string()).nullable()),
        Field::required("outputType", output_type),
    ])
}

/// The kind of result an operator produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputType {
    Raster,
    Vector,
    Plot,
    /// Same type as the operator's source.
    CopyFromSource,
    Other(String),
}

impl OutputType {
    pub const FIXED: [&'static str; 4] = ["raster", "vector", "plot", "copyFromSource"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Raster => "raster",
            Self::Vector => "vector",
            Self::Plot => "plot",
            Self::CopyFromSource => "copyFromSource",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for OutputType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "raster" => Self::Raster,
            "vector" => Self::Vector,
            "plot" => Self::Plot,
            "copyFromSource" => Self::CopyFromSource,
            _ => Self::Other(value),
        }
    }
}

impl From<OutputType> for String {
    fn from(value: OutputType) -> Self {
        match value {
            OutputType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// An editor-native operator descriptor, canonical across [`SchemaVersion`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkflowOperatorDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<WorkflowOperatorInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    pub output_type: OutputType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkflowOperatorInput {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_as_source: Option<bool>,
}

impl WorkflowOperatorDefinition {
    pub fn parse(value: &Value, version: SchemaVersion) -> Result<Self, ValidationError> {
        Self::parse_at(value, version, FieldPath::root())
    }

    pub fn parse_at(
        value: &Value,
        version: SchemaVersion,
        path: FieldPath,
    ) -> Result<Self, ValidationError> {
        let shape = version.operator_shape();
        validate_at(shape, value, path.clone())?;
        decode(value, path, shape)
    }

    /// `description` if present, otherwise the older `desc`.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().or(self.desc.as_deref())
    }

    pub fn inputs(&self) -> &[WorkflowOperatorInput] {
        self.inputs.as_deref().unwrap_or_default()
    }

    pub fn input(&self, name: &str) -> Option<&WorkflowOperatorInput> {
        self.inputs().iter().find(|input| input.name == name)
    }

    pub fn is_input_required(&self, name: &str) -> bool {
        self.required
            .as_deref()
            .is_some_and(|required| required.iter().any(|r| r == name))
    }
}

/// The ordered, editor-facing list of available operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowOperatorList {
    version: SchemaVersion,
    operators: Vec<WorkflowOperatorDefinition>,
}

impl WorkflowOperatorList {
    pub fn empty(version: SchemaVersion) -> Self {
        Self {
            version,
            operators: Vec::new(),
        }
    }

    /// Validates every element; a single bad element rejects the whole list.
    pub fn parse(raw: &Value, version: SchemaVersion) -> Result<Self, ValidationError> {
        let shape = version.list_shape();
        validate(shape, raw)?;
        let operators = decode(raw, FieldPath::root(), shape)?;
        Ok(Self { version, operators })
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkflowOperatorDefinition> {
        self.operators.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowOperatorDefinition> {
        self.operators.iter()
    }

    pub fn find_by_title(&self, title: &str) -> Option<&WorkflowOperatorDefinition> {
        self.operators.iter().find(|op| op.title == title)
    }
}

impl Serialize for WorkflowOperatorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.operators.serialize(serializer)
    }
}
