use super::datatype::DatatypeDefinition;
use super::operator::OperatorDefinition;
use super::ShapedDefinition;
use crate::error::ValidationError;
use crate::shape::{Field, KeyPredicate, Shape};
use crate::validator::{FieldPath, describe, validate};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

const CATALOG_ENTRY_EXPECTATION: &str = "a datatype or operator definition mapping";

/// The document wrapping a catalog: `{"definitions": {...}}` plus optional
/// JSON-Schema metadata.
pub static SCHEMA_DOCUMENT: LazyLock<Shape> = LazyLock::new(|| {
    Shape::mapping([
        Field::optional("$schema", Shape::string()),
        Field::optional("$ref", Shape::string()),
        Field::optional("title", Shape::nullable_string()),
        Field::optional("description", Shape::nullable_string()),
        Field::required("definitions", Shape::keyed(KeyPredicate::Any, Shape::opaque())),
    ])
});

/// Which of the two definition kinds a catalog entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Datatype,
    Operator,
}

impl DefinitionKind {
    /// An entry is a datatype definition iff its only key is `oneOf`.
    pub fn classify(entry: &Map<String, Value>) -> Self {
        if entry.len() == 1 && entry.contains_key("oneOf") {
            Self::Datatype
        } else {
            Self::Operator
        }
    }

    pub fn shape(self) -> &'static Shape {
        match self {
            Self::Datatype => DatatypeDefinition::shape(),
            Self::Operator => OperatorDefinition::shape(),
        }
    }
}

/// A classified catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Definition {
    Datatype(DatatypeDefinition),
    Operator(OperatorDefinition),
}

impl Definition {
    /// Classifies `value` once and validates it against the matching shape.
    pub fn parse_at(value: &Value, path: FieldPath) -> Result<Self, ValidationError> {
        let Some(entry) = value.as_object() else {
            return Err(ValidationError::new(
                path,
                CATALOG_ENTRY_EXPECTATION,
                describe(value),
            ));
        };
        match DefinitionKind::classify(entry) {
            DefinitionKind::Datatype => DatatypeDefinition::parse_at(value, path).map(Self::Datatype),
            DefinitionKind::Operator => OperatorDefinition::parse_at(value, path).map(Self::Operator),
        }
    }

    pub fn kind(&self) -> DefinitionKind {
        match self {
            Self::Datatype(_) => DefinitionKind::Datatype,
            Self::Operator(_) => DefinitionKind::Operator,
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorDefinition> {
        match self {
            Self::Operator(operator) => Some(operator),
            Self::Datatype(_) => None,
        }
    }

    pub fn as_datatype(&self) -> Option<&DatatypeDefinition> {
        match self {
            Self::Datatype(datatype) => Some(datatype),
            Self::Operator(_) => None,
        }
    }
}

/// Identifier to definition. Parsing is all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DefinitionCatalog {
    entries: BTreeMap<String, Definition>,
}

impl DefinitionCatalog {
    pub fn parse(raw: &Value) -> Result<Self, ValidationError> {
        Self::parse_at(raw, FieldPath::root())
    }

    pub fn parse_at(raw: &Value, path: FieldPath) -> Result<Self, ValidationError> {
        let Some(map) = raw.as_object() else {
            return Err(ValidationError::new(
                path,
                format!("a mapping of identifiers to {CATALOG_ENTRY_EXPECTATION}s"),
                describe(raw),
            ));
        };
        let mut entries = BTreeMap::new();
        for (id, entry) in map {
            let definition = Definition::parse_at(entry, path.clone().key(id))?;
            entries.insert(id.clone(), definition);
        }
        let catalog = Self { entries };
        log::debug!(
            "Classified {} datatype and {} operator definitions",
            catalog.datatypes().count(),
            catalog.operators().count()
        );
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Definition> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.entries.iter().map(|(id, def)| (id.as_str(), def))
    }

    pub fn operators(&self) -> impl Iterator<Item = (&str, &OperatorDefinition)> {
        self.iter()
            .filter_map(|(id, def)| def.as_operator().map(|op| (id, op)))
    }

    pub fn datatypes(&self) -> impl Iterator<Item = (&str, &DatatypeDefinition)> {
        self.iter()
            .filter_map(|(id, def)| def.as_datatype().map(|dt| (id, dt)))
    }

    /// Finds an operator by its type tag rather than its catalog identifier.
    pub fn operator_by_type(&self, type_tag: &str) -> Option<&OperatorDefinition> {
        self.operators()
            .map(|(_, op)| op)
            .find(|op| op.id() == type_tag)
    }
}

/// The schema-facing definitions document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditorSchema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub meta_schema: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub definitions: DefinitionCatalog,
}

impl EditorSchema {
    pub fn parse(raw: &Value) -> Result<Self, ValidationError> {
        validate(&SCHEMA_DOCUMENT, raw)?;
        let definitions = DefinitionCatalog::parse_at(
            &raw["definitions"],
            FieldPath::root().key("definitions"),
        )?;
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_owned);
        Ok(Self {
            meta_schema: text("$schema"),
            root: text("$ref"),
            title: text("title"),
            description: text("description"),
            definitions,
        })
    }
}
