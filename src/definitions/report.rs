//! Non-short-circuiting validation for diagnostics.
//!
//! Loading a document stops at the first mismatch. When a user needs to fix a
//! document it is more useful to see every broken entry at once, grouped by the
//! operator it belongs to.

use super::catalog::{Definition, SCHEMA_DOCUMENT};
use super::workflow_operator::SchemaVersion;
use crate::config::DefinitionsVariant;
use crate::error::ValidationError;
use crate::validator::{FieldPath, validate, validate_at};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Group name for errors that are not tied to a single entry.
pub const DOCUMENT_GROUP: &str = "<document>";

/// Validation errors grouped by the entry they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    groups: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationReport {
    pub fn push(&mut self, entry: impl Into<String>, error: ValidationError) {
        self.groups.entry(entry.into()).or_default().push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn errors_for(&self, entry: &str) -> &[ValidationError] {
        self.groups.get(entry).map(Vec::as_slice).unwrap_or_default()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (entry, errors) in &self.groups {
            writeln!(f, "{entry}:")?;
            for error in errors {
                writeln!(f, "  - {error}")?;
            }
        }
        Ok(())
    }
}

/// Validates every entry of a `{"definitions": ...}` document.
pub fn diagnose_schema(raw: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    if let Err(err) = validate(&SCHEMA_DOCUMENT, raw) {
        report.push(DOCUMENT_GROUP, err);
        return report;
    }
    if let Some(definitions) = raw["definitions"].as_object() {
        for (id, entry) in definitions {
            let path = FieldPath::root().key("definitions").key(id);
            if let Err(err) = Definition::parse_at(entry, path) {
                report.push(id.as_str(), err);
            }
        }
    }
    report
}

/// Validates every element of an operator list. Entries are grouped by title,
/// or by `[index]` when the element has no usable title.
pub fn diagnose_operator_list(raw: &Value, version: SchemaVersion) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(items) = raw.as_array() else {
        if let Err(err) = validate(version.list_shape(), raw) {
            report.push(DOCUMENT_GROUP, err);
        }
        return report;
    };
    for (index, item) in items.iter().enumerate() {
        let path = FieldPath::root().index(index);
        if let Err(err) = validate_at(version.operator_shape(), item, path) {
            let entry = item
                .get("title")
                .and_then(Value::as_str)
                .map_or_else(|| format!("[{index}]"), str::to_owned);
            report.push(entry, err);
        }
    }
    report
}

/// Diagnostics for whichever representation `variant` synchronizes.
pub fn diagnose_definitions(variant: DefinitionsVariant, raw: &Value) -> ValidationReport {
    match variant {
        DefinitionsVariant::Catalog => diagnose_schema(raw),
        DefinitionsVariant::OperatorList { schema_version } => {
            diagnose_operator_list(raw, schema_version)
        }
    }
}
