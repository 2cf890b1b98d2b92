//! A lenient typed view of the remote-owned workflow document.
//!
//! The document itself is stored as raw JSON and never validated. These types are
//! only for the hosting process to inspect it; a document that does not fit simply
//! has no view.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{"type": "Raster", "operator": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(rename = "type")]
    pub result_type: String,
    pub operator: WorkflowOperator,
}

/// One node of the operator tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOperator {
    #[serde(rename = "type")]
    pub operator_type: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Map<String, Value>>,
}

impl Workflow {
    pub fn from_document(document: &Value) -> Option<Self> {
        Self::deserialize(document).ok()
    }
}

impl WorkflowOperator {
    /// Source operators by slot name. A slot holding a list yields one entry per
    /// element; values that are not operators are skipped.
    pub fn source_operators(&self) -> Vec<(&str, WorkflowOperator)> {
        let Some(sources) = &self.sources else {
            return Vec::new();
        };
        let mut operators = Vec::new();
        for (slot, value) in sources {
            match value {
                Value::Array(items) => operators.extend(
                    items
                        .iter()
                        .filter_map(|item| Self::deserialize(item).ok())
                        .map(|op| (slot.as_str(), op)),
                ),
                other => {
                    if let Ok(op) = Self::deserialize(other) {
                        operators.push((slot.as_str(), op));
                    }
                }
            }
        }
        operators
    }

    /// Operator types in the tree, depth-first, this operator first.
    pub fn operator_types(&self) -> Vec<String> {
        let mut types = vec![self.operator_type.clone()];
        for (_, source) in self.source_operators() {
            types.extend(source.operator_types());
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn walks_nested_sources() {
        let doc = json!({
            "type": "Raster",
            "operator": {
                "type": "Expression",
                "params": {"expression": "A + B"},
                "sources": {
                    "a": {"type": "GdalSource", "params": {"data": "ndvi"}},
                    "b": [{"type": "GdalSource", "params": {}}, 42]
                }
            }
        });
        let workflow = Workflow::from_document(&doc).expect("workflow view");
        assert_eq!(workflow.result_type, "Raster");
        assert_eq!(
            workflow.operator.operator_types(),
            vec!["Expression", "GdalSource", "GdalSource"]
        );
    }

    #[test]
    fn foreign_documents_have_no_view() {
        assert!(Workflow::from_document(&json!({"nodes": []})).is_none());
        assert!(Workflow::from_document(&json!(null)).is_none());
    }
}
