//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! workflow_editor crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use workflow_editor::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string("schema.json")?)?;
//! let schema = EditorSchema::parse(&raw)?;
//! for (id, operator) in schema.definitions.operators() {
//!     println!("{} -> {}", id, operator.title());
//! }
//! # Ok(())
//! # }
//! ```

// State and loading
pub use crate::config::{DefinitionsVariant, EditorConfig, LoaderConfig};
pub use crate::loader::{DocumentLoader, HttpDocumentLoader, MemoryLoader};
pub use crate::state::{Definitions, EditorState, LoadOutcome, RemoteSurface, Snapshot};

// Document types
pub use crate::definitions::{
    DatatypeDefinition, Definition, DefinitionCatalog, DefinitionKind, EditorSchema,
    OperatorDefinition, SchemaVersion, ShapedDefinition, ValidationReport,
    WorkflowOperatorDefinition, WorkflowOperatorList,
};
pub use crate::workflow::{Workflow, WorkflowOperator};

// Shapes and validation
pub use crate::shape::{Field, KeyPredicate, ScalarKind, Shape};
pub use crate::validator::{FieldPath, validate};

// Error types
pub use crate::error::{ConfigError, EditorError, LoadError, LoadFailure, ValidationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
