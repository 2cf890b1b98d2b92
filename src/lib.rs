//! # Workflow Editor - Definition Validation and Synchronized State
//!
//! **workflow-editor** is the data core behind a visual workflow editor embedded in a
//! notebook. The editor canvas itself runs remotely; this crate decides which
//! definition documents it is allowed to see and keeps the state both sides share.
//!
//! ## Core Workflow
//!
//! 1.  **Describe**: Every document kind has a [`shape::Shape`], a declarative contract
//!     built once and checked by the generic matcher in [`validator`].
//! 2.  **Load**: [`state::EditorState::load_definitions_from`] fetches raw JSON through an
//!     injected [`loader::DocumentLoader`] and validates the whole document.
//! 3.  **Publish**: A validated document atomically replaces the definitions field and is
//!     pushed to every subscriber of the state's `watch` channel.
//! 4.  **Receive**: The remote surface writes back the in-progress workflow document,
//!     which is stored as-is.
//!
//! Two definition representations exist, one per deployment generation: a schema
//! catalog of datatype and operator definitions (published as `schema`), and an
//! editor-native list of workflow operators (published as `definitions`).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workflow_editor::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let loader = MemoryLoader::new().with_document(
//!     "mem://schema",
//!     serde_json::json!({
//!         "definitions": {
//!             "op1": {
//!                 "title": "A",
//!                 "properties": {
//!                     "type": { "enum": ["raster"] },
//!                     "params": { "properties": null, "required": null }
//!                 }
//!             }
//!         }
//!     }),
//! );
//!
//! let state = EditorState::initialize(
//!     "https://backend.example/api",
//!     "token",
//!     DefinitionsVariant::Catalog,
//!     Arc::new(loader),
//! );
//! state.load_definitions_from("mem://schema").await?;
//!
//! let definitions = state.definitions();
//! let schema = definitions.as_catalog().expect("catalog deployment");
//! println!("op1 -> {:?}", schema.definitions.get("op1").map(Definition::kind));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod definitions;
pub mod error;
pub mod loader;
pub mod prelude;
pub mod shape;
pub mod state;
pub mod validator;
pub mod workflow;

#[cfg(feature = "python-bindings")]
mod python;
