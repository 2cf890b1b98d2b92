//! Common test utilities: definition documents and loaders with controlled timing.
use ahash::AHashMap;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use workflow_editor::prelude::*;

/// The catalog document from the end-to-end scenario.
#[allow(dead_code)]
pub fn e2e_schema() -> Value {
    json!({
        "definitions": {
            "op1": {
                "title": "A",
                "properties": {
                    "type": { "enum": ["raster"] },
                    "params": { "properties": null, "required": null }
                }
            }
        }
    })
}

/// Same as [`e2e_schema`] with an empty type tag list.
#[allow(dead_code)]
pub fn e2e_schema_empty_enum() -> Value {
    let mut doc = e2e_schema();
    doc["definitions"]["op1"]["properties"]["type"]["enum"] = json!([]);
    doc
}

/// A catalog with two datatypes and two operators covering every source form.
#[allow(dead_code)]
pub fn create_full_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "$ref": "#/definitions/Workflow",
        "title": "Workflow",
        "description": null,
        "definitions": {
            "RasterOrVector": {
                "oneOf": [
                    { "$ref": "#/definitions/RasterDataType" },
                    { "$ref": "#/definitions/VectorDataType" }
                ]
            },
            "Workflow": {
                "oneOf": [{ "$ref": "#/definitions/Expression" }]
            },
            "Expression": {
                "title": "Raster Expression",
                "description": "Per-pixel arithmetic",
                "help_text": "Combine bands with a formula",
                "properties": {
                    "type": { "enum": ["Expression"] },
                    "params": {
                        "properties": {
                            "expression": { "type": "string", "title": "Formula", "help_text": null },
                            "outputBand": {
                                "type": "object",
                                "properties": { "dataType": { "type": "string" } }
                            }
                        },
                        "required": ["expression"]
                    },
                    "sources": {
                        "properties": {
                            "raster": { "$ref": "#/definitions/RasterDataType" }
                        },
                        "required": ["raster"]
                    }
                }
            },
            "Reprojection": {
                "properties": {
                    "type": { "enum": ["Reprojection"] },
                    "params": {
                        "properties": {
                            "targetSpatialReference": { "type": "string", "format": "srs" }
                        },
                        "required": null
                    },
                    "sources": {
                        "properties": {
                            "source": {
                                "anyOf": [
                                    { "$ref": "#/definitions/RasterDataType" },
                                    { "$ref": "#/definitions/VectorDataType" }
                                ]
                            },
                            "extras": { "items": { "$ref": "#/definitions/VectorDataType" } }
                        },
                        "required": null
                    }
                }
            }
        }
    })
}

/// An operator list valid under both schema versions.
#[allow(dead_code)]
pub fn create_operator_list() -> Value {
    json!([
        {
            "title": "GDAL Source",
            "description": "Reads raster files",
            "inputs": [],
            "outputType": "raster"
        },
        {
            "title": "Point in Polygon",
            "desc": "Filters points by polygons",
            "helpUrl": "https://docs.example/pip",
            "inputs": [
                { "name": "points", "type": "vector" },
                { "name": "polygons", "type": "vector", "schema": { "type": "object" } }
            ],
            "required": ["points", "polygons"],
            "outputType": "copyFromSource"
        }
    ])
}

/// A V1 list using `forceAsSource`, rejected by V2.
#[allow(dead_code)]
pub fn create_v1_operator_list() -> Value {
    json!([
        {
            "title": "Histogram",
            "inputs": [{ "name": "source", "type": "raster", "forceAsSource": true }],
            "required": ["source"],
            "outputType": "plot"
        }
    ])
}

/// A V2 list with a free-form output type, rejected by V1.
#[allow(dead_code)]
pub fn create_v2_operator_list() -> Value {
    json!([
        { "title": "Statistics", "inputs": null, "required": null, "outputType": "json" }
    ])
}

#[allow(dead_code)]
pub fn catalog_state(loader: Arc<dyn DocumentLoader>) -> EditorState {
    EditorState::initialize(
        "https://backend.example/api",
        "secret-token",
        DefinitionsVariant::Catalog,
        loader,
    )
}

#[allow(dead_code)]
pub fn operator_list_state(version: SchemaVersion, loader: Arc<dyn DocumentLoader>) -> EditorState {
    EditorState::initialize(
        "https://backend.example/api",
        "secret-token",
        DefinitionsVariant::OperatorList {
            schema_version: version,
        },
        loader,
    )
}

type Reply = oneshot::Sender<std::result::Result<Value, LoadError>>;

/// A loader whose fetches stay pending until the test answers them.
///
/// Lets a test complete overlapping loads in any order it likes.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct GatedLoader {
    pending: Arc<Mutex<AHashMap<String, Reply>>>,
}

#[allow(dead_code)]
impl GatedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self, url: &str) -> bool {
        self.pending.lock().expect("gate lock").contains_key(url)
    }

    /// Yields until a fetch of `url` is pending. The fetching future must be
    /// polled concurrently, spawned or joined.
    pub async fn wait_requested(&self, url: &str) {
        while !self.is_requested(url) {
            tokio::task::yield_now().await;
        }
    }

    pub fn release(&self, url: &str, document: Value) {
        self.answer(url, Ok(document));
    }

    pub fn fail(&self, url: &str, cause: LoadFailure) {
        self.answer(url, Err(LoadError::new(url, cause)));
    }

    fn answer(&self, url: &str, reply: std::result::Result<Value, LoadError>) {
        let sender = self
            .pending
            .lock()
            .expect("gate lock")
            .remove(url)
            .expect("no pending fetch for url");
        // The fetching future may already be gone.
        let _ = sender.send(reply);
    }
}

#[async_trait]
impl DocumentLoader for GatedLoader {
    async fn fetch(&self, url: &str) -> std::result::Result<Value, LoadError> {
        let (sender, receiver) = oneshot::channel();
        self.pending
            .lock()
            .expect("gate lock")
            .insert(url.to_string(), sender);
        receiver.await.unwrap_or_else(|_| {
            Err(LoadError::new(
                url,
                LoadFailure::Transport("gate dropped".to_string()),
            ))
        })
    }
}
