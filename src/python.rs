use crate::config::{DefinitionsVariant, EditorConfig};
use crate::definitions::SchemaVersion;
use crate::error::EditorError;
use crate::state::{EditorState, LoadOutcome};
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use serde_json::Value;

fn parse_variant(variant: &str, schema_version: &str) -> PyResult<DefinitionsVariant> {
    let schema_version = match schema_version {
        "v1" => SchemaVersion::V1,
        "v2" => SchemaVersion::V2,
        other => {
            return Err(PyValueError::new_err(format!(
                "unknown schema version '{other}', expected 'v1' or 'v2'"
            )));
        }
    };
    match variant {
        "catalog" => Ok(DefinitionsVariant::Catalog),
        "operator_list" => Ok(DefinitionsVariant::OperatorList { schema_version }),
        other => Err(PyValueError::new_err(format!(
            "unknown definitions variant '{other}', expected 'catalog' or 'operator_list'"
        ))),
    }
}

fn to_py_err(err: EditorError) -> PyErr {
    match err {
        EditorError::Validation(e) => PyValueError::new_err(e.to_string()),
        EditorError::Load(e) => PyIOError::new_err(e.to_string()),
    }
}

fn to_json(value: &Value) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// The synchronized state of one workflow editor widget.
///
/// Definitions documents are validated before they become visible to the
/// editor canvas; the workflow document is owned by the canvas and passed
/// through unchanged.
#[pyclass(name = "WorkflowEditor")]
struct WorkflowEditorPy {
    state: EditorState,
    runtime: tokio::runtime::Runtime,
}

#[pymethods]
impl WorkflowEditorPy {
    /// Creates the editor state.
    ///
    /// Args:
    ///     server_url (str): Base URL of the backend.
    ///     token (str): Session token forwarded to the canvas.
    ///     variant (str): "catalog" (synchronized as `schema`) or
    ///         "operator_list" (synchronized as `definitions`).
    ///     schema_version (str): "v1" or "v2", only used by "operator_list".
    ///
    /// Raises:
    ///     ValueError: If `variant` or `schema_version` is unknown.
    #[new]
    #[pyo3(signature = (server_url, token, variant = "catalog", schema_version = "v2"))]
    fn new(server_url: &str, token: &str, variant: &str, schema_version: &str) -> PyResult<Self> {
        let config = EditorConfig::new(server_url, token)
            .with_definitions(parse_variant(variant, schema_version)?);
        let state =
            EditorState::from_config(&config).map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(Self { state, runtime })
    }

    #[getter]
    fn server_url(&self) -> String {
        self.state.connection().server_url().to_string()
    }

    #[getter]
    fn token(&self) -> String {
        self.state.connection().token().to_string()
    }

    /// Fetches and validates a definitions document.
    ///
    /// Returns:
    ///     bool: True if the document was applied, False if a newer load won.
    ///
    /// Raises:
    ///     ValueError: If the document does not match the definitions shape.
    ///     IOError: If the document could not be fetched or parsed.
    fn load_definitions(&self, py: Python<'_>, url: &str) -> PyResult<bool> {
        let outcome = py
            .detach(|| self.runtime.block_on(self.state.load_definitions_from(url)))
            .map_err(to_py_err)?;
        Ok(outcome == LoadOutcome::Applied)
    }

    /// Like `load_definitions`, using `<server_url>/workflow/schema`.
    fn load_definitions_from_server(&self, py: Python<'_>) -> PyResult<bool> {
        let outcome = py
            .detach(|| self.runtime.block_on(self.state.load_definitions_from_server()))
            .map_err(to_py_err)?;
        Ok(outcome == LoadOutcome::Applied)
    }

    /// Validates and applies a definitions document given as a JSON string.
    fn set_definitions_json(&self, document: &str) -> PyResult<()> {
        let raw: Value =
            serde_json::from_str(document).map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.state
            .set_definitions(raw)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// The current definitions document as a JSON string.
    fn definitions_json(&self) -> PyResult<String> {
        to_json(self.state.definitions().raw())
    }

    /// The workflow document as a JSON string, or None while absent.
    fn workflow_json(&self) -> PyResult<Option<String>> {
        self.state.workflow().as_ref().map(to_json).transpose()
    }

    /// Stores a workflow document coming from the canvas. Never validated.
    #[pyo3(signature = (document = None))]
    fn receive_workflow_json(&self, document: Option<&str>) -> PyResult<()> {
        let document = document
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.state.receive_workflow_update(document);
        Ok(())
    }

    /// All synchronized fields as a JSON string.
    fn state_json(&self) -> PyResult<String> {
        to_json(&self.state.snapshot().to_wire())
    }
}

/// Definition validation and synchronized state for the workflow editor widget.
#[pymodule]
fn workflow_editor(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<WorkflowEditorPy>()?;
    Ok(())
}
