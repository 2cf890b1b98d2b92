//! The synchronized editor state.
//!
//! One [`EditorState`] exists per editor instance. The hosting process owns the
//! connection parameters and the definitions field; the remote rendering surface
//! owns the workflow field. Every accepted change is published through a `watch`
//! channel, so both sides see the latest [`Snapshot`] and are woken on change.
//!
//! Definitions are only ever replaced as a whole, after the complete document has
//! been fetched and validated.

use crate::config::{DefinitionsVariant, EditorConfig};
use crate::definitions::{EditorSchema, WorkflowOperatorList};
use crate::error::{ConfigError, EditorError, ValidationError};
use crate::loader::{DocumentLoader, HttpDocumentLoader};
use crate::workflow::Workflow;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Connection parameters, fixed for the lifetime of the editor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    server_url: String,
    token: String,
}

impl Connection {
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Where the backend serves its operator definitions.
    pub fn schema_url(&self) -> String {
        format!("{}/workflow/schema", self.server_url.trim_end_matches('/'))
    }
}

/// The parsed form of the definitions field.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDefinitions {
    Catalog(EditorSchema),
    OperatorList(WorkflowOperatorList),
}

/// The definitions field: the document exactly as loaded, plus its parsed form.
#[derive(Debug, Clone, PartialEq)]
pub struct Definitions {
    raw: Value,
    parsed: ParsedDefinitions,
}

impl Definitions {
    /// What the field holds before anything has been loaded.
    pub fn empty(variant: DefinitionsVariant) -> Self {
        match variant {
            DefinitionsVariant::Catalog => Self {
                raw: json!({ "definitions": {} }),
                parsed: ParsedDefinitions::Catalog(EditorSchema::default()),
            },
            DefinitionsVariant::OperatorList { schema_version } => Self {
                raw: json!([]),
                parsed: ParsedDefinitions::OperatorList(WorkflowOperatorList::empty(schema_version)),
            },
        }
    }

    /// Validates `raw` as a whole against the deployment's representation.
    pub fn parse(variant: DefinitionsVariant, raw: Value) -> Result<Self, ValidationError> {
        let parsed = match variant {
            DefinitionsVariant::Catalog => ParsedDefinitions::Catalog(EditorSchema::parse(&raw)?),
            DefinitionsVariant::OperatorList { schema_version } => {
                ParsedDefinitions::OperatorList(WorkflowOperatorList::parse(&raw, schema_version)?)
            }
        };
        Ok(Self { raw, parsed })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn parsed(&self) -> &ParsedDefinitions {
        &self.parsed
    }

    pub fn as_catalog(&self) -> Option<&EditorSchema> {
        match &self.parsed {
            ParsedDefinitions::Catalog(schema) => Some(schema),
            ParsedDefinitions::OperatorList(_) => None,
        }
    }

    pub fn as_operator_list(&self) -> Option<&WorkflowOperatorList> {
        match &self.parsed {
            ParsedDefinitions::OperatorList(list) => Some(list),
            ParsedDefinitions::Catalog(_) => None,
        }
    }

    /// Number of catalog entries or list elements.
    pub fn len(&self) -> usize {
        match &self.parsed {
            ParsedDefinitions::Catalog(schema) => schema.definitions.len(),
            ParsedDefinitions::OperatorList(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A published state of the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    connection: Connection,
    variant: DefinitionsVariant,
    definitions: Definitions,
    workflow: Option<Value>,
    definitions_revision: u64,
    workflow_revision: u64,
}

impl Snapshot {
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn workflow(&self) -> Option<&Value> {
        self.workflow.as_ref()
    }

    /// Bumped each time the definitions field changes value.
    pub fn definitions_revision(&self) -> u64 {
        self.definitions_revision
    }

    /// Bumped each time the workflow field changes value.
    pub fn workflow_revision(&self) -> u64 {
        self.workflow_revision
    }

    /// The fields as the rendering surface sees them:
    /// `serverUrl`, `token`, `schema` or `definitions`, and `workflow`.
    pub fn to_wire(&self) -> Value {
        let mut wire = Map::new();
        wire.insert("serverUrl".to_string(), Value::from(self.connection.server_url.as_str()));
        wire.insert("token".to_string(), Value::from(self.connection.token.as_str()));
        wire.insert(self.variant.wire_field().to_string(), self.definitions.raw.clone());
        wire.insert("workflow".to_string(), self.workflow.clone().unwrap_or(Value::Null));
        Value::Object(wire)
    }
}

/// Result of a definitions load that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document now backs the definitions field.
    Applied,
    /// A load initiated later was already applied; this result was discarded.
    Superseded,
}

struct Shared {
    variant: DefinitionsVariant,
    loader: Arc<dyn DocumentLoader>,
    next_ticket: AtomicU64,
    committed_ticket: AtomicU64,
    sender: watch::Sender<Snapshot>,
}

impl Shared {
    fn issue_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies `definitions` unless a newer ticket has already been committed.
    fn commit(&self, ticket: u64, definitions: Definitions) -> LoadOutcome {
        let mut outcome = LoadOutcome::Superseded;
        self.sender.send_if_modified(|snapshot| {
            // The watch lock serializes commits, so this check-then-store is atomic.
            if ticket <= self.committed_ticket.load(Ordering::Acquire) {
                return false;
            }
            self.committed_ticket.store(ticket, Ordering::Release);
            outcome = LoadOutcome::Applied;
            if snapshot.definitions == definitions {
                return false;
            }
            snapshot.definitions = definitions;
            snapshot.definitions_revision += 1;
            true
        });
        outcome
    }

    async fn finish_load(&self, ticket: u64, url: &str) -> Result<LoadOutcome, EditorError> {
        let field = self.variant.wire_field();
        let raw = self.loader.fetch(url).await.inspect_err(|err| {
            log::warn!("Load #{} failed: {}", ticket, err);
        })?;
        let definitions = Definitions::parse(self.variant, raw).inspect_err(|err| {
            log::warn!("Load #{} rejected {} from '{}': {}", ticket, field, url, err);
        })?;
        let count = definitions.len();

        let outcome = self.commit(ticket, definitions);
        match outcome {
            LoadOutcome::Applied => {
                log::info!("  -> Applied {} {} entries from '{}'", count, field, url)
            }
            LoadOutcome::Superseded => {
                log::info!("  -> Discarded load #{} from '{}': a newer load won", ticket, url)
            }
        }
        Ok(outcome)
    }

    fn set_workflow(&self, document: Option<Value>) {
        self.sender.send_if_modified(|snapshot| {
            if snapshot.workflow == document {
                return false;
            }
            snapshot.workflow = document;
            snapshot.workflow_revision += 1;
            true
        });
    }
}

/// The process-wide state of one editor instance. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct EditorState {
    shared: Arc<Shared>,
}

impl fmt::Debug for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorState")
            .field("variant", &self.shared.variant)
            .field("snapshot", &*self.shared.sender.borrow())
            .finish_non_exhaustive()
    }
}

impl EditorState {
    /// Creates the state with fixed connection parameters. No format checks are
    /// applied to them. The workflow starts absent and the definitions empty.
    pub fn initialize(
        server_url: impl Into<String>,
        token: impl Into<String>,
        variant: DefinitionsVariant,
        loader: Arc<dyn DocumentLoader>,
    ) -> Self {
        let snapshot = Snapshot {
            connection: Connection {
                server_url: server_url.into(),
                token: token.into(),
            },
            variant,
            definitions: Definitions::empty(variant),
            workflow: None,
            definitions_revision: 0,
            workflow_revision: 0,
        };
        let (sender, _) = watch::channel(snapshot);
        Self {
            shared: Arc::new(Shared {
                variant,
                loader,
                next_ticket: AtomicU64::new(0),
                committed_ticket: AtomicU64::new(0),
                sender,
            }),
        }
    }

    /// Builds the state with the HTTP/file loader described by `config`.
    pub fn from_config(config: &EditorConfig) -> Result<Self, ConfigError> {
        let loader = HttpDocumentLoader::new(&config.loader)?;
        Ok(Self::with_loader(config, Arc::new(loader)))
    }

    pub fn with_loader(config: &EditorConfig, loader: Arc<dyn DocumentLoader>) -> Self {
        Self::initialize(
            config.server_url.clone(),
            config.token.clone(),
            config.definitions,
            loader,
        )
    }

    pub fn variant(&self) -> DefinitionsVariant {
        self.shared.variant
    }

    pub fn connection(&self) -> Connection {
        self.shared.sender.borrow().connection.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.sender.borrow().clone()
    }

    pub fn definitions(&self) -> Definitions {
        self.shared.sender.borrow().definitions.clone()
    }

    pub fn workflow(&self) -> Option<Value> {
        self.shared.sender.borrow().workflow.clone()
    }

    /// The workflow document as a typed tree, if it has that shape.
    pub fn workflow_view(&self) -> Option<Workflow> {
        self.shared
            .sender
            .borrow()
            .workflow
            .as_ref()
            .and_then(Workflow::from_document)
    }

    /// Receives every change the hosting process or the remote surface makes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.sender.subscribe()
    }

    /// The handle given to the rendering surface.
    pub fn remote(&self) -> RemoteSurface {
        RemoteSurface {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Validates `raw` and, if it passes, replaces the definitions.
    /// On rejection the previously held definitions stay in effect.
    pub fn set_definitions(&self, raw: Value) -> Result<(), ValidationError> {
        let ticket = self.shared.issue_ticket();
        let field = self.shared.variant.wire_field();
        let definitions = Definitions::parse(self.shared.variant, raw).inspect_err(|err| {
            log::warn!("Rejected {} document: {}", field, err);
        })?;
        let count = definitions.len();
        match self.shared.commit(ticket, definitions) {
            LoadOutcome::Applied => log::info!("  -> Applied {} {} entries", count, field),
            LoadOutcome::Superseded => {
                log::info!("  -> Discarded assignment #{}: a newer load won", ticket)
            }
        }
        Ok(())
    }

    /// Fetches `url` through the injected loader and replaces the definitions with it.
    ///
    /// The load's place in line is taken by this call, not by the first poll of the
    /// returned future: when several loads overlap, the one called last among those
    /// that succeed wins, whatever order they are polled or complete in. Nothing is
    /// mutated before the full document has been fetched and validated, so dropping
    /// the future is always safe.
    pub fn load_definitions_from(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<LoadOutcome, EditorError>> + Send {
        self.start_load(url.to_string())
    }

    /// Loads the definitions the configured backend serves.
    pub fn load_definitions_from_server(
        &self,
    ) -> impl Future<Output = Result<LoadOutcome, EditorError>> + Send {
        self.start_load(self.connection().schema_url())
    }

    fn start_load(
        &self,
        url: String,
    ) -> impl Future<Output = Result<LoadOutcome, EditorError>> + Send {
        let ticket = self.shared.issue_ticket();
        log::debug!(
            "Load #{} of {} from '{}'",
            ticket,
            self.shared.variant.wire_field(),
            url
        );
        let shared = Arc::clone(&self.shared);
        async move { shared.finish_load(ticket, &url).await }
    }

    /// Accepts a workflow document pushed by the remote surface. Never validated:
    /// the document belongs to the remote side.
    pub fn receive_workflow_update(&self, document: Option<Value>) {
        self.shared.set_workflow(document);
    }
}

/// The rendering surface's end of the synchronization channel.
///
/// It may read every field but only write the workflow.
#[derive(Clone)]
pub struct RemoteSurface {
    shared: Arc<Shared>,
}

impl RemoteSurface {
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.sender.subscribe()
    }

    /// The current state in wire form.
    pub fn state(&self) -> Value {
        self.shared.sender.borrow().to_wire()
    }

    pub fn push_workflow(&self, document: Option<Value>) {
        log::debug!("Workflow update from remote surface");
        self.shared.set_workflow(document);
    }
}
