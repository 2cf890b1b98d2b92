use crate::validator::FieldPath;
use thiserror::Error;

/// A value was rejected by a shape.
///
/// Always recoverable: whatever operation produced it left the editor state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("at `{path}`: expected {expected}, found {actual}")]
pub struct ValidationError {
    /// Where in the document the mismatch was found.
    pub path: FieldPath,
    /// What the shape at `path` accepts.
    pub expected: String,
    /// What was found instead.
    pub actual: String,
    /// Rejections of the remaining variants when every variant of a union failed.
    /// The error itself always describes the first variant.
    pub alternatives: Vec<ValidationError>,
}

impl ValidationError {
    pub fn new(path: FieldPath, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            path,
            expected: expected.into(),
            actual: actual.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<ValidationError>) -> Self {
        self.alternatives = alternatives;
        self
    }
}

/// Why a document could not be fetched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("no handler for URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("could not read file: {0}")]
    Io(String),

    #[error("response is not valid JSON: {0}")]
    Parse(String),
}

/// The document loader failed. State is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load '{url}': {cause}")]
pub struct LoadError {
    pub url: String,
    pub cause: LoadFailure,
}

impl LoadError {
    pub fn new(url: impl Into<String>, cause: LoadFailure) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

/// Errors surfaced by mutating operations on the editor state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("definitions rejected {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors raised while reading configuration or preparing the default loader.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config JSON: {0}")]
    JsonParseError(String),

    #[error("Could not build HTTP client: {0}")]
    HttpClient(String),
}
