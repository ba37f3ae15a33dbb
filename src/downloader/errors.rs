// Error types for the option codec and the yt-dlp runner

use thiserror::Error;

/// Failures while turning an options document back into [`Options`].
///
/// Every variant is fatal to the call that produced it; nothing is applied
/// partially to a caller's model.
///
/// [`Options`]: crate::downloader::options::Options
#[derive(Debug, Error)]
pub enum CodecError {
    /// Top-level key with no matching option category
    #[error("Unknown option category: {0}")]
    UnknownCategory(String),

    /// Nested key with no matching cell inside its category
    #[error("Unknown option '{cell}' in category '{category}'")]
    UnknownCell { category: String, cell: String },

    /// Timestamp cell received text that is not RFC 3339 / ISO-8601
    #[error("Malformed timestamp for '{cell}': {value}")]
    MalformedTimestamp { cell: String, value: String },

    /// Rate cell received text that is not a magnitude with a unit (e.g. "4.2M")
    #[error("Malformed rate for '{cell}': {value}")]
    MalformedRate { cell: String, value: String },

    /// JSON value shape does not fit the cell's declared type
    #[error("Type mismatch for '{cell}': expected {expected}, got {found}")]
    TypeMismatch {
        cell: String,
        expected: &'static str,
        found: String,
    },

    /// Document text is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Options file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn mismatch(cell: &str, expected: &'static str, found: &serde_json::Value) -> Self {
        let found = match found {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(n) if n.is_f64() => "floating point number",
            serde_json::Value::Number(_) => "integer",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        Self::TypeMismatch {
            cell: cell.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp (or the configured interpreter) could not be started
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Process could not be spawned or its pipes captured
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Saving or restoring options failed
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::ToolNotFound(e.to_string())
        } else {
            Self::ExecutionError(e.to_string())
        }
    }
}
