use std::path::PathBuf;

use thiserror::Error;

/// The primary error type that can be produced while decoding VizQL
/// documents or driving a session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("field \"{field}\" is not of the expected type (expected {expected})")]
    UnexpectedType {
        field: String,
        expected: &'static str,
    },
    #[error("malformed bootstrap response: {0}")]
    MalformedBootstrap(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no such worksheet: {0}")]
    NoSuchWorksheet(String),
    #[error("no such column \"{column}\" in worksheet \"{worksheet}\"")]
    NoSuchColumn { worksheet: String, column: String },
    #[error("no such filter \"{column}\" in worksheet \"{worksheet}\"")]
    NoSuchFilter { worksheet: String, column: String },
    #[error("no such parameter: {0}")]
    NoSuchParameter(String),
    #[error("no such sheet: {0}")]
    NoSuchSheet(String),
    #[error("no such story point: {0}")]
    NoSuchStoryPoint(i64),
    #[error("value \"{value}\" not found in {within}")]
    ValueNotFound { value: String, within: String },

    #[error("transport error: {0}")]
    Transport(String),
    #[error("I/O error {0}: {1}")]
    Io(String, std::io::Error),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("cannot determine file type of file: {0}")]
    CannotDetermineFileType(PathBuf),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

impl Error {
    /// A user-supplied name or value was not among the currently known
    /// candidates. Callers can recover from these (prompt again, skip, etc.).
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::NoSuchWorksheet(_)
                | Self::NoSuchColumn { .. }
                | Self::NoSuchFilter { .. }
                | Self::NoSuchParameter(_)
                | Self::NoSuchSheet(_)
                | Self::NoSuchStoryPoint(_)
                | Self::ValueNotFound { .. }
        )
    }

    /// A document did not have the shape its caller asserted.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::UnexpectedType { .. }
                | Self::MalformedBootstrap(_)
                | Self::Json(_)
        )
    }

    pub(crate) fn value_not_found<V, W>(value: V, within: W) -> Self
    where
        V: AsRef<str>,
        W: AsRef<str>,
    {
        Self::ValueNotFound {
            value: value.as_ref().to_string(),
            within: within.as_ref().to_string(),
        }
    }
}
