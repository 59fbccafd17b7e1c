//! Errors raised while parsing a template or generating code from it.
//!
//! Every error aborts the run; there is no partial output.

/// Generator error. Line numbers are 1-based lines of the template source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unbalanced braces, malformed header or field line, bad id or repeat count.
    #[error("line {line}: {message}")]
    Structure { line: usize, message: String },
    #[error("line {line}: unknown protocol type `{tag}` for field `{field}`")]
    UnknownType {
        line: usize,
        tag: String,
        field: String,
    },
    #[error("line {line}: unsupported quantity `{quantity}` for block `{block}`")]
    UnsupportedQuantity {
        line: usize,
        block: String,
        quantity: String,
    },
    #[error("line {line}: unsupported frequency `{frequency}` for message `{message}`")]
    UnsupportedFrequency {
        line: usize,
        message: String,
        frequency: String,
    },
    #[error("duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },
    #[error("invalid generator configuration: {0}")]
    Config(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn structure(line: usize, message: impl Into<String>) -> Self {
        Error::Structure {
            line,
            message: message.into(),
        }
    }

    /// Source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Structure { line, .. }
            | Error::UnknownType { line, .. }
            | Error::UnsupportedQuantity { line, .. }
            | Error::UnsupportedFrequency { line, .. } => Some(*line),
            Error::Duplicate { .. } | Error::Config(_) | Error::Io(_) => None,
        }
    }
}
