use std::path::PathBuf;

/// Errors raised while reading or checking a model file.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A parse error occurred at a specific line of the model file.
    #[error("parse error at line {line}: {message}")]
    ParseError {
        /// 1-based line number where the error occurred.
        line: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// The model file is structurally malformed.
    #[error("model format error: {0}")]
    ModelFormatError(String),

    /// The model loaded but its arrays disagree with each other.
    #[error("inconsistent model: {0}")]
    Inconsistent(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of one probe step: the artifact is missing, cannot be
/// deserialized, or cannot produce a prediction.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Nothing to read at the artifact path.
    #[error("No such file or directory: '{}'", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact exists but does not decode into a model.
    #[error("failed to deserialize model '{}': {source}", path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    /// The model rejected the input or could not be evaluated.
    #[error("prediction failed: {0}")]
    Predict(String),
}

impl ProbeError {
    /// Classify a load failure for `path`.
    pub(crate) fn from_load(path: PathBuf, err: ModelError) -> Self {
        match err {
            ModelError::Io(source) if source.kind() == std::io::ErrorKind::NotFound => {
                ProbeError::NotFound { path, source }
            }
            source => ProbeError::Deserialize { path, source },
        }
    }
}
