use thiserror::Error;

/// Failures raised by the content store and line-query engine.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Duplicate file detected with SHA256: {0}")]
    DuplicateContent(String),

    #[error("No files stored")]
    NoFilesStored,

    #[error("File {0} contains no lines")]
    EmptyContent(String),

    #[error("File content is not valid UTF-8: {0}")]
    Decoding(#[from] std::str::Utf8Error),

    #[error("File not found for reference: {0}")]
    FileNotFound(String),
}

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Returns the corpus-level failure, if this error carries one.
    pub fn as_corpus(&self) -> Option<&CorpusError> {
        match self {
            Self::Corpus(err) => Some(err),
            _ => None,
        }
    }
}
