use thiserror::Error;

/// Authorization engine errors
#[derive(Error, Debug)]
pub enum AccessError {
    /// A request field was empty
    #[error("Malformed request: {field} must not be empty")]
    MalformedInput { field: &'static str },

    /// A strict build saw the same id twice in one collection
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// A snapshot entity failed validation
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    /// The request was denied (explicitly or implicitly)
    #[error("Not authorized")]
    AccessDenied,

    /// Engine configuration could not be parsed or is out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a config or snapshot file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authorization result type
pub type Result<T> = std::result::Result<T, AccessError>;
