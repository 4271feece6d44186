use thiserror::Error;

/// Errors surfaced by the call-graph model.
///
/// Malformed edge references and empty inputs are not errors: the graph
/// layer filters them locally.
#[derive(Error, Debug)]
pub enum CallscopeError {
    /// The analysis backend answered with a `detail` (or `error`) message.
    #[error("analysis backend reported: {0}")]
    Upstream(String),
    #[error("invalid call graph JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown file: {0}")]
    UnknownFile(String),
    #[error("unknown function {function} in {file}")]
    UnknownFunction { file: String, function: String },
}

impl CallscopeError {
    /// Message shown to the user as-is for upstream failures.
    pub fn notice(&self) -> String {
        match self {
            CallscopeError::Upstream(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CallscopeError>;
