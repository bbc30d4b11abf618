use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ChatError {
    #[error("Provider transport error: {0}")]
    Transport(String),

    #[error("Client connection closed")]
    DownstreamSend,

    #[error("No such function: {0}")]
    UnknownFunction(String),

    #[error("Malformed arguments for function {name}: {reason}")]
    MalformedFunctionArguments { name: String, reason: String },

    #[error("Function {name} failed: {reason}")]
    Tool { name: String, reason: String },

    #[error("Failed to persist message {id}: {reason}")]
    Persistence { id: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Fatal errors abort the reply without persisting it. The rest, a failing tool
    /// included, end the reply early and keep whatever was accumulated.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ChatError::UnknownFunction(_)
                | ChatError::MalformedFunctionArguments { .. }
                | ChatError::Internal(_)
        )
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
