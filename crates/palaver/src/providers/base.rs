use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::errors::ChatResult;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::{FunctionCall, Tool};

/// A message as sent to the provider. Unlike `Message` it can carry a function call
/// made by the assistant or name the function whose result it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: Option<String>,
    pub name: Option<String>,
    pub function_call: Option<FunctionCall>,
}

impl CompletionMessage {
    /// The assistant turn that requested `call`, with no visible content
    pub fn function_call(call: &FunctionCall) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            name: None,
            function_call: Some(call.clone()),
        }
    }

    /// The result of calling the function `name`
    pub fn function_result<N: Into<String>, R: Into<String>>(name: N, result: R) -> Self {
        Self {
            role: Role::Function,
            content: Some(result.into()),
            name: Some(name.into()),
            function_call: None,
        }
    }
}

impl From<&Message> for CompletionMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: Some(message.content.clone()),
            name: None,
            function_call: None,
        }
    }
}

/// Everything needed to open one streamed completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub messages: Vec<CompletionMessage>,
    /// Functions the model may call. When empty the request offers no function calling.
    pub functions: Vec<Tool>,
}

/// One incremental unit of a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// Assistant text to show to the user
    Text(String),
    /// A fragment of a function call, to be concatenated with the following fragments
    FunctionCall {
        name: Option<String>,
        arguments: Option<String>,
    },
}

pub type ChunkStream = BoxStream<'static, ChatResult<Chunk>>;

/// Base trait for LLM providers (OpenAI, Ollama, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Open one streamed completion. Each call opens a new connection and the returned
    /// stream can only be consumed once. Nothing is retried.
    async fn stream(&self, request: CompletionRequest) -> ChatResult<ChunkStream>;
}
