pub mod chat;
pub mod conversations;

use crate::state::AppState;
use axum::{http::StatusCode, Json, Router};
use serde_json::{json, Value};

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(chat::routes(state.clone()))
        .merge(conversations::routes(state))
}

pub(crate) type ErrorResponse = (StatusCode, Json<Value>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (status, Json(json!({ "error": message.into() })))
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use palaver::chat::Responder;
    use palaver::errors::ChatResult;
    use palaver::models::assistant::Assistant;
    use palaver::providers::base::{Chunk, ChunkStream, CompletionRequest, Provider};
    use palaver::store::MemoryStore;
    use palaver::tools::ToolRegistry;
    use std::sync::Arc;

    use crate::state::AppState;

    /// Answers every completion with the same text chunks
    pub struct Scripted(pub Vec<&'static str>);

    #[async_trait]
    impl Provider for Scripted {
        async fn stream(&self, _request: CompletionRequest) -> ChatResult<ChunkStream> {
            let chunks: Vec<ChatResult<Chunk>> = self
                .0
                .iter()
                .map(|text| Ok(Chunk::Text(text.to_string())))
                .collect();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    pub fn state(chunks: Vec<&'static str>) -> AppState {
        let assistant = Assistant::new("gpt-4o", "You are a helpful assistant.", 0.6).unwrap();
        AppState::new(Responder::new(
            Arc::new(Scripted(chunks)),
            assistant,
            ToolRegistry::default(),
            Arc::new(MemoryStore::new()),
        ))
    }
}
