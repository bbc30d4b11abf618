use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::errors::{ChatError, ChatResult};
use crate::providers::base::{Chunk, ChunkStream, CompletionRequest, Provider};

/// A mock provider that replays pre-configured chunk sequences, one per completion,
/// and records every request it receives
#[derive(Clone, Default)]
pub struct MockProvider {
    passes: Arc<Mutex<VecDeque<Vec<ChatResult<Chunk>>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    connect_error: Option<ChatError>,
}

impl MockProvider {
    pub fn new(passes: Vec<Vec<ChatResult<Chunk>>>) -> Self {
        Self {
            passes: Arc::new(Mutex::new(passes.into())),
            requests: Arc::default(),
            connect_error: None,
        }
    }

    /// Fail to connect once the scripted passes are used up
    pub fn with_connect_error(mut self, error: ChatError) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn text(text: &str) -> ChatResult<Chunk> {
    Ok(Chunk::Text(text.to_string()))
}

pub fn call(name: Option<&str>, arguments: Option<&str>) -> ChatResult<Chunk> {
    Ok(Chunk::FunctionCall {
        name: name.map(String::from),
        arguments: arguments.map(String::from),
    })
}

#[async_trait]
impl Provider for MockProvider {
    async fn stream(&self, request: CompletionRequest) -> ChatResult<ChunkStream> {
        self.requests.lock().unwrap().push(request);
        let chunks = match self.passes.lock().unwrap().pop_front() {
            Some(chunks) => chunks,
            None => match &self.connect_error {
                Some(error) => return Err(error.clone()),
                // Return an empty completion once the script runs out
                None => Vec::new(),
            },
        };
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
