use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::base::{ChunkStream, CompletionRequest, Provider};
use super::configs::OllamaProviderConfig;
use super::utils::{create_request_payload, stream_chat_completion};
use crate::errors::ChatResult;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen2.5";

/// Talks to a local server through its OpenAI-compatible endpoint. No credentials.
pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn stream(&self, request: CompletionRequest) -> ChatResult<ChunkStream> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        let payload = create_request_payload(&request);

        stream_chat_completion(self.client.post(&url), payload).await
    }
}
