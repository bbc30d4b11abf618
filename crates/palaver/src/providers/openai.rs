use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::base::{ChunkStream, CompletionRequest, Provider};
use super::configs::OpenAiProviderConfig;
use super::utils::{create_request_payload, stream_chat_completion};
use crate::errors::ChatResult;

pub const OPENAI_HOST: &str = "https://api.openai.com";

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        // Bounds connection setup only; a slow stream is left to run
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn stream(&self, request: CompletionRequest) -> ChatResult<ChunkStream> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        let payload = create_request_payload(&request);
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "opening completion stream"
        );

        let builder = self.client.post(&url).bearer_auth(&self.config.api_key);
        stream_chat_completion(builder, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChatError;
    use crate::models::role::Role;
    use crate::models::tool::Tool;
    use crate::providers::base::{Chunk, CompletionMessage};
    use futures::TryStreamExt;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse_body(chunks: &[Value]) -> String {
        let mut body: String = chunks
            .iter()
            .map(|chunk| format!("data: {}\n\n", chunk))
            .collect();
        body.push_str("data: [DONE]\n\n");
        body
    }

    async fn _setup_mock_server(template: ResponseTemplate) -> (MockServer, OpenAiProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test_api_key"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        // Create the OpenAiProvider with the mock server's URL as the host
        let config = OpenAiProviderConfig {
            host: mock_server.uri(),
            api_key: "test_api_key".to_string(),
        };

        let provider = OpenAiProvider::new(config).unwrap();
        (mock_server, provider)
    }

    fn request(functions: Vec<Tool>) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            temperature: 0.7,
            messages: vec![CompletionMessage {
                role: Role::User,
                content: Some("What's the weather in Rome?".to_string()),
                name: None,
                function_call: None,
            }],
            functions,
        }
    }

    #[tokio::test]
    async fn test_stream_text() -> anyhow::Result<()> {
        let body = sse_body(&[
            json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}}]}),
            json!({"choices": [{"index": 0, "delta": {"content": "Hello! "}}]}),
            json!({"choices": [{"index": 0, "delta": {"content": "How can I help?"}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]}),
        ]);
        let (mock_server, provider) =
            _setup_mock_server(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
                .await;

        let chunks: Vec<Chunk> = provider.stream(request(vec![])).await?.try_collect().await?;

        assert_eq!(
            chunks,
            vec![
                Chunk::Text("Hello! ".to_string()),
                Chunk::Text("How can I help?".to_string()),
            ]
        );

        // No function calling is offered without functions
        let received = mock_server.received_requests().await.unwrap();
        let payload: Value = received[0].body_json()?;
        assert_eq!(payload["stream"], json!(true));
        assert!(payload.get("functions").is_none());
        assert!(payload.get("function_call").is_none());
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "What's the weather in Rome?");

        Ok(())
    }

    #[tokio::test]
    async fn test_stream_function_call() -> anyhow::Result<()> {
        let body = sse_body(&[
            json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": null, "function_call": {"name": "get_weather", "arguments": ""}}}]}),
            json!({"choices": [{"index": 0, "delta": {"function_call": {"arguments": "{\"city\":"}}}]}),
            json!({"choices": [{"index": 0, "delta": {"function_call": {"arguments": "\"Rome\"}"}}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "function_call"}]}),
        ]);
        let (mock_server, provider) =
            _setup_mock_server(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
                .await;

        let tool = Tool::new(
            "get_weather",
            "Gets the current weather for a city",
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string"}
                },
                "required": ["city"]
            }),
        );
        let chunks: Vec<Chunk> = provider
            .stream(request(vec![tool]))
            .await?
            .try_collect()
            .await?;

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks[0],
            Chunk::FunctionCall {
                name: Some("get_weather".to_string()),
                arguments: Some(String::new()),
            }
        );
        let arguments: String = chunks
            .iter()
            .filter_map(|chunk| match chunk {
                Chunk::FunctionCall { arguments, .. } => arguments.clone(),
                Chunk::Text(_) => None,
            })
            .collect();
        assert_eq!(arguments, r#"{"city":"Rome"}"#);

        let received = mock_server.received_requests().await.unwrap();
        let payload: Value = received[0].body_json()?;
        assert_eq!(payload["function_call"], "auto");
        assert_eq!(payload["functions"][0]["name"], "get_weather");

        Ok(())
    }

    #[tokio::test]
    async fn test_http_error_is_transport_error() {
        let (_, provider) = _setup_mock_server(
            ResponseTemplate::new(500).set_body_json(json!({"error": {"message": "boom"}})),
        )
        .await;

        match provider.stream(request(vec![])).await {
            Err(ChatError::Transport(message)) => assert!(message.contains("500")),
            Err(other) => panic!("Expected transport error, got {:?}", other),
            Ok(_) => panic!("Expected transport error"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let provider = OpenAiProvider::new(OpenAiProviderConfig {
            host: "http://127.0.0.1:1".to_string(),
            api_key: "test_api_key".to_string(),
        })
        .unwrap();

        assert!(matches!(
            provider.stream(request(vec![])).await,
            Err(ChatError::Transport(_))
        ));
    }
}
