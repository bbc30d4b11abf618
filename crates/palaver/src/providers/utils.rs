use futures::StreamExt;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use super::base::{Chunk, ChunkStream, CompletionMessage, CompletionRequest};
use crate::errors::{ChatError, ChatResult};
use crate::models::role::Role;
use crate::models::tool::Tool;

lazy_static! {
    static ref FUNCTION_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Convert the request messages to OpenAI's API message specification, system prompt first
pub fn messages_to_openai_spec(system_prompt: &str, messages: &[CompletionMessage]) -> Vec<Value> {
    let mut messages_spec = vec![json!({
        "role": Role::System,
        "content": system_prompt,
    })];

    for message in messages {
        let mut converted = json!({
            "role": message.role,
            "content": message.content,
        });
        if let Some(name) = &message.name {
            converted["name"] = json!(name);
        }
        if let Some(call) = &message.function_call {
            converted["function_call"] = json!({
                "name": call.name,
                "arguments": call.arguments,
            });
        }
        messages_spec.push(converted);
    }

    messages_spec
}

/// Convert tools to OpenAI's function specification
pub fn functions_to_openai_spec(tools: &[Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            })
        })
        .collect()
}

/// Build the streamed chat completion payload. Function calling is only offered when
/// there is at least one function.
pub fn create_request_payload(request: &CompletionRequest) -> Value {
    let mut payload = json!({
        "model": request.model,
        "messages": messages_to_openai_spec(&request.system_prompt, &request.messages),
        "temperature": request.temperature,
        "stream": true,
    });

    if !request.functions.is_empty() {
        payload["functions"] = json!(functions_to_openai_spec(&request.functions));
        payload["function_call"] = json!("auto");
    }

    payload
}

pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME.is_match(name)
}

/// Splits a server-sent event byte stream into the data payloads of complete events.
///
/// Bytes are buffered until a blank line closes the event, so multi-byte characters and
/// events split across network reads come out whole. Bytes already searched for a
/// separator are not searched again on the next read.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    scanned: usize,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        // A separator may straddle the previous read, so back up by its length minus one
        let mut from = self.scanned.saturating_sub(3);
        while let Some((end, separator)) = find_event_end(&self.buffer, from) {
            let event: Vec<u8> = self.buffer.drain(..end + separator).collect();
            let event = String::from_utf8_lossy(&event[..end]);

            let data: Vec<&str> = event
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|data| data.strip_prefix(' ').unwrap_or(data))
                .collect();
            if !data.is_empty() {
                payloads.push(data.join("\n"));
            }
            from = 0;
        }
        self.scanned = self.buffer.len();
        payloads
    }
}

/// Position and length of the first event separator at or after `from`
fn find_event_end(buffer: &[u8], from: usize) -> Option<(usize, usize)> {
    let tail = buffer.get(from..)?;
    let lf = tail.windows(2).position(|w| w == b"\n\n").map(|pos| (from + pos, 2));
    let crlf = tail
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (from + pos, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Convert one OpenAI streamed completion chunk. Chunks with neither text nor a
/// function call fragment (role announcements, finish markers) yield nothing.
pub fn openai_chunk_to_chunk(data: &str) -> ChatResult<Option<Chunk>> {
    let value: Value = serde_json::from_str(data)
        .map_err(|e| ChatError::Transport(format!("Invalid completion chunk: {}", e)))?;

    if let Some(error) = value.get("error") {
        return Err(ChatError::Transport(format!("Provider error: {}", error)));
    }

    let delta = &value["choices"][0]["delta"];
    if let Some(call) = delta.get("function_call").filter(|call| call.is_object()) {
        let name = call["name"].as_str().map(String::from);
        let arguments = call["arguments"].as_str().map(String::from);
        return Ok(Some(Chunk::FunctionCall { name, arguments }));
    }

    match delta["content"].as_str() {
        Some(text) if !text.is_empty() => Ok(Some(Chunk::Text(text.to_string()))),
        _ => Ok(None),
    }
}

/// Send a streamed completion request and turn the response body into chunks
pub async fn stream_chat_completion(
    request: RequestBuilder,
    payload: Value,
) -> ChatResult<ChunkStream> {
    let response = request.json(&payload).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(openai_http_error(status, &body));
    }

    let mut bytes = Box::pin(response.bytes_stream());
    let stream: ChunkStream = Box::pin(async_stream::try_stream! {
        let mut decoder = SseDecoder::default();
        'read: while let Some(next) = bytes.next().await {
            let next = next.map_err(ChatError::from)?;
            for data in decoder.push(&next) {
                if data.trim() == "[DONE]" {
                    break 'read;
                }
                if let Some(chunk) = openai_chunk_to_chunk(&data)? {
                    yield chunk;
                }
            }
        }
    });
    Ok(stream)
}

fn openai_http_error(status: StatusCode, body: &str) -> ChatError {
    let error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").cloned());

    if let Some(err) = error.as_ref().and_then(check_openai_context_length_error) {
        return ChatError::Transport(err.to_string());
    }
    match error {
        Some(error) => ChatError::Transport(format!("Request failed: {}: {}", status, error)),
        None => ChatError::Transport(format!("Request failed: {}: {}", status, body)),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}
