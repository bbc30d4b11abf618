use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;
use crate::models::tool::FunctionCall;
use crate::providers::base::{Chunk, CompletionMessage, CompletionRequest, Provider};
use crate::tools::ToolRegistry;

/// Function call fragments collected over one provider pass
#[derive(Debug, Default)]
struct PendingCall {
    name: String,
    arguments: String,
}

impl PendingCall {
    fn push(&mut self, name: Option<String>, arguments: Option<String>) {
        if let Some(name) = name {
            self.name.push_str(&name);
        }
        if let Some(arguments) = arguments {
            self.arguments.push_str(&arguments);
        }
    }

    fn finish(self) -> Option<FunctionCall> {
        if self.name.is_empty() {
            None
        } else {
            Some(FunctionCall::new(self.name, self.arguments))
        }
    }
}

/// Stream the visible text of a reply.
///
/// Opens one provider pass at a time. Text chunks are yielded as they arrive; function
/// call fragments are collected silently. When a pass ends with a call, the function
/// runs with `history` and the parsed arguments, and a new pass starts from the original
/// messages plus the latest assistant call and its function result. Calls from earlier
/// passes are not resent. The stream ends after the first pass without a call, or at the
/// first error.
pub fn reply_stream(
    provider: Arc<dyn Provider>,
    request: CompletionRequest,
    tools: ToolRegistry,
    history: Vec<Message>,
) -> BoxStream<'static, ChatResult<String>> {
    Box::pin(async_stream::try_stream! {
        let base_messages = request.messages.clone();
        let mut request = request;
        let mut pass = 1;
        loop {
            debug!(pass, messages = request.messages.len(), "starting provider pass");
            let mut chunks = provider.stream(request.clone()).await?;

            let mut pending = PendingCall::default();
            while let Some(chunk) = chunks.next().await {
                match chunk? {
                    Chunk::Text(text) => {
                        yield text;
                    }
                    Chunk::FunctionCall { name, arguments } => {
                        pending.push(name, arguments);
                    }
                }
            }

            let Some(call) = pending.finish() else {
                break;
            };
            let function = tools
                .get(&call.name)
                .cloned()
                .ok_or_else(|| ChatError::UnknownFunction(call.name.clone()))?;
            let arguments = call.parse_arguments()?;

            info!(function = %call.name, arguments = %call.arguments, "invoking function");
            let result = function
                .invoke(&history, arguments)
                .await
                .map_err(|e| ChatError::Tool {
                    name: call.name.clone(),
                    reason: e.to_string(),
                })?;
            info!(function = %call.name, result_len = result.len(), "function returned");

            request.messages = base_messages.clone();
            request.messages.push(CompletionMessage::function_call(&call));
            request.messages.push(CompletionMessage::function_result(&call.name, result));
            pass += 1;
        }
    })
}
