use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::completion::reply_stream;
use super::sink::{EventReceiver, EventSink};
use crate::errors::{ChatError, ChatResult};
use crate::ids::{IdGenerator, NanoIdGenerator};
use crate::models::assistant::Assistant;
use crate::models::event::StreamEvent;
use crate::models::message::Message;
use crate::providers::base::{CompletionMessage, CompletionRequest, Provider};
use crate::store::MessageStore;
use crate::tools::ToolRegistry;

/// How many events may wait for a slow client before the reply pauses
pub const EVENT_BUFFER: usize = 64;

/// Answers user messages with a streamed assistant reply.
///
/// Every reply starts with a `response` event carrying the empty assistant message,
/// followed by one `delta` per text fragment. The assistant message is saved once the
/// stream is closed, holding exactly the deltas the client was sent.
#[derive(Clone)]
pub struct Responder {
    provider: Arc<dyn Provider>,
    assistant: Assistant,
    tools: ToolRegistry,
    store: Arc<dyn MessageStore>,
    ids: Arc<dyn IdGenerator>,
    save_when_done: bool,
}

impl Responder {
    pub fn new(
        provider: Arc<dyn Provider>,
        assistant: Assistant,
        tools: ToolRegistry,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            provider,
            assistant,
            tools,
            store,
            ids: Arc::new(NanoIdGenerator),
            save_when_done: true,
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Whether the assistant message is saved when the reply ends
    pub fn with_save_when_done(mut self, save_when_done: bool) -> Self {
        self.save_when_done = save_when_done;
        self
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    fn completion_request(&self, history: &[Message]) -> CompletionRequest {
        CompletionRequest {
            model: self.assistant.model.clone(),
            system_prompt: self.assistant.system_prompt.clone(),
            temperature: self.assistant.temperature,
            messages: history.iter().map(CompletionMessage::from).collect(),
            functions: self.tools.tools(),
        }
    }

    /// Start replying to `user_message` in the background and return the client's events.
    /// `history` is the whole conversation, ending with `user_message`.
    pub fn respond(&self, user_message: Message, history: Vec<Message>) -> EventReceiver {
        let (sink, receiver) = EventSink::channel(EVENT_BUFFER);
        let responder = self.clone();
        tokio::spawn(async move {
            // Failures are already reported to the client and logged
            let _ = responder.respond_into(&user_message, history, sink).await;
        });
        receiver
    }

    /// Drive one reply into `sink`. Returns the assistant message as persisted, or the
    /// fatal error that aborted the reply without persisting anything.
    pub async fn respond_into(
        &self,
        user_message: &Message,
        history: Vec<Message>,
        mut sink: EventSink,
    ) -> ChatResult<Message> {
        let mut reply = Message::reply_to(user_message, self.ids.next_id());
        let request = self.completion_request(&history);
        let mut deltas = reply_stream(self.provider.clone(), request, self.tools.clone(), history);

        let mut connected = sink.emit(StreamEvent::Response(reply.clone())).await.is_ok();
        while connected {
            match deltas.next().await {
                None => break,
                Some(Ok(text)) => {
                    if sink.emit(StreamEvent::Delta(text.clone())).await.is_ok() {
                        // Only what the client was sent is kept
                        reply.append_text(&text);
                    } else {
                        connected = false;
                    }
                }
                Some(Err(err)) if err.is_fatal() => {
                    error!(message_id = %reply.id, error = %err, "reply aborted");
                    sink.fail(err.clone()).await;
                    return Err(err);
                }
                Some(Err(err)) => {
                    warn!(message_id = %reply.id, error = %err, "provider stream ended early");
                    break;
                }
            }
        }
        if !connected {
            warn!(message_id = %reply.id, "client disconnected, reply truncated");
        }
        sink.complete();

        if self.save_when_done {
            self.persist(&reply).await;
        }
        info!(message_id = %reply.id, length = reply.content.len(), "reply finished");
        Ok(reply)
    }

    async fn persist(&self, message: &Message) {
        if let Err(e) = self.store.save(message).await {
            let err = ChatError::Persistence {
                id: message.id.clone(),
                reason: e.to_string(),
            };
            error!(error = %err, "failed to save reply");
        }
    }
}
