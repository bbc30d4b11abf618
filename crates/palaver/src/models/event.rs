use serde::Serialize;

use super::message::Message;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
/// An event sent to the client while a reply is streamed
pub enum StreamEvent {
    /// The empty assistant message the following deltas belong to
    Response(Message),
    /// A fragment of text to append to the assistant message
    Delta(String),
}

impl StreamEvent {
    /// Encode as a single server-sent event frame
    pub fn to_frame(&self) -> serde_json::Result<String> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }

    pub fn as_delta(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(text) => Some(text),
            _ => None,
        }
    }
}
