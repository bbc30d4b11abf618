use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A file uploaded alongside a message
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A message in a conversation, exchanged with the client and persisted in the store
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub conversation_id: String,
    /// The message this one replies to, forming a tree of replies
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "Utc::now")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Create an empty message with the current timestamp
    pub fn new<I: Into<String>, C: Into<String>>(id: I, role: Role, conversation_id: C) -> Self {
        Message {
            id: id.into(),
            role,
            content: String::new(),
            attachments: Vec::new(),
            conversation_id: conversation_id.into(),
            parent: None,
            sent_at: Utc::now(),
        }
    }

    /// Create a new user message
    pub fn user<I: Into<String>, C: Into<String>>(id: I, conversation_id: C) -> Self {
        Self::new(id, Role::User, conversation_id)
    }

    /// Create the empty assistant envelope that answers `message`
    pub fn reply_to<I: Into<String>>(message: &Message, id: I) -> Self {
        Self::new(id, Role::Assistant, message.conversation_id.clone()).with_parent(&message.id)
    }

    /// Set the text content of the message
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.content = text.into();
        self
    }

    pub fn with_parent<S: Into<String>>(mut self, parent: S) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Append a streamed fragment to the content
    pub fn append_text(&mut self, text: &str) {
        self.content.push_str(text);
    }
}
