//! Persistence of conversation messages
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::message::Message;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message. Messages are keyed by id and never rewritten.
    async fn save(&self, message: &Message) -> Result<()>;

    /// All messages of a conversation, in the order they were saved
    async fn conversation(&self, conversation_id: &str) -> Result<Vec<Message>>;
}

/// Keeps messages in memory for the lifetime of the process
#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn save(&self, message: &Message) -> Result<()> {
        self.messages.lock().await.push(message.clone());
        Ok(())
    }

    async fn conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        Ok(self
            .messages
            .lock()
            .await
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }
}

/// Appends messages to a file, one JSON object per line
pub struct JsonlStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl MessageStore for JsonlStore {
    async fn save(&self, message: &Message) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        // Lines from concurrent saves must not interleave
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open message file {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut messages = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let message: Message = serde_json::from_str(line).with_context(|| {
                format!("Invalid message on line {} of {}", number + 1, self.path.display())
            })?;
            if message.conversation_id == conversation_id {
                messages.push(message);
            }
        }
        Ok(messages)
    }
}
