use anyhow::Result;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use super::registry::ToolFunction;
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const NAME: &str = "timeofday";

/// Tells the model the current date and time
pub struct TimeOfDay {
    tool: Tool,
}

impl TimeOfDay {
    pub fn new() -> Self {
        Self {
            tool: Tool::new(
                NAME,
                "Retrieve the current date and time in UTC",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
        }
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolFunction for TimeOfDay {
    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn invoke(&self, _history: &[Message], _arguments: Value) -> Result<String> {
        Ok(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_returns_rfc3339() -> Result<()> {
        let result = TimeOfDay::new().invoke(&[], json!({})).await?;
        assert!(DateTime::parse_from_rfc3339(&result).is_ok());
        assert!(result.ends_with('Z'));
        Ok(())
    }
}
