use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::utils::is_valid_function_name;

/// A function the model can call, with its descriptor
#[async_trait]
pub trait ToolFunction: Send + Sync {
    /// The descriptor offered to the model
    fn tool(&self) -> &Tool;

    /// Run the function with the conversation so far and the parsed arguments
    async fn invoke(&self, history: &[Message], arguments: Value) -> Result<String>;
}

/// The functions registered for an assistant, looked up by name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    functions: Vec<Arc<dyn ToolFunction>>,
}

impl ToolRegistry {
    pub fn new(functions: Vec<Arc<dyn ToolFunction>>) -> Result<Self> {
        let mut names = HashSet::new();
        for function in &functions {
            let name = &function.tool().name;
            if !is_valid_function_name(name) {
                return Err(anyhow!(
                    "Invalid tool name '{}', it must match [a-zA-Z0-9_-]+",
                    name
                ));
            }
            if !names.insert(name.clone()) {
                return Err(anyhow!("Duplicate tool name: {}", name));
            }
        }
        Ok(Self { functions })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolFunction>> {
        self.functions.iter().find(|f| f.tool().name == name)
    }

    /// Descriptors of every registered function, in registration order
    pub fn tools(&self) -> Vec<Tool> {
        self.functions.iter().map(|f| f.tool().clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
