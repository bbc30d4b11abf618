use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ChatError, ChatResult};

/// A function that can be offered to a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the function
    pub name: String,
    /// A description of what the function does
    pub description: String,
    /// JSON schema of the parameters the function accepts
    pub parameters: Value,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A function call requested by the model, with the arguments still in their raw JSON form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

impl FunctionCall {
    pub fn new<N: Into<String>, A: Into<String>>(name: N, arguments: A) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the raw arguments. An empty string means the model sent no arguments.
    pub fn parse_arguments(&self) -> ChatResult<Value> {
        if self.arguments.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&self.arguments).map_err(|e| ChatError::MalformedFunctionArguments {
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }
}
