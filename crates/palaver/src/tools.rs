//! Functions an assistant can call in the middle of a reply
mod registry;
mod timeofday;

use anyhow::{anyhow, Result};
use std::sync::Arc;

pub use registry::{ToolFunction, ToolRegistry};
pub use timeofday::TimeOfDay;

/// Names of the built-in tools, as accepted by `build`
pub const BUILTIN_TOOLS: &[&str] = &[timeofday::NAME];

/// Build a built-in tool by name
pub fn build(name: &str) -> Result<Arc<dyn ToolFunction>> {
    match name {
        timeofday::NAME => Ok(Arc::new(TimeOfDay::new())),
        _ => Err(anyhow!(
            "Unknown tool '{}', expected one of: {}",
            name,
            BUILTIN_TOOLS.join(", ")
        )),
    }
}

/// Build a registry from a list of built-in tool names
pub fn build_registry<S: AsRef<str>>(names: &[S]) -> Result<ToolRegistry> {
    let functions = names
        .iter()
        .map(|name| build(name.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    ToolRegistry::new(functions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry() {
        let registry = build_registry(&["timeofday"]).unwrap();
        assert!(registry.get("timeofday").is_some());
        assert_eq!(registry.tools().len(), 1);

        assert!(build_registry::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_tool() {
        let err = build("calculator").err().unwrap();
        assert!(err.to_string().contains("timeofday"));
    }
}
