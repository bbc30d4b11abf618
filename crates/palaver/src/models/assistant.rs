use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// The model settings an assistant answers with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
}

impl Assistant {
    pub fn new<M: Into<String>, S: Into<String>>(
        model: M,
        system_prompt: S,
        temperature: f32,
    ) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&temperature),
            "Temperature must be between 0.0 and 1.0, got {}",
            temperature
        );
        Ok(Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bounds() {
        assert!(Assistant::new("gpt-4o", "Be brief.", 0.0).is_ok());
        assert!(Assistant::new("gpt-4o", "Be brief.", 1.0).is_ok());
        assert!(Assistant::new("gpt-4o", "Be brief.", 1.5).is_err());
        assert!(Assistant::new("gpt-4o", "Be brief.", -0.1).is_err());
    }
}
