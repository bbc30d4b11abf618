use super::{
    base::Provider, configs::ProviderConfig, ollama::OllamaProvider, openai::OpenAiProvider,
};
use anyhow::Result;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    Ollama,
}

impl ProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderConfig::OpenAi(_) => ProviderType::OpenAi,
            ProviderConfig::Ollama(_) => ProviderType::Ollama,
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider + Send + Sync>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Ollama(ollama_config) => Ok(Box::new(OllamaProvider::new(ollama_config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::{OllamaProviderConfig, OpenAiProviderConfig};
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_provider_type_names() {
        let names: Vec<String> = ProviderType::iter().map(|t| t.to_string()).collect();
        assert_eq!(names, vec!["openai", "ollama"]);
        assert_eq!(ProviderType::from_str("ollama").unwrap(), ProviderType::Ollama);
    }

    #[test]
    fn test_get_provider() {
        let config = ProviderConfig::OpenAi(OpenAiProviderConfig {
            host: "https://api.openai.com".to_string(),
            api_key: "key".to_string(),
        });
        assert_eq!(config.provider_type(), ProviderType::OpenAi);
        assert!(get_provider(config).is_ok());

        let config = ProviderConfig::Ollama(OllamaProviderConfig {
            host: "http://localhost:11434".to_string(),
        });
        assert_eq!(config.provider_type(), ProviderType::Ollama);
        assert!(get_provider(config).is_ok());
    }
}
