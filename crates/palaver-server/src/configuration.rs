use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use palaver::models::assistant::Assistant;
use palaver::providers::{
    configs::{OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig},
    factory::ProviderType,
    ollama, openai,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                env_var: to_env_var("server.host"),
                reason: format!("{} is not a socket address: {}", self.host, e),
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_host")]
        host: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
}

impl ProviderSettings {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderSettings::OpenAi { .. } => ProviderType::OpenAi,
            ProviderSettings::Ollama { .. } => ProviderType::Ollama,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderSettings::OpenAi { model, .. } | ProviderSettings::Ollama { model, .. } => {
                model
            }
        }
    }

    pub fn to_config(&self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi { host, api_key, .. } => {
                ProviderConfig::OpenAi(OpenAiProviderConfig {
                    host: host.clone(),
                    api_key: api_key.clone(),
                })
            }
            ProviderSettings::Ollama { host, .. } => {
                ProviderConfig::Ollama(OllamaProviderConfig { host: host.clone() })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Comma separated names of built-in tools
    #[serde(default)]
    pub tools: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            tools: String::new(),
        }
    }
}

impl AssistantSettings {
    pub fn tool_names(&self) -> Vec<String> {
        self.tools
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreSettings {
    /// Messages are kept in memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    /// The assistant that answers with the configured model
    pub fn assistant(&self) -> Result<Assistant, ConfigError> {
        Assistant::new(
            self.provider.model(),
            self.assistant.system_prompt.clone(),
            self.assistant.temperature,
        )
        .map_err(|e| ConfigError::InvalidValue {
            env_var: to_env_var("assistant.temperature"),
            reason: e.to_string(),
        })
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .add_source(
                Environment::with_prefix("PALAVER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = match config.try_deserialize() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);
                if let Some(field) = missing_field(&err.to_string()) {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&field),
                    });
                }
                if let config::ConfigError::NotFound(field) = &err {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    });
                }
                return Err(ConfigError::Other(err));
            }
        };

        settings.assistant()?;
        Ok(settings)
    }
}

/// Extract the dotted key from "missing field `x`", optionally followed by " for key `y`"
fn missing_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let (field, rest) = rest.split_once('`')?;
    match rest
        .strip_prefix(" for key `")
        .and_then(|key| key.split_once('`'))
    {
        Some((key, _)) => Some(format!("{}.{}", key, field)),
        None => Some(field.to_string()),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_host() -> String {
    openai::OPENAI_HOST.to_string()
}

fn default_ollama_host() -> String {
    ollama::OLLAMA_HOST.to_string()
}

fn default_ollama_model() -> String {
    ollama::OLLAMA_MODEL.to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_temperature() -> f32 {
    0.6
}
