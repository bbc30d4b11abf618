use anyhow::Result;
use palaver::chat::Responder;
use palaver::providers::{base::Provider, factory};
use palaver::store::{JsonlStore, MemoryStore, MessageStore};
use palaver::tools;
use std::sync::Arc;
use tracing::info;

use crate::configuration::Settings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<Responder>,
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    pub fn new(responder: Responder) -> Self {
        Self {
            store: responder.store().clone(),
            responder: Arc::new(responder),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider: Arc<dyn Provider + Send + Sync> =
            factory::get_provider(settings.provider.to_config())?.into();
        let provider: Arc<dyn Provider> = provider;

        let tools = tools::build_registry(&settings.assistant.tool_names())?;

        let store: Arc<dyn MessageStore> = match &settings.store.path {
            Some(path) => {
                info!(path = %path.display(), "storing messages in file");
                Arc::new(JsonlStore::new(path.clone()))
            }
            None => {
                info!("storing messages in memory");
                Arc::new(MemoryStore::new())
            }
        };

        info!(
            provider = %settings.provider.provider_type(),
            model = settings.provider.model(),
            tools = tools.tools().len(),
            "assistant ready"
        );
        Ok(Self::new(Responder::new(
            provider,
            settings.assistant()?,
            tools,
            store,
        )))
    }
}
