use std::sync::Arc;

use crate::config::AppConfig;
use crate::nutrition::{Normalizer, PeriodResolver};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self { config })
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.config.utc_offset)
    }

    pub fn resolver(&self) -> PeriodResolver {
        PeriodResolver::new(self.config.utc_offset)
    }

    pub fn fake() -> Self {
        Self::from_config(AppConfig::default())
    }
}
