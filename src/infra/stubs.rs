use anyhow::Result;

use crate::infra::{config::AppConfig, contracts::ConfigAdapter};

/// Hands out a fixed config without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter {
    pub config: AppConfig,
}

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(self.config.clone())
    }
}
