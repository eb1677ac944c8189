use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::infra::{
    config::{load, AppConfig},
    contracts::ConfigAdapter,
};

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub username: Option<String>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(server_url) = &self.server_url {
            config.server.base_url = server_url.clone();
        }

        if let Some(username) = &self.username {
            config.session.username = username.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>, overrides: ConfigOverrides) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            overrides,
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        let mut config = load(self.path.as_deref())?;
        self.overrides.apply(&mut config);
        Ok(config)
    }
}
