use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub server: ServerConfig,
    pub session: SessionDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Log file; resolved under the user data dir when unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: String,
    pub events_path: String,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_owned(),
            events_path: "/events".to_owned(),
            request_timeout_ms: 5_000,
        }
    }
}

impl ServerConfig {
    /// Absolute uri of the push endpoint.
    pub fn events_uri(&self) -> String {
        join_url(&self.base_url, &self.events_path)
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDefaults {
    pub username: String,
    pub initial_room: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            username: "guest".to_owned(),
            initial_room: "lobby".to_owned(),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
