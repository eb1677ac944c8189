mod adapter;
mod app_config;
mod file_config;
mod loader;

pub use adapter::{ConfigOverrides, FileConfigAdapter};
pub use app_config::{AppConfig, LogConfig, ServerConfig, SessionDefaults};
pub(crate) use loader::load;
