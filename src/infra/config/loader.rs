use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn returns_defaults_when_file_is_missing() {
        let config = load(Some(Path::new("./missing-config.toml"))).expect("config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn merges_file_values_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[logging]
level = "debug"

[server]
base_url = "http://chat.example:9000"

[session]
username = "alice"
"#
        )
        .expect("must write test config");

        let config = load(Some(file.path())).expect("config must load");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.base_url, "http://chat.example:9000");
        assert_eq!(config.server.events_path, "/events");
        assert_eq!(config.session.username, "alice");
        assert_eq!(config.session.initial_room, "lobby");
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "[server]\nrequest_timeout_ms = \"soon\"\n").expect("must write");

        let error = load(Some(file.path())).expect_err("must fail");

        assert!(matches!(error, AppError::ConfigParse { .. }));
        assert!(error
            .to_string()
            .contains(&file.path().display().to_string()));
    }
}
