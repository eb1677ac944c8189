use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError, storage_layout::StorageLayout};

/// Installs the global subscriber writing to a file, since the terminal
/// belongs to the TUI. Keep the guard alive until exit to flush buffered lines.
pub fn init(config: &LogConfig) -> Result<WorkerGuard, AppError> {
    let path = log_path(config)?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&directory).map_err(|source| AppError::StorageDirCreate {
        path: directory.clone(),
        source,
    })?;

    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::StoragePathResolution {
            details: format!("log path {} has no file name", path.display()),
        })?;

    let appender = tracing_appender::rolling::never(&directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
        )
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(AppError::LoggingInit)?;

    Ok(guard)
}

fn log_path(config: &LogConfig) -> Result<PathBuf, AppError> {
    if let Some(file) = &config.file {
        return Ok(file.clone());
    }

    let layout = StorageLayout::resolve()?;
    layout.ensure_dirs()?;
    Ok(layout.log_file())
}
