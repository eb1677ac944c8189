use std::{fs, path::PathBuf};

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "roomchat";
const LOG_FILE_NAME: &str = "roomchat.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub data_dir: PathBuf,
}

impl StorageLayout {
    pub fn resolve() -> Result<Self, AppError> {
        let base = dirs::data_local_dir().ok_or_else(|| AppError::StoragePathResolution {
            details: "unable to resolve local data directory".into(),
        })?;

        Ok(Self {
            data_dir: base.join(APP_DIR_NAME),
        })
    }

    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| AppError::StorageDirCreate {
            path: self.data_dir.clone(),
            source,
        })
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}
