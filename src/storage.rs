/*
Viking Run
*/
use std::path::PathBuf;

use thiserror::Error;

pub const APP_DIR: &str = "VikingRun";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("ron encode: {0}")]
    RonEncode(#[from] ron::Error),
    #[error("no data directory available")]
    NoDataDir,
}

/// Where Settings / Saves Live
/// Debug: Project Directory, Release: Config Dir
pub fn store_path(file_name: &str) -> Result<PathBuf, StoreError> {
    #[cfg(debug_assertions)]
    {
        let mut p = std::env::current_dir()?;
        p.push(file_name);
        Ok(p)
    }
    #[cfg(not(debug_assertions))]
    {
        let mut p = dirs::config_dir().ok_or(StoreError::NoDataDir)?;
        p.push(APP_DIR);
        std::fs::create_dir_all(&p)?;
        p.push(file_name);
        Ok(p)
    }
}

/// Missing File is Ok(None), Anything Else Bubbles Up
pub fn read_optional(file_name: &str) -> Result<Option<String>, StoreError> {
    let path = store_path(file_name)?;
    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn write(file_name: &str, contents: &str) -> Result<(), StoreError> {
    let path = store_path(file_name)?;
    std::fs::write(path, contents)?;
    Ok(())
}
