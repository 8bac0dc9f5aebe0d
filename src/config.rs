use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".tutor-scheduler";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "tutor.sqlite";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "tutor-scheduler.log";

/// Environment variable that points the app at a different database file.
pub const DB_PATH_VAR: &str = "TUTOR_SCHEDULER_DB";
/// Environment variable that points the log output at a different file.
pub const LOG_PATH_VAR: &str = "TUTOR_SCHEDULER_LOG";

/// Where the app keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve paths from the environment, falling back to the home directory.
    pub fn from_env() -> Result<Self> {
        Self::resolve(env::var_os(DB_PATH_VAR), env::var_os(LOG_PATH_VAR), home_data_dir)
    }

    fn resolve(
        db_override: Option<std::ffi::OsString>,
        log_override: Option<std::ffi::OsString>,
        data_dir: impl Fn() -> Result<PathBuf>,
    ) -> Result<Self> {
        let db_path = match non_empty(db_override) {
            Some(path) => path,
            None => data_dir()?.join(DB_FILE_NAME),
        };
        let log_path = match non_empty(log_override) {
            Some(path) => path,
            None => match db_path.parent() {
                Some(parent) => parent.join(LOG_FILE_NAME),
                None => PathBuf::from(LOG_FILE_NAME),
            },
        };
        Ok(Self { db_path, log_path })
    }
}

fn non_empty(value: Option<std::ffi::OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// `~/.tutor-scheduler`
fn home_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
