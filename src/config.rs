use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "MEMOPORT_DB";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl StorageConfig {
    pub fn default_paths() -> Option<StorageConfig> {
        let proj_dirs = ProjectDirs::from("", "", "memoport")?;
        let data_dir = proj_dirs.data_dir();

        Some(StorageConfig {
            db_path: data_dir.join("memoport.db"),
        })
    }

    /// Resolve storage from an explicit path, then `MEMOPORT_DB`, then the
    /// platform data directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Option<StorageConfig> {
        if let Some(db_path) = explicit {
            return Some(StorageConfig { db_path });
        }
        match std::env::var_os(DB_PATH_ENV) {
            Some(path) if !path.is_empty() => Some(StorageConfig {
                db_path: PathBuf::from(path),
            }),
            _ => Self::default_paths(),
        }
    }

    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        if let Some(parent) = self.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
