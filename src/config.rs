use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ShelfError, ShelfResult};

pub const DATABASE_PATH_VAR: &str = "SHELF_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "SHELF_MAX_CONNECTIONS";

/// Settings for the on-disk SQLite store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Location of the database file. Parent directories are created on open.
    pub database_path: PathBuf,
    pub max_connections: u32,
    #[serde(with = "secs")]
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: Self::default_path().unwrap_or_else(|_| PathBuf::from("shelf.db")),
            max_connections: 5,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

impl StoreConfig {
    /// Config for a database file at `path` with default pool settings.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            ..Default::default()
        }
    }

    /// Defaults overridden by `SHELF_DATABASE_PATH` and `SHELF_MAX_CONNECTIONS`.
    ///
    /// # Errors
    /// - [`ShelfError::Config`] if `SHELF_MAX_CONNECTIONS` is not a positive integer
    pub fn from_env() -> ShelfResult<Self> {
        let mut config = StoreConfig::default();

        if let Some(path) = env::var_os(DATABASE_PATH_VAR) {
            config.database_path = PathBuf::from(path);
        }

        if let Ok(raw) = env::var(MAX_CONNECTIONS_VAR) {
            config.max_connections = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ShelfError::Config(format!("{MAX_CONNECTIONS_VAR} must be a positive integer, got '{raw}'"))
                })?;
        }

        Ok(config)
    }

    /// Resolves `{data_dir}/shelf-core/shelf.db`.
    ///
    /// # Errors
    /// - [`ShelfError::Config`] if the platform data directory cannot be determined
    pub fn default_path() -> ShelfResult<PathBuf> {
        let data = dirs::data_dir()
            .ok_or_else(|| ShelfError::Config("data directory not found".into()))?;
        Ok(data.join("shelf-core").join("shelf.db"))
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
