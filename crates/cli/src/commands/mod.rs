//! Command implementations.

pub mod migrate;
pub mod seed;
pub mod stores;
pub mod urls;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use thiserror::Error;

use product_url_store::config::{ConfigError, UrlStoreConfig};
use product_url_store::db;

/// Errors shared by the commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid YAML for the expected shape.
    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Load configuration and open a pool.
async fn connect() -> Result<(UrlStoreConfig, PgPool), CommandError> {
    let config = UrlStoreConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database).await?;

    Ok((config, pool))
}

/// Read and parse a YAML file.
async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_yaml::from_str(&content).map_err(|source| CommandError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let rendered = serde_json::to_string_pretty(value)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}
