use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::{Error, Result};

/// Environment variable that overrides the configured storage connection string
pub const DATABASE_URL_ENV: &str = "AUTOFILL_DATABASE_URL";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://job_autofill.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Contents of `autofill.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AutofillConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AutofillConfig {
    /// The config `init` writes: every key spelled out with its default
    pub fn with_defaults() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE_URL.to_string()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
        }
    }
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database: StorageLocation,
    pub host: String,
    pub port: u16,
}

/// Explicit values, usually from CLI flags; they win over everything else
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServerConfig {
    /// Precedence: overrides > `AUTOFILL_DATABASE_URL` (database only) >
    /// config file > defaults
    pub fn resolve(overrides: Overrides, file: Option<AutofillConfig>, env_database: Option<String>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let database = overrides
            .database
            .or(env_database)
            .or(file.database)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            database: StorageLocation::parse(&database)?,
            host: overrides.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
        })
    }

    /// Resolve using the real environment
    pub fn from_env(overrides: Overrides, file: Option<AutofillConfig>) -> Result<Self> {
        let env_database = std::env::var(DATABASE_URL_ENV).ok().filter(|v| !v.is_empty());
        Self::resolve(overrides, file, env_database)
    }
}

/// Where the SQLite database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    File(PathBuf),
    /// Private to a single connection. Only useful for one-shot CLI runs;
    /// the server opens a connection per request and would see an empty
    /// database each time.
    Memory,
}

impl StorageLocation {
    /// Accepts `sqlite://path`, `sqlite:path`, `:memory:` or a bare path
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if rest.is_empty() {
            return Err(Error::Config("empty database location".to_string()));
        }
        if rest == ":memory:" {
            return Ok(StorageLocation::Memory);
        }
        if let Some((scheme, _)) = rest.split_once("://") {
            return Err(Error::Config(format!(
                "unsupported storage scheme '{}' (only sqlite is available)",
                scheme
            )));
        }
        Ok(StorageLocation::File(PathBuf::from(rest)))
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageLocation::File(path) => write!(f, "sqlite://{}", path.display()),
            StorageLocation::Memory => f.write_str("sqlite://:memory:"),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("autofill.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<AutofillConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: AutofillConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &AutofillConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
