use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub bulk_upload: BulkUploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory where uploaded images are written
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// URL prefix under which `upload_dir` is served
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HMAC secret shared with the service that issues admin tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BulkUploadConfig {
    #[serde(default = "default_max_excel_bytes")]
    pub max_excel_bytes: u64,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_upload_dir() -> String {
    "target/uploads".into()
}

fn default_public_base_url() -> String {
    "/uploads".into()
}

const DEV_JWT_SECRET: &str = "dev-only-secret-change-me";

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.into()
}

fn default_max_excel_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_max_rows() -> usize {
    500
}

fn default_batch_size() -> usize {
    50
}

fn default_max_images() -> usize {
    200
}

fn default_max_image_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            upload_dir: default_upload_dir(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
        }
    }
}

impl Default for BulkUploadConfig {
    fn default() -> Self {
        Self {
            max_excel_bytes: default_max_excel_bytes(),
            max_rows: default_max_rows(),
            batch_size: default_batch_size(),
            max_images: default_max_images(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
port = 3000
upload_dir = "target/uploads"
public_base_url = "/uploads"

[bulk_upload]
max_excel_bytes = 5242880
max_rows = 500
batch_size = 50
max_images = 200
max_image_bytes = 5242880
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Load the configuration once and keep it for the lifetime of the process
pub fn initialize() -> anyhow::Result<&'static Config> {
    let config = load_config()?;
    if config.auth.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("auth.jwt_secret is not configured, using the development secret");
    }
    if config.bulk_upload.batch_size == 0 {
        anyhow::bail!("bulk_upload.batch_size must be greater than 0");
    }
    Ok(CONFIG.get_or_init(|| config))
}

/// Loaded configuration, or the embedded defaults when `initialize` was never called
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Config {
            database: DatabaseConfig {
                path: "target/db/app.db".into(),
            },
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            bulk_upload: BulkUploadConfig::default(),
        })
    })
}

/// Resolve a configured path relative to the executable directory
pub fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(path_str)
}

/// Get the database file path from configuration
pub fn get_database_path(config: &Config) -> PathBuf {
    resolve_path(&config.database.path)
}
