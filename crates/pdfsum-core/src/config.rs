//! Configuration module
//!
//! `Config` is built once at startup from the environment (and an optional `.env`
//! file), validated, and then handed to every component that needs it.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SUMMARIZER_TIMEOUT_SECS: u64 = 120;
const SUMMARY_WORKERS: usize = 4;
const SUMMARY_QUEUE_SIZE: usize = 100;

/// Server and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: String,
}

/// Upload limits consumed by the PDF validator
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub min_file_size: u64,
    pub max_file_size: u64,
    pub allowed_extension: String,
    pub allowed_mime_type: String,
    pub magic: [u8; 4],
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            min_file_size: constants::MIN_FILE_SIZE,
            max_file_size: constants::MAX_FILE_SIZE,
            allowed_extension: constants::ALLOWED_EXTENSION.to_string(),
            allowed_mime_type: constants::ALLOWED_MIME_TYPE.to_string(),
            magic: constants::PDF_MAGIC,
        }
    }
}

/// Summarizer endpoint and worker pool settings
#[derive(Clone, Debug)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_concurrent: usize,
    pub queue_size: usize,
}

impl SummarizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub upload_dir: PathBuf,
    pub upload_limits: UploadLimits,
    pub summarizer: SummarizerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("APP_PORT must be a valid number"))?;

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts()?,
        };

        let base = BaseConfig {
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
            cors_origins,
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let summarizer = SummarizerConfig {
            base_url: env::var("ML_SERVICE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            timeout_secs: env::var("SUMMARIZER_TIMEOUT_SECS")
                .unwrap_or_else(|_| SUMMARIZER_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(SUMMARIZER_TIMEOUT_SECS),
            max_concurrent: env::var("SUMMARY_WORKERS")
                .unwrap_or_else(|_| SUMMARY_WORKERS.to_string())
                .parse()
                .unwrap_or(SUMMARY_WORKERS),
            queue_size: env::var("SUMMARY_QUEUE_SIZE")
                .unwrap_or_else(|_| SUMMARY_QUEUE_SIZE.to_string())
                .parse()
                .unwrap_or(SUMMARY_QUEUE_SIZE),
        };

        let upload_dir = env::var("UPLOAD_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "./uploads".to_string());

        Ok(Config {
            base,
            upload_dir: PathBuf::from(upload_dir),
            upload_limits: UploadLimits::default(),
            summarizer,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base.database_url.starts_with("postgres://")
            && !self.base.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS cannot be 0"));
        }

        if self.base.db_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("DB_TIMEOUT_SECONDS cannot be 0"));
        }

        if !self.summarizer.base_url.starts_with("http://")
            && !self.summarizer.base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "ML_SERVICE_URL must start with http:// or https://"
            ));
        }

        if self.summarizer.max_concurrent == 0 {
            return Err(anyhow::anyhow!("SUMMARY_WORKERS must be at least 1"));
        }

        if self.summarizer.queue_size == 0 {
            return Err(anyhow::anyhow!("SUMMARY_QUEUE_SIZE must be at least 1"));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn host(&self) -> &str {
        &self.base.host
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.base.log_format
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }

    pub fn upload_limits(&self) -> &UploadLimits {
        &self.upload_limits
    }

    pub fn summarizer(&self) -> &SummarizerConfig {
        &self.summarizer
    }

    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn database_url_from_parts() -> Result<String, anyhow::Error> {
    let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port: u16 = env::var("DB_PORT")
        .unwrap_or_else(|_| "5432".to_string())
        .parse()
        .map_err(|_| anyhow::anyhow!("DB_PORT must be a valid number"))?;
    let user = env::var("DB_USER")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL or DB_USER must be set"))?;
    let password = env::var("DB_PASSWORD").unwrap_or_default();
    let name = env::var("DB_NAME").map_err(|_| anyhow::anyhow!("DB_NAME must be set"))?;

    Ok(format!(
        "postgresql://{}:{}@{}:{}/{}",
        user, password, host, port, name
    ))
}
