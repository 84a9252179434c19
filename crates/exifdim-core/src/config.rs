//! Configuration module
//!
//! Server and rewrite settings are read from the process environment (after
//! loading an optional `.env` file) and validated once at startup.

use std::env;

// Common constants
const SERVER_PORT: u16 = 3000;
const BIND_ADDRESS: &str = "0.0.0.0";
const MAX_UPLOAD_SIZE_MB: usize = 20;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const DOWNLOAD_CONTENT_TYPE: &str = "image/jpeg";
const MIN_API_KEY_LENGTH: usize = 16;

/// Console log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'compact' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub bind_address: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    pub log_format: LogFormat,
}

/// Settings of the rewrite endpoint itself
#[derive(Clone, Debug)]
pub struct RewriteConfig {
    pub max_upload_size_bytes: usize,
    /// MIME type sent with the rewritten download
    pub download_content_type: String,
    /// Optional shared key expected in the `x-api-key` header
    pub api_key: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub base: BaseConfig,
    pub rewrite: RewriteConfig,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            bind_address: BIND_ADDRESS.to_string(),
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            log_format: LogFormat::Compact,
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            download_content_type: DOWNLOAD_CONTENT_TYPE.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("PORT").or_else(|| lookup("SERVER_PORT")) {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let log_format = match lookup("LOG_FORMAT") {
            Some(s) => LogFormat::parse(&s)?,
            None => LogFormat::Compact,
        };

        let base = BaseConfig {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| BIND_ADDRESS.to_string()),
            server_port,
            cors_origins,
            environment,
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            log_format,
        };

        let rewrite = RewriteConfig {
            max_upload_size_bytes,
            download_content_type: lookup("DOWNLOAD_CONTENT_TYPE")
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DOWNLOAD_CONTENT_TYPE.to_string()),
            api_key: lookup("API_KEY").filter(|s| !s.is_empty()),
        };

        Ok(Config { base, rewrite })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.rewrite.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be greater than 0"));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }

        let content_type = &self.rewrite.download_content_type;
        if content_type != "image/jpeg" && content_type != "application/octet-stream" {
            return Err(anyhow::anyhow!(
                "DOWNLOAD_CONTENT_TYPE must be 'image/jpeg' or 'application/octet-stream'"
            ));
        }

        if let Some(key) = &self.rewrite.api_key {
            if key.len() < MIN_API_KEY_LENGTH {
                return Err(anyhow::anyhow!(
                    "API_KEY must be at least {} characters long",
                    MIN_API_KEY_LENGTH
                ));
            }
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn bind_address(&self) -> &str {
        &self.base.bind_address
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.base.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit
    }

    pub fn log_format(&self) -> LogFormat {
        self.base.log_format
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.rewrite.max_upload_size_bytes
    }

    pub fn download_content_type(&self) -> &str {
        &self.rewrite.download_content_type
    }

    pub fn api_key(&self) -> Option<&str> {
        self.rewrite.api_key.as_deref()
    }
}
