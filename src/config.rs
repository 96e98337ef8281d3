use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

use crate::payments::BackendConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub verification: VerificationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Fixed delay before the single automatic retry
    pub retry_delay: Duration,
    pub wallet_redirect_secs: u32,
    pub store_redirect_secs: u32,
    /// WhatsApp number for support links, digits only with country code
    pub support_whatsapp: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(3_000),
            wallet_redirect_secs: 5,
            store_redirect_secs: 10,
            support_whatsapp: "233000000000".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Redis URL; sessions stay in memory when unset
    pub redis_url: Option<String>,
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl: Duration::from_secs(86_400),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                environment: "development".to_string(),
            },
            backend: BackendConfig::default(),
            verification: VerificationConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or(defaults.server.host),
            port: parse_var("PORT", defaults.server.port)?,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.server.environment),
        };

        let backend = BackendConfig {
            base_url: env::var("BACKEND_API_URL").context("BACKEND_API_URL not set")?,
            timeout_secs: parse_var("BACKEND_TIMEOUT_SECS", defaults.backend.timeout_secs)?,
            max_retries: parse_var("BACKEND_MAX_RETRIES", defaults.backend.max_retries)?,
        };

        let verification = VerificationConfig {
            retry_delay: Duration::from_millis(parse_var(
                "VERIFY_RETRY_DELAY_MS",
                defaults.verification.retry_delay.as_millis() as u64,
            )?),
            wallet_redirect_secs: parse_var(
                "WALLET_REDIRECT_SECS",
                defaults.verification.wallet_redirect_secs,
            )?,
            store_redirect_secs: parse_var(
                "STORE_REDIRECT_SECS",
                defaults.verification.store_redirect_secs,
            )?,
            support_whatsapp: env::var("SUPPORT_WHATSAPP_NUMBER")
                .unwrap_or(defaults.verification.support_whatsapp),
        };

        let session = SessionConfig {
            redis_url: env::var("REDIS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            ttl: Duration::from_secs(parse_var(
                "SESSION_TTL_SECS",
                defaults.session.ttl.as_secs(),
            )?),
        };

        let config = Config {
            server,
            backend,
            verification,
            session,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port < 1024 {
            return Err(anyhow!(
                "Port must be at least 1024, got {}",
                self.server.port
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.server.environment.as_str()) {
            return Err(anyhow!(
                "Environment must be one of: {:?}, got {}",
                valid_environments,
                self.server.environment
            ));
        }

        let backend_url = url::Url::parse(&self.backend.base_url)
            .with_context(|| format!("BACKEND_API_URL is not a URL: {}", self.backend.base_url))?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "BACKEND_API_URL must be http or https, got {}",
                backend_url.scheme()
            ));
        }
        if self.server.environment == "production" && backend_url.scheme() != "https" {
            return Err(anyhow!("BACKEND_API_URL must use https in production"));
        }

        if self.backend.timeout_secs == 0 {
            return Err(anyhow!("BACKEND_TIMEOUT_SECS must be greater than 0"));
        }

        if self.verification.wallet_redirect_secs == 0 || self.verification.store_redirect_secs == 0
        {
            return Err(anyhow!("Redirect countdowns must be at least 1 second"));
        }

        let number = &self.verification.support_whatsapp;
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!(
                "SUPPORT_WHATSAPP_NUMBER must contain digits only, got '{}'",
                number
            ));
        }

        if self.session.ttl.is_zero() {
            return Err(anyhow!("SESSION_TTL_SECS must be greater than 0"));
        }

        Ok(())
    }
}
