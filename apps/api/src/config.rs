use anyhow::{bail, Context, Result};
use secrecy::SecretString;

use crate::vault::suite::MIN_KDF_ITERATIONS;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// `vault_secret` is the root of trust for every stored API key. Its `Debug`
/// output is redacted.
#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub vault_secret: SecretString,
    pub vault_kdf_iterations: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let vault_secret = require_env("VAULT_SECRET")?;
        if vault_secret.is_empty() {
            bail!("Required environment variable 'VAULT_SECRET' is empty");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            vault_secret: SecretString::from(vault_secret),
            vault_kdf_iterations: parse_kdf_iterations(
                std::env::var("VAULT_KDF_ITERATIONS").ok().as_deref(),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_kdf_iterations(raw: Option<&str>) -> Result<u32> {
    let Some(raw) = raw else {
        return Ok(MIN_KDF_ITERATIONS);
    };
    let iterations = raw
        .trim()
        .parse::<u32>()
        .context("VAULT_KDF_ITERATIONS must be a positive integer")?;
    if iterations < MIN_KDF_ITERATIONS {
        bail!("VAULT_KDF_ITERATIONS must be at least {MIN_KDF_ITERATIONS}, got {iterations}");
    }
    Ok(iterations)
}
