//! Environment-driven server configuration.

use anyhow::Context;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Payment gateway key id (basic-auth user).
    pub gateway_key_id: String,
    /// Payment gateway shared secret; also verifies payment signatures.
    pub gateway_key_secret: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// `DATABASE_URL`, `RAZORPAY_KEY_ID`, and `RAZORPAY_KEY_SECRET` are
    /// required; `BIND_ADDR` defaults to 0.0.0.0:8080.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            gateway_key_id: std::env::var("RAZORPAY_KEY_ID")
                .context("RAZORPAY_KEY_ID must be set")?,
            gateway_key_secret: std::env::var("RAZORPAY_KEY_SECRET")
                .context("RAZORPAY_KEY_SECRET must be set")?,
        })
    }
}
