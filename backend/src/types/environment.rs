//! Environment configuration for different deployment stages

use std::env;

use tracing_subscriber::{fmt, EnvFilter};

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Port the HTTP server listens on (`PORT`, default 3000)
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn port(&self) -> Result<u16, std::num::ParseIntError> {
        env::var("PORT").map_or(Ok(3000), |p| p.parse())
    }

    /// Installs the global tracing subscriber
    ///
    /// JSON output for staging/production, human-readable output for development.
    pub fn init_tracing(&self) {
        match self {
            Self::Production | Self::Staging => {
                fmt()
                    .json()
                    .with_env_filter(EnvFilter::from_default_env())
                    .init();
            }
            Self::Development => {
                fmt().with_env_filter(EnvFilter::from_default_env()).init();
            }
        }
    }
}
