use std::env;
use std::fmt;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use serde::Deserialize;

use crate::jwt::SigningAlgorithm;
use crate::jwt::TokenSettings;
use crate::jwt::DEFAULT_ISSUER;
use crate::password::PasswordParams;

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordParams,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_expiration_hours() -> i64 {
    1
}

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

impl JwtConfig {
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    /// Token lifetime. Values beyond chrono's range saturate; `AuthConfig`
    /// rejects them at load time.
    pub fn token_ttl(&self) -> Duration {
        Duration::try_hours(self.expiration_hours).unwrap_or(if self.expiration_hours < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        })
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            issuer: self.issuer.clone(),
            algorithm: SigningAlgorithm::default(),
        }
    }
}

// Keeps the secret out of logs and panic messages.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl AuthConfig {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__JWT__SECRET, AUTH__JWT__EXPIRATION_HOURS, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: AUTH__JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("AUTH").separator("__"))
            .build()?;

        Self::from_configuration(configuration)
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Self::from_configuration(configuration)
    }

    fn from_configuration(configuration: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: AuthConfig = configuration.try_deserialize()?;

        if config.jwt.secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must not be empty".to_string(),
            ));
        }

        if Duration::try_hours(config.jwt.expiration_hours).is_none() {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours out of range: {}",
                config.jwt.expiration_hours
            )));
        }

        Ok(config)
    }
}
