use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub node: NodeConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Which carrier wins when both hold a credential. Fixed for the whole
    /// process; never varies per deployment.
    pub carrier_precedence: CarrierPrecedence,
    /// Name of the session cookie carrying a credential
    pub cookie_name: String,
    /// HMAC signing secret, loaded once at startup and immutable thereafter
    pub secret: String,
    /// Lifetime of minted tokens
    pub token_ttl_seconds: u64,
}

/// Order in which credential carriers are searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CarrierPrecedence {
    CookieFirst,
    #[default]
    HeaderFirst,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let allowed_origins: Vec<String> = std::env::var("ALLOWED_ORIGINS")
            .map(|o| {
                o.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let secret = std::env::var("AUTH_SECRET").map_err(|_| {
            ConfigError::ValidationError("AUTH_SECRET must be set".to_string())
        })?;

        let cookie_name =
            std::env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| "token".to_string());

        let carrier_precedence = std::env::var("AUTH_CARRIER_PRECEDENCE")
            .ok()
            .map(|s| match s.to_lowercase().as_str() {
                "cookie" => CarrierPrecedence::CookieFirst,
                _ => CarrierPrecedence::HeaderFirst,
            })
            .unwrap_or_default();

        let token_ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let config = Config {
            auth: AuthConfig {
                carrier_precedence,
                cookie_name,
                secret,
                token_ttl_seconds,
            },
            node: NodeConfig {
                allowed_origins,
                bind_address,
                data_dir,
            },
            test_mode,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "AUTH_SECRET cannot be empty".to_string(),
            ));
        }

        if self.auth.secret.len() < 32 {
            tracing::warn!(
                "AUTH_SECRET is shorter than 32 bytes. Tokens signed with a short \
                 secret are easier to forge; consider a longer one."
            );
        }

        if self.auth.cookie_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "AUTH_COOKIE_NAME cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
