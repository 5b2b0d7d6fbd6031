//! Token lifecycle configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Token lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Issuer bound into signed claims and checked on verification.
    /// Typically the broker's public root URL.
    pub issuer: String,

    /// Lifetime of user tokens derived from a dynamic parent, in seconds
    #[serde(default = "default_user_token_ttl_secs")]
    pub user_token_ttl_secs: u64,

    /// Lifetime of state codes, in seconds
    #[serde(default = "default_state_code_ttl_secs")]
    pub state_code_ttl_secs: u64,
}

impl TokenConfig {
    /// User token lifetime as a duration
    pub fn user_token_ttl(&self) -> Duration {
        Duration::seconds(self.user_token_ttl_secs as i64)
    }

    /// State code lifetime as a duration
    pub fn state_code_ttl(&self) -> Duration {
        Duration::seconds(self.state_code_ttl_secs as i64)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "https://helio.example.com".to_string(),
            user_token_ttl_secs: default_user_token_ttl_secs(),
            state_code_ttl_secs: default_state_code_ttl_secs(),
        }
    }
}

fn default_user_token_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_state_code_ttl_secs() -> u64 {
    10 * 60
}
