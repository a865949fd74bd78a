//! Environment-driven configuration.

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    /// Comma-separated `token:user-uuid` pairs accepted as bearer tokens.
    pub api_tokens: String,
    /// When set, expired coupons are rejected at apply time. The upstream
    /// behavior never checked expiry, so this stays a policy switch.
    pub enforce_coupon_expiry: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8083".to_string())
                .parse()
                .context("PORT must be a number")?,
            nats_url: std::env::var("NATS_URL").ok(),
            api_tokens: std::env::var("API_TOKENS").unwrap_or_default(),
            enforce_coupon_expiry: flag_enabled(std::env::var("COUPON_ENFORCE_EXPIRY").ok()),
        })
    }
}

/// Unset flags default to enabled; only explicit "false"/"0" disable.
fn flag_enabled(value: Option<String>) -> bool {
    match value.as_deref() {
        Some("false") | Some("0") => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults_on() {
        assert!(flag_enabled(None));
        assert!(flag_enabled(Some("true".into())));
        assert!(flag_enabled(Some("yes".into())));
    }

    #[test]
    fn test_flag_disables_explicitly() {
        assert!(!flag_enabled(Some("false".into())));
        assert!(!flag_enabled(Some("0".into())));
    }
}
