//! Bearer-token identity resolution.
//!
//! Credential flows (login, refresh, password reset) live in the external
//! auth service. This module holds only the capability seam the handlers
//! depend on, plus a process-local registry seeded from configuration.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

pub trait TokenAuthority: Send + Sync {
    fn issue(&self, user_id: Uuid) -> String;
    fn verify(&self, token: &str) -> Option<Uuid>;
    fn revoke(&self, token: &str);
}

/// Token registry backed by a process-local map.
#[derive(Default)]
pub struct InMemoryTokens {
    tokens: RwLock<HashMap<String, Uuid>>,
}

impl InMemoryTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses comma-separated `token:user-uuid` pairs (the `API_TOKENS`
    /// format). An empty spec yields an empty registry.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut tokens = HashMap::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (token, user) = pair
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("malformed token pair: {pair}"))?;
            tokens.insert(token.trim().to_string(), user.trim().parse()?);
        }
        Ok(Self { tokens: RwLock::new(tokens) })
    }
}

impl TokenAuthority for InMemoryTokens {
    fn issue(&self, user_id: Uuid) -> String {
        let token = format!("{:032x}", rand::random::<u128>());
        if let Ok(mut map) = self.tokens.write() {
            map.insert(token.clone(), user_id);
        }
        token
    }

    fn verify(&self, token: &str) -> Option<Uuid> {
        self.tokens.read().ok()?.get(token).copied()
    }

    fn revoke(&self, token: &str) {
        if let Ok(mut map) = self.tokens.write() {
            map.remove(token);
        }
    }
}

/// Authenticated caller, resolved from the `Authorization: Bearer` header
/// before the handler runs.
#[derive(Clone, Copy, Debug)]
pub struct Identity(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;
        let user_id = state.auth.verify(token).ok_or(ApiError::Unauthorized)?;
        Ok(Identity(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_revoke_roundtrip() {
        let registry = InMemoryTokens::new();
        let user = Uuid::new_v4();
        let token = registry.issue(user);
        assert_eq!(registry.verify(&token), Some(user));
        registry.revoke(&token);
        assert_eq!(registry.verify(&token), None);
    }

    #[test]
    fn test_from_spec_parses_pairs() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let registry = InMemoryTokens::from_spec(&format!("alpha:{a}, beta:{b}")).unwrap();
        assert_eq!(registry.verify("alpha"), Some(a));
        assert_eq!(registry.verify("beta"), Some(b));
        assert_eq!(registry.verify("gamma"), None);
    }

    #[test]
    fn test_from_spec_rejects_malformed_pairs() {
        assert!(InMemoryTokens::from_spec("no-separator").is_err());
        assert!(InMemoryTokens::from_spec("token:not-a-uuid").is_err());
    }

    #[test]
    fn test_empty_spec_is_empty_registry() {
        let registry = InMemoryTokens::from_spec("").unwrap();
        assert_eq!(registry.verify("anything"), None);
    }
}
