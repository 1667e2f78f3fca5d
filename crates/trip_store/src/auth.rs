//! Authentication context shared by everything that talks to the API.
//!
//! The context is a handle around a [`watch`] channel: cloning it is cheap,
//! every clone sees the same session, and [`AuthContext::subscribe`] is the
//! single place to be told about sign-in and sign-out.

use std::sync::Arc;

use api_types::auth::TokenPair;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Tokens issued to a signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

impl Session {
    pub fn from_tokens(username: &str, tokens: TokenPair) -> Self {
        Self {
            username: username.to_string(),
            access: tokens.access,
            refresh: Some(tokens.refresh),
        }
    }

    /// Expiry of the access token, read from its `exp` claim.
    ///
    /// Returns `None` for tokens that are not JWTs or carry no expiry.
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        let payload = self.access.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        let claims: Claims = serde_json::from_slice(&bytes).ok()?;
        DateTime::from_timestamp(claims.exp?, 0)
    }

    pub fn access_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_expires_at().is_some_and(|exp| exp <= now)
    }
}

#[derive(Clone, Debug)]
pub struct AuthContext {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn with_session(session: Session) -> Self {
        let (tx, _rx) = watch::channel(Some(session));
        Self { tx: Arc::new(tx) }
    }

    /// Bearer token to attach to the next request.
    pub fn current_token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|session| session.access.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn sign_in(&self, session: Session) {
        tracing::info!("signed in as {}", session.username);
        self.tx.send_replace(Some(session));
    }

    /// Swaps the access token after a refresh. No-op when signed out.
    pub fn replace_access(&self, access: String) -> bool {
        self.tx.send_if_modified(|current| match current {
            Some(session) => {
                session.access = access;
                true
            }
            None => false,
        })
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            tracing::info!("signed out {}", previous.username);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"user_id":1}}"#));
        format!("{header}.{payload}.signature")
    }

    fn session(access: String) -> Session {
        Session {
            username: "alice".to_string(),
            access,
            refresh: Some("refresh".to_string()),
        }
    }

    #[test]
    fn reads_expiry_from_jwt() {
        let s = session(jwt_with_exp(1_700_000_000));
        let exp = s.access_expires_at().unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_000);

        let before = DateTime::from_timestamp(1_699_999_999, 0).unwrap();
        let after = DateTime::from_timestamp(1_700_000_001, 0).unwrap();
        assert!(!s.access_expired(before));
        assert!(s.access_expired(after));
    }

    #[test]
    fn opaque_tokens_never_expire() {
        let s = session("not-a-jwt".to_string());
        assert!(s.access_expires_at().is_none());
        assert!(!s.access_expired(Utc::now()));
    }

    #[test]
    fn clones_share_the_session() {
        let ctx = AuthContext::new();
        let other = ctx.clone();
        assert!(!other.is_authenticated());

        ctx.sign_in(session("token".to_string()));
        assert_eq!(other.current_token().as_deref(), Some("token"));

        assert!(other.replace_access("fresh".to_string()));
        assert_eq!(ctx.current_token().as_deref(), Some("fresh"));
    }

    #[test]
    fn replace_access_when_signed_out_is_noop() {
        let ctx = AuthContext::new();
        assert!(!ctx.replace_access("fresh".to_string()));
        assert!(ctx.current_token().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_sign_out() {
        let ctx = AuthContext::with_session(session("token".to_string()));
        let mut rx = ctx.subscribe();

        ctx.clone().sign_out();

        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(!ctx.is_authenticated());
    }
}
