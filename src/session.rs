//! Signed session tokens carried in the `session` cookie.
//!
//! A token is `base64url(claims) "." base64url(hmac_sha256(base64url(claims)))`.
//! Anything that fails to decode, fails the MAC check, or is past its expiry
//! verifies to no session at all.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::accounts::{Account, Role};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: i64,
    pub role: Role,
    pub display_name: String,
}

impl Session {
    pub fn for_account(account: &Account) -> Self {
        Session {
            account_id: account.id,
            role: account.role,
            display_name: account.name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    session: Session,
    expires_at: i64,
}

#[derive(Clone)]
pub struct SessionKey {
    key: Arc<Vec<u8>>,
    ttl: Duration,
}

impl SessionKey {
    pub fn new(key: Vec<u8>, ttl: Duration) -> Self {
        SessionKey {
            key: Arc::new(key),
            ttl,
        }
    }

    pub fn sign(&self, session: &Session) -> Result<String> {
        self.sign_until(session, Utc::now() + self.ttl)
    }

    fn sign_until(&self, session: &Session, expires_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            session: session.clone(),
            expires_at: expires_at.timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    pub fn verify(&self, token: &str) -> Option<Session> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let (payload, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let claims: Claims = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
        if claims.expires_at <= now.timestamp() {
            return None;
        }

        Some(claims.session)
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).map_err(|_| anyhow!("unusable session key"))
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; HttpOnly; Path=/; SameSite=Lax", SESSION_COOKIE, token)
}

pub fn cleared_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
