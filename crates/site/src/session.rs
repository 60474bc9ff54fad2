//! Signed `pilot_session` cookie.
//!
//! Token layout: `base64url(json payload) "." base64url(HMAC-SHA256(secret, payload))`,
//! with timestamps in milliseconds since the Unix epoch.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "pilot_session";
pub const SESSION_TTL_MS: i64 = 1000 * 60 * 60 * 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Pilot,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pilot_type: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionCodec {
    key: HmacSha256,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}

impl SessionCodec {
    pub fn new(secret: &str) -> Result<Self, InvalidLength> {
        Ok(Self {
            key: HmacSha256::new_from_slice(secret.as_bytes())?,
        })
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = self.key.clone();
        mac.update(payload.as_bytes());
        mac
    }

    /// Token for `email`, valid for eight hours from `now_ms`.
    pub fn issue(&self, email: &str, pilot_type: Option<&str>, role: Role, now_ms: i64) -> String {
        let data = SessionData {
            email: email.to_string(),
            pilot_type: pilot_type.map(str::to_string),
            role,
            iat: now_ms,
            exp: now_ms + SESSION_TTL_MS,
        };
        self.encode(&data)
    }

    pub fn encode(&self, data: &SessionData) -> String {
        // Serializing a struct of strings and integers cannot fail
        let json = serde_json::to_vec(data).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&payload).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    /// The session carried by `token`, if its signature matches and it has
    /// not expired at `now_ms`.
    pub fn decode(&self, token: &str, now_ms: i64) -> Option<SessionData> {
        // Extra segments stay in `signature`, which then fails to verify
        let (payload, signature) = token.split_once('.')?;
        if payload.is_empty() || signature.is_empty() {
            return None;
        }

        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        // verify_slice compares in constant time
        self.mac(payload).verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let data: SessionData = serde_json::from_slice(&json).ok()?;
        if now_ms > data.exp {
            log::debug!("Rejecting expired session for {}", data.email);
            return None;
        }
        Some(data)
    }
}

/// Value of the session cookie in a `Cookie` header, if present.
pub fn session_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
