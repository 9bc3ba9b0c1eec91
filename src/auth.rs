// src/auth.rs
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::app_log;
use crate::core::StateMedium;
use crate::store::PersistedSlice;

const SESSION_KEY: &str = "auth-session";

/// What the backend hands back from `POST /login` and what we keep locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Authentication state passed explicitly to the API gateway.
///
/// Cloning shares the same session, so an invalidation observed by the
/// gateway (401) is visible to every holder.
#[derive(Debug, Clone)]
pub struct AuthSession {
    current: Arc<RwLock<Option<SessionData>>>,
    slice: Option<Arc<PersistedSlice<SessionData>>>,
}

impl AuthSession {
    /// A session that lives only in memory
    pub fn anonymous() -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            slice: None,
        }
    }

    /// Session backed by the state medium, restored from the last login
    pub async fn restore(medium: StateMedium) -> Self {
        let slice = PersistedSlice::<SessionData>::new(SESSION_KEY, medium);
        let restored = slice.load().await;
        if let Some(data) = &restored {
            app_log!(debug, "Restored session for {}", data.username);
        }
        Self {
            current: Arc::new(RwLock::new(restored)),
            slice: Some(Arc::new(slice)),
        }
    }

    fn read(&self) -> Option<SessionData> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn write(&self, value: Option<SessionData>) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }

    pub fn token(&self) -> Option<String> {
        self.read().map(|s| s.token)
    }

    pub fn username(&self) -> Option<String> {
        self.read().map(|s| s.username)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Record a successful login
    pub async fn establish(&self, token: String, username: String) {
        let data = SessionData { token, username };
        if let Some(slice) = &self.slice {
            slice.save(&data).await;
        }
        app_log!(info, "Logged in as {}", data.username);
        self.write(Some(data));
    }

    /// Forget the token and username, locally and in the persisted store
    pub async fn logout(&self) {
        self.invalidate();
        if let Some(slice) = &self.slice {
            slice.clear().await;
        }
    }

    /// In-memory half of `logout`, usable from synchronous code paths
    pub(crate) fn invalidate(&self) {
        if let Some(previous) = self.read() {
            app_log!(warn, "Session for {} invalidated", previous.username);
        }
        self.write(None);
    }

    /// Expiry embedded in the token, if the token is a JWT carrying `exp`.
    ///
    /// The signature is not checked here; the backend remains the authority.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let token = self.token()?;
        let header = decode_header(&token).ok()?;

        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(&token, &DecodingKey::from_secret(&[]), &validation).ok()?;
        DateTime::from_timestamp(data.claims.exp?, 0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}
