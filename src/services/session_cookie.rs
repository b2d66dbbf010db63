//! Session cookie codec.
//!
//! The cookie value is an HS256-signed JWT carrying the user id and the
//! session token. Anything that fails to decode is treated as "no session".

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, SESSION_COOKIE_NAME};
use crate::domain::SessionToken;
use crate::errors::{AppError, AppResult};

/// Claims embedded in the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub token: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn session_token(&self) -> SessionToken {
        SessionToken::from_presented(self.token.clone())
    }
}

/// Encodes, decodes and renders the session cookie.
pub struct SessionCookie {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    secure: bool,
}

impl SessionCookie {
    pub fn new(secret: &[u8], secure: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            secure,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_secret_bytes(), config.session_cookie_secure)
    }

    /// Sign the session identity into a cookie value.
    pub fn encode(
        &self,
        user_id: Uuid,
        token: &SessionToken,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let claims = SessionClaims {
            sub: user_id,
            token: token.as_str().to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Session cookie encoding failed: {}", e)))
    }

    /// Verify and decode a cookie value. Fails closed.
    pub fn decode(&self, value: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(value, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session cookie");
                None
            }
        }
    }

    /// Pull the session cookie out of the request headers and decode it.
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionClaims> {
        extract_cookie_value(headers).and_then(|value| self.decode(&value))
    }

    /// Render the `Set-Cookie` header for a freshly issued session.
    pub fn set_cookie_header(
        &self,
        user_id: Uuid,
        token: &SessionToken,
        expires_at: DateTime<Utc>,
    ) -> AppResult<HeaderValue> {
        let value = self.encode(user_id, token, expires_at)?;
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Expires={}",
            http_date(expires_at)
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).map_err(header_error)
    }

    /// Render the `Set-Cookie` header that removes the session cookie.
    pub fn clear_cookie_header(&self) -> AppResult<HeaderValue> {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).map_err(header_error)
    }
}

fn header_error(e: InvalidHeaderValue) -> AppError {
    AppError::internal(format!("Invalid Set-Cookie header: {}", e))
}

/// IMF-fixdate, as required for the `Expires` attribute.
fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn extract_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}
