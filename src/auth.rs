//! Admin credential checks for the `token` request header.
//!
//! The admin console sends the raw token (no `Bearer` prefix). Tokens are HS256
//! JWTs signed with `JWT_SECRET` whose `sub` claim is the admin identity,
//! `ADMIN_EMAIL` followed directly by `ADMIN_PASSWORD`.

use std::fmt;
use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Duration;
use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::{AlgorithmExt, Claims, Header, TimeOptions, UntrustedToken, ValidationError};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;

pub const TOKEN_HEADER: &str = "token";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No credential was supplied")]
    Missing,
    #[error("Token is poorly formatted: {0}")]
    Malformed(String),
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Token signature is invalid")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Token does not belong to the administrator")]
    WrongSubject,
    #[error("Could not sign token: {0}")]
    Signing(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Signing(msg) => AppError::Internal(msg),
            _ => AppError::Unauthorized,
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::AlgorithmMismatch { actual, .. } => AuthError::UnsupportedAlgorithm(actual),
            ValidationError::InvalidSignature => AuthError::BadSignature,
            ValidationError::Expired => AuthError::Expired,
            other => AuthError::Malformed(other.to_string()),
        }
    }
}

#[derive(Clone, Default)]
pub struct Secret<T: Clone + Default> {
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
}

/// Verifies (and, for operators and tests, issues) admin tokens.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    signing_secret: Secret<String>,
    identity: Secret<String>,
    time_options: TimeOptions,
}

impl AdminAuth {
    pub const TOKEN_LIFETIME_HOURS: i64 = 24;

    pub fn new(jwt_secret: &str, admin_email: &str, admin_password: &str) -> Self {
        Self {
            signing_secret: Secret::new(jwt_secret.to_string()),
            identity: Secret::new(format!("{admin_email}{admin_password}")),
            time_options: TimeOptions::default(),
        }
    }

    fn key(&self) -> Hs256Key {
        Hs256Key::new(self.signing_secret.reveal().as_bytes())
    }

    pub fn issue_token(&self) -> Result<String, AuthError> {
        self.issue_token_valid_for(Duration::hours(Self::TOKEN_LIFETIME_HOURS))
    }

    pub fn issue_token_valid_for(&self, lifetime: Duration) -> Result<String, AuthError> {
        let header = Header::empty().with_token_type("JWT");
        let claims = Claims::new(AdminClaims { sub: self.identity.reveal().clone() })
            .set_duration_and_issuance(&self.time_options, lifetime);
        Hs256
            .token(&header, &claims, &self.key())
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Missing);
        }
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let token = Hs256.validator::<AdminClaims>(&self.key()).validate(&untrusted)?;
        let claims = token.claims();
        claims.validate_expiration(&self.time_options)?;
        if &claims.custom.sub != self.identity.reveal() {
            return Err(AuthError::WrongSubject);
        }
        trace!("🔐️ Admin token accepted");
        Ok(())
    }
}

/// Extractor that only succeeds for requests carrying a valid admin token.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

impl FromRequest for AdminToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(check_request(req))
    }
}

fn check_request(req: &HttpRequest) -> Result<AdminToken, AppError> {
    let Some(auth) = req.app_data::<web::Data<AdminAuth>>() else {
        warn!("🔐️ AdminAuth is not registered as app data. Denying access.");
        return Err(AppError::Unauthorized);
    };
    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    auth.verify(token).map_err(|e| {
        warn!("🔐️ Rejected admin credential for {}: {e}", req.path());
        AppError::from(e)
    })?;
    Ok(AdminToken)
}
