//! Signed bearer tokens (HS256 JWT).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use newsdesk_core::{AccountId, AccountRole, Email};

use super::AuthError;
use crate::config::JwtConfig;
use crate::models::Identity;

/// Which identity variant a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Account,
    ConfiguredAdmin,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID (`0` for the configured admin).
    pub sub: String,
    pub email: String,
    /// Role code, see `AccountRole::code`.
    pub role: i32,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: chrono::Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.ttl,
        }
    }

    /// Issue a token for `identity`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = now + self.ttl;
        let (sub, kind) = match identity {
            Identity::Account { id, .. } => (id.to_string(), TokenKind::Account),
            Identity::ConfiguredAdmin { .. } => ("0".to_string(), TokenKind::ConfiguredAdmin),
        };

        let claims = Claims {
            sub,
            email: identity.email().to_string(),
            role: identity.role().code(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, expiry, issuer and audience, then rebuild the identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any rejected token.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        identity_from_claims(&claims)
    }
}

fn identity_from_claims(claims: &Claims) -> Result<Identity, AuthError> {
    let email = Email::parse(&claims.email)
        .map_err(|e| AuthError::InvalidToken(format!("bad email claim: {e}")))?;

    match claims.kind {
        TokenKind::ConfiguredAdmin => Ok(Identity::ConfiguredAdmin { email }),
        TokenKind::Account => {
            let id = claims
                .sub
                .parse::<i32>()
                .map_err(|e| AuthError::InvalidToken(format!("bad subject claim: {e}")))?;
            let role = AccountRole::from_code(claims.role)
                .map_err(|e| AuthError::InvalidToken(format!("bad role claim: {e}")))?;
            Ok(Identity::Account {
                id: AccountId::new(id),
                email,
                role,
            })
        }
    }
}
