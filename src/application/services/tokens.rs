//! JWT access/refresh token issuance and verification (HS256).

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bootstrap::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Claims of a token whose signature, expiry and type have been checked.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is invalid or expired")]
    Invalid,
    #[error("Token is blacklisted")]
    Blacklisted,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            &cfg.jwt_secret,
            cfg.jwt_access_expires_secs,
            cfg.jwt_refresh_expires_secs,
        )
    }

    pub fn issue_pair(&self, user_id: Uuid) -> anyhow::Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue_access(user_id)?,
            refresh: self.issue(user_id, TokenType::Refresh, self.refresh_ttl_secs)?,
        })
    }

    pub fn issue_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.issue(user_id, TokenType::Access, self.access_ttl_secs)
    }

    fn issue(&self, user_id: Uuid, token_type: TokenType, ttl_secs: i64) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Checks signature, expiry and that the token is of the `expected` type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(token.trim(), &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token_decode_failed");
                TokenError::Invalid
            })?;
        let claims = data.claims;
        if claims.token_type != expected {
            return Err(TokenError::Invalid);
        }
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid)?;
        let jti = Uuid::parse_str(&claims.jti).map_err(|_| TokenError::Invalid)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::Invalid)?;
        Ok(VerifiedToken {
            user_id,
            jti,
            expires_at,
        })
    }
}
