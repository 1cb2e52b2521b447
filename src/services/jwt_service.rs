use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::EnvironmentConfig;
use crate::models::auth::{AccessClaims, RefreshClaims, TokenKind};
use crate::models::user::User;
use crate::utils::errors::{AppError, AppResult};

/// Signing keys and lifetime for one kind of token
struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    fn new(secret: &str, ttl: std::time::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(365)),
        }
    }
}

/// Issues and verifies the access / refresh token pair
pub struct JwtService {
    algorithm: Algorithm,
    access: TokenKeys,
    refresh: TokenKeys,
}

impl JwtService {
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            access: TokenKeys::new(&config.jwt_access_secret, config.access_token_ttl),
            refresh: TokenKeys::new(&config.jwt_refresh_secret, config.refresh_token_ttl),
        }
    }

    /// Stateless token carrying the user's identity and role
    pub fn issue_access(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            kind: TokenKind::Access,
            exp: (now + self.access.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.access.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating access token: {e}")))
    }

    /// Returns the token and the expiry to persist alongside it
    pub fn issue_refresh(&self, user_id: Uuid) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + self.refresh.ttl;
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            kind: TokenKind::Refresh,
            jti: Uuid::new_v4().to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.refresh.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating refresh token: {e}")))?;
        Ok((token, expires_at))
    }

    pub fn verify_access(&self, token: &str) -> AppResult<AccessClaims> {
        let claims = decode::<AccessClaims>(
            token,
            &self.access.decoding_key,
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> AppResult<RefreshClaims> {
        let claims = decode::<RefreshClaims>(
            token,
            &self.refresh.decoding_key,
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

        if claims.kind != TokenKind::Refresh {
            return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
        }
        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation
    }
}
