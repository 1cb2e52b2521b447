//! Credential and session management
//!
//! Access tokens are stateless. Refresh tokens are persisted and checked
//! against the store on every use, so revocation takes effect immediately.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::models::auth::{LoginOutcome, RefreshOutcome};
use crate::models::refresh_token::NewRefreshToken;
use crate::models::user::{NewUser, User, ROLE_USER};
use crate::repositories::{RefreshTokenRepository, UserRepository};
use crate::services::jwt_service::JwtService;
use crate::services::password::PasswordHasher;
use crate::utils::errors::{conflict_error, internal_error, AppError, AppResult};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    hasher: Arc<dyn PasswordHasher>,
    jwt: Arc<JwtService>,
    rotate_refresh_tokens: bool,
    // hashed at the configured cost on first use
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        hasher: Arc<dyn PasswordHasher>,
        jwt: Arc<JwtService>,
        rotate_refresh_tokens: bool,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            hasher,
            jwt,
            rotate_refresh_tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Creates an account with the default role
    pub async fn register(
        &self,
        email: &str,
        name: Option<String>,
        password: &str,
    ) -> AppResult<User> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(conflict_error("User", "email"));
        }

        let password_hash = self.hasher.hash(password).await?;
        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                name,
                password_hash,
                role: ROLE_USER.to_string(),
            })
            .await?;

        info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let Some(user) = self.users.find_by_email(email).await? else {
            // unknown emails pay the same bcrypt cost as wrong passwords
            let dummy_hash = self
                .dummy_hash
                .get_or_try_init(|| self.hasher.hash(DUMMY_PASSWORD))
                .await?;
            self.hasher.verify(password, dummy_hash).await?;
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !self.hasher.verify(password, &user.password_hash).await? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let access_token = self.jwt.issue_access(&user)?;
        let refresh_token = self.issue_refresh_token(&user).await?;

        info!(user_id = %user.id, "Login succeeded");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a new access token, rotating the
    /// refresh token when rotation is enabled
    pub async fn refresh(&self, token: &str) -> AppResult<RefreshOutcome> {
        self.jwt.verify_refresh(token)?;

        let now = Utc::now();
        let stored = self
            .refresh_tokens
            .find_by_token(token)
            .await?
            .filter(|row| row.is_valid_at(now))
            .ok_or_else(|| AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?;

        let user = self.users.find_by_id(stored.user_id).await?.ok_or_else(|| {
            warn!(user_id = %stored.user_id, "Refresh token owner no longer exists");
            internal_error("refresh token references a missing user")
        })?;

        let access_token = self.jwt.issue_access(&user)?;
        let refresh_token = if self.rotate_refresh_tokens {
            self.refresh_tokens.revoke(token, now).await?;
            Some(self.issue_refresh_token(&user).await?)
        } else {
            None
        };

        Ok(RefreshOutcome {
            access_token,
            refresh_token,
        })
    }

    /// Revokes the token; unknown or already revoked tokens are accepted
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        if !self.refresh_tokens.revoke(token, Utc::now()).await? {
            tracing::debug!("Logout with unknown refresh token");
        }
        Ok(())
    }

    async fn issue_refresh_token(&self, user: &User) -> AppResult<String> {
        let (token, expires_at) = self.jwt.issue_refresh(user.id)?;
        self.refresh_tokens
            .create(NewRefreshToken {
                token: token.clone(),
                user_id: user.id,
                expires_at,
            })
            .await?;
        Ok(token)
    }
}
