use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserPatch, UserSummary, ROLE_USER};
use crate::repositories::UserRepository;
use crate::services::password::PasswordHasher;
use crate::utils::errors::{not_found_error, AppResult};

/// Fields accepted when an administrator creates an account
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
    pub role: Option<String>,
}

/// Partial update; the password is re-hashed when present
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn list(&self) -> AppResult<Vec<UserSummary>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<UserSummary> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserSummary::from)
            .ok_or_else(|| not_found_error("User", &id.to_string()))
    }

    pub async fn create(&self, input: CreateUser) -> AppResult<User> {
        let password_hash = self.hasher.hash(&input.password).await?;
        let user = self
            .users
            .create(NewUser {
                email: input.email,
                name: input.name,
                password_hash,
                role: input.role.unwrap_or_else(|| ROLE_USER.to_string()),
            })
            .await?;

        debug!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, input: UpdateUser) -> AppResult<User> {
        let password_hash = match input.password {
            Some(password) => Some(self.hasher.hash(&password).await?),
            None => None,
        };
        let patch = UserPatch {
            email: input.email,
            name: input.name,
            role: input.role,
            password_hash,
        };

        let user = self
            .users
            .update(id, patch)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))?;

        debug!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// `false` when no such user existed
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let deleted = self.users.delete(id).await?;
        if deleted {
            debug!(user_id = %id, "User deleted");
        }
        Ok(deleted)
    }
}
