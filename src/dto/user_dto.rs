use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::user::{User, ROLE_ADMIN, ROLE_USER};
use crate::services::user_service::{CreateUser, UpdateUser};
use crate::utils::validation::validate_not_empty;

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if role == ROLE_ADMIN || role == ROLE_USER {
        return Ok(());
    }
    let mut error = ValidationError::new("role");
    error.message = Some("role must be 'admin' or 'user'".into());
    Err(error)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub name: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(custom = "validate_role")]
    pub role: Option<String>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            email: request.email,
            name: request.name,
            password: request.password,
            role: request.role,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub name: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
    #[validate(custom = "validate_role")]
    pub role: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            email: request.email,
            name: request.name,
            role: request.role,
            password: request.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for CreatedUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedUserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

impl From<User> for UpdatedUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_must_be_known() {
        let request = CreateUserRequest {
            email: "a@b.com".to_string(),
            name: None,
            password: "secret1".to_string(),
            role: Some("root".to_string()),
        };
        assert!(request.validate().is_err());

        let request = UpdateUserRequest {
            email: None,
            name: None,
            password: None,
            role: Some("admin".to_string()),
        };
        assert!(request.validate().is_ok());
    }
}
