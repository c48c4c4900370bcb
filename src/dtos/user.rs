//! User DTOs - Data Transfer Objects per utenti

use crate::entities::{DietaryOption, UserId, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub dietary_restrictions: Vec<DietaryOption>,
    pub completed_intro: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserDTO {
    fn from(value: UserProfile) -> Self {
        // password hash never leaves the server
        Self {
            id: value.id,
            email: value.email,
            display_name: value.display_name,
            dietary_restrictions: value.dietary_restrictions,
            completed_intro: value.completed_intro,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare un nuovo utente
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(min = 1, max = 64, message = "Display name must be between 1 and 64 characters"))]
    pub display_name: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

/// DTO per il login
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

/// DTO per aggiornare il profilo (solo i campi presenti vengono scritti)
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateProfileDTO {
    #[validate(length(min = 1, max = 64, message = "Display name must be between 1 and 64 characters"))]
    pub display_name: Option<String>,
    pub dietary_restrictions: Option<Vec<DietaryOption>>,
    pub completed_intro: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let valid = CreateUserDTO {
            email: "ada@example.com".into(),
            display_name: "Ada".into(),
            password: "correct horse".into(),
        };
        assert!(valid.validate().is_ok());

        let short_password = CreateUserDTO {
            password: "short".into(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_err());

        let bad_email = CreateUserDTO {
            email: "not-an-email".into(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }
}
