//! User entity - Profile with methods for password handling

use super::UserId;
use super::enums::DietaryOption;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryOption>,
    #[serde(default)]
    pub completed_intro: bool,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password_hash).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }
}
