//! UserRepository - Profiles in the `users` collection

use super::{Create, Read, Update};
use crate::dtos::{CreateUserDTO, UpdateProfileDTO};
use crate::entities::{UserId, UserProfile};
use crate::store::{
    Document, DocumentStore, FieldFilter, StoreError, collections, from_document, to_document,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> UserRepository {
        Self { store }
    }

    /// Email is compared lowercased, the way it is stored
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let found = self
            .store
            .query_documents(
                collections::USERS,
                &FieldFilter::eq("email", email.trim().to_lowercase()),
            )
            .await?;

        found
            .into_iter()
            .next()
            .map(|(_, doc)| from_document(doc))
            .transpose()
    }
}

impl Create<UserProfile, CreateUserDTO> for UserRepository {
    async fn create(&self, data: &CreateUserDTO) -> Result<UserProfile, StoreError> {
        let user = UserProfile {
            id: Uuid::new_v4().to_string(),
            email: data.email.trim().to_lowercase(),
            display_name: data.display_name.trim().to_string(),
            // the service hashes the password before calling us
            password_hash: data.password.clone(),
            dietary_restrictions: Vec::new(),
            completed_intro: false,
            created_at: Utc::now(),
        };

        self.store
            .create_document(collections::USERS, &user.id, to_document(&user)?)
            .await?;

        Ok(user)
    }
}

impl Read<UserProfile, UserId> for UserRepository {
    async fn read(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        self.store
            .get_document(collections::USERS, id)
            .await?
            .map(from_document)
            .transpose()
    }
}

impl Update<UserProfile, UpdateProfileDTO, UserId> for UserRepository {
    async fn update(&self, id: &UserId, data: &UpdateProfileDTO) -> Result<UserProfile, StoreError> {
        let mut partial = Document::new();
        if let Some(ref display_name) = data.display_name {
            partial.insert(
                "displayName".to_string(),
                Value::String(display_name.trim().to_string()),
            );
        }
        if let Some(ref restrictions) = data.dietary_restrictions {
            partial.insert(
                "dietaryRestrictions".to_string(),
                serde_json::to_value(restrictions)?,
            );
        }
        if let Some(completed_intro) = data.completed_intro {
            partial.insert("completedIntro".to_string(), Value::Bool(completed_intro));
        }

        // Nothing to write, return the current profile unchanged
        if partial.is_empty() {
            return self
                .read(id)
                .await?
                .ok_or_else(|| StoreError::not_found(collections::USERS, id));
        }

        let updated = self
            .store
            .update_document(collections::USERS, id, partial)
            .await?;
        from_document(updated)
    }
}
