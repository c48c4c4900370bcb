//! Entities module - Domain records persisted in the document store
//!
//! Every entity maps to one collection (see [`crate::store::collections`]) and
//! is stored with camelCase field names.

pub mod enums;
pub mod invite;
pub mod notification;
pub mod restaurant;
pub mod user;

pub type UserId = String;
pub type RestaurantId = String;
pub type InviteId = String;

// Re-exports per facilitare l'import
pub use enums::{DietaryOption, EventType, InviteNotificationType, InviteStatus};
pub use invite::{Invite, Party};
pub use notification::InviteNotification;
pub use restaurant::{Favorite, OpeningHours, Restaurant};
pub use user::UserProfile;
