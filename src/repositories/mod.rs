//! Repositories module - Typed access to the document store collections
//!
//! Each repository owns one collection (the favorite repository also reads
//! the restaurant catalog) and converts between entities and documents.
//! Repositories hold a shared handle on the store and are cheap to clone.

pub mod favorite;
pub mod invite;
pub mod notification;
pub mod restaurant;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Read, Update};

pub use favorite::FavoriteRepository;
pub use invite::{InviteRepository, InviteSnapshot};
pub use notification::NotificationRepository;
pub use restaurant::RestaurantRepository;
pub use user::UserRepository;
