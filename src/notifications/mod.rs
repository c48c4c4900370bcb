//! Notifications module - Invite notices derived from committed invite changes

pub mod dispatcher;
pub mod rules;

// Re-exports per facilitare l'import
pub use dispatcher::{DEFAULT_DEDUPE_CAPACITY, NotificationDispatcher};
pub use rules::{PendingNotification, evaluate};
