//! Invites module - Invite lifecycle and restaurant suggestions
//!
//! - [`InviteLifecycle`]: create, RSVP, reorder, save and accept operations
//! - [`suggestion`]: ranking of both parties' favorites
//! - [`SuggestionDraft`]: local reordering staged before a save
//! - [`invariants`]: checks applied to every record before it is written

pub mod draft;
pub mod error;
pub mod invariants;
pub mod lifecycle;
pub mod suggestion;

// Re-exports per facilitare l'import
pub use draft::SuggestionDraft;
pub use error::InviteError;
pub use lifecycle::{InviteLifecycle, InvitePatch, NewInvite};
pub use suggestion::{SuggestionEngine, suggest_restaurants};
