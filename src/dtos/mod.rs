//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod invite;
pub mod notification;
pub mod restaurant;
pub mod user;
pub mod ws_event;

// Re-exports per facilitare l'import
pub use invite::{CreateInviteDTO, InviteDTO, ReorderDTO, RsvpDTO, SaveOrderDTO};
pub use notification::{MarkReadDTO, NotificationDTO};
pub use restaurant::{FavoriteDTO, RestaurantDTO};
pub use user::{CreateUserDTO, LoginDTO, UpdateProfileDTO, UserDTO};
pub use ws_event::{WsClientEventDTO, WsEventDTO};
