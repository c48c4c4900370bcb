use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::dtos::NotificationDTO;
use crate::entities::UserId;

pub enum InternalSignal {
    Shutdown,
    Error(&'static str),
    Notification(NotificationDTO),
}

pub struct UserMap {
    users_online: DashMap<UserId, UnboundedSender<InternalSignal>>,
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            users_online: DashMap::new(),
        }
    }

    /// A newer connection of the same user replaces the older one
    #[instrument(skip(self, tx))]
    pub fn register_online(&self, user_id: &str, tx: UnboundedSender<InternalSignal>) {
        info!("Registering user as online");
        if let Some(previous) = self.users_online.insert(user_id.to_string(), tx) {
            let _ = previous.send(InternalSignal::Shutdown);
        }
        info!("Total online users: {}", self.users_online.len());
    }

    /// Removes the user only if `tx` is still their registered channel,
    /// so a stale connection cannot unregister a newer one.
    #[instrument(skip(self, tx))]
    pub fn remove_from_online(&self, user_id: &str, tx: &UnboundedSender<InternalSignal>) {
        if self
            .users_online
            .remove_if(user_id, |_, current| current.same_channel(tx))
            .is_some()
        {
            info!("Removed user from online");
        }
    }

    #[instrument(skip(self, message))]
    pub fn send_server_message_if_online(&self, user_id: &str, message: InternalSignal) -> bool {
        let message_type = match &message {
            InternalSignal::Shutdown => "Shutdown",
            InternalSignal::Error(_) => "Error",
            InternalSignal::Notification(notification) => {
                debug!("Sending Notification signal for invite_id {}", notification.invite_id);
                "Notification"
            }
        };

        if let Some(entry) = self.users_online.get(user_id) {
            let tx = entry.value();
            if let Err(e) = tx.send(message) {
                warn!("Failed to send {} message to user: {:?}", message_type, e.to_string());
                false
            } else {
                debug!("{} message sent to online user", message_type);
                true
            }
        } else {
            debug!("User {} not online, {} message not sent", user_id, message_type);
            false
        }
    }

    /// Get the count of online users
    pub fn online_count(&self) -> usize {
        self.users_online.len()
    }

    /// Check if a specific user is online
    pub fn is_user_online(&self, user_id: &str) -> bool {
        self.users_online.contains_key(user_id)
    }
}

impl Default for UserMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_send_only_reaches_online_users() {
        let map = UserMap::new();
        let (tx, mut rx) = unbounded_channel();
        map.register_online("u1", tx);

        assert!(map.send_server_message_if_online("u1", InternalSignal::Error("boom")));
        assert!(!map.send_server_message_if_online("u2", InternalSignal::Error("boom")));
        assert!(matches!(rx.try_recv(), Ok(InternalSignal::Error("boom"))));
    }

    #[test]
    fn test_stale_connection_does_not_unregister_newer_one() {
        let map = UserMap::new();
        let (old_tx, mut old_rx) = unbounded_channel();
        let (new_tx, _new_rx) = unbounded_channel();

        map.register_online("u1", old_tx.clone());
        map.register_online("u1", new_tx.clone());
        assert!(matches!(old_rx.try_recv(), Ok(InternalSignal::Shutdown)));

        map.remove_from_online("u1", &old_tx);
        assert!(map.is_user_online("u1"));

        map.remove_from_online("u1", &new_tx);
        assert!(!map.is_user_online("u1"));
        assert_eq!(map.online_count(), 0);
    }
}
