//! NotificationDispatcher - Turns committed invite changes into notifications
//!
//! Runs as a background task on the `invites` change feed. For every update
//! it evaluates the rules, drops commits it has already handled, writes one
//! record per notice and pushes it to the recipient's socket if connected.
//! Writing a notification is best effort: failures are logged and the invite
//! write that caused them is never affected.

use super::rules::{self, PendingNotification};
use crate::AppState;
use crate::dtos::NotificationDTO;
use crate::entities::{Invite, InviteNotification, InviteNotificationType};
use crate::repositories::Create;
use crate::store::{ChangeStream, DocumentChange, collections, from_document};
use crate::ws::InternalSignal;
use chrono::Utc;
use futures::StreamExt;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_DEDUPE_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupeKey {
    invite_id: String,
    notification_type: InviteNotificationType,
    seq: u64,
}

/// Bounded memory of recently handled keys, oldest evicted first
struct DedupeWindow {
    capacity: usize,
    order: VecDeque<DedupeKey>,
    seen: HashSet<DedupeKey>,
}

impl DedupeWindow {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// False when the key was already handled
    fn insert(&mut self, key: DedupeKey) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.seen.insert(key);
        true
    }
}

pub struct NotificationDispatcher {
    state: Arc<AppState>,
    window: DedupeWindow,
}

impl NotificationDispatcher {
    pub fn new(state: Arc<AppState>, dedupe_capacity: usize) -> Self {
        Self {
            state,
            window: DedupeWindow::new(dedupe_capacity),
        }
    }

    /// Subscribes to the invites feed now and processes it on a background task
    pub fn spawn(self) -> JoinHandle<()> {
        let changes = self.state.store.subscribe(collections::INVITES);
        info!("Notification dispatcher started");
        tokio::spawn(self.run(changes))
    }

    pub async fn run(mut self, mut changes: ChangeStream) {
        while let Some(change) = changes.next().await {
            self.process(&change).await;
        }
        info!("Invite change feed closed, dispatcher stopped");
    }

    /// Handles one change and returns the notifications written for it
    #[instrument(skip(self, change), fields(invite_id = %change.id))]
    pub async fn process(&mut self, change: &DocumentChange) -> Vec<InviteNotification> {
        // creations and deletions carry no before/after pair
        let (Some(before_doc), Some(after_doc)) = (&change.before, &change.after) else {
            return Vec::new();
        };

        let (before, after) = match (
            from_document::<Invite>(before_doc.clone()),
            from_document::<Invite>(after_doc.clone()),
        ) {
            (Ok(before), Ok(after)) => (before, after),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Skipping unreadable invite change: {}", e);
                return Vec::new();
            }
        };

        let mut written = Vec::new();

        for pending in rules::evaluate(&before, &after) {
            let key = DedupeKey {
                invite_id: change.id.clone(),
                notification_type: pending.notification_type,
                seq: change.seq,
            };
            if !self.window.insert(key) {
                debug!(notification_type = ?pending.notification_type, "Change already handled");
                continue;
            }

            if let Some(saved) = self.deliver(&after, pending).await {
                written.push(saved);
            }
        }
        written
    }

    async fn deliver(&self, invite: &Invite, pending: PendingNotification) -> Option<InviteNotification> {
        let notification = InviteNotification {
            id: Uuid::new_v4().to_string(),
            invite_id: invite.id.clone(),
            user_id: pending.user_id,
            notification_type: pending.notification_type,
            invite_date: invite.event_date,
            invite_type: invite.event_type,
            invite_status: invite.status,
            message: pending.notification_type.default_message().to_string(),
            timestamp: Utc::now(),
            read: false,
        };

        match self.state.notification.create(&notification).await {
            Ok(saved) => {
                info!(
                    user_id = %saved.user_id,
                    notification_type = ?saved.notification_type,
                    "Notification written"
                );
                self.state.users_online.send_server_message_if_online(
                    &saved.user_id,
                    InternalSignal::Notification(NotificationDTO::from(saved.clone())),
                );
                Some(saved)
            }
            Err(e) => {
                error!(user_id = %notification.user_id, "Failed to write notification: {}", e);
                None
            }
        }
    }
}
