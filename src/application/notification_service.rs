use crate::domain::notification::NotificationSender;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const NEW_RENTALS_BANNER: &str = "new rentals created:";
pub const OVERDUE_RENTALS_BANNER: &str = "overdue rentals:";
pub const SUCCESSFUL_PAYMENTS_BANNER: &str = "successful payments:";

/// Prefixes workflow events with their banner and hands them to the sender,
/// always addressed to the configured admin chat.
pub struct NotificationService {
    sender: Arc<dyn NotificationSender>,
    admin_chat_id: String,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn NotificationSender>, admin_chat_id: String) -> Self {
        Self {
            sender,
            admin_chat_id,
        }
    }

    pub async fn notify_new_rentals_created(&self, message: &str) {
        self.notify(NEW_RENTALS_BANNER, message).await;
    }

    pub async fn notify_overdue_rentals(&self, message: &str) {
        self.notify(OVERDUE_RENTALS_BANNER, message).await;
    }

    pub async fn notify_successful_payments(&self, message: &str) {
        self.notify(SUCCESSFUL_PAYMENTS_BANNER, message).await;
    }

    #[instrument(skip(self, message), fields(chat_id = %self.admin_chat_id))]
    async fn notify(&self, banner: &str, message: &str) {
        debug!("Dispatching admin notification");
        let text = format!("{}\n{}", banner, message);
        self.sender.send(&self.admin_chat_id, &text).await;
    }
}
