use async_trait::async_trait;

/// Outbound channel for admin notifications.
///
/// Delivery is fire-and-forget: implementations log their own failures and
/// never report them to the caller.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str);
}
