//! Background task surfacing toast notifications in the server log

use crate::notify::{Notification, NotificationService, Severity};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Spawn a task that logs every dispatched toast
pub fn start_notification_logging(notifications: &NotificationService) {
    let mut rx = notifications.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => log_notification(&notification),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Notification logger skipped {} toasts", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Notification logger stopped");
    });

    info!("Notification logging started");
}

fn log_notification(notification: &Notification) {
    let ms = notification.duration.as_millis() as u64;
    match notification.severity {
        Severity::Error => error!(toast = %notification.id, duration_ms = ms, "{}", notification.message),
        Severity::Warning => warn!(toast = %notification.id, duration_ms = ms, "{}", notification.message),
        Severity::Success | Severity::Info => {
            info!(toast = %notification.id, duration_ms = ms, "{}", notification.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logger_keeps_channel_open() {
        let notifications = NotificationService::default();
        start_notification_logging(&notifications);
        let mut rx = notifications.subscribe();

        notifications.warning("Session about to expire");
        let received = rx.recv().await.unwrap();
        assert_eq!(received.severity, Severity::Warning);
    }
}
