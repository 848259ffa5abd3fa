use crate::alert::domain::notification_sink::NotificationSink;

/// Notification sink that writes to the log. Stands in for OS notification
/// delivery, which is an external collaborator.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, title: &str, body: &str) {
        log::info!("notification: {title}: {body}");
    }
}
