/// Domain interface for user notifications. Fire-and-forget: delivery and
/// rate limiting are the implementation's concern, and callers rely on no
/// return contract.
pub trait NotificationSink: Send {
    fn notify(&mut self, title: &str, body: &str);
}
