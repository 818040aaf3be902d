/// Fire-and-forget hook invoked after the service writes to disk.
pub trait NotificationPort: Send + Sync {
    /// Signals that `subject` changed. Must not block and must not fail.
    fn notify(&self, subject: &str);
}
