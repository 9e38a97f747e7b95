//! User-facing notification sink.
//!
//! Operations report success through a [`Notifier`] injected into the store.
//! The page layer typically shows these as toasts; the runner binary logs
//! them.

/// Fire-and-forget success notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn success(&self, message: &str) {
        (**self).success(message);
    }
}

/// Emits each notification as an `info` tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "knowledge_file::notify", message = %message, "success");
    }
}
