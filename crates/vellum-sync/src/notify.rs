//! Change notification hook.

/// Invoked by the engine after every successful install.
///
/// The engine carries no payload beyond the success signal and has no
/// knowledge of how the host consumes it (typically a view refresh). The
/// call arrives on whatever context completed the install, never necessarily
/// the context that triggered the sync.
pub trait ChangeNotifier: Send + Sync {
    fn content_updated(&self);
}

/// Notifier that ignores the signal, for hosts that poll the store instead.
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn content_updated(&self) {}
}
