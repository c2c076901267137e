//! Forced logout hook.

/// Notified when the session is torn down because a refresh failed.
///
/// Fired once per failed refresh exchange, never once per waiting request.
/// Whoever owns navigation or UI state implements this to route the user
/// back to an unauthenticated view.
pub trait LogoutSignal: Send + Sync {
    fn session_ended(&self);
}

impl<F> LogoutSignal for F
where
    F: Fn() + Send + Sync,
{
    fn session_ended(&self) {
        self()
    }
}

/// A [`LogoutSignal`] that ignores the notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogout;

impl LogoutSignal for NoopLogout {
    fn session_ended(&self) {}
}
