//! Process-wide signals.
//!
//! The API client produces [`Signal::AuthFailed`]; session callers produce
//! [`Signal::LoginSucceeded`] and [`Signal::LoggedOut`]. Consumers (navigation,
//! feed reload) hold a receiver from [`SignalBus::subscribe`].

use tokio::sync::broadcast;

const SIGNAL_CAPACITY: usize = 32;

/// Message carried by the auth-failed signal.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The server rejected the session; it has already been cleared.
    AuthFailed { message: String },
    LoginSucceeded,
    LoggedOut,
}

impl Signal {
    pub fn auth_failed() -> Self {
        Self::AuthFailed {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
        }
    }
}

/// Broadcast bus for [`Signal`]s. Cloning yields a handle to the same bus.
#[derive(Debug, Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<Signal>,
}

impl SignalBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    /// Delivers `signal` to every current subscriber.
    ///
    /// Returns the number of subscribers reached; emitting with nobody
    /// listening is not an error.
    pub fn emit(&self, signal: Signal) -> usize {
        tracing::debug!(?signal, "signal emitted");
        self.tx.send(signal).unwrap_or(0)
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let bus = SignalBus::new();
        assert_eq!(bus.emit(Signal::LoggedOut), 0);
    }

    #[test]
    fn test_every_subscriber_receives_signal() {
        let bus = SignalBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        assert_eq!(bus.emit(Signal::auth_failed()), 2);

        let expected = Signal::AuthFailed {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
        };
        assert_eq!(first.try_recv().unwrap(), expected);
        assert_eq!(second.try_recv().unwrap(), expected);
        assert!(matches!(first.try_recv(), Err(TryRecvError::Empty)));
    }
}
