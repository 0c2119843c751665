//! Connection state machine.
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: connect requested
//! Connecting   → Connected:  driver acknowledged the connection
//! Connecting   → Erroring:   driver reported a failure
//! Connected    → Closed:     graceful shutdown
//! Erroring / Closed → Connecting: a new connect request
//! ```

/// Lifecycle state of the document store connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection has been attempted.
    #[default]
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// The driver reported a live connection.
    Connected,
    /// The last connect attempt failed.
    Erroring,
    /// The connection was closed deliberately.
    Closed,
}

impl ConnectionState {
    /// Whether a new connect attempt may start from this state.
    pub fn accepts_connect(self) -> bool {
        matches!(
            self,
            ConnectionState::Disconnected | ConnectionState::Erroring | ConnectionState::Closed
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Erroring => "erroring",
            ConnectionState::Closed => "closed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn only_idle_states_accept_connect() {
        assert!(ConnectionState::Disconnected.accepts_connect());
        assert!(ConnectionState::Erroring.accepts_connect());
        assert!(ConnectionState::Closed.accepts_connect());
        assert!(!ConnectionState::Connecting.accepts_connect());
        assert!(!ConnectionState::Connected.accepts_connect());
    }
}
