//! Connection state and application events

use roam_conf::TunnelConfig;

/// Connection link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection and none in progress
    Disconnected,
    /// A connection attempt is in flight
    Connecting,
    /// The tunnel interface is up
    Connected,
}

impl Default for LinkState {
    fn default() -> Self {
        LinkState::Disconnected
    }
}

impl LinkState {
    /// Check if the link is fully connected
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }

    /// Check if a connection attempt is in flight
    pub fn is_connecting(&self) -> bool {
        matches!(self, LinkState::Connecting)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            LinkState::Disconnected => "Disconnected",
            LinkState::Connecting => "Connecting...",
            LinkState::Connected => "Connected",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Snapshot of the application's connection state
///
/// Lives for the process only; nothing here is persisted. Observers
/// receive a fresh snapshot with every
/// [`AppEvent::StateChanged`](crate::AppEvent).
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    /// Current link state
    pub link: LinkState,
    /// Record of the configuration in use (or restored at startup)
    pub active: Option<TunnelConfig>,
    /// Message from the last failure, until cleared explicitly
    pub error: Option<String>,
    /// Cumulative bytes received; the loopback interface moves no
    /// traffic, so this stays at zero
    pub bytes_rx: u64,
    /// Cumulative bytes sent; same caveat as `bytes_rx`
    pub bytes_tx: u64,
}

impl ConnectionState {
    /// Name of the active configuration, if any
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|config| config.name.as_str())
    }
}

/// Events broadcast to front-end observers
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The connection state changed; the new snapshot is attached
    StateChanged(ConnectionState),
    /// The set of stored configurations changed; re-list to refresh
    ConfigsChanged,
}
