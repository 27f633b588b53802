//! Persistent status notification surface

use tracing::info;

/// User-visible connection status surface
///
/// While the tunnel runs, a persistent status stays visible; stopping
/// clears it. Platform notification systems implement this trait.
pub trait StatusNotifier: Send + Sync {
    /// Show (or replace) the persistent status text
    fn show(&self, status: &str);

    /// Clear the persistent status
    fn clear(&self);
}

/// Notifier that writes status changes to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl StatusNotifier for LogNotifier {
    fn show(&self, status: &str) {
        info!(status, "tunnel status");
    }

    fn clear(&self) {
        info!("tunnel status cleared");
    }
}
