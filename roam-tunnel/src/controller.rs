//! Tunnel lifecycle controller

use std::sync::Arc;

use tracing::{info, warn};

use crate::device::{InterfaceFactory, InterfaceHandle};
use crate::error::{Error, Result};
use crate::notify::StatusNotifier;
use crate::params::TunnelParams;
use crate::permission::{require_granted, PermissionGate};

/// Lifecycle state of the tunnel interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No interface open
    Idle,
    /// Checking platform tunneling permission
    RequestingPermission,
    /// Opening the interface
    Establishing,
    /// Interface open, status notification visible
    Running,
}

impl ControllerState {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ControllerState::Idle => "Idle",
            ControllerState::RequestingPermission => "Requesting permission",
            ControllerState::Establishing => "Establishing",
            ControllerState::Running => "Running",
        }
    }
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Opens and tears down the tunnel interface
///
/// A start request walks Idle → RequestingPermission → Establishing →
/// Running; a failure at either intermediate step drops straight back to
/// Idle and returns the error to the caller. Running ends only on an
/// explicit [`TunnelController::stop`] or when the controller is
/// dropped.
pub struct TunnelController {
    gate: Arc<dyn PermissionGate>,
    factory: Arc<dyn InterfaceFactory>,
    notifier: Arc<dyn StatusNotifier>,
    state: ControllerState,
    handle: Option<Box<dyn InterfaceHandle>>,
}

impl TunnelController {
    /// Create a controller over the given platform seams
    pub fn new(
        gate: Arc<dyn PermissionGate>,
        factory: Arc<dyn InterfaceFactory>,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        Self {
            gate,
            factory,
            notifier,
            state: ControllerState::Idle,
            handle: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// True while an interface is open
    pub fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }

    /// Name of the open interface, if running
    pub fn interface_name(&self) -> Option<&str> {
        self.handle.as_deref().map(InterfaceHandle::name)
    }

    /// Open the tunnel interface with `params`
    ///
    /// Verifies permission, opens the interface, and raises the status
    /// notification. On any failure the controller is back at Idle when
    /// this returns.
    pub fn start(&mut self, params: &TunnelParams) -> Result<()> {
        if self.state == ControllerState::Running {
            return Err(Error::AlreadyRunning);
        }

        self.state = ControllerState::RequestingPermission;
        let status = self.gate.status().and_then(require_granted);
        if let Err(e) = status {
            warn!(error = %e, "tunnel start aborted at permission check");
            self.state = ControllerState::Idle;
            return Err(e);
        }

        self.state = ControllerState::Establishing;
        match self.factory.open(params) {
            Ok(handle) => {
                info!(
                    interface = handle.name(),
                    session = %params.session,
                    "tunnel interface established"
                );
                self.handle = Some(handle);
            }
            Err(e) => {
                warn!(error = %e, "tunnel establish failed");
                self.state = ControllerState::Idle;
                return Err(match e {
                    Error::PermissionDenied(_) | Error::Establish(_) => e,
                    other => Error::Establish(other.to_string()),
                });
            }
        }

        self.notifier.show(&format!("Connected to {}", params.session));
        self.state = ControllerState::Running;
        Ok(())
    }

    /// Tear down the interface and clear the status notification
    ///
    /// A stop while Idle is a no-op.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!(interface = handle.name(), "tunnel interface closed");
            drop(handle);
        }

        if self.state != ControllerState::Idle {
            self.notifier.clear();
            self.state = ControllerState::Idle;
        }
    }
}

impl Drop for TunnelController {
    fn drop(&mut self) {
        self.stop();
    }
}
