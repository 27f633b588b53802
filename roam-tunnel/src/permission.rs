//! Platform tunneling permission

use crate::error::{Error, Result};

/// Whether the platform has granted tunneling permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Permission was granted earlier and is still in effect
    Granted,
    /// Permission is missing or was revoked
    Denied,
}

/// Answers whether tunneling permission is already granted
///
/// Granting is an interactive platform flow owned by the host
/// application; the controller only ever asks for the current answer and
/// aborts the start when it is [`PermissionStatus::Denied`].
pub trait PermissionGate: Send + Sync {
    /// Current permission status
    fn status(&self) -> Result<PermissionStatus>;
}

/// Gate with a fixed answer
///
/// Hosts without a real platform gate configure one of these; tests use
/// both answers.
#[derive(Debug, Clone, Copy)]
pub struct FixedGate {
    granted: bool,
}

impl FixedGate {
    /// A gate that always reports granted permission
    pub fn granted() -> Self {
        Self { granted: true }
    }

    /// A gate that always reports denied permission
    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl PermissionGate for FixedGate {
    fn status(&self) -> Result<PermissionStatus> {
        if self.granted {
            Ok(PermissionStatus::Granted)
        } else {
            Ok(PermissionStatus::Denied)
        }
    }
}

impl From<bool> for FixedGate {
    fn from(granted: bool) -> Self {
        Self { granted }
    }
}

/// Convenience conversion used at start: denied becomes an error
pub(crate) fn require_granted(status: PermissionStatus) -> Result<()> {
    match status {
        PermissionStatus::Granted => Ok(()),
        PermissionStatus::Denied => Err(Error::PermissionDenied(
            "permission must be granted before starting the tunnel".into(),
        )),
    }
}
