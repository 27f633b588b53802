//! Virtual interface abstraction
//!
//! The controller opens interfaces through an [`InterfaceFactory`] so the
//! platform device layer stays pluggable. The built-in
//! [`LoopbackFactory`] produces a loopback-style handle: it accepts the
//! parameters, reports a device name and MTU, and moves no packets.

use tracing::debug;

use crate::error::Result;
use crate::params::TunnelParams;
use crate::TUNNEL_IF_NAME;

/// An open tunnel interface
///
/// Dropping the handle tears the interface down.
pub trait InterfaceHandle: Send {
    /// Interface name as known to the platform
    fn name(&self) -> &str;

    /// MTU the interface was configured with
    fn mtu(&self) -> u16;
}

/// Opens tunnel interfaces from parameters
pub trait InterfaceFactory: Send + Sync {
    /// Open an interface configured with `params`
    ///
    /// Blocks the calling task until the platform call returns; there is
    /// no timeout at this layer.
    fn open(&self, params: &TunnelParams) -> Result<Box<dyn InterfaceHandle>>;
}

/// The built-in loopback-style interface
#[derive(Debug)]
pub struct LoopbackInterface {
    name: String,
    mtu: u16,
}

impl InterfaceHandle for LoopbackInterface {
    fn name(&self) -> &str {
        &self.name
    }

    fn mtu(&self) -> u16 {
        self.mtu
    }
}

impl Drop for LoopbackInterface {
    fn drop(&mut self) {
        debug!(name = %self.name, "closing tunnel interface");
    }
}

/// Factory for [`LoopbackInterface`] handles
#[derive(Debug, Clone, Default)]
pub struct LoopbackFactory;

impl InterfaceFactory for LoopbackFactory {
    fn open(&self, params: &TunnelParams) -> Result<Box<dyn InterfaceHandle>> {
        params.validate()?;

        debug!(
            address = %params.address,
            prefix_len = params.prefix_len,
            mtu = params.mtu,
            routes = params.routes.len(),
            "opening loopback tunnel interface"
        );

        Ok(Box::new(LoopbackInterface {
            name: TUNNEL_IF_NAME.to_string(),
            mtu: params.mtu,
        }))
    }
}
