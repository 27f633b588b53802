//! Tunnel interface controller for Roam VPN
//!
//! This crate opens and tears down the virtual network interface behind a
//! connection and tracks its lifecycle:
//!
//! ```text
//! Idle ──▶ RequestingPermission ──▶ Establishing ──▶ Running ──▶ Idle
//!   ▲               │                     │
//!   └───────────────┴─────────────────────┘  (any failure)
//! ```
//!
//! The platform pieces live behind traits so hosts can plug in their
//! own: [`PermissionGate`] answers whether tunneling permission is
//! already granted (this layer never prompts), [`InterfaceFactory`]
//! opens the interface itself, and [`StatusNotifier`] drives the
//! persistent user-visible status surface.
//!
//! The interface carries fixed parameters (one local address, two DNS
//! resolvers, a fixed MTU, catch-all IPv4/IPv6 routes) and the built-in
//! [`LoopbackFactory`] opens a loopback-style handle that moves no
//! packets. No protocol session is negotiated here, and nothing in the
//! active configuration beyond its display name is read.

pub mod controller;
pub mod device;
pub mod error;
pub mod notify;
pub mod params;
pub mod permission;

pub use controller::{ControllerState, TunnelController};
pub use device::{InterfaceFactory, InterfaceHandle, LoopbackFactory};
pub use error::{Error, Result};
pub use notify::{LogNotifier, StatusNotifier};
pub use params::TunnelParams;
pub use permission::{FixedGate, PermissionGate, PermissionStatus};

/// MTU assigned to the tunnel interface
pub const TUNNEL_MTU: u16 = 1420;

/// Interface name used for the stub device
pub const TUNNEL_IF_NAME: &str = "roam0";
