//! Tunnel configuration model and parser for Roam VPN
//!
//! This crate defines the named configuration record used throughout the
//! application and the parser that derives it from WireGuard-style
//! configuration text.
//!
//! # Text Format
//!
//! The accepted format is INI-like, case-sensitive `Key = Value` lines
//! grouped under `[Interface]` and `[Peer]` headers:
//!
//! ```text
//! [Interface]
//! PrivateKey = cGxhY2Vob2xkZXIta2V5LW1hdGVyaWFsCg==
//! Address = 10.0.0.2/24
//! DNS = 8.8.8.8
//!
//! [Peer]
//! PublicKey = c2VydmVyLXB1YmxpYy1rZXkK
//! Endpoint = vpn.example.com:51820
//! AllowedIPs = 0.0.0.0/0
//! PersistentKeepalive = 25
//! ```
//!
//! Parsing is deliberately permissive: unrecognized lines, comments, and
//! blank lines are ignored, and field values are carried as opaque strings
//! without key-material or address validation. See [`parse`] for the exact
//! rules. Use [`TunnelConfig::has_directives`] to tell a minimal valid
//! record apart from text that contained nothing recognizable.

pub mod error;
pub mod model;
pub mod parser;

pub use error::{Error, Result};
pub use model::{InterfaceSection, PeerSection, TunnelConfig};
pub use parser::parse;
