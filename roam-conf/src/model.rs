//! Configuration record types

use serde::{Deserialize, Serialize};

/// Settings taken from the `[Interface]` section of a configuration
///
/// All fields are opaque strings exactly as they appeared in the source
/// text. Key material is never decoded and addresses are never checked
/// for syntax; the record exists for storage and display, not for
/// negotiating a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSection {
    /// Local private key, base64 as written in the source text
    pub private_key: String,
    /// Local tunnel address (usually CIDR notation)
    pub address: String,
    /// DNS resolver list as a single string
    pub dns: String,
}

/// Settings accumulated from `[Peer]` sections of a configuration
///
/// A configuration may contain several `[Peer]` sections; their fields
/// all land here, later sections overwriting earlier ones. Only the
/// section count survives per peer (see [`TunnelConfig::peer_count`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSection {
    /// Remote public key
    pub public_key: String,
    /// Remote endpoint, `host:port`
    pub endpoint: String,
    /// Allowed IP ranges as a single string
    pub allowed_ips: String,
    /// Keepalive interval in seconds, as written
    pub keepalive: String,
}

impl PeerSection {
    /// True if no field of this section was ever assigned
    pub fn is_empty(&self) -> bool {
        self.public_key.is_empty()
            && self.endpoint.is_empty()
            && self.allowed_ips.is_empty()
            && self.keepalive.is_empty()
    }
}

/// A named tunnel configuration record
///
/// Records are produced by [`crate::parse`] from user-supplied text and
/// are immutable once built; editing a configuration means re-parsing
/// the new text and saving the resulting record under the same name.
/// The original text is retained verbatim so it can be shown and edited
/// round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Unique human-chosen name, the record's identity in the store
    pub name: String,
    /// Original configuration text, unmodified
    pub raw: String,
    /// Fields collected from the `[Interface]` section
    pub interface: InterfaceSection,
    /// Fields collected from `[Peer]` sections (flat, last writer wins)
    pub peer: PeerSection,
    /// First peer endpoint encountered, for list display
    pub endpoint: String,
    /// Number of `[Peer]` section headers in the text, complete or not
    pub peer_count: usize,
}

impl TunnelConfig {
    /// Endpoint string for display, or a placeholder when absent
    pub fn display_endpoint(&self) -> &str {
        if self.endpoint.is_empty() {
            "(no endpoint)"
        } else {
            &self.endpoint
        }
    }

    /// True if parsing recognized at least one directive
    ///
    /// The parser never fails, so this is how a consumer distinguishes a
    /// minimal valid configuration from text with nothing usable in it.
    pub fn has_directives(&self) -> bool {
        self.peer_count > 0
            || !self.peer.is_empty()
            || self.interface != InterfaceSection::default()
    }
}
