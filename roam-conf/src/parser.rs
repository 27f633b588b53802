//! Line scanner for WireGuard-style configuration text

use crate::model::{InterfaceSection, PeerSection, TunnelConfig};
use crate::Result;

/// Section the scanner is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before any section header
    None,
    /// Inside an `[Interface]` section
    Interface,
    /// Inside a `[Peer]` section
    Peer,
}

/// Parse configuration text into a [`TunnelConfig`] record
///
/// The text is scanned line by line with a current-section marker. A line
/// beginning with `[Interface]` or `[Peer]` switches the section; every
/// `[Peer]` header increments the peer count whether or not the section
/// carries any fields. Recognized keys are matched by exact literal
/// prefix (case-sensitive, `Key = ` with single spaces) and assigned only
/// while the section that owns them is current:
///
/// - `PrivateKey`, `Address`, `DNS` under `[Interface]`
/// - `PublicKey`, `Endpoint`, `AllowedIPs`, `PersistentKeepalive` under `[Peer]`
///
/// Everything else is ignored. The scan accepts any input and always
/// produces a record; empty or unrecognizable text yields empty fields
/// and a peer count of zero. The fallible signature exists so stored
/// text can be re-parsed through the same seam once stricter checking is
/// layered in, without changing every caller.
pub fn parse(name: &str, raw: &str) -> Result<TunnelConfig> {
    let mut section = Section::None;
    let mut interface = InterfaceSection::default();
    let mut peer = PeerSection::default();
    let mut endpoint = String::new();
    let mut peer_count = 0usize;

    for line in raw.lines() {
        if line.starts_with("[Interface]") {
            section = Section::Interface;
            continue;
        }
        if line.starts_with("[Peer]") {
            section = Section::Peer;
            peer_count += 1;
            continue;
        }

        match section {
            Section::None => {}
            Section::Interface => {
                if let Some(value) = line.strip_prefix("PrivateKey = ") {
                    interface.private_key = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("Address = ") {
                    interface.address = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("DNS = ") {
                    interface.dns = value.trim().to_string();
                }
            }
            Section::Peer => {
                if let Some(value) = line.strip_prefix("PublicKey = ") {
                    peer.public_key = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("Endpoint = ") {
                    peer.endpoint = value.trim().to_string();
                    if endpoint.is_empty() {
                        endpoint = peer.endpoint.clone();
                    }
                } else if let Some(value) = line.strip_prefix("AllowedIPs = ") {
                    peer.allowed_ips = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("PersistentKeepalive = ") {
                    peer.keepalive = value.trim().to_string();
                }
            }
        }
    }

    Ok(TunnelConfig {
        name: name.to_string(),
        raw: raw.to_string(),
        interface,
        peer,
        endpoint,
        peer_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "\
[Interface]
PrivateKey = aW50ZXJmYWNlLWtleQ==
Address = 10.0.0.2/24
DNS = 8.8.8.8

[Peer]
PublicKey = cGVlci1rZXk=
Endpoint = host:51820
AllowedIPs = 0.0.0.0/0
PersistentKeepalive = 25
";

    #[test]
    fn test_parse_full_config() {
        let config = parse("work", FULL).unwrap();

        assert_eq!(config.name, "work");
        assert_eq!(config.raw, FULL);
        assert_eq!(config.peer_count, 1);
        assert_eq!(config.endpoint, "host:51820");
        assert_eq!(config.interface.private_key, "aW50ZXJmYWNlLWtleQ==");
        assert_eq!(config.interface.address, "10.0.0.2/24");
        assert_eq!(config.interface.dns, "8.8.8.8");
        assert_eq!(config.peer.public_key, "cGVlci1rZXk=");
        assert_eq!(config.peer.endpoint, "host:51820");
        assert_eq!(config.peer.allowed_ips, "0.0.0.0/0");
        assert_eq!(config.peer.keepalive, "25");
        assert!(config.has_directives());
    }

    #[test]
    fn test_parse_empty_text_succeeds() {
        let config = parse("empty", "").unwrap();

        assert_eq!(config.peer_count, 0);
        assert_eq!(config.endpoint, "");
        assert_eq!(config.interface, InterfaceSection::default());
        assert!(config.peer.is_empty());
        assert!(!config.has_directives());
    }

    #[test]
    fn test_parse_garbage_text_succeeds() {
        let config = parse("noise", "this is not a config\nEndpoint: wrong separator\n").unwrap();

        assert_eq!(config.peer_count, 0);
        assert!(!config.has_directives());
    }

    #[test]
    fn test_multiple_peers_count_and_overwrite() {
        let raw = "\
[Peer]
PublicKey = first
Endpoint = first.example.com:51820

[Peer]
PublicKey = second
Endpoint = second.example.com:51820
AllowedIPs = 10.0.0.0/8
";
        let config = parse("multi", raw).unwrap();

        // Every [Peer] header counts; field values come from the last section.
        assert_eq!(config.peer_count, 2);
        assert_eq!(config.peer.public_key, "second");
        assert_eq!(config.peer.endpoint, "second.example.com:51820");
        assert_eq!(config.peer.allowed_ips, "10.0.0.0/8");
        // The summary endpoint keeps the first one seen.
        assert_eq!(config.endpoint, "first.example.com:51820");
    }

    #[test]
    fn test_peer_header_without_fields_still_counts() {
        let config = parse("bare", "[Peer]\n[Peer]\n[Peer]\n").unwrap();

        assert_eq!(config.peer_count, 3);
        assert!(config.peer.is_empty());
    }

    #[test]
    fn test_keys_outside_owning_section_are_ignored() {
        let raw = "\
PrivateKey = before-any-section
[Interface]
Endpoint = wrong.section:51820
[Peer]
Address = 10.9.9.9/32
PrivateKey = wrong-section-key
";
        let config = parse("misplaced", raw).unwrap();

        assert_eq!(config.interface.private_key, "");
        assert_eq!(config.interface.address, "");
        assert_eq!(config.peer.endpoint, "");
        assert_eq!(config.endpoint, "");
    }

    #[test]
    fn test_comments_and_unknown_keys_are_ignored() {
        let raw = "\
[Interface]
# PrivateKey = commented-out
Address = 192.168.4.2/32
MTU = 1280
[Peer]
Endpoint = host:51820
PresharedKey = not-a-recognized-key
";
        let config = parse("comments", raw).unwrap();

        assert_eq!(config.interface.private_key, "");
        assert_eq!(config.interface.address, "192.168.4.2/32");
        assert_eq!(config.peer.endpoint, "host:51820");
    }

    #[test]
    fn test_key_matching_is_case_sensitive_and_spacing_exact() {
        let raw = "\
[Peer]
endpoint = lowercase.example.com:51820
Endpoint=no-spaces.example.com:51820
Endpoint = ok.example.com:51820
";
        let config = parse("strict", raw).unwrap();

        assert_eq!(config.peer.endpoint, "ok.example.com:51820");
        assert_eq!(config.endpoint, "ok.example.com:51820");
    }

    #[test]
    fn test_value_whitespace_is_trimmed() {
        let config = parse("pad", "[Peer]\nEndpoint =   host:51820  \n").unwrap();
        assert_eq!(config.peer.endpoint, "host:51820");
    }
}
