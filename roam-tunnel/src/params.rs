//! Tunnel interface parameters

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::error::{Error, Result};
use crate::TUNNEL_MTU;

/// Parameters the interface is opened with
///
/// These are fixed for every connection: the controller intentionally
/// does not derive them from the active configuration's interface or
/// peer fields. Only `session` varies, carrying the configuration name
/// for display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelParams {
    /// Session display name shown in the status surface
    pub session: String,
    /// Local interface address
    pub address: Ipv4Addr,
    /// Network prefix length for the local address
    pub prefix_len: u8,
    /// DNS resolvers pushed to the interface
    pub dns: Vec<IpAddr>,
    /// Maximum transmission unit
    pub mtu: u16,
    /// Routes directed through the interface
    pub routes: Vec<IpNet>,
}

impl TunnelParams {
    /// Standard parameters for a session with the given display name
    ///
    /// One local client address, two public resolvers, and catch-all
    /// routes for both address families.
    pub fn for_session(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            address: Ipv4Addr::new(10, 0, 0, 2),
            prefix_len: 24,
            dns: vec![
                IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
                IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
            ],
            mtu: TUNNEL_MTU,
            routes: vec![
                IpNet::V4(Ipv4Net::new(Ipv4Addr::UNSPECIFIED, 0).expect("/0 is a valid prefix")),
                IpNet::V6(Ipv6Net::new(Ipv6Addr::UNSPECIFIED, 0).expect("/0 is a valid prefix")),
            ],
        }
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        if self.session.is_empty() {
            return Err(Error::Params("session name must not be empty".into()));
        }

        if self.prefix_len > 32 {
            return Err(Error::Params(format!(
                "IPv4 prefix length {} is invalid (max 32)",
                self.prefix_len
            )));
        }

        if self.mtu < 576 {
            return Err(Error::Params(format!(
                "MTU {} is too small (minimum 576)",
                self.mtu
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_params_are_fixed() {
        let params = TunnelParams::for_session("work");

        assert_eq!(params.session, "work");
        assert_eq!(params.address, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(params.prefix_len, 24);
        assert_eq!(params.dns.len(), 2);
        assert_eq!(params.mtu, TUNNEL_MTU);
        // Both catch-all routes are present.
        assert_eq!(params.routes.len(), 2);
        assert!(params.routes.iter().all(|net| net.prefix_len() == 0));
        params.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_session() {
        let params = TunnelParams::for_session("");
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_small_mtu() {
        let mut params = TunnelParams::for_session("work");
        params.mtu = 100;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        let mut params = TunnelParams::for_session("work");
        params.prefix_len = 40;
        assert!(params.validate().is_err());
    }
}
