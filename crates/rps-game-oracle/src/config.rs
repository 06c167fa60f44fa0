//! Startup configuration read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Where the oracle listens
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND,
            port: DEFAULT_PORT,
        }
    }
}

impl OracleConfig {
    /// Read `BIND_ADDR` and `PORT`; unparsable values fall back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr),
            port: parse_or(&lookup, "PORT", defaults.port),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "ignoring unparsable setting");
            default
        }),
    }
}
