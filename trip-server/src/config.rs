//! Server configuration.
//!
//! Everything has a default; environment variables override:
//!
//! | Variable                | Meaning                              |
//! |-------------------------|--------------------------------------|
//! | `TRIP_SERVER_ADDR`      | Listen address                       |
//! | `TR_ROUTING_URL`        | Transit engine base URL              |
//! | `TR_ROUTING_PROTOCOL`   | Transit protocol, `v1` or `v2`       |
//! | `OSRM_URL`              | OSRM base URL                        |
//! | `WALKING_SEGMENT_COLOR` | Color of walking segments in GeoJSON |

use std::net::SocketAddr;

use crate::osrm::OsrmConfig;
use crate::result::DEFAULT_WALKING_COLOR;
use crate::transit::{InvalidProtocol, Protocol, TransitClientConfig};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Error loading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Listen address does not parse
    #[error("invalid listen address {value:?}: {source}")]
    InvalidAddress {
        value: String,
        source: std::net::AddrParseError,
    },

    /// Unknown transit protocol
    #[error(transparent)]
    InvalidProtocol(#[from] InvalidProtocol),
}

/// Configuration for the whole server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// Transit engine client settings
    pub transit: TransitClientConfig,
    /// OSRM client settings
    pub osrm: OsrmConfig,
    /// Color given to walking segments
    pub walking_color: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            transit: TransitClientConfig::default(),
            osrm: OsrmConfig::default(),
            walking_color: DEFAULT_WALKING_COLOR.to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("TRIP_SERVER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddress {
                value: addr.clone(),
                source,
            })?;

        let mut transit = match lookup("TR_ROUTING_URL") {
            Some(url) => TransitClientConfig::new(url),
            None => TransitClientConfig::default(),
        };
        if let Some(protocol) = lookup("TR_ROUTING_PROTOCOL") {
            transit = transit.with_protocol(protocol.parse::<Protocol>()?);
        }

        let osrm = match lookup("OSRM_URL") {
            Some(url) => OsrmConfig::new(url),
            None => OsrmConfig::default(),
        };

        Ok(Self {
            addr,
            transit,
            osrm,
            walking_color: lookup("WALKING_SEGMENT_COLOR")
                .unwrap_or_else(|| DEFAULT_WALKING_COLOR.to_string()),
        })
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_transit(mut self, transit: TransitClientConfig) -> Self {
        self.transit = transit;
        self
    }

    pub fn with_osrm(mut self, osrm: OsrmConfig) -> Self {
        self.osrm = osrm;
        self
    }

    pub fn with_walking_color(mut self, color: impl Into<String>) -> Self {
        self.walking_color = color.into();
        self
    }
}
