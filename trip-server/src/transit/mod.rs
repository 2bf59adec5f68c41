//! Transit routing engine client.
//!
//! The engine speaks two protocol generations: a legacy query-string
//! protocol ([`v1`]) and a structured one ([`v2`]). [`TransitRoutingClient`]
//! hides the difference and translates the engine's statuses into
//! [`RoutingError`]s.

mod client;
mod transport;
mod types;
pub mod v1;
pub mod v2;

use async_trait::async_trait;

use crate::domain::{HostPort, TransitPath, TransitRouteQuery};
use crate::error::RoutingError;

pub use client::{InvalidProtocol, Protocol, TransitClientConfig, TransitRoutingClient};
pub use transport::{ApiCall, ChannelError, TransitChannel};
pub use types::{AccessibleNode, SummaryLine, SummaryResponse, SummaryResult};

/// Computes transit itineraries.
///
/// Failures are always domain errors, so callers can report them as-is.
#[async_trait]
pub trait TransitRouter: Send + Sync {
    async fn route(
        &self,
        query: &TransitRouteQuery,
        host_port: Option<&HostPort>,
    ) -> Result<Vec<TransitPath>, RoutingError>;
}
