//! DHCPv4 discovery implementation
//!
//! This module contains the DHCPv4-specific pieces of a discovery run:
//! - DISCOVER construction and OFFER validation
//! - The per-attempt broadcast/listen session

pub mod message;
pub mod session;

pub use message::{build_dhcp_discover, validate_offer, DiscoverRequest, Rejection};
pub use session::{DiscoverySession, ServerSet};

#[cfg(test)]
mod tests;
