//! # dhcp-discover - Find the DHCP servers on a network segment
//!
//! dhcp-discover broadcasts a DHCPDISCOVER from a chosen interface and reports
//! every server that answers with a DHCPOFFER. It is a diagnostic tool: it
//! never requests or accepts a lease.
//!
//! ## Features
//!
//! - Fixed-layout DISCOVER packets, bounds-checked OFFER validation
//! - Several attempts per run to ride out packet loss, servers deduplicated
//! - Asynchronous I/O using Tokio, one attempt at a time
//! - Interface listing and selection by name or number
//!
//! ## Example
//!
//! ```rust,no_run
//! use dhcp_discover::{DiscoveryClient, DiscoveryConfig};
//! use bytes::Bytes;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mac_addr = Bytes::from_static(&[0x00, 0x0c, 0x29, 0xa8, 0x92, 0xf4]);
//!     let config = DiscoveryConfig::new("eth0".to_string(), mac_addr);
//!     let report = DiscoveryClient::new(config).run().await;
//!     for server in report.servers.sorted() {
//!         println!("DHCP server: {}", server);
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod v4;

pub use client::{AttemptReport, DiscoveryClient, DiscoveryReport};
pub use config::{Args, DiscoveryConfig};
pub use error::DiscoverError;
pub use network::Transport;
pub use v4::ServerSet;
