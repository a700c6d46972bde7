//! DHCP discovery run
//!
//! This module drives a complete discovery run:
//! - One transaction id for all attempts
//! - Sequential broadcast/listen attempts, each with its own socket
//! - Accumulation of the responding servers

use crate::{
    config::DiscoveryConfig,
    error::DiscoverError,
    network::{self, Transport},
    v4::{DiscoverRequest, DiscoverySession, ServerSet},
};
use tokio::time;

/// Outcome of a single attempt, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Servers first seen during this attempt.
    pub discovered: usize,
    /// Set when the attempt was cut short by a socket or send failure.
    pub error: Option<String>,
}

impl AttemptReport {
    fn completed(attempt: u32, discovered: usize) -> Self {
        Self {
            attempt,
            discovered,
            error: None,
        }
    }

    fn failed(attempt: u32, error: impl ToString) -> Self {
        Self {
            attempt,
            discovered: 0,
            error: Some(error.to_string()),
        }
    }
}

/// Result of a whole run. An empty server set is a normal outcome.
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub xid: u32,
    pub servers: ServerSet,
    pub attempts: Vec<AttemptReport>,
}

pub struct DiscoveryClient {
    config: DiscoveryConfig,
}

impl DiscoveryClient {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Runs discovery over UDP sockets bound to the configured interface.
    pub async fn run(&self) -> DiscoveryReport {
        let interface = self.config.interface.as_str();
        let port = self.config.client_port;
        self.run_with(|| {
            network::new_tokio_socket_bound_to_device(interface, port).map_err(DiscoverError::from)
        })
        .await
    }

    /// Runs discovery, calling `open` for a fresh transport at the start of
    /// every attempt. The transport is dropped when its attempt ends.
    pub async fn run_with<T, F>(&self, mut open: F) -> DiscoveryReport
    where
        T: Transport,
        F: FnMut() -> Result<T, DiscoverError>,
    {
        let retries = self.config.retries;
        let listen = self.config.attempt_timeout();
        let target = self.config.broadcast_target();
        let request = DiscoverRequest::new(self.config.mac_address.clone(), self.config.xid);

        let mut servers = ServerSet::new();
        let mut attempts = Vec::with_capacity(retries as usize);

        tracing::debug!(
            "Starting discovery: xid={:#010x}, {} attempt(s), {:?} each",
            request.xid(),
            retries,
            listen
        );

        for attempt in 1..=retries {
            tracing::info!("Attempt {}/{}", attempt, retries);

            let report = match open() {
                Err(e) => {
                    tracing::warn!("socket error: {}", e);
                    AttemptReport::failed(attempt, e)
                }
                Ok(transport) => {
                    tracing::debug!("Using broadcast: {}", target);
                    match DiscoverySession::new(transport, &request, target)
                        .run(listen, &mut servers)
                        .await
                    {
                        Ok(found) => {
                            tracing::info!("Attempt {}: found {} servers", attempt, found);
                            AttemptReport::completed(attempt, found)
                        }
                        Err(e) => {
                            tracing::warn!("send error: {}", e);
                            AttemptReport::failed(attempt, e)
                        }
                    }
                }
            };
            attempts.push(report);

            if attempt < retries {
                time::sleep(self.config.attempt_pause).await;
            }
        }

        DiscoveryReport {
            xid: request.xid(),
            servers,
            attempts,
        }
    }
}
