//! One DHCP discovery attempt
//!
//! A session broadcasts a DISCOVER and then listens until its deadline,
//! folding the sender of every valid offer into the run's [`ServerSet`].

use super::message::{self, DiscoverRequest};
use crate::network::Transport;
use std::{
    collections::{hash_set, HashSet},
    io,
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use tokio::time::{self, Instant};

/// Largest datagram read from the socket; anything longer is truncated.
pub const MAX_DATAGRAM_SIZE: usize = 1500;

/// Receive errors in a row after which the attempt is given up.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 16;

/// Stand-in deadline for listen windows too long to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// When a listen window of `listen` starting now ends. Never overflows.
pub fn listen_deadline(listen: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(listen)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Distinct addresses of the servers that answered, across all attempts of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServerSet {
    servers: HashSet<IpAddr>,
}

impl ServerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the server was not seen before.
    pub fn insert(&mut self, server: IpAddr) -> bool {
        self.servers.insert(server)
    }

    pub fn contains(&self, server: &IpAddr) -> bool {
        self.servers.contains(server)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, IpAddr> {
        self.servers.iter()
    }

    /// Servers in ascending address order, for stable output.
    pub fn sorted(&self) -> Vec<IpAddr> {
        let mut servers: Vec<IpAddr> = self.servers.iter().copied().collect();
        servers.sort();
        servers
    }
}

impl<'a> IntoIterator for &'a ServerSet {
    type Item = &'a IpAddr;
    type IntoIter = hash_set::Iter<'a, IpAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct DiscoverySession<'a, T> {
    transport: T,
    request: &'a DiscoverRequest,
    target: SocketAddr,
}

impl<'a, T: Transport> DiscoverySession<'a, T> {
    pub fn new(transport: T, request: &'a DiscoverRequest, target: SocketAddr) -> Self {
        Self {
            transport,
            request,
            target,
        }
    }

    /// Sends the request and listens for `listen` afterwards.
    ///
    /// Returns how many servers were added to `servers` by this attempt. The
    /// transport is dropped when the session ends, whatever the outcome.
    pub async fn run(self, listen: Duration, servers: &mut ServerSet) -> io::Result<usize> {
        let packet = self.request.encode();
        let sent = self.transport.send_datagram(&packet, self.target).await?;
        tracing::debug!("Sent {} byte DHCPDISCOVER to {}", sent, self.target);

        let deadline = listen_deadline(listen);
        Ok(self.collect_offers(deadline, servers).await)
    }

    async fn collect_offers(&self, deadline: Instant, servers: &mut ServerSet) -> usize {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let mut found = 0;
        let mut consecutive_errors = 0;

        loop {
            let (len, from) =
                match time::timeout_at(deadline, self.transport.recv_datagram(&mut buf)).await {
                    Ok(Ok(received)) => {
                        consecutive_errors = 0;
                        received
                    }
                    Ok(Err(e)) => {
                        consecutive_errors += 1;
                        tracing::warn!("read error: {}", e);
                        if consecutive_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                            tracing::warn!(
                                "Giving up on this attempt after {} read errors in a row",
                                consecutive_errors
                            );
                            break;
                        }
                        continue;
                    }
                    Err(_) => {
                        tracing::debug!("Listen window closed");
                        break;
                    }
                };

            tracing::debug!("Received {} bytes from {}", len, from.ip());
            if record_offer(&buf[..len], from.ip(), self.request.xid(), servers) {
                found += 1;
            }
        }

        found
    }
}

/// Adds `from` to `servers` if `datagram` is an offer for transaction `xid`.
///
/// Returns `true` only for a server not seen before.
pub fn record_offer(datagram: &[u8], from: IpAddr, xid: u32, servers: &mut ServerSet) -> bool {
    if let Err(reason) = message::validate_offer(datagram, xid) {
        tracing::debug!("Dropping datagram from {}: {}", from, reason);
        return false;
    }

    if let Some(offer) = message::describe_offer(datagram) {
        tracing::debug!(
            "DHCPOFFER from {}: offered {}, server identifier {:?}",
            from,
            offer.offered_ip,
            offer.server_identifier
        );
    }

    if servers.insert(from) {
        tracing::info!("Found DHCP server: {}", from);
        true
    } else {
        tracing::debug!("Duplicate offer from {}", from);
        false
    }
}
