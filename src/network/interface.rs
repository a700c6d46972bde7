//! Network interface enumeration and selection

use crate::error::DiscoverError;
use bytes::Bytes;
use pnet::datalink::{self, MacAddr, NetworkInterface};
use std::{fmt, net::IpAddr};

/// What the discovery run needs to know about a network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    /// Empty when the interface has no hardware address.
    pub mac: Bytes,
    pub addrs: Vec<IpAddr>,
    pub is_up: bool,
    pub is_loopback: bool,
}

impl InterfaceInfo {
    pub fn is_active(&self) -> bool {
        self.is_up && !self.is_loopback
    }

    /// Hardware address as colon separated hex, empty if there is none.
    pub fn mac_string(&self) -> String {
        format_mac(&self.mac)
    }
}

impl From<&NetworkInterface> for InterfaceInfo {
    fn from(iface: &NetworkInterface) -> Self {
        let mac = match iface.mac {
            Some(MacAddr(a, b, c, d, e, f)) => Bytes::copy_from_slice(&[a, b, c, d, e, f]),
            None => Bytes::new(),
        };

        Self {
            name: iface.name.clone(),
            mac,
            addrs: iface.ips.iter().map(|net| net.ip()).collect(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
        }
    }
}

impl fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (MAC: {})", self.name, self.mac_string())
    }
}

pub fn format_mac(mac: &[u8]) -> String {
    mac.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Interfaces that are up and not loopback, in the order the OS reports them.
pub fn active_interfaces() -> Vec<InterfaceInfo> {
    datalink::interfaces()
        .iter()
        .map(InterfaceInfo::from)
        .filter(InterfaceInfo::is_active)
        .collect()
}

/// How the user asked for an interface to be chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 1-based position in the active interface list.
    Index(usize),
    /// Exact interface name.
    Name(String),
    First,
}

impl Selection {
    /// An index wins over a name when both are given. Index 0 counts as unset.
    pub fn from_options(index: Option<usize>, name: Option<String>) -> Self {
        match (index, name) {
            (Some(index), _) if index > 0 => Self::Index(index),
            (_, Some(name)) if !name.is_empty() => Self::Name(name),
            _ => Self::First,
        }
    }
}

pub fn select_interface(
    interfaces: &[InterfaceInfo],
    selection: &Selection,
) -> Result<InterfaceInfo, DiscoverError> {
    if interfaces.is_empty() {
        return Err(DiscoverError::NoInterfaces);
    }

    match selection {
        Selection::Index(index) => index
            .checked_sub(1)
            .and_then(|i| interfaces.get(i))
            .cloned()
            .ok_or(DiscoverError::InterfaceIndexOutOfRange {
                index: *index,
                available: interfaces.len(),
            }),
        Selection::Name(name) => interfaces
            .iter()
            .find(|iface| &iface.name == name)
            .cloned()
            .ok_or_else(|| DiscoverError::InterfaceNotFound(name.clone())),
        Selection::First => Ok(interfaces[0].clone()),
    }
}
