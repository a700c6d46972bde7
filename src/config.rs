use crate::network::Selection;
use bytes::Bytes;
use clap::Parser;
use std::{
    ffi::OsString,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    time::Duration,
};

pub const DHCP_CLIENT_PORT: u16 = 68;
pub const DHCP_SERVER_PORT: u16 = 67;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_ATTEMPT_PAUSE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// List available network interfaces and exit
    #[arg(long = "show-interfaces", visible_alias = "si")]
    pub show_interfaces: bool,

    /// Select interface by exact name (e.g., 'eth0')
    #[arg(long = "iface", value_name = "NAME")]
    pub iface: Option<String>,

    /// Select interface by number from --show-interfaces (1-based)
    #[arg(long = "iface-index", value_name = "N")]
    pub iface_index: Option<usize>,

    /// Total listen time spread over all attempts (e.g. 4s, 1m, 500ms)
    #[arg(long, default_value = "8s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Number of discovery attempts
    #[arg(long, default_value_t = DEFAULT_RETRIES, value_parser = clap::value_parser!(u32).range(1..))]
    pub retry: u32,

    /// Enable verbose logging to console and dhcp-discover.log
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parses `args`, also accepting the single-dash `-si` spelling.
    pub fn parse_with_legacy_flags<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_legacy_flags(args))
    }

    pub fn selection(&self) -> Selection {
        Selection::from_options(self.iface_index, self.iface.clone())
    }
}

fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| if arg == "-si" { OsString::from("--si") } else { arg })
        .collect()
}

/// Parses durations such as `8s`, `500ms`, `1m`, `1.5h` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{input}'"))?;
    let seconds = match unit {
        "" | "s" => value,
        "ms" => value / 1000.0,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        other => return Err(format!("unknown unit '{other}' in duration '{input}'")),
    };

    let duration = Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())?;
    if duration.is_zero() {
        return Err(format!("duration '{input}' must be greater than zero"));
    }
    Ok(duration)
}

/// Everything one discovery run needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub interface: String,
    pub mac_address: Bytes,
    /// Transaction id shared by every attempt of the run.
    pub xid: u32,
    /// Total listen time, split evenly across attempts.
    pub timeout: Duration,
    pub retries: u32,
    pub attempt_pause: Duration,
    pub client_port: u16,
    pub server_port: u16,
    pub broadcast_address: Ipv4Addr,
}

impl DiscoveryConfig {
    pub fn new(interface: String, mac_address: Bytes) -> Self {
        Self {
            interface,
            mac_address,
            xid: rand::random(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            attempt_pause: DEFAULT_ATTEMPT_PAUSE,
            client_port: DHCP_CLIENT_PORT,
            server_port: DHCP_SERVER_PORT,
            broadcast_address: Ipv4Addr::BROADCAST,
        }
    }

    pub fn with_xid(mut self, xid: u32) -> Self {
        self.xid = xid;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_attempt_pause(mut self, pause: Duration) -> Self {
        self.attempt_pause = pause;
        self
    }

    /// Listen window of a single attempt.
    pub fn attempt_timeout(&self) -> Duration {
        self.timeout / self.retries.max(1)
    }

    pub fn broadcast_target(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.broadcast_address, self.server_port))
    }
}
