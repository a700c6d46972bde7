//! DHCPv4 wire handling for discovery
//!
//! Outgoing DISCOVER packets are laid out byte for byte so the result is
//! always a fixed-size BOOTP request. Inbound datagrams are never parsed as a
//! whole: only the fields needed to recognise a correlated DHCPOFFER are read,
//! each through a bounds-checked accessor.

use bytes::{BufMut as _, Bytes, BytesMut};
use dhcproto::{v4, Decodable as _, Decoder};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Minimum size of a BOOTP message on the wire.
pub const MIN_PACKET_SIZE: usize = 300;
/// `99.130.83.99`, marks the start of the DHCP options area.
pub const MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];

const XID_OFFSET: usize = 4;
const CHADDR_OFFSET: usize = 28;
pub const MAGIC_COOKIE_OFFSET: usize = 236;
/// Fixed header plus magic cookie.
pub const OPTIONS_OFFSET: usize = MAGIC_COOKIE_OFFSET + MAGIC_COOKIE.len();

const BOOTREQUEST: u8 = 1;
const HTYPE_ETHERNET: u8 = 1;
const HLEN_ETHERNET: usize = 6;
const BROADCAST_FLAG: u16 = 0x8000;

const OPTION_PAD: u8 = 0;
const OPTION_MESSAGE_TYPE: u8 = 53;
const OPTION_PARAMETER_REQUEST_LIST: u8 = 55;
const OPTION_END: u8 = 255;

pub const DHCPDISCOVER: u8 = 1;
pub const DHCPOFFER: u8 = 2;

// Subnet mask, router, domain name server, domain name.
const REQUESTED_PARAMETERS: [u8; 4] = [1, 3, 6, 15];

/// The request broadcast on every attempt of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverRequest {
    xid: u32,
    chaddr: Bytes,
}

impl DiscoverRequest {
    pub fn new(chaddr: Bytes, xid: u32) -> Self {
        Self { xid, chaddr }
    }

    pub fn xid(&self) -> u32 {
        self.xid
    }

    pub fn encode(&self) -> Vec<u8> {
        build_dhcp_discover(&self.chaddr, self.xid)
    }
}

/// Constructs a DHCP Discover message.
///
/// Never fails: a hardware address shorter than six bytes leaves `chaddr`
/// zeroed instead of rejecting the request.
pub fn build_dhcp_discover(mac_addr: &[u8], xid: u32) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(MIN_PACKET_SIZE);

    buf.put_u8(BOOTREQUEST);
    buf.put_u8(HTYPE_ETHERNET);
    buf.put_u8(HLEN_ETHERNET as u8);
    buf.put_u8(0); // hops
    buf.put_u32(xid);
    buf.put_u16(0); // secs
    buf.put_u16(BROADCAST_FLAG);
    buf.put_bytes(0, CHADDR_OFFSET - buf.len()); // ciaddr, yiaddr, siaddr, giaddr

    match mac_addr.get(..HLEN_ETHERNET) {
        Some(mac) => buf.put_slice(mac),
        None => buf.put_bytes(0, HLEN_ETHERNET),
    }

    // chaddr padding, sname and file
    buf.put_bytes(0, MAGIC_COOKIE_OFFSET - buf.len());
    buf.put_slice(&MAGIC_COOKIE);

    buf.put_slice(&[OPTION_MESSAGE_TYPE, 1, DHCPDISCOVER]);
    buf.put_u8(OPTION_PARAMETER_REQUEST_LIST);
    buf.put_u8(REQUESTED_PARAMETERS.len() as u8);
    buf.put_slice(&REQUESTED_PARAMETERS);
    buf.put_u8(OPTION_END);

    if buf.len() < MIN_PACKET_SIZE {
        buf.resize(MIN_PACKET_SIZE, 0);
    }
    buf.to_vec()
}

/// Why an inbound datagram was not counted as an offer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("packet too small: {0} bytes")]
    TooShort(usize),

    #[error("invalid magic cookie: {0:?}")]
    BadMagicCookie([u8; 4]),

    #[error("XID mismatch: expected {expected:#010x}, got {actual:#010x}")]
    TransactionMismatch { expected: u32, actual: u32 },

    #[error("no DHCP message type option")]
    MissingMessageType,

    #[error("not a DHCPOFFER: message type {0}")]
    NotOffer(u8),
}

/// Reads the big-endian transaction id, if the buffer is long enough.
pub fn transaction_id(buf: &[u8]) -> Option<u32> {
    let field = buf.get(XID_OFFSET..XID_OFFSET + 4)?;
    Some(u32::from_be_bytes(field.try_into().ok()?))
}

pub fn magic_cookie(buf: &[u8]) -> Option<[u8; 4]> {
    buf.get(MAGIC_COOKIE_OFFSET..OPTIONS_OFFSET)?.try_into().ok()
}

/// Value of the first well-formed message type option.
pub fn message_type(buf: &[u8]) -> Option<u8> {
    options(buf)
        .filter(|(code, _)| *code == OPTION_MESSAGE_TYPE)
        .find_map(|(_, value)| value.first().copied())
}

/// Iterates the options area of `buf`.
///
/// Iteration ends at the End option, or silently at the first option whose
/// declared length runs past the end of the buffer.
pub fn options(buf: &[u8]) -> Options<'_> {
    Options {
        rest: buf.get(OPTIONS_OFFSET..).unwrap_or_default(),
    }
}

pub struct Options<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Options<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (&code, tail) = self.rest.split_first()?;
            match code {
                OPTION_PAD => self.rest = tail,
                OPTION_END => {
                    self.rest = &[];
                    return None;
                }
                _ => {
                    let parsed = tail.split_first().and_then(|(&len, body)| {
                        let len = len as usize;
                        (body.len() >= len).then(|| body.split_at(len))
                    });
                    let Some((value, rest)) = parsed else {
                        self.rest = &[];
                        return None;
                    };
                    self.rest = rest;
                    return Some((code, value));
                }
            }
        }
    }
}

/// Checks that `buf` is a DHCPOFFER answering transaction `xid`.
///
/// The checks run in a fixed order and the first failure is reported.
pub fn validate_offer(buf: &[u8], xid: u32) -> Result<(), Rejection> {
    if buf.len() < OPTIONS_OFFSET {
        return Err(Rejection::TooShort(buf.len()));
    }

    let cookie = magic_cookie(buf).ok_or(Rejection::TooShort(buf.len()))?;
    if cookie != MAGIC_COOKIE {
        return Err(Rejection::BadMagicCookie(cookie));
    }

    let actual = transaction_id(buf).ok_or(Rejection::TooShort(buf.len()))?;
    if actual != xid {
        return Err(Rejection::TransactionMismatch {
            expected: xid,
            actual,
        });
    }

    match message_type(buf) {
        Some(DHCPOFFER) => Ok(()),
        Some(other) => Err(Rejection::NotOffer(other)),
        None => Err(Rejection::MissingMessageType),
    }
}

/// Details of an accepted offer, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferSummary {
    pub offered_ip: Ipv4Addr,
    pub server_identifier: Option<Ipv4Addr>,
}

/// Fully decodes an offer to report what it carries.
///
/// Returns `None` when the datagram cannot be decoded as a whole; callers use
/// this for logging only.
pub fn describe_offer(buf: &[u8]) -> Option<OfferSummary> {
    let msg = v4::Message::decode(&mut Decoder::new(buf)).ok()?;
    let server_identifier = match msg.opts().get(v4::OptionCode::ServerIdentifier) {
        Some(v4::DhcpOption::ServerIdentifier(ip)) => Some(*ip),
        _ => None,
    };

    Some(OfferSummary {
        offered_ip: msg.yiaddr(),
        server_identifier,
    })
}
