pub mod interface;

use std::{
    future::Future,
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket as StdUdpSocket},
};
use thiserror::Error;
use tokio::net::UdpSocket as TokioUdpSocket;

pub use interface::{active_interfaces, select_interface, InterfaceInfo, Selection};

/// Defines all possible errors for socket operations.
#[derive(Error, Debug)]
pub enum SocketError {
    #[error("Failed to create a new socket")]
    CreateSocket(#[source] io::Error),

    #[error("Failed to enable broadcast on socket")]
    SetBroadcast(#[source] io::Error),

    #[error("Failed to set SO_BINDTODEVICE on interface '{interface}'")]
    BindToDevice {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to bind socket to port {port}")]
    BindSocket {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Failed to set SO_REUSEADDR on socket")]
    SetReuseAddress(#[source] io::Error),

    #[error("Failed to set socket to non-blocking mode")]
    SetNonBlocking(#[source] io::Error),

    #[error("Failed to convert socket to TokioUdpSocket")]
    ConvertToTokio(#[source] io::Error),
}

/// The datagram operations a discovery attempt needs.
///
/// Implemented for `tokio::net::UdpSocket`; anything else that can send and
/// receive datagrams (a scripted peer in tests, for instance) can stand in.
pub trait Transport {
    fn send_datagram(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>>;

    fn recv_datagram(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>>;
}

impl Transport for TokioUdpSocket {
    fn send_datagram(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> {
        self.send_to(buf, target)
    }

    fn recv_datagram(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> {
        self.recv_from(buf)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send_datagram(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> {
        (**self).send_datagram(buf, target)
    }

    fn recv_datagram(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> {
        (**self).recv_datagram(buf)
    }
}

/// Creates a new `tokio::net::UdpSocket` bound to a specific network device and port.
///
/// This function handles the low-level socket configuration required for
/// broadcasting from a specific interface and hearing the replies on the
/// DHCP client port.
///
/// # Arguments
/// * `interface` - The name of the network interface (e.g., "eth0").
/// * `port` - The port number to bind the socket to.
///
/// # Returns
/// A `Result` containing the configured `TokioUdpSocket` or a `SocketError`.
pub fn new_tokio_socket_bound_to_device(
    interface: &str,
    port: u16,
) -> Result<TokioUdpSocket, SocketError> {
    use socket2::{Domain, Socket, Type};

    // Create a socket2 socket, which allows setting options before binding.
    let socket2 =
        Socket::new(Domain::IPV4, Type::DGRAM, None).map_err(SocketError::CreateSocket)?;

    // Set `SO_BROADCAST`. This is required for sending broadcast messages.
    socket2
        .set_broadcast(true)
        .map_err(SocketError::SetBroadcast)?;

    // Set `SO_REUSEADDR`. Another DHCP client may already hold port 68.
    socket2
        .set_reuse_address(true)
        .map_err(SocketError::SetReuseAddress)?;

    bind_to_device(&socket2, interface)?;

    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
    socket2
        .bind(&addr.into())
        .map_err(|source| SocketError::BindSocket { port, source })?;

    // Convert to a standard socket, then into a Tokio socket.
    let std_socket: StdUdpSocket = socket2.into();
    std_socket
        .set_nonblocking(true)
        .map_err(SocketError::SetNonBlocking)?;
    TokioUdpSocket::from_std(std_socket).map_err(SocketError::ConvertToTokio)
}

#[cfg(target_os = "linux")]
fn bind_to_device(socket: &socket2::Socket, interface: &str) -> Result<(), SocketError> {
    use std::os::fd::AsRawFd;

    // Set `SO_BINDTODEVICE`. This is an unsafe raw syscall.
    // It is safe here because we use a valid file descriptor and correct parameters.
    let ret = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_BINDTODEVICE,
            interface.as_ptr() as *const libc::c_void,
            interface.len() as libc::socklen_t,
        )
    };
    if ret < 0 {
        return Err(SocketError::BindToDevice {
            interface: interface.to_string(),
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

/// `SO_BINDTODEVICE` is Linux only; elsewhere the routing table picks the
/// outgoing interface for the broadcast.
#[cfg(not(target_os = "linux"))]
fn bind_to_device(_socket: &socket2::Socket, interface: &str) -> Result<(), SocketError> {
    tracing::debug!(
        "Binding to device '{}' is not supported on this platform, using the default route",
        interface
    );
    Ok(())
}
