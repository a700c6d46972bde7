use crate::network::SocketError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Socket operation failed: {0}")]
    Socket(#[from] SocketError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no active network interfaces found")]
    NoInterfaces,

    #[error("interface named '{0}' not found")]
    InterfaceNotFound(String),

    #[error("iface-index {index} out of range (1-{available})")]
    InterfaceIndexOutOfRange { index: usize, available: usize },

    #[error("Failed to open log file '{}': {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
