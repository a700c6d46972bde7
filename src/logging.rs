//! Tracing subscriber setup
//!
//! Quiet by default. Verbose mode logs at debug level to stdout and appends
//! the same lines to `dhcp-discover.log` beside the executable.

use crate::error::DiscoverError;
use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

pub const LOG_FILE_NAME: &str = "dhcp-discover.log";

/// Where verbose runs append their log.
pub fn log_file_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(LOG_FILE_NAME)
}

pub fn open_log_file(path: &Path) -> Result<File, DiscoverError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| DiscoverError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (log_file, file_error) = if verbose {
        match open_log_file(&log_file_path()) {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("{}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn test_log_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(LOG_FILE_NAME);

        let err = open_log_file(&path).unwrap_err();
        assert!(matches!(err, DiscoverError::LogFile { path: p, .. } if p == path));
    }

    #[test]
    fn test_log_file_path_name() {
        assert!(log_file_path().ends_with(LOG_FILE_NAME));
    }
}
