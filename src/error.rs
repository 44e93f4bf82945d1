//! Error types for switchwire.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for switchwire operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport open or authentication failure. Fatal to the attempted
    /// connect; the caller may retry later.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// No prompt within the inactivity window, after the reconnect-retry
    /// has already been spent.
    #[error("Timeout error: {0}")]
    Timeout(#[from] TimeoutError),

    /// Privilege escalation failed. Non-fatal; surfaced only when a caller
    /// explicitly asks for escalation.
    #[error("Privilege error: {0}")]
    Privilege(#[from] PrivilegeError),

    /// Registry lookup miss.
    #[error("Unsupported vendor '{vendor}' (supported: {})", .supported.join(", "))]
    UnsupportedVendor {
        vendor: String,
        supported: Vec<String>,
    },

    /// Command submitted to a session that is not `Ready` and could not be
    /// brought back to `Ready`.
    #[error("Session is {state}; command submission requires a Ready session")]
    NotReady { state: String },

    /// An operation could not produce usable output.
    #[error("Command failed: {message}")]
    CommandFailed { message: String },
}

/// Transport-level errors (channel open, login, mid-session I/O).
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to open the byte channel to the device.
    #[error("Connection failed to {host}:{port}: {source}")]
    Open {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// SSH server rejected the credentials.
    #[error("Authentication rejected for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Every login strategy failed. Carries the concatenated per-strategy
    /// failure messages for diagnosability.
    #[error("All login strategies failed: {}", .attempts.join("; "))]
    LoginExhausted { attempts: Vec<String> },

    /// The channel was closed by the peer or by cancellation.
    #[error("Channel closed")]
    Closed,

    /// The endpoint is missing a required field.
    #[error("Invalid endpoint: {message}")]
    InvalidEndpoint { message: String },

    /// I/O error on an established channel.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// No recognized prompt arrived within the inactivity window.
///
/// The window is an inactivity timeout, not a wall-clock cap: every byte
/// of fresh output pushes the deadline out again.
#[derive(Error, Debug)]
#[error("no prompt within {waited:?} of inactivity while waiting for '{context}'")]
pub struct TimeoutError {
    /// What was being waited for (a command, a login step, ...).
    pub context: String,
    /// The inactivity window that elapsed.
    pub waited: Duration,
}

impl TimeoutError {
    pub fn new(context: impl Into<String>, waited: Duration) -> Self {
        Self {
            context: context.into(),
            waited,
        }
    }
}

/// Privilege escalation failed; the session remains usable.
#[derive(Error, Debug)]
#[error("privilege escalation failed: {message}")]
pub struct PrivilegeError {
    pub message: String,
}

impl PrivilegeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Error {
    /// Whether this error indicates a broken transport, i.e. the session
    /// must be torn down and re-established before another attempt.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

/// Result type alias using switchwire's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_vendor_lists_tags() {
        let err = Error::UnsupportedVendor {
            vendor: "acme".into(),
            supported: vec!["huawei".into(), "h3c".into(), "ruijie".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("acme"));
        assert!(msg.contains("huawei, h3c, ruijie"));
    }

    #[test]
    fn login_exhausted_concatenates_attempts() {
        let err = ConnectionError::LoginExhausted {
            attempts: vec!["direct: no prompt".into(), "cue-wait: no prompt".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("direct: no prompt"));
        assert!(msg.contains("cue-wait: no prompt"));
    }

    #[test]
    fn transport_classification() {
        let io = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        let err: Error = ConnectionError::Io(io).into();
        assert!(err.is_transport());

        let err: Error = TimeoutError::new("show version", Duration::from_secs(15)).into();
        assert!(!err.is_transport());
    }
}
