//! Device endpoint and timing configuration.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConnectionError;

/// Byte-transport kind for a device endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Telnet,
    Ssh,
}

impl Transport {
    /// Infer the transport from a port number when the endpoint does not
    /// name one: 23 means Telnet, anything else SSH.
    pub fn from_port(port: u16) -> Self {
        if port == 23 {
            Transport::Telnet
        } else {
            Transport::Ssh
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Transport::Telnet => 23,
            Transport::Ssh => 22,
        }
    }
}

/// Connection parameters for one device.
///
/// Immutable for the lifetime of a session; owned by the caller and passed
/// by value into the engine.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    /// Hostname or IP address of the device's management interface.
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Transport kind.
    pub transport: Transport,

    /// Username for the initial login.
    pub username: String,

    /// Primary password.
    pub password: SecretString,

    /// Secondary credential for the elevated command mode, when the device
    /// uses one distinct from the primary password.
    pub enable_password: Option<SecretString>,

    /// Free-form per-vendor protocol hint (e.g. a device-type label the
    /// caller's inventory carries). The engine does not interpret it.
    pub protocol_hint: Option<String>,

    /// Per-endpoint timing override; `None` uses the vendor profile's.
    pub timing: Option<Timing>,
}

impl DeviceEndpoint {
    /// Create an endpoint with SSH defaults for the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            transport: Transport::Ssh,
            username: String::new(),
            password: SecretString::from(String::new()),
            enable_password: None,
            protocol_hint: None,
            timing: None,
        }
    }

    /// Set the port and re-infer the transport from it.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self.transport = Transport::from_port(port);
        self
    }

    /// Set the transport explicitly, overriding port-based inference.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = SecretString::from(password.into());
        self
    }

    pub fn with_enable_password(mut self, password: impl Into<String>) -> Self {
        self.enable_password = Some(SecretString::from(password.into()));
        self
    }

    pub fn with_protocol_hint(mut self, hint: impl Into<String>) -> Self {
        self.protocol_hint = Some(hint.into());
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Check that the fields required to attempt a connection are present.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.host.trim().is_empty() {
            return Err(ConnectionError::InvalidEndpoint {
                message: "host must not be empty".into(),
            });
        }
        if self.username.trim().is_empty() {
            return Err(ConnectionError::InvalidEndpoint {
                message: "username must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Timing knobs for the poll loops, login ladder, and retry policy.
///
/// Timeouts are per-operation and are not inherited across calls: a slow
/// command does not shorten the next command's budget.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Sleep between non-blocking reads in the poll loop.
    pub poll_interval: Duration,

    /// Pause after writing a credential or command before reading back.
    pub settle_delay: Duration,

    /// How long a login strategy waits for a username/password cue before
    /// proceeding anyway.
    pub cue_grace: Duration,

    /// Inactivity window for ordinary commands.
    pub command_timeout: Duration,

    /// Inactivity window for configuration fetches (large outputs).
    pub config_timeout: Duration,

    /// Wall-clock cap on opening the channel.
    pub connect_timeout: Duration,

    /// Pause between reconnect attempts.
    pub reconnect_backoff: Duration,

    /// Total execute attempts before a transport failure is surfaced.
    pub retry_budget: u32,

    /// Bare newlines sent while probing for a prompt after login.
    pub newline_probes: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            settle_delay: Duration::from_millis(1000),
            cue_grace: Duration::from_millis(2000),
            command_timeout: Duration::from_secs(15),
            config_timeout: Duration::from_secs(40),
            connect_timeout: Duration::from_secs(30),
            reconnect_backoff: Duration::from_secs(1),
            retry_budget: 3,
            newline_probes: 3,
        }
    }
}

impl Timing {
    /// Millisecond-scale timings for simulated devices and lab rigs where
    /// real settle delays would only slow things down.
    pub fn snappy() -> Self {
        Self {
            poll_interval: Duration::from_millis(2),
            settle_delay: Duration::from_millis(2),
            cue_grace: Duration::from_millis(10),
            command_timeout: Duration::from_millis(500),
            config_timeout: Duration::from_millis(1000),
            connect_timeout: Duration::from_millis(500),
            reconnect_backoff: Duration::from_millis(5),
            retry_budget: 3,
            newline_probes: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_inferred_from_port() {
        assert_eq!(Transport::from_port(23), Transport::Telnet);
        assert_eq!(Transport::from_port(22), Transport::Ssh);
        assert_eq!(Transport::from_port(2222), Transport::Ssh);
    }

    #[test]
    fn with_port_reinfers_transport() {
        let ep = DeviceEndpoint::new("10.0.0.1").with_port(23);
        assert_eq!(ep.transport, Transport::Telnet);

        let ep = ep.with_transport(Transport::Ssh);
        assert_eq!(ep.transport, Transport::Ssh);
    }

    #[test]
    fn validate_requires_host_and_username() {
        assert!(DeviceEndpoint::new("").validate().is_err());
        assert!(DeviceEndpoint::new("10.0.0.1").validate().is_err());
        assert!(
            DeviceEndpoint::new("10.0.0.1")
                .with_username("admin")
                .validate()
                .is_ok()
        );
    }
}
