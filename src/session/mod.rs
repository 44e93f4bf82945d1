//! Session lifecycle and the cooperative poll loop.
//!
//! A [`Session`] owns exactly one channel and is driven by exactly one
//! logical caller; the engine performs no background polling. Waiting for
//! output is a read/sleep loop with an inactivity deadline: the deadline
//! is pushed out every time fresh bytes arrive, so a slowly streaming
//! configuration dump is not cut off, while a silent device is.
//!
//! Cancellation is cooperative too: dropping an in-flight operation stops
//! the loop at its next tick, and [`Session::disconnect`] closes the
//! channel so nothing stays alive on the device side.

mod login;
mod privilege;

pub use login::{
    CueWaitLogin, DirectLogin, LoginChain, LoginCues, LoginOutcome, LoginReport, LoginStrategy,
    PatientLogin, StrategyVerdict,
};
pub use privilege::{EscalationOutcome, PrivilegeEscalator};

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace};
use regex::bytes::Regex;
use tokio::time::sleep;

use crate::channel::{Channel, ChannelFactory, PatternBuffer};
use crate::endpoint::{DeviceEndpoint, Timing};
use crate::error::{ConnectionError, Result};

/// Connection lifecycle states.
///
/// A session is in exactly one state at any instant; only `Ready` admits
/// command submission. `Failed` is terminal until an explicit
/// [`Session::open`] restarts the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticating,
    Ready,
    Executing,
    Failed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Disconnected => "Disconnected",
            SessionState::Connecting => "Connecting",
            SessionState::Authenticating => "Authenticating",
            SessionState::Ready => "Ready",
            SessionState::Executing => "Executing",
            SessionState::Failed => "Failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of waiting on the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A recognized prompt appeared at the tail of the output.
    Prompt,
    /// The inactivity window elapsed with no new bytes.
    Inactive,
}

/// One interactive terminal session to one device.
pub struct Session {
    endpoint: DeviceEndpoint,
    factory: Arc<dyn ChannelFactory>,
    channel: Option<Box<dyn Channel>>,
    state: SessionState,
    buffer: PatternBuffer,
    last_activity: Instant,
    elevated: bool,
    timing: Timing,
}

impl Session {
    /// Create a disconnected session. The endpoint's timing override, when
    /// present, wins over the supplied (vendor-profile) timing.
    pub fn new(
        endpoint: DeviceEndpoint,
        factory: Arc<dyn ChannelFactory>,
        timing: Timing,
    ) -> Self {
        let timing = endpoint.timing.clone().unwrap_or(timing);
        Self {
            endpoint,
            factory,
            channel: None,
            state: SessionState::Disconnected,
            buffer: PatternBuffer::default(),
            last_activity: Instant::now(),
            elevated: false,
            timing,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Whether the elevated command mode has been reached.
    pub fn elevated(&self) -> bool {
        self.elevated
    }

    pub(crate) fn set_elevated(&mut self, elevated: bool) {
        self.elevated = elevated;
    }

    /// Instant of the last byte or write on this session.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Open the channel and move to `Authenticating`.
    ///
    /// Valid from any state: an existing channel is closed first, so this
    /// also restarts a `Failed` machine from scratch.
    pub async fn open(&mut self) -> Result<()> {
        self.disconnect().await;
        self.endpoint.validate().map_err(crate::error::Error::from)?;

        self.state = SessionState::Connecting;
        debug!(
            "connecting to {}:{} ({:?})",
            self.endpoint.host, self.endpoint.port, self.endpoint.transport
        );

        let opened = tokio::time::timeout(
            self.timing.connect_timeout,
            self.factory.open(&self.endpoint),
        )
        .await
        .map_err(|_| ConnectionError::Open {
            host: self.endpoint.host.clone(),
            port: self.endpoint.port,
            source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
        });

        match opened {
            Ok(Ok(channel)) => {
                self.channel = Some(channel);
                self.buffer.clear();
                self.elevated = false;
                self.last_activity = Instant::now();
                self.state = SessionState::Authenticating;
                Ok(())
            }
            Ok(Err(e)) | Err(e) => {
                self.state = SessionState::Failed;
                Err(e.into())
            }
        }
    }

    /// Close the channel and land in `Disconnected`. Valid from any state;
    /// repeated calls are no-ops. Close errors are logged, not surfaced.
    pub async fn disconnect(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("ignoring channel close error: {e}");
            }
        }
        self.buffer.clear();
        self.elevated = false;
        self.state = SessionState::Disconnected;
    }

    pub(crate) fn mark_ready(&mut self) {
        self.state = SessionState::Ready;
    }

    pub(crate) fn mark_executing(&mut self) {
        self.state = SessionState::Executing;
    }

    pub(crate) fn fail(&mut self) {
        self.state = SessionState::Failed;
    }

    fn channel_mut(&mut self) -> std::result::Result<&mut Box<dyn Channel>, ConnectionError> {
        self.channel.as_mut().ok_or(ConnectionError::Closed)
    }

    /// Write raw bytes. Any I/O error moves the session to `Failed` so a
    /// corrupted session cannot be reused.
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let res = self.channel_mut()?.write(data).await;
        match res {
            Ok(()) => {
                self.last_activity = Instant::now();
                Ok(())
            }
            Err(e) => {
                self.fail();
                Err(ConnectionError::Io(e).into())
            }
        }
    }

    /// Write a line with a trailing newline.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.write_raw(&data).await
    }

    /// One non-blocking read into the buffer. Returns the byte count.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let res = self.channel_mut()?.read_available().await;
        match res {
            Ok(chunk) => {
                if !chunk.is_empty() {
                    trace!("read {} bytes", chunk.len());
                    self.buffer.extend(&chunk);
                    self.last_activity = Instant::now();
                }
                Ok(chunk.len())
            }
            Err(e) => {
                self.fail();
                Err(ConnectionError::Io(e).into())
            }
        }
    }

    /// Discard everything currently buffered or in flight.
    pub async fn drain(&mut self) -> Result<()> {
        while self.poll_once().await? > 0 {}
        self.buffer.clear();
        Ok(())
    }

    /// Poll until the buffer tail matches `pattern` or the inactivity
    /// window elapses. Accumulated output stays in the buffer either way.
    ///
    /// A prompt already buffered (say, collected during a settle window)
    /// counts; the device is not required to say anything new.
    pub async fn read_until(&mut self, pattern: &Regex, inactivity: Duration) -> Result<WaitOutcome> {
        if self.buffer.tail_contains(pattern) {
            return Ok(WaitOutcome::Prompt);
        }
        let mut deadline = Instant::now() + inactivity;
        loop {
            let n = self.poll_once().await?;
            if n > 0 {
                deadline = Instant::now() + inactivity;
                if self.buffer.tail_contains(pattern) {
                    return Ok(WaitOutcome::Prompt);
                }
                continue;
            }
            if Instant::now() >= deadline {
                return Ok(WaitOutcome::Inactive);
            }
            sleep(self.timing.poll_interval).await;
        }
    }

    /// Collect whatever arrives during a fixed settle window.
    pub async fn read_for(&mut self, window: Duration) -> Result<()> {
        let deadline = Instant::now() + window;
        loop {
            let n = self.poll_once().await?;
            if Instant::now() >= deadline {
                return Ok(());
            }
            if n == 0 {
                sleep(self.timing.poll_interval).await;
            }
        }
    }

    pub fn buffer(&self) -> &PatternBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PatternBuffer {
        &mut self.buffer
    }

    /// Take the accumulated output as a string, resetting the buffer.
    pub fn take_output(&mut self) -> String {
        self.buffer.take_string()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.endpoint.host)
            .field("state", &self.state)
            .field("elevated", &self.elevated)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}
