//! The abstract duplex byte channel the engine consumes.
//!
//! The engine is a client of whatever Telnet/SSH transport implements
//! these traits; it never sees wire-protocol details. Concrete
//! implementations live in [`crate::transport`], and tests substitute
//! scripted channels.

mod buffer;
mod prompts;

pub use buffer::PatternBuffer;
pub use prompts::{PromptSet, contains_cue};

use std::io;

use async_trait::async_trait;

use crate::endpoint::DeviceEndpoint;
use crate::error::ConnectionError;

/// Bidirectional byte stream to a device.
///
/// `read_available` must be non-blocking in spirit: it returns whatever
/// bytes have arrived (possibly none) without waiting for more. The poll
/// loops in [`crate::session`] supply the pacing.
#[async_trait]
pub trait Channel: Send {
    /// Read the bytes currently available, empty if none.
    async fn read_available(&mut self) -> io::Result<Vec<u8>>;

    /// Write bytes to the device.
    async fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Close the channel. Repeated calls are no-ops.
    async fn close(&mut self) -> io::Result<()>;
}

/// Opens channels for endpoints. Held by the session so a broken channel
/// can be re-established with the same parameters.
#[async_trait]
pub trait ChannelFactory: Send + Sync {
    async fn open(&self, endpoint: &DeviceEndpoint) -> Result<Box<dyn Channel>, ConnectionError>;
}
