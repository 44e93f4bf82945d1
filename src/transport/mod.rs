//! Concrete Telnet and SSH channels.
//!
//! Both transports surface the same [`Channel`](crate::channel::Channel)
//! contract: non-blocking reads, plain writes, idempotent close. Protocol
//! negotiation (Telnet options, SSH handshake and PTY setup) happens at
//! open time and never leaks into the byte stream the engine sees.

mod ssh;
mod telnet;

pub use ssh::SshChannel;
pub use telnet::TelnetChannel;

use async_trait::async_trait;
use log::debug;

use crate::channel::{Channel, ChannelFactory};
use crate::endpoint::{DeviceEndpoint, Transport};
use crate::error::ConnectionError;

/// Opens real network channels, dispatching on the endpoint's transport.
#[derive(Debug, Default)]
pub struct NetChannelFactory;

impl NetChannelFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChannelFactory for NetChannelFactory {
    async fn open(
        &self,
        endpoint: &DeviceEndpoint,
    ) -> Result<Box<dyn Channel>, ConnectionError> {
        debug!(
            "opening {:?} channel to {}:{}",
            endpoint.transport, endpoint.host, endpoint.port
        );
        match endpoint.transport {
            Transport::Telnet => {
                let channel = TelnetChannel::connect(endpoint).await?;
                Ok(Box::new(channel))
            }
            Transport::Ssh => {
                let channel = SshChannel::connect(endpoint).await?;
                Ok(Box::new(channel))
            }
        }
    }
}
