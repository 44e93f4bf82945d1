//! Telnet channel with minimal option handling.
//!
//! Every option the server proposes is refused (DO answered with WONT,
//! WILL with DONT), which leaves the connection in the plain NVT mode the
//! device CLIs expect. Negotiation bytes are stripped from the stream the
//! engine sees, including sequences split across reads.

use std::io;

use async_trait::async_trait;
use log::trace;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::channel::Channel;
use crate::endpoint::DeviceEndpoint;
use crate::error::ConnectionError;

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

/// Parser state for the Telnet command stream. Kept across reads because
/// a command sequence can land on a read boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IacState {
    Data,
    Iac,
    Negotiate(u8),
    Subnegotiation,
    SubnegotiationIac,
}

pub struct TelnetChannel {
    stream: Option<TcpStream>,
    state: IacState,
}

impl TelnetChannel {
    pub async fn connect(endpoint: &DeviceEndpoint) -> Result<Self, ConnectionError> {
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|source| ConnectionError::Open {
                host: endpoint.host.clone(),
                port: endpoint.port,
                source,
            })?;
        stream.set_nodelay(true).map_err(ConnectionError::Io)?;
        Ok(Self {
            stream: Some(stream),
            state: IacState::Data,
        })
    }

    fn stream_mut(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "telnet channel closed"))
    }

    /// Strip command sequences from `input`, collecting refusals for every
    /// option the server proposes.
    fn process(&mut self, input: &[u8], replies: &mut Vec<u8>) -> Vec<u8> {
        let mut data = Vec::with_capacity(input.len());
        for &byte in input {
            self.state = match (self.state, byte) {
                (IacState::Data, IAC) => IacState::Iac,
                (IacState::Data, b) => {
                    data.push(b);
                    IacState::Data
                }
                // Escaped literal 0xFF.
                (IacState::Iac, IAC) => {
                    data.push(IAC);
                    IacState::Data
                }
                (IacState::Iac, cmd @ (DO | DONT | WILL | WONT)) => IacState::Negotiate(cmd),
                (IacState::Iac, SB) => IacState::Subnegotiation,
                (IacState::Iac, _) => IacState::Data,
                (IacState::Negotiate(cmd), option) => {
                    match cmd {
                        DO => replies.extend_from_slice(&[IAC, WONT, option]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, option]),
                        _ => {}
                    }
                    trace!("telnet: refused option {option} (command {cmd})");
                    IacState::Data
                }
                (IacState::Subnegotiation, IAC) => IacState::SubnegotiationIac,
                (IacState::Subnegotiation, _) => IacState::Subnegotiation,
                (IacState::SubnegotiationIac, SE) => IacState::Data,
                (IacState::SubnegotiationIac, _) => IacState::Subnegotiation,
            };
        }
        data
    }
}

#[async_trait]
impl Channel for TelnetChannel {
    async fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let stream = self.stream_mut()?;
            match stream.try_read(&mut chunk) {
                Ok(0) => {
                    if raw.is_empty() {
                        return Err(io::Error::new(
                            io::ErrorKind::ConnectionAborted,
                            "telnet connection closed by peer",
                        ));
                    }
                    break;
                }
                Ok(n) => raw.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        let mut replies = Vec::new();
        let data = self.process(&raw, &mut replies);
        if !replies.is_empty() {
            self.stream_mut()?.write_all(&replies).await?;
        }
        Ok(data)
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let stream = self.stream_mut()?;
        stream.write_all(data).await?;
        stream.flush().await
    }

    async fn close(&mut self) -> io::Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
        }
        Ok(())
    }
}
