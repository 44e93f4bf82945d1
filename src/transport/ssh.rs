//! SSH channel built on russh.
//!
//! The russh channel is converted into a byte stream and split: a pump
//! task moves inbound bytes into an unbounded queue so `read_available`
//! never blocks, and writes go straight to the write half. Host keys are
//! accepted unconditionally; switch management networks rotate device
//! keys on every firmware replacement and a known-hosts policy belongs to
//! the operator's bastion, not to this engine.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, trace, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{ChannelStream, Disconnect};
use secrecy::ExposeSecret;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::channel::Channel;
use crate::endpoint::DeviceEndpoint;
use crate::error::ConnectionError;

const TERMINAL_WIDTH: u32 = 511;
const TERMINAL_HEIGHT: u32 = 24;

pub struct SshChannel {
    session: Handle<AcceptingHandler>,
    writer: WriteHalf<ChannelStream<Msg>>,
    inbound: UnboundedReceiver<Vec<u8>>,
    pump: JoinHandle<()>,
    closed: bool,
}

impl SshChannel {
    /// Connect, authenticate with the endpoint's password, and open a
    /// shell on a PTY.
    pub async fn connect(endpoint: &DeviceEndpoint) -> Result<Self, ConnectionError> {
        let config = Arc::new(client::Config::default());

        let mut session = client::connect(
            config,
            (endpoint.host.as_str(), endpoint.port),
            AcceptingHandler,
        )
        .await?;

        let authenticated = session
            .authenticate_password(&endpoint.username, endpoint.password.expose_secret())
            .await?
            .success();
        if !authenticated {
            return Err(ConnectionError::AuthenticationFailed {
                user: endpoint.username.clone(),
            });
        }

        let channel = session.channel_open_session().await?;
        channel
            .request_pty(true, "vt100", TERMINAL_WIDTH, TERMINAL_HEIGHT, 0, 0, &[])
            .await?;
        channel.request_shell(true).await?;

        let (mut reader, writer) = tokio::io::split(channel.into_stream());
        let (tx, inbound) = mpsc::unbounded_channel();
        let pump = tokio::spawn(async move {
            pump_inbound(&mut reader, tx).await;
        });

        debug!("ssh shell established to {}:{}", endpoint.host, endpoint.port);
        Ok(Self {
            session,
            writer,
            inbound,
            pump,
            closed: false,
        })
    }
}

/// Move inbound bytes into the queue until EOF or error.
async fn pump_inbound(
    reader: &mut ReadHalf<ChannelStream<Msg>>,
    tx: mpsc::UnboundedSender<Vec<u8>>,
) {
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                trace!("ssh: pumped {n} bytes");
                if tx.send(chunk[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("ssh: inbound pump stopped: {e}");
                break;
            }
        }
    }
}

#[async_trait]
impl Channel for SshChannel {
    async fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            match self.inbound.try_recv() {
                Ok(chunk) => out.extend_from_slice(&chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if out.is_empty() && !self.closed {
                        return Err(io::Error::new(
                            io::ErrorKind::ConnectionAborted,
                            "ssh channel closed by peer",
                        ));
                    }
                    break;
                }
            }
        }
        Ok(out)
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "ssh channel closed",
            ));
        }
        self.writer.write_all(data).await?;
        self.writer.flush().await
    }

    async fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.pump.abort();
        if let Err(e) = self
            .session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            warn!("ignoring ssh disconnect error: {e}");
        }
        Ok(())
    }
}

/// Accepts every host key; see the module docs for the rationale.
struct AcceptingHandler;

impl client::Handler for AcceptingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}
