//! # Switchwire
//!
//! Async command-automation engine for multi-vendor network switches.
//!
//! Switchwire drives interactive CLI sessions over Telnet or SSH against
//! Huawei VRP, H3C Comware, and Ruijie RGOS devices: it logs in through a
//! ladder of strategies, escalates privilege, disables pagination, runs
//! command ladders with reconnect budgets, and extracts structured facts
//! from the output.
//!
//! ## Features
//!
//! - Async Telnet and SSH channels (SSH via russh)
//! - Three-strategy login chain tolerant of cue-less devices
//! - Inactivity-based timeouts that survive slowly streaming output
//! - Vendor behavior as data: one adapter, per-vendor profiles
//! - Regex-driven fact extraction with first-match-wins pattern ladders
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchwire::{Adapter, AdapterRegistry, DeviceEndpoint, NetChannelFactory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), switchwire::Error> {
//!     let registry = AdapterRegistry::with_builtins(Arc::new(NetChannelFactory::new()));
//!
//!     let endpoint = DeviceEndpoint::new("192.168.1.1")
//!         .with_port(22)
//!         .with_username("admin")
//!         .with_password("secret");
//!
//!     let mut adapter = registry.resolve("huawei", endpoint)?;
//!     adapter.connect().await?;
//!
//!     let facts = adapter.device_facts().await?;
//!     println!("{} running {}", facts.model, facts.version);
//!
//!     adapter.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod facts;
pub mod session;
pub mod transport;
pub mod vendor;

// Re-export main types for convenience
pub use endpoint::{DeviceEndpoint, Timing, Transport};
pub use error::{ConnectionError, Error, PrivilegeError, Result, TimeoutError};
pub use executor::{CommandExecutor, CommandResult};
pub use facts::{DeviceFacts, FactExtractor, InterfaceCounters, InterfaceFacts};
pub use session::{LoginChain, LoginOutcome, LoginReport, Session, SessionState};
pub use transport::{NetChannelFactory, SshChannel, TelnetChannel};
pub use vendor::{Adapter, AdapterRegistry, VendorAdapter, VendorProfile};
