//! Structured facts extracted from show-command output.
//!
//! Extraction is best-effort: a field that no pattern matches stays empty
//! rather than failing the whole operation. Callers treat empty strings as
//! "unknown".

mod extract;

pub use extract::{FactExtractor, FieldPatterns};

use serde::{Deserialize, Serialize};

/// Identity facts for one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFacts {
    pub vendor: String,
    pub model: String,
    pub version: String,
    pub serial_number: String,
    pub uptime: String,
}

/// One row of an interface summary table, optionally enriched with
/// per-interface counters from a detail command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceFacts {
    pub name: String,
    /// Link/admin status column, normalized to lowercase.
    pub status: String,
    /// Protocol/line status column, normalized to lowercase.
    pub protocol: String,
    pub description: String,
    pub speed: String,
    pub duplex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<InterfaceCounters>,
}

/// Traffic and error counters for one interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub input_packets: u64,
    pub output_packets: u64,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub input_errors: u64,
    pub output_errors: u64,
}
