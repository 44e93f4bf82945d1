//! Regex-driven extraction from CLI output.

use log::trace;
use regex::Regex;

use super::{DeviceFacts, InterfaceCounters, InterfaceFacts};

/// Ordered list of patterns for one field; the first pattern whose first
/// capture group matches wins. Ordering encodes preference across firmware
/// generations of the same vendor.
#[derive(Debug, Clone, Default)]
pub struct FieldPatterns {
    patterns: Vec<Regex>,
}

impl FieldPatterns {
    pub fn new(patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// First capture group of the first matching pattern, trimmed.
    pub fn first_match(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
    }

    fn first_u64(&self, text: &str) -> Option<u64> {
        self.first_match(text).and_then(|v| v.replace(',', "").parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Extracts structured facts from one vendor's CLI output.
///
/// Extraction is a pure function of the output text: the same text always
/// produces the same facts.
#[derive(Debug, Clone)]
pub struct FactExtractor {
    vendor: String,
    model: FieldPatterns,
    version: FieldPatterns,
    serial: FieldPatterns,
    uptime: FieldPatterns,
    interface_name: Regex,
    mtu: FieldPatterns,
    speed: FieldPatterns,
    duplex: FieldPatterns,
    input_packets: FieldPatterns,
    output_packets: FieldPatterns,
    input_bytes: FieldPatterns,
    output_bytes: FieldPatterns,
    input_errors: FieldPatterns,
    output_errors: FieldPatterns,
}

/// Leading interface-name shapes seen across the supported CLIs. The name
/// may be split from its index by whitespace ("GigabitEthernet 0/0/1"),
/// which a naive column split would break apart.
const INTERFACE_NAME: &str = r"(?x)
    (?:Ten)?GigabitEthernet|FastEthernet|Ethernet|Eth-Trunk|Eth
    |GE|XGE|MEth|M-Ethernet
    |Vlanif|Vlan-interface|Vlan
    |LoopBack|Loopback|NULL|Null|Aux
    |Bridge-Aggregation|AggregatePort|Port-channel
";

impl FactExtractor {
    pub fn new(vendor: impl Into<String>) -> Self {
        let compile = |pats: &[&str]| {
            // Built-in patterns are static and always compile.
            #[allow(clippy::unwrap_used)]
            FieldPatterns::new(pats).unwrap()
        };
        #[allow(clippy::unwrap_used)]
        let interface_name =
            Regex::new(&format!(r"(?:{INTERFACE_NAME})\s?[\d/:.\-]+")).unwrap();
        Self {
            vendor: vendor.into(),
            model: FieldPatterns::default(),
            version: FieldPatterns::default(),
            serial: FieldPatterns::default(),
            uptime: FieldPatterns::default(),
            interface_name,
            mtu: compile(&[r"(?i)MTU(?:\s+is)?\s*:?\s*(\d+)"]),
            speed: compile(&[r"(?i)speed\s*:?\s*(\d+)", r"(?i)BW\s+(\d+)\s*[Kk]bit"]),
            duplex: compile(&[r"(?i)(half|full)[\s-]duplex", r"(?i)duplex\s*:?\s*(half|full)"]),
            input_packets: compile(&[
                r"(?i)(\d[\d,]*)\s+packets input",
                r"(?i)input.*?:\s*(\d[\d,]*)\s+packets",
            ]),
            output_packets: compile(&[
                r"(?i)(\d[\d,]*)\s+packets output",
                r"(?i)output.*?:\s*(\d[\d,]*)\s+packets",
            ]),
            input_bytes: compile(&[
                r"(?i)packets input,\s*(\d[\d,]*)\s+bytes",
                r"(?i)input.*?packets,\s*(\d[\d,]*)\s+bytes",
            ]),
            output_bytes: compile(&[
                r"(?i)packets output,\s*(\d[\d,]*)\s+bytes",
                r"(?i)output.*?packets,\s*(\d[\d,]*)\s+bytes",
            ]),
            input_errors: compile(&[
                r"(?i)(\d[\d,]*)\s+input errors",
                r"(?i)input errors?\s*:?\s*(\d[\d,]*)",
            ]),
            output_errors: compile(&[
                r"(?i)(\d[\d,]*)\s+output errors",
                r"(?i)output errors?\s*:?\s*(\d[\d,]*)",
            ]),
        }
    }

    pub fn with_model(mut self, patterns: FieldPatterns) -> Self {
        self.model = patterns;
        self
    }

    pub fn with_version(mut self, patterns: FieldPatterns) -> Self {
        self.version = patterns;
        self
    }

    pub fn with_serial(mut self, patterns: FieldPatterns) -> Self {
        self.serial = patterns;
        self
    }

    pub fn with_uptime(mut self, patterns: FieldPatterns) -> Self {
        self.uptime = patterns;
        self
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Extract identity facts from version-command output. Fields with no
    /// matching pattern stay empty.
    pub fn device_facts(&self, output: &str) -> DeviceFacts {
        let facts = DeviceFacts {
            vendor: self.vendor.clone(),
            model: self.model.first_match(output).unwrap_or_default(),
            version: self.version.first_match(output).unwrap_or_default(),
            serial_number: self.serial.first_match(output).unwrap_or_default(),
            uptime: self.uptime.first_match(output).unwrap_or_default(),
        };
        trace!("extracted facts: {facts:?}");
        facts
    }

    /// Parse an interface summary table.
    ///
    /// The table starts at the first line carrying the header keywords;
    /// everything before it (uptime banners, utilization legends) is
    /// skipped. Rows whose first column is not a recognizable interface
    /// name are skipped too.
    pub fn interfaces(&self, output: &str) -> Vec<InterfaceFacts> {
        let mut rows = Vec::new();
        let mut in_table = false;

        for line in output.lines() {
            let line = line.trim_end();
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }
            if !in_table {
                if Self::looks_like_header(trimmed) {
                    in_table = true;
                }
                continue;
            }
            if trimmed.chars().all(|c| matches!(c, '-' | '=' | '*' | ' ')) {
                continue;
            }
            if let Some(row) = self.parse_row(trimmed) {
                rows.push(row);
            }
        }
        rows
    }

    /// Fill counters, MTU, speed, and duplex from a per-interface detail
    /// command's output.
    pub fn apply_detail(&self, iface: &mut InterfaceFacts, output: &str) {
        if let Some(mtu) = self.mtu.first_u64(output) {
            iface.mtu = u32::try_from(mtu).ok();
        }
        if let Some(speed) = self.speed.first_match(output) {
            iface.speed = speed;
        }
        if let Some(duplex) = self.duplex.first_match(output) {
            iface.duplex = duplex.to_lowercase();
        }
        iface.counters = Some(InterfaceCounters {
            input_packets: self.input_packets.first_u64(output).unwrap_or_default(),
            output_packets: self.output_packets.first_u64(output).unwrap_or_default(),
            input_bytes: self.input_bytes.first_u64(output).unwrap_or_default(),
            output_bytes: self.output_bytes.first_u64(output).unwrap_or_default(),
            input_errors: self.input_errors.first_u64(output).unwrap_or_default(),
            output_errors: self.output_errors.first_u64(output).unwrap_or_default(),
        });
    }

    fn looks_like_header(line: &str) -> bool {
        let lower = line.to_lowercase();
        (lower.contains("interface") || lower.starts_with("port"))
            && (lower.contains("status")
                || lower.contains("state")
                || lower.contains("link")
                || lower.contains("phy"))
    }

    fn parse_row(&self, line: &str) -> Option<InterfaceFacts> {
        let m = self.interface_name.find(line)?;
        if m.start() != 0 {
            return None;
        }
        let name = line[m.range()].split_whitespace().collect::<Vec<_>>().join("");
        let rest = line[m.end()..].trim();
        let mut columns = rest.split_whitespace();

        let status = columns.next().map(Self::normalize_status).unwrap_or_default();
        let protocol = columns.next().map(Self::normalize_status).unwrap_or_default();
        let description = columns.collect::<Vec<_>>().join(" ");

        Some(InterfaceFacts {
            name,
            status,
            protocol,
            description,
            ..InterfaceFacts::default()
        })
    }

    /// Lowercase the column and expand the `*down` shorthand for
    /// administratively disabled ports.
    fn normalize_status(column: &str) -> String {
        let lower = column.to_lowercase();
        if lower == "*down" {
            "admin-down".to_string()
        } else {
            lower
        }
    }
}
