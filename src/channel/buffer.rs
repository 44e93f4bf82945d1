//! Accumulation buffer with tail-limited pattern search.
//!
//! Prompt patterns are only searched over the last N bytes of accumulated
//! output. For large outputs (a full running configuration, say) searching
//! the whole buffer on every poll tick would dominate the loop.

use bytes::BytesMut;
use regex::bytes::Regex;

/// Default number of trailing bytes searched for prompt patterns.
const DEFAULT_SEARCH_DEPTH: usize = 1000;

/// Buffer for accumulating device output and searching its tail.
///
/// Incoming data is stripped of ANSI escape sequences before accumulation;
/// colored prompts and cursor noise would otherwise defeat the suffix
/// patterns. The strip also removes bare carriage returns, so buffered
/// text is `\n`-terminated; downstream line handling relies on this.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: BytesMut,
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a pattern buffer searching the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
        }
    }

    /// Append new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search only the tail of the buffer for the pattern.
    pub fn search_tail(&self, pattern: &Regex) -> Option<regex::bytes::Match<'_>> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.find(&self.buffer[start..])
    }

    /// Check whether the tail contains a match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    /// Take the contents as a lossy UTF-8 string and reset.
    pub fn take_string(&mut self) -> String {
        String::from_utf8_lossy(&self.take()).into_owned()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}
