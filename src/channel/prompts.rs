//! Prompt and cue detection.
//!
//! Device prompts are recognized by a small set of terminal sigils
//! (`#`, `>`, `]`, `$`, `%`) appearing at the end of accumulated output,
//! with tolerance for trailing whitespace. Exact-match detection does not
//! survive real fleets: padding, color codes, and hostname decorations
//! vary by vendor and by privilege depth.

use memchr::memmem;
use regex::bytes::Regex;

/// Compiled prompt patterns for one vendor: the set of sigils that mean
/// "ready for a command" and the subset that marks the elevated mode.
#[derive(Debug, Clone)]
pub struct PromptSet {
    ready: Regex,
    elevated: Regex,
}

impl PromptSet {
    /// Build from explicit regex patterns. Patterns without an end anchor
    /// get `\s*$` appended, matching the suffix-scan contract.
    pub fn new(ready: &str, elevated: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            ready: Regex::new(&anchor(ready))?,
            elevated: Regex::new(&anchor(elevated))?,
        })
    }

    /// Build from raw sigil characters, e.g. `">#]$%"` and `"#]"`.
    pub fn from_sigils(ready: &str, elevated: &str) -> Self {
        let class = |sigils: &str| format!("[{}]", regex::escape(sigils));
        // Escaped single-character classes always compile.
        #[allow(clippy::unwrap_used)]
        Self::new(&class(ready), &class(elevated)).unwrap()
    }

    /// Pattern matching any ready prompt.
    pub fn ready(&self) -> &Regex {
        &self.ready
    }

    /// Pattern matching the elevated-mode prompt.
    pub fn elevated(&self) -> &Regex {
        &self.elevated
    }

    pub fn is_ready(&self, data: &[u8]) -> bool {
        self.ready.is_match(data)
    }

    pub fn is_elevated(&self, data: &[u8]) -> bool {
        self.elevated.is_match(data)
    }
}

fn anchor(pattern: &str) -> String {
    if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("{pattern}\\s*$")
    }
}

/// Scan raw output for any of the given textual cues (substring match).
///
/// Cues are written without their leading capital so the scan tolerates
/// `Username:` vs `username:` without a lowercasing pass.
pub fn contains_cue(data: &[u8], cues: &[&str]) -> bool {
    cues.iter().any(|cue| memmem::find(data, cue.as_bytes()).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigil_set_matches_vendor_prompts() {
        let prompts = PromptSet::from_sigils(">#]$%", "#]");

        assert!(prompts.is_ready(b"<Huawei>"));
        assert!(prompts.is_ready(b"[Huawei]"));
        assert!(prompts.is_ready(b"Ruijie# "));
        assert!(prompts.is_ready(b"Switch> \r\n"));
        assert!(!prompts.is_ready(b"User Access Verification"));

        assert!(prompts.is_elevated(b"[Huawei]"));
        assert!(prompts.is_elevated(b"Ruijie#"));
        assert!(!prompts.is_elevated(b"Ruijie>"));
    }

    #[test]
    fn anchored_pattern_is_kept_verbatim() {
        let prompts = PromptSet::new(r"<[\w.-]+>$", r"\[[\w.-]+\]$").unwrap();
        assert!(prompts.is_ready(b"<SW-floor3>"));
        assert!(!prompts.is_ready(b"<SW-floor3> trailing"));
    }

    #[test]
    fn cue_scan_is_substring_based() {
        assert!(contains_cue(b"Username:", &["sername:", "ogin:"]));
        assert!(contains_cue(b"login: ", &["sername:", "ogin:"]));
        assert!(contains_cue(b"Enter Password: ", &["assword"]));
        assert!(!contains_cue(b"<Switch>", &["sername:", "ogin:"]));
    }
}
