//! Privilege escalation on an authenticated session.
//!
//! Escalation is best-effort by contract: callers that need elevated mode
//! try it, log a failure, and continue with the unprivileged prompt. Most
//! read-only operations work either way; only configuration writes hard-
//! require the elevated mode, and those surface the escalation error.

use log::{debug, warn};
use secrecy::ExposeSecret;

use super::login::wait_for_cue;
use super::{Session, WaitOutcome};
use crate::channel::PromptSet;
use crate::error::{PrivilegeError, Result};

/// How the elevated mode was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// The elevated prompt appeared.
    Elevated,
    /// The session was already elevated; nothing was sent.
    AlreadyElevated,
    /// The device answered without an elevated prompt or a rejection;
    /// treated as elevated anyway.
    Soft,
}

/// Drives one vendor's escalation exchange.
///
/// The exchange is command, optional password on cue, then prompt
/// verification by newline probe. Vendors that enter elevated mode without
/// a password (mode-switch commands like `system-view`) skip the middle
/// step naturally because no password cue arrives.
#[derive(Debug, Clone)]
pub struct PrivilegeEscalator {
    command: String,
    /// Used when the endpoint carries no enable password. `None` falls
    /// back to the login password.
    default_password: Option<String>,
    /// Substrings that mean the device rejected the escalation.
    rejection_markers: Vec<&'static str>,
    password_cues: Vec<&'static str>,
}

impl PrivilegeEscalator {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            default_password: None,
            rejection_markers: vec!["ad password", "ad secrets", "ermission denied", "nvalid"],
            password_cues: vec!["assword"],
        }
    }

    pub fn with_default_password(mut self, password: impl Into<String>) -> Self {
        self.default_password = Some(password.into());
        self
    }

    pub fn with_rejection_markers(mut self, markers: Vec<&'static str>) -> Self {
        self.rejection_markers = markers;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the escalation exchange. On success the session is marked
    /// elevated; on failure it stays usable at its current level.
    pub async fn escalate(
        &self,
        session: &mut Session,
        prompts: &PromptSet,
    ) -> Result<EscalationOutcome> {
        if session.elevated() {
            return Ok(EscalationOutcome::AlreadyElevated);
        }

        let timing = session.timing().clone();

        session.drain().await?;
        debug!("escalating with '{}'", self.command);
        session.write_line(&self.command).await?;

        if wait_for_cue(session, &self.password_cues, timing.cue_grace).await? {
            let password = self.resolve_password(session);
            session.buffer_mut().clear();
            session.write_line(&password).await?;
            session.read_for(timing.settle_delay).await?;
        }

        if session.buffer().tail_contains(prompts.elevated()) {
            session.set_elevated(true);
            return Ok(EscalationOutcome::Elevated);
        }

        // One probe in case the device needs a nudge to redraw the prompt.
        session.write_line("").await?;
        if session.read_until(prompts.elevated(), timing.settle_delay).await?
            == WaitOutcome::Prompt
        {
            session.set_elevated(true);
            return Ok(EscalationOutcome::Elevated);
        }

        let response = session.buffer().as_str_lossy().into_owned();
        if self
            .rejection_markers
            .iter()
            .any(|marker| response.contains(marker))
        {
            return Err(PrivilegeError::new(format!(
                "escalation with '{}' rejected by device",
                self.command
            ))
            .into());
        }

        if !response.trim().is_empty() {
            warn!(
                "escalation with '{}' got output but no elevated prompt; \
                 continuing on soft success",
                self.command
            );
            session.set_elevated(true);
            return Ok(EscalationOutcome::Soft);
        }

        Err(PrivilegeError::new(format!(
            "no response to escalation command '{}'",
            self.command
        ))
        .into())
    }

    fn resolve_password(&self, session: &Session) -> String {
        if let Some(enable) = &session.endpoint().enable_password {
            return enable.expose_secret().to_owned();
        }
        if let Some(default) = &self.default_password {
            return default.clone();
        }
        session.endpoint().password.expose_secret().to_owned()
    }
}
