//! Command execution with retry, reconnect, and output normalization.
//!
//! One executor serves one vendor profile. Transport failures during a
//! command get a bounded reconnect budget with a backoff between attempts;
//! an inactivity timeout gets exactly one reconnect-and-retry. The two
//! budgets are independent: a flapping link and a wedged command are
//! different failures and are reported differently.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::time::sleep;

use crate::channel::contains_cue;
use crate::error::{Error, Result, TimeoutError};
use crate::session::{LoginReport, Session, WaitOutcome};
use crate::vendor::VendorProfile;

/// Outcome of one command exchange.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub command: String,
    /// Output with the command echo and trailing prompt removed.
    pub output: String,
    /// Output exactly as accumulated, echo and prompt included.
    pub raw: String,
    pub elapsed: Duration,
    /// Set when the device reported the command as unrecognized.
    pub failure: Option<String>,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Drives command exchanges over a session using one vendor's profile.
pub struct CommandExecutor {
    profile: Arc<VendorProfile>,
}

impl CommandExecutor {
    pub fn new(profile: Arc<VendorProfile>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    /// Open, authenticate, escalate (best-effort), and disable pagination.
    /// Leaves the session `Ready`.
    pub async fn connect(&self, session: &mut Session) -> Result<LoginReport> {
        session.open().await?;
        let report = self
            .profile
            .login_chain()
            .authenticate(session, &self.profile.prompts, &self.profile.login_cues)
            .await?;
        debug!(
            "authenticated to {} via '{}' strategy",
            session.endpoint().host,
            report.strategy
        );

        if let Some(escalator) = &self.profile.escalator {
            if let Err(e) = escalator.escalate(session, &self.profile.prompts).await {
                warn!("privilege escalation failed, continuing unprivileged: {e}");
            }
        }

        self.suppress_pagination(session).await?;
        Ok(report)
    }

    /// Send every pagination-disabling command the vendor knows, ignoring
    /// whether the device recognizes them.
    async fn suppress_pagination(&self, session: &mut Session) -> Result<()> {
        let settle = session.timing().settle_delay;
        for command in &self.profile.commands.pagination {
            session.drain().await?;
            session.write_line(command).await?;
            session.read_until(self.profile.prompts.ready(), settle).await?;
            session.buffer_mut().clear();
        }
        Ok(())
    }

    /// Execute `command`, waiting up to `timeout` of device inactivity for
    /// the prompt to return.
    ///
    /// Transport errors trigger reconnect-and-retry up to the timing retry
    /// budget; an inactivity timeout triggers a single reconnect-and-retry.
    pub async fn execute(
        &self,
        session: &mut Session,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandResult> {
        let budget = session.timing().retry_budget.max(1);
        let backoff = session.timing().reconnect_backoff;
        let mut transport_attempts = 0u32;
        let mut timeout_retried = false;

        loop {
            match self.try_execute(session, command, timeout).await {
                Ok(result) => return Ok(result),
                Err(e @ Error::Connection(_)) => {
                    transport_attempts += 1;
                    if transport_attempts >= budget {
                        return Err(e);
                    }
                    warn!(
                        "transport error on '{command}' (attempt {transport_attempts}/{budget}): \
                         {e}; reconnecting"
                    );
                    sleep(backoff).await;
                    self.reestablish(session).await?;
                }
                Err(Error::Timeout(t)) => {
                    if timeout_retried {
                        return Err(Error::Timeout(t));
                    }
                    timeout_retried = true;
                    warn!("'{command}' timed out ({t}); reconnecting for one retry");
                    self.reestablish(session).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute a command that asks interactive questions, answering each
    /// cue with the paired reply. Used for save/confirm handshakes.
    pub async fn execute_with_replies(
        &self,
        session: &mut Session,
        command: &str,
        replies: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<CommandResult> {
        self.require_ready(session)?;
        session.mark_executing();
        let started = Instant::now();

        session.drain().await?;
        session.write_line(command).await?;

        let poll = session.timing().poll_interval;
        let mut answered = vec![false; replies.len()];
        let mut deadline = Instant::now() + timeout;
        loop {
            let n = session.poll_once().await?;
            if n > 0 {
                deadline = Instant::now() + timeout;
                if session.buffer().tail_contains(self.profile.prompts.ready()) {
                    break;
                }
                for (i, (cue, reply)) in replies.iter().copied().enumerate() {
                    if !answered[i] && contains_cue(session.buffer().as_slice(), &[cue]) {
                        debug!("answering '{cue}' with '{reply}'");
                        session.write_line(reply).await?;
                        answered[i] = true;
                    }
                }
                continue;
            }
            if Instant::now() >= deadline {
                session.fail();
                return Err(TimeoutError::new(format!("command '{command}'"), timeout).into());
            }
            sleep(poll).await;
        }

        let raw = session.take_output();
        session.mark_ready();
        Ok(self.finish(command, raw, started))
    }

    async fn try_execute(
        &self,
        session: &mut Session,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandResult> {
        self.require_ready(session)?;
        session.mark_executing();
        let started = Instant::now();

        let raw = self.exchange(session, command, timeout).await?;
        let mut result = self.finish(command, raw, started);

        // A denial on an unelevated session is worth one escalation and
        // one more try. A refused escalation is not fatal: the denied
        // output goes back to the caller and the session stays usable.
        if !session.elevated()
            && self.matches_any(&result.output, &self.profile.access_denied_markers)
        {
            if let Some(escalator) = &self.profile.escalator {
                debug!("'{command}' denied; escalating and retrying once");
                match escalator.escalate(session, &self.profile.prompts).await {
                    Ok(_) => {
                        session.mark_executing();
                        let raw = self.exchange(session, command, timeout).await?;
                        result = self.finish(command, raw, started);
                    }
                    Err(e) if e.is_transport() => return Err(e),
                    Err(e) => {
                        warn!(
                            "escalation for '{command}' failed; returning the denied \
                             output: {e}"
                        );
                    }
                }
            }
        }

        session.mark_ready();
        Ok(result)
    }

    async fn exchange(
        &self,
        session: &mut Session,
        command: &str,
        timeout: Duration,
    ) -> Result<String> {
        session.drain().await?;
        session.write_line(command).await?;
        match session
            .read_until(self.profile.prompts.ready(), timeout)
            .await?
        {
            WaitOutcome::Prompt => Ok(session.take_output()),
            WaitOutcome::Inactive => {
                session.fail();
                Err(TimeoutError::new(format!("command '{command}'"), timeout).into())
            }
        }
    }

    fn require_ready(&self, session: &Session) -> Result<()> {
        use crate::session::SessionState;
        match session.state() {
            SessionState::Ready => Ok(()),
            other => Err(Error::NotReady {
                state: other.to_string(),
            }),
        }
    }

    fn finish(&self, command: &str, raw: String, started: Instant) -> CommandResult {
        let output = self.normalize(command, &raw);
        let failure = self
            .profile
            .invalid_markers
            .iter()
            .find(|marker| output.contains(*marker))
            .map(|marker| format!("device rejected command: matched '{marker}'"));
        CommandResult {
            command: command.to_string(),
            output,
            raw,
            elapsed: started.elapsed(),
            failure,
        }
    }

    /// Strip the echoed command, residual pagination markers, and the
    /// trailing prompt from raw output.
    fn normalize(&self, command: &str, raw: &str) -> String {
        let cleaned = raw.replace("--More--", "").replace('\u{8}', "");
        let mut lines: Vec<&str> = cleaned.lines().collect();

        while let Some(first) = lines.first() {
            let first = first.trim();
            if first == command || first.ends_with(command) {
                lines.remove(0);
            } else {
                break;
            }
        }

        while let Some(last) = lines.last() {
            let trimmed = last.trim();
            if trimmed.is_empty() || self.profile.prompts.is_ready(trimmed.as_bytes()) {
                lines.pop();
            } else {
                break;
            }
        }

        lines.join("\n").trim().to_string()
    }

    fn matches_any(&self, output: &str, markers: &[&str]) -> bool {
        markers.iter().any(|marker| output.contains(marker))
    }

    /// Reconnect and re-run the authentication and setup sequence after a
    /// broken exchange.
    async fn reestablish(&self, session: &mut Session) -> Result<()> {
        session.open().await?;
        self.profile
            .login_chain()
            .authenticate(session, &self.profile.prompts, &self.profile.login_cues)
            .await?;
        if let Some(escalator) = &self.profile.escalator {
            if let Err(e) = escalator.escalate(session, &self.profile.prompts).await {
                debug!("escalation after reconnect failed: {e}");
            }
        }
        self.suppress_pagination(session).await?;
        Ok(())
    }
}
