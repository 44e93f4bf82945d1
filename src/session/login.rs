//! Login strategy chain.
//!
//! Authentication against embedded terminal servers is messy: some devices
//! prompt for a username, some drop straight into a password prompt, some
//! print a banner and nothing else. The chain tries a prioritized sequence
//! of strategies against the session until one yields a recognized prompt.
//! Strategies differ only in how strictly they wait for cues versus acting
//! proactively.
//!
//! A strategy that ends with a non-empty response but no recognized prompt
//! is a *soft success*: the connection is kept and used. Many devices'
//! banners and MOTDs simply never match the standard prompt sigils. This is
//! a known source of false-positive authentication; see the tests.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use secrecy::ExposeSecret;
use tokio::time::sleep;

use super::{Session, WaitOutcome};
use crate::channel::{PromptSet, contains_cue};
use crate::error::{ConnectionError, Result};

/// Textual cues that precede credential input.
#[derive(Debug, Clone)]
pub struct LoginCues {
    /// Substrings announcing the username prompt.
    pub username: Vec<&'static str>,
    /// Substrings announcing a password prompt.
    pub password: Vec<&'static str>,
}

impl Default for LoginCues {
    fn default() -> Self {
        Self {
            username: vec!["sername:", "ogin:", "sername "],
            password: vec!["assword"],
        }
    }
}

/// How a successful login was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A recognized command prompt appeared.
    Prompt,
    /// Non-empty response without a recognized prompt; accepted anyway.
    Soft,
}

/// Which strategy succeeded, and how.
#[derive(Debug, Clone)]
pub struct LoginReport {
    pub strategy: &'static str,
    pub outcome: LoginOutcome,
}

/// Verdict of a single strategy attempt.
#[derive(Debug)]
pub enum StrategyVerdict {
    Prompt,
    Soft,
    /// No prompt and nothing usable; carries the failure detail.
    NoPrompt(String),
}

/// One authentication procedure.
#[async_trait]
pub trait LoginStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the procedure on an `Authenticating` session. `Err` means the
    /// transport itself failed; the chain records it and moves on.
    async fn attempt(
        &self,
        session: &mut Session,
        prompts: &PromptSet,
        cues: &LoginCues,
    ) -> Result<StrategyVerdict>;
}

/// Prioritized sequence of strategies tried until one succeeds.
pub struct LoginChain {
    strategies: Vec<Box<dyn LoginStrategy>>,
}

impl LoginChain {
    /// The standard three-strategy ladder: send immediately, wait for
    /// cues, then the slow patient fallback.
    pub fn standard() -> Self {
        Self {
            strategies: vec![
                Box::new(DirectLogin),
                Box::new(CueWaitLogin),
                Box::new(PatientLogin),
            ],
        }
    }

    /// Build a chain from custom strategies, in priority order.
    pub fn custom(strategies: Vec<Box<dyn LoginStrategy>>) -> Self {
        Self { strategies }
    }

    /// Try each strategy in order. On success the session becomes `Ready`;
    /// on exhaustion it becomes `Failed` and the error carries every
    /// per-strategy failure message.
    pub async fn authenticate(
        &self,
        session: &mut Session,
        prompts: &PromptSet,
        cues: &LoginCues,
    ) -> Result<LoginReport> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            debug!("login: trying strategy '{}'", strategy.name());
            match strategy.attempt(session, prompts, cues).await {
                Ok(StrategyVerdict::Prompt) => {
                    debug!("login: strategy '{}' found a prompt", strategy.name());
                    session.mark_ready();
                    return Ok(LoginReport {
                        strategy: strategy.name(),
                        outcome: LoginOutcome::Prompt,
                    });
                }
                Ok(StrategyVerdict::Soft) => {
                    warn!(
                        "login: strategy '{}' got output but no recognized prompt; \
                         continuing on soft success",
                        strategy.name()
                    );
                    session.mark_ready();
                    return Ok(LoginReport {
                        strategy: strategy.name(),
                        outcome: LoginOutcome::Soft,
                    });
                }
                Ok(StrategyVerdict::NoPrompt(detail)) => {
                    failures.push(format!("{}: {detail}", strategy.name()));
                }
                Err(e) => {
                    failures.push(format!("{}: {e}", strategy.name()));
                }
            }
        }

        session.fail();
        Err(ConnectionError::LoginExhausted { attempts: failures }.into())
    }
}

/// Poll until one of `cues` shows up or the grace window elapses.
pub(crate) async fn wait_for_cue(
    session: &mut Session,
    cues: &[&str],
    grace: Duration,
) -> Result<bool> {
    let poll = session.timing().poll_interval;
    let deadline = Instant::now() + grace;
    loop {
        session.poll_once().await?;
        if contains_cue(session.buffer().as_slice(), cues) {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        sleep(poll).await;
    }
}

/// Send username then password, pausing a settle delay after each.
async fn send_credentials(session: &mut Session, settle: Duration) -> Result<()> {
    let username = session.endpoint().username.clone();
    session.write_line(&username).await?;
    session.read_for(settle).await?;

    let password = session.endpoint().password.expose_secret().to_owned();
    session.write_line(&password).await?;
    session.read_for(settle).await?;
    Ok(())
}

/// Send up to `probes` bare newlines, checking after each for a prompt.
async fn probe_for_prompt(
    session: &mut Session,
    prompts: &PromptSet,
    probes: u32,
    settle: Duration,
) -> Result<StrategyVerdict> {
    for _ in 0..probes {
        session.write_line("").await?;
        if session.read_until(prompts.ready(), settle).await? == WaitOutcome::Prompt {
            return Ok(StrategyVerdict::Prompt);
        }
    }

    if !session.buffer().as_str_lossy().trim().is_empty() {
        return Ok(StrategyVerdict::Soft);
    }
    Ok(StrategyVerdict::NoPrompt(format!(
        "no prompt after {probes} newline probes and empty response"
    )))
}

/// Sends the credentials immediately without waiting for any cue.
pub struct DirectLogin;

#[async_trait]
impl LoginStrategy for DirectLogin {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn attempt(
        &self,
        session: &mut Session,
        prompts: &PromptSet,
        _cues: &LoginCues,
    ) -> Result<StrategyVerdict> {
        let timing = session.timing().clone();
        send_credentials(session, timing.settle_delay).await?;
        probe_for_prompt(session, prompts, timing.newline_probes, timing.settle_delay).await
    }
}

/// Waits a grace window for a username cue before sending; proceeds
/// unconditionally if the cue never arrives.
pub struct CueWaitLogin;

#[async_trait]
impl LoginStrategy for CueWaitLogin {
    fn name(&self) -> &'static str {
        "cue-wait"
    }

    async fn attempt(
        &self,
        session: &mut Session,
        prompts: &PromptSet,
        cues: &LoginCues,
    ) -> Result<StrategyVerdict> {
        let timing = session.timing().clone();
        if wait_for_cue(session, &cues.username, timing.cue_grace).await? {
            debug!("login: username cue detected");
        } else {
            debug!("login: no username cue within grace, sending anyway");
        }
        send_credentials(session, timing.settle_delay).await?;
        probe_for_prompt(session, prompts, timing.newline_probes, timing.settle_delay).await
    }
}

/// Slow fallback: clears the line state first, doubles the settle delays,
/// and probes more times. Catches devices that drop input while busy.
pub struct PatientLogin;

#[async_trait]
impl LoginStrategy for PatientLogin {
    fn name(&self) -> &'static str {
        "patient"
    }

    async fn attempt(
        &self,
        session: &mut Session,
        prompts: &PromptSet,
        _cues: &LoginCues,
    ) -> Result<StrategyVerdict> {
        let timing = session.timing().clone();
        let settle = timing.settle_delay * 2;

        // Reset whatever half-typed state the line is in.
        session.write_raw(b"\r\n").await?;
        session.read_for(settle).await?;
        if session.buffer().tail_contains(prompts.ready()) {
            return Ok(StrategyVerdict::Prompt);
        }
        session.drain().await?;

        send_credentials(session, settle).await?;
        let probes = timing.newline_probes.max(5);
        probe_for_prompt(session, prompts, probes, settle).await
    }
}
