//! End-to-end tests against scripted in-memory devices.
//!
//! The simulator answers like a switch: it echoes commands, redraws its
//! prompt, asks login questions, and can be configured to stay silent,
//! reject writes, or answer without any recognizable prompt.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use switchwire::channel::{Channel, ChannelFactory, PromptSet};
use switchwire::error::ConnectionError;
use switchwire::session::{LoginOutcome, PrivilegeEscalator, Session, SessionState};
use switchwire::vendor::Adapter;
use switchwire::{
    AdapterRegistry, CommandExecutor, DeviceEndpoint, Error, FactExtractor, Timing, VendorProfile,
};

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct SimConfig {
    username: &'static str,
    password: &'static str,
    prompt: &'static str,
    elevated_prompt: &'static str,
    escalate_command: &'static str,
    /// Some means `escalate_command` asks for this password first.
    escalate_password: Option<&'static str>,
    /// Respond to escalation without any prompt at all.
    soft_escalation: bool,
    /// After a correct password, answer with this text instead of the
    /// prompt (soft-success login).
    soft_login_banner: Option<&'static str>,
    /// Ignore all input until this many bare newlines have arrived, then
    /// answer every bare newline with the prompt.
    silent_until_newlines: Option<u32>,
    /// Writes of exactly this command fail with a connection reset.
    fail_on_command: Option<&'static str>,
    /// Command -> response body (echo and prompt are added around it).
    responses: Vec<(&'static str, &'static str)>,
    /// Save handshake: trigger command, question, expected answer, outcome.
    save: Option<(&'static str, &'static str, &'static str, &'static str)>,
    unknown_response: &'static str,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            username: "admin",
            password: "secret",
            prompt: "<Switch>",
            elevated_prompt: "[Switch]",
            escalate_command: "system-view",
            escalate_password: None,
            soft_escalation: false,
            soft_login_banner: None,
            silent_until_newlines: None,
            fail_on_command: None,
            responses: vec![],
            save: None,
            unknown_response: "Error: Unrecognized command found at '^' position.",
        }
    }
}

#[derive(Default)]
struct SimStats {
    opens: u32,
    commands: Vec<String>,
}

#[derive(Clone)]
struct SimFactory {
    config: Arc<SimConfig>,
    stats: Arc<Mutex<SimStats>>,
}

impl SimFactory {
    fn new(config: SimConfig) -> Self {
        Self {
            config: Arc::new(config),
            stats: Arc::new(Mutex::new(SimStats::default())),
        }
    }

    fn opens(&self) -> u32 {
        self.stats.lock().unwrap().opens
    }

    fn commands(&self) -> Vec<String> {
        self.stats.lock().unwrap().commands.clone()
    }
}

#[async_trait]
impl ChannelFactory for SimFactory {
    async fn open(
        &self,
        _endpoint: &DeviceEndpoint,
    ) -> Result<Box<dyn Channel>, ConnectionError> {
        self.stats.lock().unwrap().opens += 1;
        let mut channel = SimChannel {
            config: self.config.clone(),
            stats: self.stats.clone(),
            outbox: VecDeque::new(),
            line: Vec::new(),
            stage: Stage::Username,
            elevated: false,
            newlines: 0,
            closed: false,
        };
        if self.config.silent_until_newlines.is_none() {
            channel.emit("Username: ");
        }
        Ok(Box::new(channel))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Username,
    Password,
    Shell,
    EnablePassword,
    SaveConfirm,
}

struct SimChannel {
    config: Arc<SimConfig>,
    stats: Arc<Mutex<SimStats>>,
    outbox: VecDeque<u8>,
    line: Vec<u8>,
    stage: Stage,
    elevated: bool,
    newlines: u32,
    closed: bool,
}

impl SimChannel {
    fn emit(&mut self, text: &str) {
        self.outbox.extend(text.as_bytes());
    }

    fn prompt(&self) -> &'static str {
        if self.elevated {
            self.config.elevated_prompt
        } else {
            self.config.prompt
        }
    }

    fn handle_line(&mut self, line: String) -> io::Result<()> {
        if let Some(fail_on) = self.config.fail_on_command {
            if line == fail_on {
                self.stats.lock().unwrap().commands.push(line);
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ));
            }
        }

        if let Some(threshold) = self.config.silent_until_newlines {
            if line.is_empty() {
                self.newlines += 1;
                if self.newlines >= threshold {
                    let prompt = self.config.prompt;
                    self.emit(prompt);
                }
            }
            return Ok(());
        }

        match self.stage {
            Stage::Username => {
                if line == self.config.username {
                    self.emit("Password: ");
                    self.stage = Stage::Password;
                } else if !line.is_empty() {
                    self.emit("Login incorrect\r\nUsername: ");
                }
            }
            Stage::Password => {
                if line == self.config.password {
                    self.stage = Stage::Shell;
                    if let Some(banner) = self.config.soft_login_banner {
                        self.emit(banner);
                    } else {
                        let prompt = self.prompt();
                        self.emit(prompt);
                    }
                } else {
                    self.emit("Login incorrect\r\nUsername: ");
                    self.stage = Stage::Username;
                }
            }
            Stage::EnablePassword => {
                self.stage = Stage::Shell;
                if Some(line.as_str()) == self.config.escalate_password {
                    self.elevated = true;
                    let prompt = self.prompt();
                    self.emit(prompt);
                } else {
                    self.emit("Bad password\r\n");
                    let prompt = self.prompt();
                    self.emit(prompt);
                }
            }
            Stage::SaveConfirm => {
                self.stage = Stage::Shell;
                if let Some((_, _, answer, outcome)) = self.config.save {
                    if line == answer {
                        self.emit(outcome);
                        self.emit("\r\n");
                    } else {
                        self.emit("Aborted.\r\n");
                    }
                }
                let prompt = self.prompt();
                self.emit(prompt);
            }
            Stage::Shell => self.handle_command(line),
        }
        Ok(())
    }

    fn handle_command(&mut self, line: String) {
        if line.is_empty() {
            if self.config.soft_login_banner.is_none() {
                let prompt = self.prompt();
                self.emit(prompt);
            }
            return;
        }

        self.stats.lock().unwrap().commands.push(line.clone());
        self.emit(&line);
        self.emit("\r\n");

        if let Some((trigger, question, _, _)) = self.config.save {
            if line == trigger {
                self.emit(question);
                self.stage = Stage::SaveConfirm;
                return;
            }
        }

        if line == self.config.escalate_command {
            if self.config.escalate_password.is_some() {
                self.emit("Password: ");
                self.stage = Stage::EnablePassword;
            } else if self.config.soft_escalation {
                self.emit("entering privileged context\r\n");
            } else {
                self.elevated = true;
                let prompt = self.prompt();
                self.emit(prompt);
            }
            return;
        }

        let response = self
            .config
            .responses
            .iter()
            .find(|(command, _)| *command == line)
            .map(|(_, response)| *response);
        match response {
            Some(body) => {
                self.emit(body);
                self.emit("\r\n");
            }
            None => {
                let unknown = self.config.unknown_response;
                self.emit(unknown);
                self.emit("\r\n");
            }
        }
        let prompt = self.prompt();
        self.emit(prompt);
    }
}

#[async_trait]
impl Channel for SimChannel {
    async fn read_available(&mut self) -> io::Result<Vec<u8>> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "channel closed",
            ));
        }
        Ok(self.outbox.drain(..).collect())
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "channel closed",
            ));
        }
        for &byte in data {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.line)
                    .trim_end_matches('\r')
                    .to_string();
                self.line.clear();
                self.handle_line(line)?;
            } else {
                self.line.push(byte);
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn endpoint() -> DeviceEndpoint {
    let _ = env_logger::builder().is_test(true).try_init();
    DeviceEndpoint::new("10.0.0.1")
        .with_username("admin")
        .with_password("secret")
        .with_timing(Timing::snappy())
}

fn bare_profile() -> VendorProfile {
    VendorProfile::new(
        "sim",
        PromptSet::from_sigils(">]#", "]"),
        FactExtractor::new("sim"),
    )
}

const COMWARE_VERSION: &str = "\
H3C Comware Platform Software\r\n\
Comware Software Version 5.70, Release 2208\r\n\
H3C S5120-28P uptime is 0 week, 2 days, 9 hours";

// ---------------------------------------------------------------------------
// Login chain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_direct_strategy_on_cueful_device() {
    let factory = SimFactory::new(SimConfig::default());
    let profile = bare_profile();
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    session.open().await.unwrap();
    let report = profile
        .login_chain()
        .authenticate(&mut session, &profile.prompts, &profile.login_cues)
        .await
        .unwrap();

    assert_eq!(report.strategy, "direct");
    assert_eq!(report.outcome, LoginOutcome::Prompt);
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn login_falls_through_to_patient_strategy() {
    // The device ignores everything until seven bare newlines have
    // arrived, which outlasts the first two strategies' probe budgets.
    let factory = SimFactory::new(SimConfig {
        silent_until_newlines: Some(7),
        ..SimConfig::default()
    });
    let profile = bare_profile();
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    session.open().await.unwrap();
    let report = profile
        .login_chain()
        .authenticate(&mut session, &profile.prompts, &profile.login_cues)
        .await
        .unwrap();

    assert_eq!(report.strategy, "patient");
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn login_exhaustion_names_every_strategy() {
    let factory = SimFactory::new(SimConfig {
        silent_until_newlines: Some(u32::MAX),
        ..SimConfig::default()
    });
    let profile = bare_profile();
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    session.open().await.unwrap();
    let err = profile
        .login_chain()
        .authenticate(&mut session, &profile.prompts, &profile.login_cues)
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("direct"), "missing direct in: {msg}");
    assert!(msg.contains("cue-wait"), "missing cue-wait in: {msg}");
    assert!(msg.contains("patient"), "missing patient in: {msg}");
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn login_soft_success_without_prompt() {
    // The device accepts the credentials but its banner never shows a
    // prompt sigil. The chain keeps the connection anyway.
    let factory = SimFactory::new(SimConfig {
        soft_login_banner: Some("Welcome to the switch lab\r\n"),
        ..SimConfig::default()
    });
    let profile = bare_profile();
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    session.open().await.unwrap();
    let report = profile
        .login_chain()
        .authenticate(&mut session, &profile.prompts, &profile.login_cues)
        .await
        .unwrap();

    assert_eq!(report.outcome, LoginOutcome::Soft);
    assert_eq!(session.state(), SessionState::Ready);
}

// ---------------------------------------------------------------------------
// Privilege escalation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn escalation_with_password_reaches_elevated_prompt() {
    let factory = SimFactory::new(SimConfig {
        prompt: "Switch>",
        elevated_prompt: "Switch#",
        escalate_command: "enable",
        escalate_password: Some("ruijie"),
        ..SimConfig::default()
    });
    let mut profile = bare_profile();
    profile.prompts = PromptSet::from_sigils(">#", "#");
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    session.open().await.unwrap();
    profile
        .login_chain()
        .authenticate(&mut session, &profile.prompts, &profile.login_cues)
        .await
        .unwrap();

    // No enable password on the endpoint: the factory default applies.
    let escalator = PrivilegeEscalator::new("enable").with_default_password("ruijie");
    escalator.escalate(&mut session, &profile.prompts).await.unwrap();
    assert!(session.elevated());
}

#[tokio::test]
async fn escalation_soft_success_sets_elevated() {
    let factory = SimFactory::new(SimConfig {
        soft_escalation: true,
        ..SimConfig::default()
    });
    let profile = bare_profile();
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    session.open().await.unwrap();
    profile
        .login_chain()
        .authenticate(&mut session, &profile.prompts, &profile.login_cues)
        .await
        .unwrap();

    let escalator = PrivilegeEscalator::new("system-view");
    let outcome = escalator
        .escalate(&mut session, &profile.prompts)
        .await
        .unwrap();
    assert_eq!(outcome, switchwire::session::EscalationOutcome::Soft);
    assert!(session.elevated());
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn output_excludes_echo_and_prompt() {
    let factory = SimFactory::new(SimConfig {
        responses: vec![("display clock", "2026-08-31 10:22:33\r\nSunday")],
        ..SimConfig::default()
    });
    let mut profile = bare_profile();
    profile.commands.pagination = vec![];
    let executor = CommandExecutor::new(Arc::new(profile));
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    executor.connect(&mut session).await.unwrap();
    let result = executor
        .execute(&mut session, "display clock", Duration::from_millis(500))
        .await
        .unwrap();

    assert_eq!(result.output, "2026-08-31 10:22:33\nSunday");
    assert!(result.raw.contains("display clock"));
    assert!(result.raw.contains("<Switch>"));
    assert!(!result.output.contains("<Switch>"));
    assert!(result.is_success());
}

#[tokio::test]
async fn unrecognized_command_is_flagged() {
    let factory = SimFactory::new(SimConfig::default());
    let mut profile = bare_profile();
    profile.invalid_markers = vec!["Unrecognized command"];
    let executor = CommandExecutor::new(Arc::new(profile));
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    executor.connect(&mut session).await.unwrap();
    let result = executor
        .execute(&mut session, "frobnicate", Duration::from_millis(500))
        .await
        .unwrap();

    assert!(!result.is_success());
    assert!(result.failure.unwrap().contains("Unrecognized command"));
}

#[tokio::test]
async fn failed_escalation_returns_the_denied_output() {
    // The device denies the command and rejects the enable password, so
    // the reactive escalation fails. The denied output still comes back
    // and the session stays usable.
    let factory = SimFactory::new(SimConfig {
        escalate_command: "enable",
        escalate_password: Some("enable-pw"),
        responses: vec![("show secret", "Access denied: privileged mode required")],
        ..SimConfig::default()
    });
    let mut profile = bare_profile();
    profile.access_denied_markers = vec!["Access denied"];
    profile.escalator = Some(PrivilegeEscalator::new("enable"));
    let executor = CommandExecutor::new(Arc::new(profile));
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    executor.connect(&mut session).await.unwrap();
    let result = executor
        .execute(&mut session, "show secret", Duration::from_millis(500))
        .await
        .unwrap();

    assert!(result.output.contains("Access denied"));
    assert_eq!(session.state(), SessionState::Ready);
    assert!(!session.elevated());

    // The next command goes through normally.
    let result = executor
        .execute(&mut session, "display clock", Duration::from_millis(500))
        .await
        .unwrap();
    assert!(result.raw.contains("<Switch>"));
}

#[tokio::test]
async fn execute_requires_a_ready_session() {
    let factory = SimFactory::new(SimConfig::default());
    let executor = CommandExecutor::new(Arc::new(bare_profile()));
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    let err = executor
        .execute(&mut session, "display clock", Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotReady { .. }));
}

#[tokio::test]
async fn transport_failures_spend_exactly_the_retry_budget() {
    let factory = SimFactory::new(SimConfig {
        fail_on_command: Some("display version"),
        ..SimConfig::default()
    });
    let executor = CommandExecutor::new(Arc::new(bare_profile()));
    let mut session = Session::new(endpoint(), Arc::new(factory.clone()), Timing::snappy());

    executor.connect(&mut session).await.unwrap();
    let err = executor
        .execute(&mut session, "display version", Duration::from_millis(500))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    let attempts = factory
        .commands()
        .iter()
        .filter(|c| c.as_str() == "display version")
        .count();
    assert_eq!(attempts, 3, "budget is three attempts, saw {attempts}");
    // Initial connect plus one reconnect per surviving retry.
    assert_eq!(factory.opens(), 3);
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let factory = SimFactory::new(SimConfig::default());
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    session.open().await.unwrap();
    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Disconnected);
    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Disconnected);
}

// ---------------------------------------------------------------------------
// Inactivity timeout
// ---------------------------------------------------------------------------

/// Releases the payload one byte per `gap` once triggered; answers
/// everything else with an immediate prompt.
struct DripChannel {
    payload: VecDeque<u8>,
    gap: Duration,
    last_emit: Instant,
    immediate: VecDeque<u8>,
    line: Vec<u8>,
}

#[async_trait]
impl Channel for DripChannel {
    async fn read_available(&mut self) -> io::Result<Vec<u8>> {
        if !self.immediate.is_empty() {
            return Ok(self.immediate.drain(..).collect());
        }
        if !self.payload.is_empty() && self.last_emit.elapsed() >= self.gap {
            self.last_emit = Instant::now();
            return Ok(vec![self.payload.pop_front().unwrap()]);
        }
        Ok(Vec::new())
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        for &byte in data {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.line)
                    .trim_end_matches('\r')
                    .to_string();
                self.line.clear();
                if line == "slow" {
                    self.payload.extend(b"drip payload done\r\nSW# ");
                    self.last_emit = Instant::now() - self.gap;
                } else {
                    self.immediate.extend(b"SW# ");
                }
            } else {
                self.line.push(byte);
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct DripFactory {
    gap: Duration,
    opens: Arc<Mutex<u32>>,
}

#[async_trait]
impl ChannelFactory for DripFactory {
    async fn open(
        &self,
        _endpoint: &DeviceEndpoint,
    ) -> Result<Box<dyn Channel>, ConnectionError> {
        *self.opens.lock().unwrap() += 1;
        Ok(Box::new(DripChannel {
            payload: VecDeque::new(),
            gap: self.gap,
            last_emit: Instant::now(),
            immediate: VecDeque::new(),
            line: Vec::new(),
        }))
    }
}

fn drip_profile() -> VendorProfile {
    VendorProfile::new(
        "sim",
        PromptSet::from_sigils(">#", "#"),
        FactExtractor::new("sim"),
    )
}

#[tokio::test]
async fn slow_stream_survives_a_window_longer_than_the_gap() {
    let opens = Arc::new(Mutex::new(0));
    let factory = DripFactory {
        gap: Duration::from_millis(20),
        opens: opens.clone(),
    };
    let executor = CommandExecutor::new(Arc::new(drip_profile()));
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    executor.connect(&mut session).await.unwrap();
    // Each byte arrives well inside the window, so the deadline keeps
    // moving and the whole payload lands.
    let result = executor
        .execute(&mut session, "slow", Duration::from_millis(200))
        .await
        .unwrap();

    assert!(result.output.contains("drip payload done"));
    assert_eq!(*opens.lock().unwrap(), 1);
}

#[tokio::test]
async fn silent_gap_times_out_after_one_reconnect_retry() {
    let opens = Arc::new(Mutex::new(0));
    let factory = DripFactory {
        gap: Duration::from_millis(150),
        opens: opens.clone(),
    };
    let executor = CommandExecutor::new(Arc::new(drip_profile()));
    let mut session = Session::new(endpoint(), Arc::new(factory), Timing::snappy());

    executor.connect(&mut session).await.unwrap();
    let err = executor
        .execute(&mut session, "slow", Duration::from_millis(30))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout(_)));
    // Initial connect, then exactly one reconnect for the timeout retry.
    assert_eq!(*opens.lock().unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Registry and adapters end to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comware_version_extracted_through_the_adapter() {
    let factory = SimFactory::new(SimConfig {
        responses: vec![("display version", COMWARE_VERSION)],
        ..SimConfig::default()
    });
    let registry = AdapterRegistry::with_builtins(Arc::new(factory));

    let mut adapter = registry.resolve("h3c", endpoint()).unwrap();
    adapter.connect().await.unwrap();
    let facts = adapter.device_facts().await.unwrap();

    assert_eq!(facts.vendor, "h3c");
    assert_eq!(facts.version, "5.70");
    assert_eq!(facts.model, "S5120-28P");
    adapter.disconnect().await;
}

#[tokio::test]
async fn interface_table_through_the_adapter() {
    let table = "\
Interface                 PHY     Protocol  Description\r\n\
GigabitEthernet0/0/1      up      up        uplink\r\n\
GigabitEthernet0/0/2      down    down\r\n\
Vlanif100                 *down   down\r\n";
    let factory = SimFactory::new(SimConfig {
        responses: vec![("display interface brief", table)],
        ..SimConfig::default()
    });
    let registry = AdapterRegistry::with_builtins(Arc::new(factory));

    let mut adapter = registry.resolve("huawei", endpoint()).unwrap();
    adapter.connect().await.unwrap();
    let interfaces = adapter.interfaces().await.unwrap();

    assert_eq!(interfaces.len(), 3);
    assert_eq!(interfaces[0].name, "GigabitEthernet0/0/1");
    assert_eq!(interfaces[0].status, "up");
    assert_eq!(interfaces[2].status, "admin-down");
}

#[tokio::test]
async fn save_handshake_answers_the_confirmation() {
    let factory = SimFactory::new(SimConfig {
        save: Some((
            "save",
            "The current configuration will be written to the device. Continue? [Y/N]:",
            "y",
            "Save the configuration successfully.",
        )),
        ..SimConfig::default()
    });
    let registry = AdapterRegistry::with_builtins(Arc::new(factory));

    let mut adapter = registry.resolve("huawei", endpoint()).unwrap();
    adapter.connect().await.unwrap();
    assert!(adapter.save_config().await.unwrap());
}

#[tokio::test]
async fn unknown_vendor_is_rejected_with_the_supported_list() {
    let factory = SimFactory::new(SimConfig::default());
    let registry = AdapterRegistry::with_builtins(Arc::new(factory));
    let err = registry.resolve("cisco", endpoint()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedVendor { .. }));
    assert!(err.to_string().contains("ruijie"));
}

#[tokio::test]
async fn running_config_uses_the_stretched_validation() {
    let config_body = "\
#\r\n\
 sysname SW-floor3\r\n\
#\r\n\
vlan batch 10 20 30\r\n\
#\r\n\
interface GigabitEthernet0/0/1\r\n\
 port link-type access\r\n\
#\r\nreturn";
    let factory = SimFactory::new(SimConfig {
        responses: vec![("display current-configuration", config_body)],
        ..SimConfig::default()
    });
    let registry = AdapterRegistry::with_builtins(Arc::new(factory));

    let mut adapter = registry.resolve("huawei", endpoint()).unwrap();
    adapter.connect().await.unwrap();
    let config = adapter.running_config().await.unwrap();
    assert!(config.contains("sysname SW-floor3"));
}
