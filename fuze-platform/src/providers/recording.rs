//! In-memory provider that records every interaction instead of touching the
//! OS. Tool side effects are emulated by a caller-supplied handler.

use fuze_core::error::Result;

use crate::command::{CommandSpec, QuoteStyle};
use crate::console::{ConsoleState, ConsoleTracker};
use crate::environment;
use crate::traits::{ExitCode, PlatformProvider};

pub type SpawnHandler = Box<dyn FnMut(&CommandSpec) -> Result<ExitCode>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    EnsureConsole { interactive: bool },
    ReleaseConsole,
    Keypress,
    SetEnv(String, String),
    Spawn(CommandSpec),
    Final(CommandSpec),
}

pub struct RecordingPlatform {
    pub events: Vec<Recorded>,
    console: ConsoleTracker,
    handler: SpawnHandler,
    launcher_env: Vec<(&'static str, &'static str)>,
    gui_script: bool,
    windows_scripts: bool,
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPlatform {
    /// Every spawned command exits 0 without side effects.
    pub fn new() -> Self {
        Self::with_handler(|_| Ok(0))
    }

    pub fn with_handler(handler: impl FnMut(&CommandSpec) -> Result<ExitCode> + 'static) -> Self {
        Self {
            events: Vec::new(),
            console: ConsoleTracker::default(),
            handler: Box::new(handler),
            launcher_env: Vec::new(),
            gui_script: false,
            windows_scripts: false,
        }
    }

    pub fn with_launcher_environment(mut self, vars: Vec<(&'static str, &'static str)>) -> Self {
        self.launcher_env = vars;
        self
    }

    pub fn with_gui_script(mut self, supported: bool) -> Self {
        self.gui_script = supported;
        self
    }

    /// Choose the Windows install script instead of the Unix one.
    pub fn with_windows_scripts(mut self, windows: bool) -> Self {
        self.windows_scripts = windows;
        self
    }

    /// Commands passed to `spawn_and_wait` and `spawn_final`, in order.
    pub fn spawned(&self) -> Vec<&CommandSpec> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Recorded::Spawn(spec) | Recorded::Final(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn env_assignments(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Recorded::SetEnv(k, v) => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }
}

impl PlatformProvider for RecordingPlatform {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn executable_name(&self, base: &str) -> String {
        base.to_string()
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::Posix
    }

    fn console_state(&self) -> ConsoleState {
        self.console.state()
    }

    fn ensure_console(&mut self, interactive: bool) -> Result<()> {
        self.events.push(Recorded::EnsureConsole { interactive });
        if !self.console.state().is_bound() {
            self.console.bound(ConsoleState::AllocatedOwn, interactive);
        }
        Ok(())
    }

    fn release_console(&mut self) -> Result<()> {
        self.events.push(Recorded::ReleaseConsole);
        self.console.release()?;
        Ok(())
    }

    fn wait_for_keypress(&mut self, _message: &str) -> Result<()> {
        self.events.push(Recorded::Keypress);
        Ok(())
    }

    fn set_environment(&mut self, key: &str, value: &str) -> Result<()> {
        environment::validate_assignment(key, value)?;
        self.events
            .push(Recorded::SetEnv(key.to_string(), value.to_string()));
        Ok(())
    }

    fn launcher_environment(&self) -> Vec<(&'static str, &'static str)> {
        self.launcher_env.clone()
    }

    fn bootstrap_script<'a>(&self, unix: &'a str, windows: &'a str) -> &'a str {
        if self.windows_scripts {
            windows
        } else {
            unix
        }
    }

    fn bootstrap_command(&self, script: &str, local: bool) -> CommandSpec {
        let mode = if local { "local" } else { "remote" };
        CommandSpec::new("bootstrap")
            .args([mode, script])
            .interactive(true)
    }

    fn spawn_and_wait(&mut self, spec: &CommandSpec) -> Result<ExitCode> {
        self.events.push(Recorded::Spawn(spec.clone()));
        (self.handler)(spec)
    }

    fn spawn_final(&mut self, spec: &CommandSpec) -> Result<ExitCode> {
        self.events.push(Recorded::Final(spec.clone()));
        (self.handler)(spec)
    }

    fn supports_gui_script(&self) -> bool {
        self.gui_script
    }
}
