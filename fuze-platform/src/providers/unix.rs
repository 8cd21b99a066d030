//! Unix platform provider implementation.

use std::io::{self, BufRead, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};

use fuze_core::error::{FuzeError, Result};
use nix::sys::signal::Signal;
use tracing::debug;

use crate::command::{resolve_program, CommandSpec, QuoteStyle};
use crate::console::{ConsoleState, ConsoleTracker};
use crate::environment;
use crate::traits::{ExitCode, PlatformProvider};

/// Unix platform provider (Linux, macOS and other Unix-like systems).
///
/// The terminal is inherited from the parent, so console handling is pure
/// bookkeeping.
#[derive(Debug, Default)]
pub struct UnixPlatform {
    console: ConsoleTracker,
}

impl UnixPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, spec: &CommandSpec, stdin: Stdio) -> Result<ExitCode> {
        let command_line = spec.display(QuoteStyle::Posix);
        let program = resolve_program(&spec.program)?;
        debug!(command = %command_line, cwd = ?spec.current_dir, "spawning");

        let mut command = Command::new(&program);
        command
            .args(&spec.args)
            .stdin(stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| FuzeError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        let status = child.wait().map_err(|source| FuzeError::Wait {
            command: command_line.clone(),
            source,
        })?;
        exit_code(&command_line, status)
    }
}

/// Normal exit yields the code; death by signal is an error.
fn exit_code(command: &str, status: ExitStatus) -> Result<ExitCode> {
    if let Some(code) = status.code() {
        return Ok(code);
    }
    let detail = match status.signal() {
        Some(sig) => match Signal::try_from(sig) {
            Ok(signal) => format!("killed by {}", signal),
            Err(_) => format!("killed by signal {}", sig),
        },
        None => format!("terminated abnormally ({})", status),
    };
    Err(FuzeError::AbnormalExit {
        command: command.to_string(),
        detail,
    })
}

impl PlatformProvider for UnixPlatform {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn executable_name(&self, base: &str) -> String {
        base.to_string()
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::Posix
    }

    // === Console ===

    fn console_state(&self) -> ConsoleState {
        self.console.state()
    }

    fn ensure_console(&mut self, interactive: bool) -> Result<()> {
        if self.console.state().is_bound() {
            if interactive {
                self.console.bind_stdin();
            }
            return Ok(());
        }
        self.console.bound(ConsoleState::AttachedToParent, interactive);
        Ok(())
    }

    fn release_console(&mut self) -> Result<()> {
        // The descriptors stay open: the application inherits them.
        io::stdout().flush()?;
        io::stderr().flush()?;
        self.console.release()?;
        Ok(())
    }

    fn wait_for_keypress(&mut self, message: &str) -> Result<()> {
        self.ensure_console(true)?;
        println!("\n{}", message);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }

    // === Environment ===

    fn set_environment(&mut self, key: &str, value: &str) -> Result<()> {
        environment::apply(key, value)
    }

    fn launcher_environment(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    // === Processes ===

    fn bootstrap_script<'a>(&self, unix: &'a str, _windows: &'a str) -> &'a str {
        unix
    }

    fn bootstrap_command(&self, script: &str, local: bool) -> CommandSpec {
        let spec = if local {
            CommandSpec::new("sh").arg(script)
        } else {
            let url = shlex::try_quote(script)
                .map(|q| q.into_owned())
                .unwrap_or_else(|_| script.to_string());
            CommandSpec::new("sh")
                .arg("-c")
                .arg(format!("curl -LsSf {} | sh", url))
        };
        spec.interactive(true)
    }

    fn spawn_and_wait(&mut self, spec: &CommandSpec) -> Result<ExitCode> {
        let stdin = if spec.interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        self.run(spec, stdin)
    }

    fn spawn_final(&mut self, spec: &CommandSpec) -> Result<ExitCode> {
        self.run(spec, Stdio::inherit())
    }

    fn supports_gui_script(&self) -> bool {
        false
    }
}
