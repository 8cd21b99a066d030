//! Core trait for platform abstraction.
//!
//! Everything the launcher does that differs between Windows and POSIX goes
//! through [`PlatformProvider`]: console lifecycle, environment mutation and
//! child processes. Callers never branch on the target OS themselves.

use fuze_core::error::Result;

use crate::command::{CommandSpec, QuoteStyle};
use crate::console::ConsoleState;

/// Child exit status as reported by the OS.
pub type ExitCode = i32;

pub trait PlatformProvider {
    /// Platform name ("unix" or "windows")
    fn name(&self) -> &'static str;

    /// Append `.exe` where the platform expects it.
    fn executable_name(&self, base: &str) -> String;

    /// How command lines are quoted in diagnostics.
    fn quote_style(&self) -> QuoteStyle;

    // === Console ===

    fn console_state(&self) -> ConsoleState;

    /// Make output visible: no-op when a console is already bound, otherwise
    /// attach to the parent's console or allocate a fresh one. `interactive`
    /// additionally binds stdin.
    fn ensure_console(&mut self, interactive: bool) -> Result<()>;

    /// Close the bound streams and give up the console. Only valid while
    /// attached or allocated.
    fn release_console(&mut self) -> Result<()>;

    /// Print `message` on the console and block until Enter is pressed.
    fn wait_for_keypress(&mut self, message: &str) -> Result<()>;

    // === Environment ===

    /// Set a variable on the current process; children spawned later inherit it.
    fn set_environment(&mut self, key: &str, value: &str) -> Result<()>;

    /// Variables the launcher always sets on this platform before spawning
    /// any tool.
    fn launcher_environment(&self) -> Vec<(&'static str, &'static str)>;

    // === Processes ===

    /// Pick the install script meant for this platform out of the
    /// configured pair.
    fn bootstrap_script<'a>(&self, unix: &'a str, windows: &'a str) -> &'a str;

    /// Command that bootstraps the package manager from `script`, which is
    /// either a local file (`local == true`) or a URL.
    fn bootstrap_command(&self, script: &str, local: bool) -> CommandSpec;

    /// Run a child to completion. Abnormal termination is an error; any
    /// normal exit, zero or not, is returned as the exit code.
    fn spawn_and_wait(&mut self, spec: &CommandSpec) -> Result<ExitCode>;

    /// Final hand-off to the application. Streams are inherited and the
    /// child's exit code becomes the launcher's.
    fn spawn_final(&mut self, spec: &CommandSpec) -> Result<ExitCode>;

    /// Whether a GUI-mode launch should use the windowed run mode.
    fn supports_gui_script(&self) -> bool;
}
