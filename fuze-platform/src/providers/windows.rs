//! Windows platform provider implementation.

use std::env;
use std::ffi::OsStr;
use std::io::{self, BufRead, Write};
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::ptr;

use fuze_core::error::{FuzeError, Result};
use tracing::{debug, warn};
use windows_sys::Win32::Foundation::{
    CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows_sys::Win32::System::Console::{
    AllocConsole, AttachConsole, FreeConsole, GetConsoleWindow, SetStdHandle,
    ATTACH_PARENT_PROCESS, STD_ERROR_HANDLE, STD_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use windows_sys::Win32::System::Threading::CREATE_NO_WINDOW;

use crate::command::{resolve_program, CommandSpec, QuoteStyle};
use crate::console::{ConsoleState, ConsoleTracker};
use crate::environment;
use crate::traits::{ExitCode, PlatformProvider};

/// Windows platform provider.
///
/// In GUI mode the launcher may start without a console; one is attached or
/// allocated lazily the first time something has to be shown.
pub struct WindowsPlatform {
    gui: bool,
    console: ConsoleTracker,
    /// Console handles we opened and bound as std handles.
    bound_handles: Vec<HANDLE>,
    /// True when the console came from AttachConsole/AllocConsole rather
    /// than from process startup.
    owns_console: bool,
}

impl WindowsPlatform {
    pub fn new(gui: bool) -> Self {
        Self {
            gui,
            console: ConsoleTracker::default(),
            bound_handles: Vec::new(),
            owns_console: false,
        }
    }

    fn bind_std(&mut self, device: &str, targets: &[STD_HANDLE]) -> Result<()> {
        let handle = open_console_device(device)
            .map_err(|e| FuzeError::Console(format!("failed to open {}: {}", device, e)))?;
        for target in targets {
            // SAFETY: `handle` is a live console handle owned by `self`.
            if unsafe { SetStdHandle(*target, handle) } == 0 {
                let err = io::Error::last_os_error();
                // SAFETY: handle came from CreateFileW and is not yet shared.
                unsafe { CloseHandle(handle) };
                return Err(FuzeError::Console(format!("SetStdHandle failed: {}", err)));
            }
        }
        self.bound_handles.push(handle);
        Ok(())
    }

    fn creation_flags(&self) -> u32 {
        if self.gui && !self.console.state().is_bound() {
            CREATE_NO_WINDOW
        } else {
            0
        }
    }

    fn run(&self, spec: &CommandSpec, stdin: Stdio) -> Result<ExitCode> {
        let command_line = spec.display(QuoteStyle::Windows);
        let program = resolve_program(&spec.program)?;
        debug!(command = %command_line, cwd = ?spec.current_dir, "spawning");

        let mut command = Command::new(&program);
        command
            .args(&spec.args)
            .stdin(stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .creation_flags(self.creation_flags());
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
        status.code().ok_or_else(|| FuzeError::AbnormalExit {
            command: command_line,
            detail: format!("terminated abnormally ({})", status),
        })
    }
}

fn open_console_device(name: &str) -> io::Result<HANDLE> {
    let wide: Vec<u16> = OsStr::new(name)
        .encode_wide()
        .chain(iter::once(0))
        .collect();
    // SAFETY: `wide` is NUL-terminated and outlives the call.
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            GENERIC_READ | GENERIC_WRITE,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            ptr::null(),
            OPEN_EXISTING,
            0,
            ptr::null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    Ok(handle)
}

fn powershell_path() -> PathBuf {
    let root = env::var_os("SystemRoot").unwrap_or_else(|| "C:\\Windows".into());
    PathBuf::from(root)
        .join("System32")
        .join("WindowsPowerShell")
        .join("v1.0")
        .join("powershell.exe")
}

impl PlatformProvider for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn executable_name(&self, base: &str) -> String {
        if base.ends_with(".exe") {
            base.to_string()
        } else {
            format!("{}.exe", base)
        }
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::Windows
    }

    // === Console ===

    fn console_state(&self) -> ConsoleState {
        self.console.state()
    }

    fn ensure_console(&mut self, interactive: bool) -> Result<()> {
        if self.console.state().is_bound() {
            if interactive && !self.console.stdin_bound() {
                if self.owns_console {
                    self.bind_std("CONIN$", &[STD_INPUT_HANDLE])?;
                }
                self.console.bind_stdin();
            }
            return Ok(());
        }

        // SAFETY: plain query without arguments.
        if !unsafe { GetConsoleWindow() }.is_null() {
            // Console subsystem build or already attached: std handles are live.
            self.console.bound(ConsoleState::AttachedToParent, interactive);
            return Ok(());
        }

        // SAFETY: console APIs take no pointers here.
        let state = if unsafe { AttachConsole(ATTACH_PARENT_PROCESS) } != 0 {
            ConsoleState::AttachedToParent
        } else if unsafe { AllocConsole() } != 0 {
            ConsoleState::AllocatedOwn
        } else {
            return Err(FuzeError::Console(format!(
                "unable to attach or allocate a console: {}",
                io::Error::last_os_error()
            )));
        };
        self.owns_console = true;

        self.bind_std("CONOUT$", &[STD_OUTPUT_HANDLE, STD_ERROR_HANDLE])?;
        if interactive {
            self.bind_std("CONIN$", &[STD_INPUT_HANDLE])?;
        }
        self.console.bound(state, interactive);
        Ok(())
    }

    fn release_console(&mut self) -> Result<()> {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        self.console.release()?;

        if self.owns_console {
            for handle in self.bound_handles.drain(..) {
                // SAFETY: every handle in the list was opened by bind_std.
                unsafe { CloseHandle(handle) };
            }
            // SAFETY: detaching from a console we attached or allocated.
            if unsafe { FreeConsole() } == 0 {
                warn!(error = %io::Error::last_os_error(), "FreeConsole failed");
            }
            self.owns_console = false;
        }
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
        // Keeps a user's PowerShell 7 module path from breaking the
        // Windows PowerShell 5 bootstrap (PowerShell/PowerShell#18530).
        vec![("PSModulePath", "")]
    }

    // === Processes ===

    fn bootstrap_script<'a>(&self, _unix: &'a str, windows: &'a str) -> &'a str {
        windows
    }

    fn bootstrap_command(&self, script: &str, local: bool) -> CommandSpec {
        let spec = CommandSpec::new(powershell_path()).args([
            "-NoProfile",
            "-ExecutionPolicy",
            "Bypass",
        ]);
        let spec = if local {
            spec.arg("-File").arg(script)
        } else {
            spec.arg("-c").arg(format!("irm {} | iex", script))
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
        true
    }
}

impl Drop for WindowsPlatform {
    fn drop(&mut self) {
        for handle in self.bound_handles.drain(..) {
            // SAFETY: handles were opened by bind_std and are closed once.
            unsafe { CloseHandle(handle) };
        }
    }
}
