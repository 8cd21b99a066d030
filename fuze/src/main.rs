// GUI subsystem: no console appears unless the launcher asks for one.
// Bundles built with `win_gui=0` are switched to the console subsystem.
#![cfg_attr(windows, windows_subsystem = "windows")]

use std::process;

use anyhow::{Context, Result};
use colored::Colorize;
use fuze::cli::Args;
use fuze::launcher::{self, LaunchRequest};
use fuze_core::file_system::executable_directory;
use fuze_core::{fuze_error, fuze_warning, msg_format};
use fuze_logging::{init_subscriber, LogSettings, WorkerGuard};
use fuze_messages::MESSAGES;
use fuze_platform::PlatformProvider;
use tracing::error;

/// State the fatal-error path needs once `run` has bailed out.
#[derive(Default)]
struct Session {
    platform: Option<Box<dyn PlatformProvider>>,
    /// `None` until the config has been read.
    gui: Option<bool>,
    _log_guard: Option<WorkerGuard>,
}

fn main() {
    let args = Args::from_env();
    let mut session = Session::default();

    let code = match run(args, &mut session) {
        Ok(code) => code,
        Err(e) => fatal(&mut session, &e),
    };

    drop(session);
    process::exit(code);
}

fn run(args: Args, session: &mut Session) -> Result<i32> {
    let executable_dir = executable_directory()?;

    let settings = LogSettings::from_env(&executable_dir);
    match init_subscriber(&settings) {
        Ok(guard) => session._log_guard = guard,
        Err(e) => fuze_warning!(
            "{}",
            msg_format!(MESSAGES.launcher.log_init_failed, error = e)
        ),
    }

    let request = LaunchRequest {
        bundle_root: launcher::bundle_root(&executable_dir),
        executable_dir,
        args: args.forwarded,
    };
    let config = request.load_config().with_context(|| {
        format!(
            "failed to load launcher configuration from {}",
            request.config_path().display()
        )
    })?;

    session.gui = Some(config.win_gui);
    let platform = session
        .platform
        .insert(fuze_platform::current(config.win_gui));

    let code = launcher::launch(&request, &config, platform.as_mut())?;
    Ok(code)
}

/// Report a launcher failure and pick the exit status.
///
/// Without a config the launch mode is unknown, so the GUI behavior (bind a
/// console, wait for Enter) is assumed.
fn fatal(session: &mut Session, err: &anyhow::Error) -> i32 {
    error!(error = %format!("{:#}", err), "launcher failed");

    let gui = session.gui.unwrap_or(true);
    let platform = session
        .platform
        .get_or_insert_with(|| fuze_platform::current(gui));

    let _ = platform.ensure_console(false);
    fuze_error!("{} {:#}", MESSAGES.launcher.error_prefix.red().bold(), err);
    if gui {
        let _ = platform.wait_for_keypress(MESSAGES.launcher.press_enter);
    }
    1
}
