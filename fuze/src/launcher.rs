//! Launch sequence: working directory, asset sync, environment,
//! provisioning, then the hand-off to `uv run`.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use fuze_config::{LauncherConfig, CONFIG_FILE_NAME};
use fuze_core::error::{FuzeError, Result};
use fuze_core::file_system;
use fuze_platform::{ExitCode, PlatformProvider};
use tracing::{debug, info};

use crate::layout::{RuntimeLayout, UV_BINARY};
use crate::provisioner::Provisioner;
use crate::sync;

/// Overrides where the read-only bundle is mounted.
pub const BUNDLE_ROOT_ENV: &str = "FUZE_BUNDLE_ROOT";

pub const BUNDLE_DIR: &str = "bundle";

/// `$FUZE_BUNDLE_ROOT`, or `bundle/` next to the executable.
pub fn bundle_root(executable_dir: &Path) -> PathBuf {
    env::var_os(BUNDLE_ROOT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| executable_dir.join(BUNDLE_DIR))
}

#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub executable_dir: PathBuf,
    pub bundle_root: PathBuf,
    /// Caller arguments forwarded to the application.
    pub args: Vec<OsString>,
}

impl LaunchRequest {
    pub fn config_path(&self) -> PathBuf {
        self.bundle_root.join(CONFIG_FILE_NAME)
    }

    pub fn load_config(&self) -> Result<LauncherConfig> {
        LauncherConfig::load(&self.config_path())
    }
}

/// Run the whole launch and return the application's exit code.
pub fn launch(
    request: &LaunchRequest,
    config: &LauncherConfig,
    platform: &mut dyn PlatformProvider,
) -> Result<ExitCode> {
    let workdir = config.working_dir(&request.executable_dir);
    info!(
        workdir = %workdir.display(),
        bundle = %request.bundle_root.display(),
        platform = platform.name(),
        "launching"
    );

    // Console launches show everything, including output from the tools.
    if !config.win_gui {
        platform.ensure_console(false)?;
    }

    file_system::recursive_mkdir(&workdir)?;
    let report = sync::synchronize(&request.bundle_root, &workdir, platform)?;
    debug!(
        changed = report.changed,
        extracted = report.extracted.len(),
        kept = report.kept.len(),
        "assets synchronized"
    );

    env::set_current_dir(&workdir).map_err(|e| FuzeError::filesystem(&workdir, e))?;

    let layout = RuntimeLayout::new(&workdir, &platform.executable_name(UV_BINARY));
    apply_environment(&layout, config, platform)?;

    let mut provisioner = Provisioner::new(&layout, config, platform);
    provisioner.provision()?;
    let run = provisioner.run_command(&request.args);

    if config.win_gui && platform.console_state().is_bound() {
        platform.release_console()?;
    }

    info!(command = %run.display(platform.quote_style()), "starting application");
    let code = platform.spawn_final(&run)?;
    info!(code, "application exited");
    Ok(code)
}

/// Set the launcher's variables, then the config overlay so it can
/// override them.
pub fn apply_environment(
    layout: &RuntimeLayout,
    config: &LauncherConfig,
    platform: &mut dyn PlatformProvider,
) -> Result<()> {
    let cache_dir = layout.cache_dir.to_string_lossy().into_owned();
    let uv_dir = layout.uv_dir.to_string_lossy().into_owned();
    platform.set_environment("UV_CACHE_DIR", &cache_dir)?;
    platform.set_environment("UV_UNMANAGED_INSTALL", &uv_dir)?;

    for (key, value) in platform.launcher_environment() {
        platform.set_environment(key, value)?;
    }
    for (key, value) in &config.env {
        debug!(%key, "applying environment overlay");
        platform.set_environment(key, value)?;
    }
    Ok(())
}
