//! Runtime provisioning.
//!
//! Four steps run in order on every launch. Each one checks for its target
//! first and does nothing when it is already there:
//!
//! 1. the `uv` binary
//! 2. a python runtime under `python/`
//! 3. `pyproject.toml` (plus `requirements.txt` import on creation)
//! 4. `uv sync`
//!
//! A tool that exits non-zero stops provisioning. An install that exits 0
//! but leaves its target missing stops it as well; there is exactly one
//! install attempt per step.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use fuze_config::LauncherConfig;
use fuze_core::error::{FuzeError, Result};
use fuze_core::file_system;
use fuze_core::msg_format;
use fuze_messages::MESSAGES;
use fuze_platform::{CommandSpec, PlatformProvider};
use tracing::{debug, info, info_span, warn};

use crate::layout::{RuntimeLayout, PYTHON_DIR, REQUIREMENTS_FILE, SOURCE_DIR, UV_DIR};
use crate::report;

/// How `uv sync` is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// A lock file exists: install the locked versions exactly.
    pub frozen: bool,
    /// No virtual environment yet: tell uv which interpreter to use.
    pub explicit_python: bool,
}

impl SyncOptions {
    pub fn detect(layout: &RuntimeLayout) -> Self {
        Self {
            frozen: file_system::exists(&layout.lock_file),
            explicit_python: !file_system::exists(&layout.venv_marker),
        }
    }
}

pub struct Provisioner<'a> {
    layout: &'a RuntimeLayout,
    config: &'a LauncherConfig,
    platform: &'a mut dyn PlatformProvider,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        layout: &'a RuntimeLayout,
        config: &'a LauncherConfig,
        platform: &'a mut dyn PlatformProvider,
    ) -> Self {
        Self {
            layout,
            config,
            platform,
        }
    }

    /// Run all four steps and return the python runtime directory.
    pub fn provision(&mut self) -> Result<PathBuf> {
        let _span = info_span!("provision", workdir = %self.layout.root.display()).entered();
        self.ensure_package_manager()?;
        let python = self.ensure_runtime()?;
        self.ensure_manifest(&python)?;
        self.sync_dependencies(&python)?;
        Ok(python)
    }

    pub fn ensure_package_manager(&mut self) -> Result<()> {
        if file_system::exists(&self.layout.uv_binary) {
            debug!(path = %self.layout.uv_binary.display(), "uv present");
            return Ok(());
        }

        report::progress(
            self.platform,
            &msg_format!(MESSAGES.provision.uv_missing, dir = UV_DIR),
        )?;

        let script = self.platform.bootstrap_script(
            &self.config.uv_install_script_unix,
            &self.config.uv_install_script_windows,
        );
        let local_script = self.layout.root.join(script);
        let spec = if local_script.is_file() {
            info!(script = %local_script.display(), "installing uv from local script");
            self.platform
                .bootstrap_command(&local_script.to_string_lossy(), true)
        } else {
            info!(url = %script, "installing uv from remote script");
            self.platform.bootstrap_command(script, false)
        };
        self.check(spec)?;

        if !file_system::exists(&self.layout.uv_binary) {
            return Err(self.install_failed(
                MESSAGES.provision.uv_install_failed,
                "uv",
                &self.layout.uv_binary,
            ));
        }
        Ok(())
    }

    pub fn ensure_runtime(&mut self) -> Result<PathBuf> {
        if let Some(python) = self.layout.find_python()? {
            debug!(path = %python.display(), "python present");
            return Ok(python);
        }

        report::progress(
            self.platform,
            &msg_format!(MESSAGES.provision.python_missing, dir = PYTHON_DIR),
        )?;
        let spec = self.uv(["python", "install", "--install-dir", PYTHON_DIR]);
        self.check(spec)?;

        match self.layout.find_python()? {
            Some(python) => Ok(python),
            None => Err(self.install_failed(
                MESSAGES.provision.python_install_failed,
                "python",
                &self.layout.python_dir,
            )),
        }
    }

    pub fn ensure_manifest(&mut self, python: &Path) -> Result<()> {
        if file_system::exists(&self.layout.manifest) {
            return Ok(());
        }

        let manifest_name = self.layout.manifest.display().to_string();
        report::progress(
            self.platform,
            &msg_format!(MESSAGES.provision.init_project, file = manifest_name),
        )?;
        let spec = self.uv(["init", "--bare", "--no-workspace"]);
        self.check(spec)?;

        if file_system::exists(&self.layout.requirements) {
            report::progress(
                self.platform,
                &msg_format!(MESSAGES.provision.add_dependencies, file = REQUIREMENTS_FILE),
            )?;
            let spec = self
                .uv(["add", "-r", REQUIREMENTS_FILE, "--python"])
                .arg(python);
            self.check(spec)?;
        }
        Ok(())
    }

    pub fn sync_dependencies(&mut self, python: &Path) -> Result<()> {
        let options = SyncOptions::detect(self.layout);
        debug!(?options, "syncing dependencies");
        let spec = self.sync_command(options, python);
        self.check(spec)
    }

    pub fn sync_command(&self, options: SyncOptions, python: &Path) -> CommandSpec {
        let mut spec = self.uv(["sync", "--quiet"]);
        if options.frozen {
            spec = spec.arg("--frozen");
        }
        if options.explicit_python {
            spec = spec.arg("--python").arg(python);
        }
        spec
    }

    /// The final `uv run` hand-off for the configured entry script.
    pub fn run_command(&self, forwarded: &[OsString]) -> CommandSpec {
        let mode = if self.config.win_gui && self.platform.supports_gui_script() {
            "--gui-script"
        } else {
            "--script"
        };
        self.uv(["run"])
            .arg("--project")
            .arg(&self.layout.root)
            .args(["--directory", SOURCE_DIR, mode])
            .arg(&self.config.entry)
            .args(forwarded.iter().cloned())
    }

    fn uv<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        CommandSpec::new(&self.layout.uv_binary)
            .args(args)
            .current_dir(&self.layout.root)
    }

    /// Run an intermediate step; any non-zero exit is fatal.
    fn check(&mut self, spec: CommandSpec) -> Result<()> {
        let spec = if spec.current_dir.is_none() {
            spec.current_dir(&self.layout.root)
        } else {
            spec
        };
        let code = self.platform.spawn_and_wait(&spec)?;
        if code != 0 {
            let command = spec.display(self.platform.quote_style());
            warn!(%command, code, "provisioning step failed");
            return Err(FuzeError::ExternalTool { command, code });
        }
        Ok(())
    }

    fn install_failed(&self, message: &str, tool: &str, path: &Path) -> FuzeError {
        warn!("{}", message);
        FuzeError::InstallFailed {
            tool: tool.to_string(),
            path: path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuze_platform::providers::RecordingPlatform;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config() -> LauncherConfig {
        LauncherConfig {
            entry: "app.py".to_string(),
            win_gui: false,
            unzip_path: None,
            uv_install_script_windows: "https://example.invalid/install.ps1".to_string(),
            uv_install_script_unix: "https://example.invalid/install.sh".to_string(),
            env: Vec::new(),
        }
    }

    fn argv(spec: &CommandSpec) -> Vec<String> {
        let mut out = vec![PathBuf::from(&spec.program)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned()];
        out.extend(spec.args_lossy());
        out
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Emulates uv: creates whatever each subcommand would leave behind.
    fn emulating_uv(root: PathBuf) -> RecordingPlatform {
        RecordingPlatform::with_handler(move |spec| {
            let args = spec.args_lossy();
            match args.first().map(String::as_str) {
                Some("remote") | Some("local") => {
                    fs::create_dir_all(root.join("uv")).unwrap();
                    fs::write(root.join("uv").join("uv"), "").unwrap();
                }
                Some("python") => {
                    fs::create_dir_all(root.join("python").join("cpython-3.12")).unwrap();
                }
                Some("init") => fs::write(root.join("pyproject.toml"), "").unwrap(),
                _ => {}
            }
            Ok(0)
        })
    }

    #[test]
    fn test_fresh_directory_runs_every_step_in_order() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let config = config();
        let mut platform = emulating_uv(temp.path().to_path_buf());

        let python = Provisioner::new(&layout, &config, &mut platform)
            .provision()
            .unwrap();
        assert_eq!(python, layout.python_dir.join("cpython-3.12"));

        let calls: Vec<Vec<String>> = platform.spawned().into_iter().map(argv).collect();
        let python_arg = python.to_string_lossy().into_owned();
        assert_eq!(
            calls,
            vec![
                strings(&["bootstrap", "remote", "https://example.invalid/install.sh"]),
                strings(&["uv", "python", "install", "--install-dir", "python"]),
                strings(&["uv", "init", "--bare", "--no-workspace"]),
                strings(&["uv", "sync", "--quiet", "--python", python_arg.as_str()]),
            ]
        );
        assert!(platform
            .spawned()
            .iter()
            .all(|spec| spec.current_dir.as_deref() == Some(temp.path())));
    }

    #[test]
    fn test_second_run_only_syncs() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let config = config();
        let mut platform = emulating_uv(temp.path().to_path_buf());
        Provisioner::new(&layout, &config, &mut platform)
            .provision()
            .unwrap();

        let mut platform = emulating_uv(temp.path().to_path_buf());
        Provisioner::new(&layout, &config, &mut platform)
            .provision()
            .unwrap();
        let calls = platform.spawned();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args_lossy()[0], "sync");
    }

    #[test]
    fn test_local_install_script_is_preferred() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("install.sh"), "#!/bin/sh\n").unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let mut config = config();
        config.uv_install_script_unix = "install.sh".to_string();
        let mut platform = emulating_uv(temp.path().to_path_buf());

        Provisioner::new(&layout, &config, &mut platform)
            .ensure_package_manager()
            .unwrap();
        let args = platform.spawned()[0].args_lossy();
        assert_eq!(args[0], "local");
        assert_eq!(
            PathBuf::from(&args[1]),
            temp.path().join("install.sh")
        );
    }

    #[test]
    fn test_install_script_is_chosen_by_platform() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let config = config();
        let mut platform =
            emulating_uv(temp.path().to_path_buf()).with_windows_scripts(true);

        Provisioner::new(&layout, &config, &mut platform)
            .ensure_package_manager()
            .unwrap();
        assert_eq!(
            platform.spawned()[0].args_lossy(),
            vec!["remote", "https://example.invalid/install.ps1"]
        );
    }

    #[test]
    fn test_install_that_leaves_no_binary_fails() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let config = config();
        let mut platform = RecordingPlatform::new();

        let err = Provisioner::new(&layout, &config, &mut platform)
            .ensure_package_manager()
            .unwrap_err();
        assert!(matches!(err, FuzeError::InstallFailed { ref tool, .. } if tool == "uv"));
        assert_eq!(platform.spawned().len(), 1);
    }

    #[test]
    fn test_non_zero_exit_is_external_tool_error() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let config = config();
        let mut platform = RecordingPlatform::with_handler(|_| Ok(2));

        let err = Provisioner::new(&layout, &config, &mut platform)
            .ensure_runtime()
            .unwrap_err();
        match err {
            FuzeError::ExternalTool { command, code } => {
                assert_eq!(code, 2);
                assert!(command.contains("python install"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_requirements_are_added_on_init() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("requirements.txt"), "requests\n").unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let config = config();
        let mut platform = emulating_uv(temp.path().to_path_buf());
        let python = temp.path().join("python").join("cpython-3.12");

        Provisioner::new(&layout, &config, &mut platform)
            .ensure_manifest(&python)
            .unwrap();
        let calls = platform.spawned();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1].args_lossy(),
            vec![
                "add".to_string(),
                "-r".into(),
                "requirements.txt".into(),
                "--python".into(),
                python.to_string_lossy().into_owned()
            ]
        );
    }

    #[test]
    fn test_sync_command_flags() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let config = config();
        let mut platform = RecordingPlatform::new();
        let provisioner = Provisioner::new(&layout, &config, &mut platform);
        let python = Path::new("/p");

        let frozen_only = SyncOptions {
            frozen: true,
            explicit_python: false,
        };
        assert_eq!(
            provisioner.sync_command(frozen_only, python).args_lossy(),
            vec!["sync", "--quiet", "--frozen"]
        );

        let both = SyncOptions {
            frozen: true,
            explicit_python: true,
        };
        assert_eq!(
            provisioner.sync_command(both, python).args_lossy(),
            vec!["sync", "--quiet", "--frozen", "--python", "/p"]
        );
    }

    #[test]
    fn test_sync_options_follow_marker_files() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        assert_eq!(
            SyncOptions::detect(&layout),
            SyncOptions {
                frozen: false,
                explicit_python: true
            }
        );

        fs::write(&layout.lock_file, "").unwrap();
        fs::create_dir_all(layout.venv_marker.parent().unwrap()).unwrap();
        fs::write(&layout.venv_marker, "").unwrap();
        assert_eq!(
            SyncOptions::detect(&layout),
            SyncOptions {
                frozen: true,
                explicit_python: false
            }
        );
    }

    #[test]
    fn test_run_command_selects_script_mode() {
        let temp = TempDir::new().unwrap();
        let layout = RuntimeLayout::new(temp.path(), "uv");
        let mut config = config();
        config.win_gui = true;
        let forwarded = vec![OsString::from("--flag"), OsString::from("two words")];

        let mut platform = RecordingPlatform::new();
        let spec = Provisioner::new(&layout, &config, &mut platform).run_command(&forwarded);
        let args = spec.args_lossy();
        assert_eq!(args[0], "run");
        assert_eq!(PathBuf::from(&args[2]), temp.path());
        assert_eq!(
            &args[3..],
            ["--directory", "src", "--script", "app.py", "--flag", "two words"]
        );

        let mut platform = RecordingPlatform::new().with_gui_script(true);
        let spec = Provisioner::new(&layout, &config, &mut platform).run_command(&forwarded);
        assert_eq!(spec.args_lossy()[5], "--gui-script");
    }
}
