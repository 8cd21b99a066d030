//! Full launch against real processes. uv and its installer are shell stubs
//! that log every invocation.

#![cfg(unix)]

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use fuze::launcher::{launch, LaunchRequest};
use fuze_config::CONFIG_FILE_NAME;
use fuze_platform::providers::UnixPlatform;
use tempfile::TempDir;

const INSTALL_SCRIPT: &str = r#"#!/bin/sh
set -e
echo "install" >> "$FUZE_E2E_LOG"
mkdir -p "$UV_UNMANAGED_INSTALL"
cat > "$UV_UNMANAGED_INSTALL/uv" <<'STUB'
#!/bin/sh
echo "$*" >> "$FUZE_E2E_LOG"
case "$1" in
    python) mkdir -p "$4/cpython-3.12-stub" ;;
    init) : > pyproject.toml ;;
    run) cd "$5" && shift 7 && exec sh app.py "$@" ;;
esac
exit 0
STUB
chmod +x "$UV_UNMANAGED_INSTALL/uv"
"#;

const APP: &str = r#"echo "app $*" >> "$FUZE_E2E_LOG"
exit 7
"#;

fn write_bundle(bundle: &Path, log: &Path) {
    fs::create_dir_all(bundle.join("src")).unwrap();
    fs::write(bundle.join("src").join("app.py"), APP).unwrap();
    fs::write(bundle.join("install.sh"), INSTALL_SCRIPT).unwrap();
    fs::write(bundle.join(".build_id.txt"), "e2e-1").unwrap();
    fs::write(
        bundle.join(CONFIG_FILE_NAME),
        format!(
            "entry=app.py\nwin_gui=0\nuv_install_script_unix=install.sh\nenv_FUZE_E2E_LOG={}\n",
            log.display()
        ),
    )
    .unwrap();
}

fn log_lines(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_fresh_install_then_relaunch() {
    let temp = TempDir::new().unwrap();
    let exe_dir = temp.path().join("app");
    let bundle = exe_dir.join("bundle");
    let log = temp.path().join("calls.log");
    write_bundle(&bundle, &log);

    let request = LaunchRequest {
        executable_dir: exe_dir.clone(),
        bundle_root: bundle.clone(),
        args: vec![OsString::from("--flag"), OsString::from("value")],
    };
    let config = request.load_config().unwrap();

    let mut platform = UnixPlatform::new();
    assert_eq!(launch(&request, &config, &mut platform).unwrap(), 7);

    let python = exe_dir.join("python").join("cpython-3.12-stub");
    assert!(python.is_dir());
    assert!(exe_dir.join("pyproject.toml").is_file());
    assert_eq!(fs::read_to_string(exe_dir.join(".build_id.txt")).unwrap(), "e2e-1");

    let lines = log_lines(&log);
    assert_eq!(
        lines,
        vec![
            "install".to_string(),
            "python install --install-dir python".to_string(),
            "init --bare --no-workspace".to_string(),
            format!("sync --quiet --python {}", python.display()),
            format!(
                "run --project {} --directory src --script app.py --flag value",
                exe_dir.display()
            ),
            "app --flag value".to_string(),
        ]
    );

    // Second launch: everything is in place, only sync and run happen.
    fs::remove_file(&log).unwrap();
    let mut platform = UnixPlatform::new();
    assert_eq!(launch(&request, &config, &mut platform).unwrap(), 7);

    let lines = log_lines(&log);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("sync --quiet"));
    assert!(lines[1].starts_with("run --project"));
    assert_eq!(lines[2], "app --flag value");
}
