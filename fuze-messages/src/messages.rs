//! Message templates grouped by launcher phase.
//!
//! ```rust
//! use fuze_messages::MESSAGES;
//!
//! let msg = MESSAGES.sync.build_id_changed;
//! let msg = MESSAGES.provision.uv_missing;
//! ```

pub struct SyncMessages {
    pub build_id_changed: &'static str,
    pub build_id_updated: &'static str,
    pub extracting_dir: &'static str,
    pub extracting_file: &'static str,
}

pub struct ProvisionMessages {
    pub add_dependencies: &'static str,
    pub init_project: &'static str,
    pub python_install_failed: &'static str,
    pub python_missing: &'static str,
    pub uv_install_failed: &'static str,
    pub uv_missing: &'static str,
}

pub struct LauncherMessages {
    pub error_prefix: &'static str,
    pub log_init_failed: &'static str,
    pub press_enter: &'static str,
}

pub struct Messages {
    pub sync: SyncMessages,
    pub provision: ProvisionMessages,
    pub launcher: LauncherMessages,
}

pub const SYNC_MESSAGES: SyncMessages = SyncMessages {
    build_id_changed: "build id changed, extracting and overwriting files...",
    build_id_updated: "successfully updated {file}",
    extracting_dir: "found directory {path}, extracting ...",
    extracting_file: "found file {path}, extracting ...",
};

pub const PROVISION_MESSAGES: ProvisionMessages = ProvisionMessages {
    add_dependencies: "adding dependencies from {file}...",
    init_project: "{file} not found, creating new project...",
    python_install_failed: "python installation failed",
    python_missing: "python not found, installing to {dir} ...",
    uv_install_failed: "uv installation failed",
    uv_missing: "uv not found, installing to {dir} ...",
};

pub const LAUNCHER_MESSAGES: LauncherMessages = LauncherMessages {
    error_prefix: "ERROR:",
    log_init_failed: "logging disabled: {error}",
    press_enter: "Press Enter to exit...",
};

/// Global messages constant, the entry point for all templates
pub const MESSAGES: Messages = Messages {
    sync: SYNC_MESSAGES,
    provision: PROVISION_MESSAGES,
    launcher: LAUNCHER_MESSAGES,
};
