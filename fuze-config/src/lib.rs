//! Configuration for the fuze launcher.
//!
//! [`ConfigStore`] is the forgiving `key=value` reader for the bundled
//! `.fuze_config.txt`; [`LauncherConfig`] is the typed, immutable view the
//! rest of the launcher consumes.

pub mod launcher;
pub mod store;

pub use launcher::LauncherConfig;
pub use store::ConfigStore;

/// Name of the configuration file inside the bundle.
pub const CONFIG_FILE_NAME: &str = ".fuze_config.txt";

/// Prefix marking a config key as an environment variable assignment.
pub const ENV_PREFIX: &str = "env_";
