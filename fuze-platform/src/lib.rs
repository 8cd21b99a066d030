//! Console and process abstraction for the fuze launcher.
//!
//! All platform differences (console attach/allocate, environment mutation,
//! spawning and waiting on children, bootstrap command lines) sit behind
//! [`PlatformProvider`]. `#[cfg]` conditionals stay inside `providers` and
//! `registry`.

pub mod command;
pub mod console;
pub mod environment;
pub mod providers;
pub mod registry;
pub mod traits;

pub use command::{CommandSpec, QuoteStyle};
pub use console::ConsoleState;
pub use registry::PlatformRegistry;
pub use traits::{ExitCode, PlatformProvider};

/// Provider for the current platform.
pub fn current(gui: bool) -> Box<dyn PlatformProvider> {
    PlatformRegistry::current(gui)
}
