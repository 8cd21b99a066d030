//! Platform registry: the one place that picks a provider for the host OS.

use crate::traits::PlatformProvider;

#[cfg(windows)]
use crate::providers::WindowsPlatform;

#[cfg(unix)]
use crate::providers::UnixPlatform;

pub struct PlatformRegistry;

impl PlatformRegistry {
    /// Provider for the current operating system. `gui` tells the Windows
    /// provider to keep children windowless until a console exists.
    pub fn current(gui: bool) -> Box<dyn PlatformProvider> {
        #[cfg(windows)]
        return Box::new(WindowsPlatform::new(gui));

        #[cfg(unix)]
        {
            let _ = gui;
            return Box::new(UnixPlatform::new());
        }

        #[cfg(not(any(unix, windows)))]
        compile_error!("Unsupported platform - only Unix-like and Windows platforms are supported");
    }

    /// Canonical platform name for the current OS.
    pub fn current_platform_name() -> &'static str {
        Self::current(false).name()
    }
}
