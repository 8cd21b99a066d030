//! Platform-specific provider implementations.

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

#[cfg(any(test, feature = "test-helpers"))]
pub mod recording;

#[cfg(unix)]
pub use unix::UnixPlatform;

#[cfg(windows)]
pub use windows::WindowsPlatform;

#[cfg(any(test, feature = "test-helpers"))]
pub use recording::RecordingPlatform;
