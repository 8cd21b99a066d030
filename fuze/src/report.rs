use fuze_core::error::Result;
use fuze_core::{fuze_progress, fuze_success};
use fuze_platform::PlatformProvider;
use tracing::info;

/// Show a progress line, binding a console first so GUI launches see it.
pub fn progress(platform: &mut dyn PlatformProvider, message: &str) -> Result<()> {
    platform.ensure_console(false)?;
    info!("{}", message);
    fuze_progress!("{}", message);
    Ok(())
}

/// Show a completion line on a bound console.
pub fn success(platform: &mut dyn PlatformProvider, message: &str) -> Result<()> {
    platform.ensure_console(false)?;
    info!("{}", message);
    fuze_success!("{}", message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuze_platform::providers::recording::Recorded;
    use fuze_platform::providers::RecordingPlatform;

    #[test]
    fn test_success_binds_console_first() {
        let mut platform = RecordingPlatform::new();
        success(&mut platform, "done").unwrap();
        assert_eq!(
            platform.events,
            vec![Recorded::EnsureConsole { interactive: false }]
        );
        assert!(platform.console_state().is_bound());
    }
}
