use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};

use fuze_core::error::{FuzeError, Result};
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::MakeWriter, prelude::*, registry, EnvFilter};

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
}

/// Logging knobs read from `FUZE_LOG*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file: PathBuf,
}

impl LogSettings {
    /// Read settings from the environment. `default_dir` anchors the log
    /// file when `FUZE_LOG_FILE` is unset.
    pub fn from_env(default_dir: &Path) -> Self {
        Self::from_lookup(default_dir, |key| env::var(key).ok())
    }

    fn from_lookup(default_dir: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let filter = lookup("FUZE_LOG").unwrap_or_else(|| "warn".to_string());
        let format = match lookup("FUZE_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("compact") => LogFormat::Compact,
            _ => LogFormat::Human,
        };
        let output = match lookup("FUZE_LOG_OUTPUT").as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            _ => LogOutput::Console,
        };
        let file = lookup("FUZE_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir.join("fuze.log"));

        Self {
            filter,
            format,
            output,
            file,
        }
    }
}

macro_rules! install_fmt_layer {
    ($subscriber:expr, $layer:expr, $format:expr) => {
        match $format {
            LogFormat::Json => $subscriber.with($layer.json()).try_init(),
            LogFormat::Compact => $subscriber.with($layer.compact()).try_init(),
            LogFormat::Human => $subscriber.with($layer).try_init(),
        }
    };
}

/// Initializes the global tracing subscriber.
///
/// Console output goes to stderr. The returned guard must be held for as
/// long as file logging should keep flushing.
pub fn init_subscriber(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&settings.filter)
        .map_err(|e| FuzeError::Config(format!("invalid FUZE_LOG filter: {}", e)))?;

    let mut guard: Option<WorkerGuard> = None;
    let subscriber = registry().with(env_filter);

    let log_dir = settings
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_filename = settings.file.file_name().unwrap_or("fuze.log".as_ref());

    let result = match settings.output {
        LogOutput::Both => {
            let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
            let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);
            guard = Some(worker);

            let tee_writer = MakeTee {
                make_a: std::io::stderr,
                make_b: non_blocking,
            };
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(tee_writer);
            install_fmt_layer!(subscriber, fmt_layer, settings.format)
        }
        LogOutput::Console => {
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            install_fmt_layer!(subscriber, fmt_layer, settings.format)
        }
        LogOutput::File => {
            let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
            let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);
            guard = Some(worker);

            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            install_fmt_layer!(subscriber, fmt_layer, settings.format)
        }
    };

    result.map_err(|e| FuzeError::Internal(format!("Failed to initialize tracing: {}", e)))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(Path::new("/opt/app"), |key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_are_quiet_console() {
        let s = settings(&[]);
        assert_eq!(s.filter, "warn");
        assert_eq!(s.format, LogFormat::Human);
        assert_eq!(s.output, LogOutput::Console);
        assert_eq!(s.file, Path::new("/opt/app").join("fuze.log"));
    }

    #[test]
    fn test_overrides_are_honored() {
        let s = settings(&[
            ("FUZE_LOG", "fuze=debug"),
            ("FUZE_LOG_FORMAT", "json"),
            ("FUZE_LOG_OUTPUT", "both"),
            ("FUZE_LOG_FILE", "/var/log/fuze.log"),
        ]);
        assert_eq!(s.filter, "fuze=debug");
        assert_eq!(s.format, LogFormat::Json);
        assert_eq!(s.output, LogOutput::Both);
        assert_eq!(s.file, PathBuf::from("/var/log/fuze.log"));
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let s = settings(&[("FUZE_LOG_FORMAT", "xml"), ("FUZE_LOG_OUTPUT", "syslog")]);
        assert_eq!(s.format, LogFormat::Human);
        assert_eq!(s.output, LogOutput::Console);
    }
}
