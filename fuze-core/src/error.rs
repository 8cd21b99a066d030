use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FuzeError {
    Config(String),
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    Io(#[from] io::Error),
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
    AbnormalExit {
        command: String,
        detail: String,
    },
    ExternalTool {
        command: String,
        code: i32,
    },
    InstallFailed {
        tool: String,
        path: PathBuf,
    },
    Console(String),
    Internal(String),
}

impl FuzeError {
    /// Wrap an I/O failure together with the path it happened on.
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FuzeError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl Display for FuzeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            FuzeError::Config(s) => write!(f, "Configuration error: {}", s),
            FuzeError::Filesystem { path, source } => {
                write!(f, "Filesystem error at {}: {}", path.display(), source)
            }
            FuzeError::Io(e) => write!(f, "I/O error: {}", e),
            FuzeError::Spawn { command, source } => {
                write!(f, "Failed to start '{}': {}", command, source)
            }
            FuzeError::Wait { command, source } => {
                write!(f, "Failed to wait for '{}': {}", command, source)
            }
            FuzeError::AbnormalExit { command, detail } => {
                write!(f, "Command '{}' did not exit normally: {}", command, detail)
            }
            FuzeError::ExternalTool { command, code } => {
                write!(f, "Command '{}' failed with exit code {}", command, code)
            }
            FuzeError::InstallFailed { tool, path } => {
                write!(f, "{} installation failed: {} still missing", tool, path.display())
            }
            FuzeError::Console(s) => write!(f, "Console error: {}", s),
            FuzeError::Internal(s) => write!(f, "Internal error: {}", s),
        }
    }
}

pub type Result<T> = std::result::Result<T, FuzeError>;
