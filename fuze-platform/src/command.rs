//! Platform-neutral description of a child process invocation.

use std::ffi::{OsStr, OsString};
use std::io;
use std::iter;
use std::path::{Path, PathBuf};

use fuze_core::error::{FuzeError, Result};

/// How a command line is rendered for logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Posix,
    Windows,
}

/// A program, its arguments and where to run it.
///
/// `interactive` commands get the caller's stdin; everything else reads from
/// the null device so a stray prompt cannot hang the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
    pub interactive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Arguments as lossy strings, handy for assertions and logging.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Quoted command line for humans.
    pub fn display(&self, style: QuoteStyle) -> String {
        iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| quote_arg(part, style))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_arg(arg: &OsStr, style: QuoteStyle) -> String {
    let arg = arg.to_string_lossy();
    match style {
        QuoteStyle::Posix => shlex::try_quote(&arg)
            .map(|q| q.into_owned())
            .unwrap_or_else(|_| arg.into_owned()),
        QuoteStyle::Windows => quote_windows_arg(&arg),
    }
}

/// Quote one argument so `CommandLineToArgvW` splits it back unchanged.
pub fn quote_windows_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '\t', '\n', '\x0b', '"']);
    if !needs_quotes {
        return arg.to_string();
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(iter::repeat('\\').take(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }
    // Backslashes before the closing quote must be doubled.
    out.extend(iter::repeat('\\').take(backslashes * 2));
    out.push('"');
    out
}

/// Resolve a bare program name through `PATH`. Anything containing a path
/// separator is used as given.
pub fn resolve_program(program: &OsStr) -> Result<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 || path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    which::which(program).map_err(|e| FuzeError::Spawn {
        command: program.to_string_lossy().into_owned(),
        source: io::Error::new(io::ErrorKind::NotFound, e.to_string()),
    })
}
