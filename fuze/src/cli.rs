use std::ffi::OsString;

use clap::Parser;

/// The launcher takes no options of its own; everything after argv[0] goes
/// to the application.
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(
    name = "fuze",
    about = "Unpack, provision and run a bundled python application",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Arguments forwarded to the application unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub forwarded: Vec<OsString>,
}

impl Args {
    pub fn from_env() -> Self {
        Self::from_raw(std::env::args_os())
    }

    /// Parse a full argv, argv[0] included.
    pub fn from_raw<I, T>(raw: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let raw: Vec<OsString> = raw.into_iter().map(Into::into).collect();
        let tail = raw.iter().skip(1).cloned().collect::<Vec<_>>();

        let mut args = Self::try_parse_from(&raw).unwrap_or_else(|_| Self {
            forwarded: tail.clone(),
        });
        // clap swallows a leading `--` as its own separator.
        if tail.first().is_some_and(|a| a == "--") && args.forwarded.len() < tail.len() {
            args.forwarded.insert(0, OsString::from("--"));
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded(raw: &[&str]) -> Vec<String> {
        Args::from_raw(raw.iter().copied())
            .forwarded
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_arguments_pass_through_in_order() {
        assert_eq!(
            forwarded(&["fuze", "input.csv", "--verbose", "-n", "3"]),
            vec!["input.csv", "--verbose", "-n", "3"]
        );
    }

    #[test]
    fn test_launcher_flags_are_not_intercepted() {
        assert_eq!(forwarded(&["fuze", "--help"]), vec!["--help"]);
        assert_eq!(forwarded(&["fuze", "-V"]), vec!["-V"]);
    }

    #[test]
    fn test_leading_separator_is_kept() {
        assert_eq!(forwarded(&["fuze", "--", "x"]), vec!["--", "x"]);
    }

    #[test]
    fn test_no_arguments() {
        assert!(forwarded(&["fuze"]).is_empty());
    }
}
