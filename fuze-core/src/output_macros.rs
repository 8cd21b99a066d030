//! Output macros for user-facing launcher messages.
//!
//! Templates live in `fuze-messages`; these macros only decide the stream and
//! the leading marker. Progress, status and errors go to stderr so the
//! launched application's stdout stays clean.

/// Substitute `{key}` placeholders in a message template.
#[macro_export]
macro_rules! msg_format {
    ($template:expr) => {
        $template.to_string()
    };
    ($template:expr, $($key:ident = $value:expr),+ $(,)?) => {
        {
            let mut result = $template.to_string();
            $(
                result = result.replace(&format!("{{{}}}", stringify!($key)), &$value.to_string());
            )+
            result
        }
    };
}

#[macro_export]
macro_rules! fuze_error {
    ($($arg:tt)*) => {
        eprintln!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! fuze_success {
    ($($arg:tt)*) => {
        eprintln!("✓ {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! fuze_warning {
    ($($arg:tt)*) => {
        eprintln!("⚠ {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! fuze_progress {
    ($($arg:tt)*) => {
        eprintln!("▶ {}", format!($($arg)*));
    };
}
