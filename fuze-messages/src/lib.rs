//! fuze-messages
//!
//! Central registry of user-facing message templates for the fuze launcher.
//! Templates use `{variable}` placeholders, filled in by
//! `fuze_core::msg_format!`.

pub mod messages;

pub use messages::{Messages, MESSAGES};
