//! Foundation crate for the fuze launcher.
//!
//! Holds the error taxonomy shared by every layer, the filesystem helpers
//! used for bundle extraction, and the output macros.

pub mod error;
pub mod file_system;
pub mod output_macros;

pub use error::{FuzeError, Result};
