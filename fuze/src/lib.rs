//! Self-extracting launcher for bundled python applications.
//!
//! On every start the launcher copies the bundle into its working directory
//! (only what changed), makes sure `uv` and a python runtime are installed,
//! syncs the project's dependencies and finally hands off to `uv run`.

pub mod cli;
pub mod launcher;
pub mod layout;
pub mod provisioner;
pub mod report;
pub mod sync;

pub use launcher::{launch, LaunchRequest};
