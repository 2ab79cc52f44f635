//! Pins the README install snippet to the current commit and publishes it.
//!
//! The crate is split along the collaborators of a release run:
//!
//! - [`runner`]: executes `git` and captures its output
//! - [`readme`]: locates and rewrites the install snippet line
//! - [`workflow`]: the linear release state machine tying both together
pub mod cli;
pub mod config;
pub mod error;
pub mod readme;
pub mod runner;
pub mod workflow;

pub use error::{ReleaseError, Result};
pub use workflow::{AbortReason, ReleaseOutcome, ReleaseWorkflow};
