//! # archive-repo
//!
//! Archives a repository of a GitHub organization on request, then reports the
//! result as a comment on the issue that asked for it.
//!
//! The archive runs with an administrative token and the comment with a
//! separate, less privileged one. A failed archive still gets a comment, one
//! that says it failed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use archive_repo::prelude::*;
//!
//! # async fn demo(raw: RawInputs) -> archive_repo::error::Result<()> {
//! let inputs = ActionInputs::try_from(raw)?;
//! let command = ArchiveCommand::parse(&inputs.body, &inputs.org)?;
//!
//! let outcome = archive::run(&inputs, &command, &ClientConfig::default()).await;
//! if let Some(reason) = outcome.failure_reason() {
//!     eprintln!("{}", reason);
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod archive;
pub mod command;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::archive::{self, Outcome, Step, StepFailure};
    pub use crate::command::ArchiveCommand;
    pub use crate::config::{ActionInputs, RawInputs, Token};
    pub use crate::error::{ArchiveError, Result};
    pub use crate::github::{
        ClientConfig, GitHubClient, GitHubRepo, IssueComment, IssueOps, RepoOps, ThrottleConfig,
    };
    pub use crate::logging::LogFormat;
}

pub use prelude::*;
