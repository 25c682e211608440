//! GitHub API integration.
//!
//! Each [`GitHubClient`] is bound to a single credential and built from a
//! [`ClientConfig`]. Clients share nothing, so callers that act with different
//! privileges simply build one client per credential:
//!
//! ```rust,no_run
//! use archive_repo::config::Token;
//! use archive_repo::github::{ClientConfig, GitHubClient, IssueOps, RepoOps};
//!
//! # async fn demo() -> archive_repo::error::Result<()> {
//! let config = ClientConfig::new("https://api.github.com");
//!
//! let admin = GitHubClient::new(Token::new("ghp_admin"), config.clone());
//! admin.archive_repo("acme", "old-service").await?;
//!
//! let bot = GitHubClient::new(Token::new("ghp_bot"), config);
//! bot.create_issue_comment("acme", "requests", 42, "done").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod issues;
mod repos;
pub mod retry;

pub use client::{ClientConfig, DEFAULT_API_URL, GitHubClient};
pub use issues::{IssueComment, IssueOps};
pub use repos::{GitHubRepo, RepoOps};
pub use retry::{RateLimitHandler, RateLimitKind, RateLimited, ThrottleConfig};
