//! Action inputs.
//!
//! Inputs arrive either as command-line flags or, when running as a CI step,
//! as `INPUT_<NAME>` environment variables. [`RawInputs`] accepts whatever was
//! supplied; [`ActionInputs`] is the validated form the rest of the crate uses.

use std::fmt;

use clap::Args;

use crate::error::{ArchiveError, Result};

/// Inputs as supplied, before validation.
#[derive(Clone, Default, Args)]
pub struct RawInputs {
    /// User to mention in the outcome comment
    #[arg(long, env = "INPUT_ACTOR")]
    pub actor: Option<String>,

    /// Token allowed to archive repositories in the organization
    #[arg(long, env = "INPUT_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Command text; its last word names the repository to archive
    #[arg(long, env = "INPUT_BODY")]
    pub body: Option<String>,

    /// Issue to post the outcome comment on
    #[arg(long, env = "INPUT_ISSUE_NUMBER")]
    pub issue_number: Option<String>,

    /// Organization owning the archived repository and the issue
    #[arg(long, env = "INPUT_ORG")]
    pub org: Option<String>,

    /// Repository containing the issue
    #[arg(long, env = "INPUT_REPO")]
    pub repo: Option<String>,

    /// Token allowed to comment on the issue
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// An API credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Validated action inputs.
#[derive(Debug, Clone)]
pub struct ActionInputs {
    pub actor: String,
    pub admin_token: Token,
    pub body: String,
    pub issue_number: u64,
    pub org: String,
    pub repo: String,
    pub token: Token,
}

impl TryFrom<RawInputs> for ActionInputs {
    type Error = ArchiveError;

    fn try_from(raw: RawInputs) -> Result<Self> {
        let actor = required("actor", raw.actor)?;
        let admin_token = required("admin_token", raw.admin_token)?;
        let body = required("body", raw.body)?;
        let issue_number = required("issue_number", raw.issue_number)?;
        let org = required("org", raw.org)?;
        let repo = required("repo", raw.repo)?;
        let token = required("token", raw.token)?;

        Ok(Self {
            actor,
            admin_token: Token::new(admin_token),
            body,
            issue_number: parse_issue_number(&issue_number)?,
            org,
            repo,
            token: Token::new(token),
        })
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ArchiveError::MissingInput(name)),
    }
}

fn parse_issue_number(value: &str) -> Result<u64> {
    let invalid = || ArchiveError::InvalidInput {
        name: "issue_number",
        message: format!("expected a positive integer, got '{}'", value),
    };
    let number: u64 = value.strip_prefix('#').unwrap_or(value).parse().map_err(|_| invalid())?;
    if number == 0 {
        return Err(invalid());
    }
    Ok(number)
}
