//! Archive a repository and report the result on the triggering issue.
//!
//! The run has two steps, each with its own client and credential:
//!
//! 1. archive the target repository with the admin token;
//! 2. comment on the issue with the comment token.
//!
//! A failed archive does not stop the comment; it only changes its wording.
//! Both failures are kept in the [`Outcome`].

use tracing::{debug, error, info};

use crate::command::ArchiveCommand;
use crate::config::ActionInputs;
use crate::error::Result;
use crate::github::{ClientConfig, GitHubClient, IssueOps, RepoOps};

/// A step of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Archive,
    Comment,
}

/// A failed step and the message reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub message: String,
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Repository the run tried to archive.
    pub target: String,
    pub archived: bool,
    pub commented: bool,
    /// Failures in the order they happened.
    pub failures: Vec<StepFailure>,
}

impl Outcome {
    fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            archived: false,
            commented: false,
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, step: Step, message: String) {
        error!("{}", message);
        self.failures.push(StepFailure { step, message });
    }

    /// True when neither step failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failure reported as the run's result: the most recent one.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failures.last().map(|f| f.message.as_str())
    }

    /// Step outputs published for later workflow steps.
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("archived", self.archived.to_string()),
            ("commented", self.commented.to_string()),
            ("repository", self.target.clone()),
        ]
    }
}

/// Text of the comment posted on the issue.
pub fn comment_body(actor: &str, target: &str, archived: bool) -> String {
    if archived {
        format!("@{} archived repo {}", actor, target)
    } else {
        format!("@{} failed to archive repo {}", actor, target)
    }
}

/// Archive the requested repository, then comment on the issue.
pub async fn run(inputs: &ActionInputs, command: &ArchiveCommand, config: &ClientConfig) -> Outcome {
    let target = command.repository.as_str();
    let mut outcome = Outcome::new(target);

    match archive(inputs, target, config).await {
        Ok(()) => outcome.archived = true,
        Err(e) => outcome.fail(Step::Archive, format!("Failed to archive repo: {}", e)),
    }

    let body = comment_body(&inputs.actor, target, outcome.archived);
    match comment(inputs, &body, config).await {
        Ok(()) => outcome.commented = true,
        Err(e) => outcome.fail(Step::Comment, format!("Failed to comment on issue: {}", e)),
    }

    outcome
}

async fn archive(inputs: &ActionInputs, target: &str, config: &ClientConfig) -> Result<()> {
    info!("Creating client");
    let client = GitHubClient::new(inputs.admin_token.clone(), config.clone());
    debug!("Client created");

    info!("Archiving repo {}/{}", inputs.org, target);
    let repo = client.archive_repo(&inputs.org, target).await?;
    debug!("Repo {} archived: {}", repo.full_name, repo.archived);
    Ok(())
}

async fn comment(inputs: &ActionInputs, body: &str, config: &ClientConfig) -> Result<()> {
    info!("Creating client");
    let client = GitHubClient::new(inputs.token.clone(), config.clone());
    debug!("Client created");

    info!(
        "Commenting on issue {}/{}#{}",
        inputs.org, inputs.repo, inputs.issue_number
    );
    let comment = client
        .create_issue_comment(&inputs.org, &inputs.repo, inputs.issue_number, body)
        .await?;
    debug!("Comment {} created", comment.id);
    Ok(())
}
