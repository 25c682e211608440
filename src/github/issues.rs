//! GitHub issue operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::github::GitHubClient;

/// A comment on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateComment<'a> {
    body: &'a str,
}

/// Issue comment operations.
#[async_trait]
pub trait IssueOps {
    /// Post a comment on an issue or pull request.
    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment>;
}

#[async_trait]
impl IssueOps for GitHubClient {
    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment> {
        let endpoint = format!(
            "/repos/{}/{}/issues/{}/comments",
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            issue_number
        );
        self.post(&endpoint, &CreateComment { body }).await
    }
}
