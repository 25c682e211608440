//! GitHub repository operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::github::GitHubClient;

/// Repository information from GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub archived: bool,
    pub html_url: Option<String>,
}

/// Request body for updating repository settings.
#[derive(Debug, Default, Serialize)]
struct UpdateRepository {
    #[serde(skip_serializing_if = "Option::is_none")]
    archived: Option<bool>,
}

/// Repository settings operations.
#[async_trait]
pub trait RepoOps {
    /// Mark a repository as archived (read-only).
    async fn archive_repo(&self, owner: &str, repo: &str) -> Result<GitHubRepo>;
}

#[async_trait]
impl RepoOps for GitHubClient {
    async fn archive_repo(&self, owner: &str, repo: &str) -> Result<GitHubRepo> {
        let endpoint = format!(
            "/repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        let update = UpdateRepository {
            archived: Some(true),
        };
        self.patch(&endpoint, &update).await
    }
}
