//! Parsing of the archive command body.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ArchiveError, Result};

static REPO_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,100}$").expect("valid repository name pattern"));

/// A request to archive one repository of the organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveCommand {
    /// Bare name of the repository to archive.
    pub repository: String,
}

impl ArchiveCommand {
    /// Parse a command body such as `/archive old-service`.
    ///
    /// The last whitespace-delimited word names the repository. It may be
    /// qualified as `org/name` as long as the owner is `org`.
    pub fn parse(body: &str, org: &str) -> Result<Self> {
        let token = body
            .split_whitespace()
            .last()
            .ok_or_else(|| ArchiveError::InvalidCommand("command body is empty".into()))?;

        let name = match token.split_once('/') {
            Some((owner, name)) if owner.eq_ignore_ascii_case(org) => name,
            Some((owner, _)) => {
                return Err(ArchiveError::InvalidCommand(format!(
                    "repository '{}' is not owned by organization '{}' (owner is '{}')",
                    token, org, owner
                )));
            }
            None => token,
        };

        if !is_valid_repo_name(name) {
            return Err(ArchiveError::InvalidCommand(format!(
                "'{}' is not a valid repository name",
                name
            )));
        }

        Ok(Self {
            repository: name.to_string(),
        })
    }
}

fn is_valid_repo_name(name: &str) -> bool {
    name != "." && name != ".." && REPO_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_token_is_target() {
        let cmd = ArchiveCommand::parse("/archive old-service", "acme").unwrap();
        assert_eq!(cmd.repository, "old-service");
    }

    #[test]
    fn test_surrounding_whitespace() {
        let cmd = ArchiveCommand::parse("  please\tarchive \n legacy.api  \n", "acme").unwrap();
        assert_eq!(cmd.repository, "legacy.api");
    }

    #[test]
    fn test_single_word_body() {
        let cmd = ArchiveCommand::parse("widgets", "acme").unwrap();
        assert_eq!(cmd.repository, "widgets");
    }

    #[test]
    fn test_qualified_name_in_org() {
        let cmd = ArchiveCommand::parse("please archive acme/widgets", "acme").unwrap();
        assert_eq!(cmd.repository, "widgets");

        let cmd = ArchiveCommand::parse("please archive ACME/widgets", "acme").unwrap();
        assert_eq!(cmd.repository, "widgets");
    }

    #[test]
    fn test_qualified_name_other_org() {
        let err = ArchiveCommand::parse("archive other/widgets", "acme").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidCommand(_)));
        assert!(err.to_string().contains("not owned by organization 'acme'"));
    }

    #[test]
    fn test_empty_body() {
        let err = ArchiveCommand::parse(" \n\t ", "acme").unwrap_err();
        assert!(err.to_string().contains("command body is empty"));
    }

    #[test]
    fn test_invalid_names() {
        let too_long = "a".repeat(101);
        for body in [
            "/archive .",
            "/archive ..",
            "/archive acme/",
            "/archive acme/a/b",
            "/archive bad$name",
            "/archive <script>",
            too_long.as_str(),
        ] {
            assert!(
                ArchiveCommand::parse(body, "acme").is_err(),
                "{body} should be rejected"
            );
        }
    }

    #[test]
    fn test_max_length_name() {
        let name = "a".repeat(100);
        let cmd = ArchiveCommand::parse(&format!("/archive {}", name), "acme").unwrap();
        assert_eq!(cmd.repository, name);
    }
}
