use std::{fmt::Display, str::FromStr};

#[cfg(feature = "miette")]
use miette::Diagnostic;
use serde::Deserialize;

/// One repository entry of a project in `.versionista.yml`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct RepoConfig {
    /// `owner/name` on GitHub.
    #[serde(default)]
    pub repo: String,
    /// Shown instead of the repository name in prompts and release notes.
    #[serde(default)]
    pub alias: Option<String>,
    /// Whether release notes for this repository get a ticket column.
    #[serde(default)]
    pub jira: bool,
    /// Whether release notes link to sibling releases of the same project.
    #[serde(default, rename = "crossLink")]
    pub cross_link: bool,
}

impl RepoConfig {
    /// # Errors
    ///
    /// If `repo` isn't `owner/name`.
    pub fn id(&self) -> Result<RepoId, InvalidRepoId> {
        self.repo.parse()
    }

    /// The `name` half of `owner/name`, or the whole thing if there's no `/`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.repo
            .split_once('/')
            .map_or(self.repo.as_str(), |(_, name)| name)
    }
}

/// Identifies a repository on the hosting platform.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRepoId(s.to_string());
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("{0:?} is not a repository")]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(config::invalid_repo),
        help("Repositories are written as owner/name, like octocat/hello-world"),
    )
)]
pub struct InvalidRepoId(pub String);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_repo_id {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse() {
        let id: RepoId = "octocat/hello-world".parse().unwrap();
        assert_eq!(id.owner, "octocat");
        assert_eq!(id.name, "hello-world");
        assert_eq!(id.to_string(), "octocat/hello-world");
    }

    #[test]
    fn invalid() {
        for bad in ["", "octocat", "/name", "owner/", "a/b/c"] {
            assert_eq!(
                bad.parse::<RepoId>(),
                Err(InvalidRepoId(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn short_name() {
        let config = RepoConfig {
            repo: "acme/backend".to_string(),
            ..RepoConfig::default()
        };
        assert_eq!(config.short_name(), "backend");
    }
}
