//! The `.versionista.yml` configuration file.

use indexmap::IndexMap;
use itertools::Itertools;
#[cfg(feature = "miette")]
use miette::Diagnostic;
use serde::Deserialize;

pub use repo::{InvalidRepoId, RepoConfig, RepoId};
pub use target::Target;

mod repo;
mod target;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Everything in `.versionista.yml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gh_token: Option<String>,
    /// Base of the GitHub REST API, for GitHub Enterprise.
    #[serde(default)]
    pub github_api_url: Option<String>,
    /// Ticket prefixes like `PROJ` to look for in pull requests.
    #[serde(default)]
    pub jira_boards: Vec<String>,
    /// The `<org>` in `https://<org>.atlassian.net`.
    #[serde(default)]
    pub jira_org_id: Option<String>,
    /// Command to edit release notes with, `$EDITOR` and then `vi` otherwise.
    #[serde(default)]
    pub editor: Option<String>,
    /// Branch to release from, keyed by `owner/name`.
    #[serde(default)]
    pub branches: IndexMap<String, String>,
    #[serde(default)]
    pub projects: IndexMap<String, Vec<RepoConfig>>,
}

impl Config {
    /// # Errors
    ///
    /// If `source` isn't YAML or doesn't match the expected shape.
    pub fn from_yaml(source: &str) -> Result<Self, Error> {
        serde_yaml::from_str(source).map_err(Error::Parse)
    }

    /// Use `token` if the file didn't set one.
    #[must_use]
    pub fn with_token_fallback(mut self, token: Option<String>) -> Self {
        if self.token().is_none() {
            self.gh_token = token.filter(|token| !token.trim().is_empty());
        }
        self
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.gh_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    #[must_use]
    pub fn github_api_url(&self) -> &str {
        self.github_api_url
            .as_deref()
            .map_or(DEFAULT_GITHUB_API_URL, |url| url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn jira_org_id(&self) -> Option<&str> {
        self.jira_org_id
            .as_deref()
            .map(str::trim)
            .filter(|org| !org.is_empty())
    }

    /// The branch releases of `repo` are cut from.
    #[must_use]
    pub fn branch(&self, repo: &RepoId) -> &str {
        self.branches
            .get(&repo.to_string())
            .map_or(DEFAULT_BRANCH, String::as_str)
    }

    /// # Errors
    ///
    /// The first problem found, naming the project (and repository index) it's in.
    pub fn validate(&self) -> Result<(), Error> {
        if self.token().is_none() {
            return Err(Error::MissingToken);
        }
        if self.projects.is_empty() {
            return Err(Error::NoProjects);
        }
        for (project, repos) in &self.projects {
            if repos.is_empty() {
                return Err(Error::EmptyProject {
                    project: project.clone(),
                });
            }
            for (index, repo) in repos.iter().enumerate() {
                if repo.repo.trim().is_empty() {
                    return Err(Error::MissingRepo {
                        project: project.clone(),
                        index,
                    });
                }
                repo.id().map_err(|source| Error::InvalidRepo {
                    project: project.clone(),
                    index,
                    source,
                })?;
                if repo.jira && self.jira_org_id().is_none() {
                    return Err(Error::MissingJiraOrgId {
                        project: project.clone(),
                        repo: repo.repo.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The single project containing `repo`, matched by `owner/name` or by `name` alone.
    ///
    /// # Errors
    ///
    /// If no project, or more than one, contains it.
    pub fn find_project_by_repository(&self, repo: &str) -> Result<&str, Error> {
        let matching = self
            .projects
            .iter()
            .filter(|(_, repos)| repos.iter().any(|config| matches_repo(config, repo)))
            .map(|(name, _)| name.as_str())
            .collect_vec();
        match matching.as_slice() {
            [] => Err(Error::UnknownRepository {
                repo: repo.to_string(),
            }),
            [project] => Ok(*project),
            projects => Err(Error::AmbiguousRepository {
                repo: repo.to_string(),
                projects: projects.join(", "),
            }),
        }
    }

    /// The project named by `--project`, or by a positional argument, or the only project.
    ///
    /// # Errors
    ///
    /// If the named project doesn't exist, or nothing was named and there are several.
    pub fn project_name<'a>(
        &'a self,
        flag: Option<&'a str>,
        argument: Option<&'a str>,
    ) -> Result<&'a str, Error> {
        if let Some(name) = flag.or(argument) {
            return self
                .projects
                .get_key_value(name)
                .map(|(name, _)| name.as_str())
                .ok_or_else(|| self.unknown_project(name));
        }
        let mut names = self.projects.keys();
        match (names.next(), names.next()) {
            (Some(only), None) => Ok(only.as_str()),
            _ => Err(Error::AmbiguousProject {
                projects: self.projects.keys().join(", "),
            }),
        }
    }

    fn unknown_project(&self, name: &str) -> Error {
        Error::UnknownProject {
            name: name.to_string(),
            known: self.projects.keys().join(", "),
        }
    }
}

pub(crate) fn matches_repo(config: &RepoConfig, repo: &str) -> bool {
    config.repo == repo || config.short_name() == repo
}

#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
pub enum Error {
    #[error("Could not parse the config file: {0}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::parse),
            help("The config file must be YAML with keys like gh_token and projects")
        )
    )]
    Parse(#[source] serde_yaml::Error),
    #[error("No GitHub token configured")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::missing_token),
            help("Set gh_token in the config file or the GITHUB_TOKEN environment variable")
        )
    )]
    MissingToken,
    #[error("No projects configured")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::no_projects),
            help("Add at least one project with at least one repo under `projects`")
        )
    )]
    NoProjects,
    #[error("Project {project} has no repositories")]
    #[cfg_attr(feature = "miette", diagnostic(code(config::empty_project)))]
    EmptyProject { project: String },
    #[error("Repository {index} of project {project} has no `repo`")]
    #[cfg_attr(feature = "miette", diagnostic(code(config::missing_repo)))]
    MissingRepo { project: String, index: usize },
    #[error("Repository {index} of project {project} is invalid: {source}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::invalid_repo),
            help("Repositories are written as owner/name, like octocat/hello-world")
        )
    )]
    InvalidRepo {
        project: String,
        index: usize,
        #[source]
        source: InvalidRepoId,
    },
    #[error("{repo} in project {project} enables jira, but jira_org_id is not set")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::missing_jira_org_id),
            help("Set jira_org_id to the <org> part of https://<org>.atlassian.net")
        )
    )]
    MissingJiraOrgId { project: String, repo: String },
    #[error("Project {name} not found")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(code(config::unknown_project), help("Configured projects: {known}"))
    )]
    UnknownProject { name: String, known: String },
    #[error("Repository {repo} is not part of any project")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::unknown_repository),
            help("Pass owner/name to release a repository outside of any project")
        )
    )]
    UnknownRepository { repo: String },
    #[error("Repository {repo} is part of several projects: {projects}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::ambiguous_repository),
            help("Choose one with --project")
        )
    )]
    AmbiguousRepository { repo: String, projects: String },
    #[error("Multiple projects found: {projects}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::ambiguous_project),
            help("Choose one with --project or as an argument")
        )
    )]
    AmbiguousProject { projects: String },
    #[error("Target is not a repository: {0}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(config::invalid_target),
            help("Pass a project name, a repository name, or owner/name")
        )
    )]
    InvalidTarget(#[source] InvalidRepoId),
    #[error("Repository {repo} is not part of project {project}")]
    #[cfg_attr(feature = "miette", diagnostic(code(config::not_a_member)))]
    NotAMember { project: String, repo: String },
}
