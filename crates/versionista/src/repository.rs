use std::fmt::Display;

use versionista_config::{Config, InvalidRepoId, RepoConfig, RepoId, Target};
use versionista_versioning::Version;

/// A repository and everything needed to release it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ReleaseRepository {
    pub(crate) id: RepoId,
    pub(crate) alias: Option<String>,
    pub(crate) tickets_enabled: bool,
    pub(crate) cross_link: bool,
    /// Branch (or commit) the next release is cut from.
    pub(crate) target: String,
    /// Set once, when the run starts.
    pub(crate) latest_release: Option<Version>,
}

impl ReleaseRepository {
    pub(crate) fn from_config(repo: &RepoConfig, config: &Config) -> Result<Self, InvalidRepoId> {
        let id = repo.id()?;
        Ok(Self {
            target: config.branch(&id).to_string(),
            id,
            alias: repo
                .alias
                .clone()
                .filter(|alias| !alias.trim().is_empty()),
            tickets_enabled: repo.jira,
            cross_link: repo.cross_link,
            latest_release: None,
        })
    }

    /// A repository named on the command line rather than through a project. Tickets are
    /// linked whenever the config knows how, and there are no siblings to link to.
    pub(crate) fn direct(id: RepoId, config: &Config) -> Self {
        Self {
            target: config.branch(&id).to_string(),
            id,
            alias: None,
            tickets_enabled: !config.jira_boards.is_empty() && config.jira_org_id().is_some(),
            cross_link: false,
            latest_release: None,
        }
    }

    /// The alias if there is one, otherwise the repository name.
    pub(crate) fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id.name)
    }

    pub(crate) fn release_url(&self, version: &Version) -> String {
        format!(
            "https://github.com/{owner}/{name}/releases/tag/{tag}",
            owner = self.id.owner,
            name = self.id.name,
            tag = version.tag()
        )
    }
}

impl Display for ReleaseRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The repositories a command runs on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Selection {
    /// A project name, or the repository named on the command line.
    pub(crate) label: String,
    pub(crate) repos: Vec<ReleaseRepository>,
    /// Only this one of `repos` is released, the rest are there to link to.
    pub(crate) focus: Option<usize>,
}

impl Selection {
    pub(crate) fn new(target: Target<'_>, config: &Config) -> Result<Self, InvalidRepoId> {
        let from_config = |repos: &[RepoConfig]| {
            repos
                .iter()
                .map(|repo| ReleaseRepository::from_config(repo, config))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(match target {
            Target::Repository(id) => Self {
                label: id.to_string(),
                repos: vec![ReleaseRepository::direct(id, config)],
                focus: None,
            },
            Target::Project { name, repos } => Self {
                label: name.to_string(),
                repos: from_config(repos)?,
                focus: None,
            },
            Target::Member {
                project,
                repos,
                index,
            } => Self {
                label: project.to_string(),
                repos: from_config(repos)?,
                focus: Some(index),
            },
        })
    }
}
