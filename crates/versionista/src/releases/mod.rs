//! Working out, deciding on, and publishing releases.

use std::fmt::{self, Display};

use miette::Diagnostic;
use tracing::{info, warn};
use versionista_versioning::{InvalidVersionSyntax, TicketExtractor, Version, display_version};

pub(crate) use workflow::{Mode, Releaser};

use crate::{
    integrations::{self, Forge},
    prompt,
    repository::{ReleaseRepository, Selection},
};

mod cross_links;
mod decision;
pub(crate) mod resolve;
mod workflow;

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Forge(#[from] integrations::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] InvalidVersionSyntax),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] prompt::Error),
    #[error("Could not publish {tag}")]
    #[diagnostic(
        code(release::publish),
        help(
            "Nothing was retried. Check the releases page of the repository, \
            then run again once the problem is fixed."
        )
    )]
    Publish {
        tag: String,
        #[source]
        #[diagnostic_source]
        source: integrations::Error,
    },
}

/// An [`Error`] and the repository it happened to.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("Problem with {repo}")]
pub(crate) struct RepositoryError {
    repo: String,
    #[source]
    #[diagnostic_source]
    source: Error,
}

impl RepositoryError {
    pub(crate) fn new(repo: &ReleaseRepository, source: impl Into<Error>) -> Self {
        Self {
            repo: repo.id.to_string(),
            source: source.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Error {
        &self.source
    }
}

/// Every repository that failed in a run which kept going without them.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{} of the repositories failed", .errors.len())]
#[diagnostic(code(release::failed))]
pub(crate) struct BatchError {
    #[related]
    errors: Vec<RepositoryError>,
}

/// How releasing one repository ended.
#[derive(Debug)]
pub(crate) enum Outcome {
    NoChanges,
    Skipped,
    Released(Version),
    Failed(RepositoryError),
}

/// The version every repository ended up on, and whatever went wrong along the way.
#[derive(Debug)]
pub(crate) struct Summary {
    label: String,
    versions: Vec<(String, Option<Version>)>,
    errors: Vec<RepositoryError>,
}

impl Summary {
    pub(crate) fn new(label: &str, outcomes: Vec<(ReleaseRepository, Outcome)>) -> Self {
        let mut summary = Self {
            label: label.to_string(),
            versions: Vec::with_capacity(outcomes.len()),
            errors: Vec::new(),
        };
        for (repo, outcome) in outcomes {
            let version = match outcome {
                Outcome::Released(version) => Some(version),
                Outcome::NoChanges | Outcome::Skipped => repo.latest_release.clone(),
                Outcome::Failed(err) => {
                    summary.errors.push(err);
                    repo.latest_release.clone()
                }
            };
            summary
                .versions
                .push((repo.display_name().to_string(), version));
        }
        summary
    }

    /// # Errors
    ///
    /// If any repository failed.
    pub(crate) fn into_result(self) -> Result<(), BatchError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BatchError {
                errors: self.errors,
            })
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} versions are:", self.label)?;
        for (name, version) in &self.versions {
            write!(f, "\n  {name}: {}", display_version(version.as_ref()))?;
        }
        Ok(())
    }
}

/// Look up the latest version of every selected repository, all at once.
pub(crate) async fn review<F: Forge>(forge: &F, selection: Selection) -> Summary {
    let Selection {
        label, mut repos, ..
    } = selection;
    info!("Fetching latest versions…");
    let tickets = TicketExtractor::default();
    let results = resolve::ChangeSetResolver::new(forge, &tickets)
        .resolve_versions(&mut repos)
        .await;
    let outcomes = repos
        .into_iter()
        .zip(results)
        .map(|(repo, result)| {
            let outcome = match result {
                Ok(_) => Outcome::NoChanges,
                Err(err) => {
                    warn!("Could not fetch the latest version of {repo}: {err}");
                    Outcome::Failed(RepositoryError::new(&repo, err))
                }
            };
            (repo, outcome)
        })
        .collect();
    Summary::new(&label, outcomes)
}
