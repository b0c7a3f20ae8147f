use futures::{StreamExt, TryStreamExt, future::join_all, stream};
use itertools::Itertools;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use versionista_versioning::{
    Entry, PullRequest, TicketExtractor, Version, changelog::pull_request_number,
};

use super::Error;
use crate::{
    integrations::{Commit, Forge, MergedWindow},
    repository::ReleaseRepository,
};

/// Never-released repositories get a changelog of this many recent pull requests.
const BOOTSTRAP_PULL_REQUESTS: usize = 10;
/// Never-released repositories have changes if anything was merged this recently.
const BOOTSTRAP_WINDOW: Duration = Duration::days(30);
/// Requests in flight at once while building a single changelog.
const CONCURRENT_REQUESTS: usize = 8;

/// What's happened in a repository since its latest release.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ChangeSet {
    NoChanges { latest: Version },
    Pending { latest: Version, entries: Vec<Entry> },
}

/// Works out versions and changelogs. Never asks the operator anything.
pub(crate) struct ChangeSetResolver<'a, F> {
    forge: &'a F,
    tickets: &'a TicketExtractor,
}

impl<'a, F: Forge> ChangeSetResolver<'a, F> {
    pub(crate) const fn new(forge: &'a F, tickets: &'a TicketExtractor) -> Self {
        Self { forge, tickets }
    }

    /// Resolve every repository at once. One failing doesn't stop the others.
    pub(crate) async fn resolve_all(
        &self,
        repos: &mut [ReleaseRepository],
    ) -> Vec<Result<ChangeSet, Error>> {
        join_all(repos.iter_mut().map(|repo| self.resolve(repo))).await
    }

    /// Resolve just the latest version of every repository at once.
    pub(crate) async fn resolve_versions(
        &self,
        repos: &mut [ReleaseRepository],
    ) -> Vec<Result<Version, Error>> {
        join_all(repos.iter_mut().map(|repo| self.resolve_version(repo))).await
    }

    pub(crate) async fn resolve(&self, repo: &mut ReleaseRepository) -> Result<ChangeSet, Error> {
        let latest = self.resolve_version(repo).await?;
        self.change_set(repo, latest).await
    }

    /// Set `repo.latest_release`. A repository without releases is at [`Version::BOOTSTRAP`].
    pub(crate) async fn resolve_version(
        &self,
        repo: &mut ReleaseRepository,
    ) -> Result<Version, Error> {
        let latest = match self.forge.latest_release(&repo.id).await? {
            Some(tag) => tag.parse::<Version>()?,
            None => Version::BOOTSTRAP,
        };
        debug!("{repo} is at {}", latest.tag());
        repo.latest_release = Some(latest.clone());
        Ok(latest)
    }

    pub(crate) async fn change_set(
        &self,
        repo: &ReleaseRepository,
        latest: Version,
    ) -> Result<ChangeSet, Error> {
        if latest.is_bootstrap() {
            if !self.has_changes(repo, &latest).await? {
                return Ok(ChangeSet::NoChanges { latest });
            }
            let entries = self.changelog(repo, &latest, &repo.target).await?;
            return Ok(ChangeSet::Pending { latest, entries });
        }
        let commits = self
            .forge
            .compare_commits(&repo.id, &latest.tag(), &repo.target)
            .await?;
        if commits.is_empty() {
            return Ok(ChangeSet::NoChanges { latest });
        }
        let entries = self.entries_from_commits(repo, &commits).await?;
        Ok(ChangeSet::Pending { latest, entries })
    }

    /// Whether anything is waiting to be released.
    ///
    /// Without a previous release there's nothing to compare with, so any recently merged pull
    /// request counts. If even that can't be checked, assume there are changes.
    pub(crate) async fn has_changes(
        &self,
        repo: &ReleaseRepository,
        latest: &Version,
    ) -> Result<bool, Error> {
        if latest.is_bootstrap() {
            let since = OffsetDateTime::now_utc() - BOOTSTRAP_WINDOW;
            return match self
                .forge
                .merged_pull_requests(&repo.id, MergedWindow::Since(since))
                .await
            {
                Ok(merged) => Ok(!merged.is_empty()),
                Err(err) => {
                    warn!("Could not check {repo} for recent pull requests, assuming it has changes: {err}");
                    Ok(true)
                }
            };
        }
        let commits = self
            .forge
            .compare_commits(&repo.id, &latest.tag(), &repo.target)
            .await?;
        Ok(!commits.is_empty())
    }

    /// The pull requests released if `head` is released now, in the order they were merged.
    pub(crate) async fn changelog(
        &self,
        repo: &ReleaseRepository,
        latest: &Version,
        head: &str,
    ) -> Result<Vec<Entry>, Error> {
        if latest.is_bootstrap() {
            let recent = self
                .forge
                .merged_pull_requests(&repo.id, MergedWindow::Latest(BOOTSTRAP_PULL_REQUESTS))
                .await?;
            return self.entries(repo, recent).await;
        }
        let commits = self
            .forge
            .compare_commits(&repo.id, &latest.tag(), head)
            .await?;
        self.entries_from_commits(repo, &commits).await
    }

    /// Commits without a pull request are left out, as are references to numbers that turn out
    /// not to be pull requests. A pull request referenced by several commits is only listed once,
    /// where it's first referenced.
    async fn entries_from_commits(
        &self,
        repo: &ReleaseRepository,
        commits: &[Commit],
    ) -> Result<Vec<Entry>, Error> {
        let numbers = commits
            .iter()
            .filter_map(|commit| {
                let number = pull_request_number(&commit.message);
                if number.is_none() {
                    debug!(
                        "Skipping commit {} of {repo}, it doesn't reference a pull request",
                        short_sha(&commit.sha)
                    );
                }
                number
            })
            .unique()
            .collect_vec();
        let found: Vec<(u64, Option<PullRequest>)> = stream::iter(numbers)
            .map(|number| async move {
                self.forge
                    .pull_request(&repo.id, number)
                    .await
                    .map(|pull_request| (number, pull_request))
            })
            .buffered(CONCURRENT_REQUESTS)
            .try_collect()
            .await?;
        let pull_requests = found
            .into_iter()
            .filter_map(|(number, pull_request)| {
                if pull_request.is_none() {
                    warn!("Skipping #{number} in {repo}, it isn't a pull request");
                }
                pull_request
            })
            .collect();
        self.entries(repo, pull_requests).await
    }

    async fn entries(
        &self,
        repo: &ReleaseRepository,
        pull_requests: Vec<PullRequest>,
    ) -> Result<Vec<Entry>, Error> {
        stream::iter(pull_requests)
            .map(|pull_request| self.entry(repo, pull_request))
            .buffered(CONCURRENT_REQUESTS)
            .try_collect()
            .await
    }

    async fn entry(
        &self,
        repo: &ReleaseRepository,
        pull_request: PullRequest,
    ) -> Result<Entry, Error> {
        let extractor = (repo.tickets_enabled && self.tickets.is_enabled()).then_some(self.tickets);
        let comments = if extractor.is_some() {
            self.forge
                .pull_request_comments(&repo.id, pull_request.number)
                .await?
        } else {
            Vec::new()
        };
        debug!("✓ #{}, {}", pull_request.number, pull_request.title);
        Ok(Entry::from_pull_request(pull_request, &comments, extractor))
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
