use miette::Diagnostic;
use time::OffsetDateTime;
use versionista_config::RepoId;
use versionista_versioning::PullRequest;

pub(crate) mod github;

/// One commit of a comparison between two refs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Commit {
    pub(crate) sha: String,
    pub(crate) message: String,
}

/// Which merged pull requests to list, newest first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MergedWindow {
    /// Everything merged since this moment.
    Since(OffsetDateTime),
    /// Only the most recent few.
    Latest(usize),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct NewRelease<'a> {
    pub(crate) tag: &'a str,
    pub(crate) name: &'a str,
    pub(crate) body: &'a str,
    /// Branch or commit the tag is created from.
    pub(crate) target_commitish: &'a str,
    pub(crate) prerelease: bool,
}

/// The hosting platform operations releases are built on.
pub(crate) trait Forge {
    /// The tag of the latest published release, `None` if nothing was ever released.
    async fn latest_release(&self, repo: &RepoId) -> Result<Option<String>, Error>;

    /// Commits reachable from `head` but not `base`, oldest first.
    async fn compare_commits(
        &self,
        repo: &RepoId,
        base: &str,
        head: &str,
    ) -> Result<Vec<Commit>, Error>;

    /// `None` if there's no pull request with this number, e.g. it's an issue.
    async fn pull_request(&self, repo: &RepoId, number: u64)
    -> Result<Option<PullRequest>, Error>;

    /// Bodies of every conversation and review comment on a pull request.
    async fn pull_request_comments(&self, repo: &RepoId, number: u64)
    -> Result<Vec<String>, Error>;

    async fn merged_pull_requests(
        &self,
        repo: &RepoId,
        window: MergedWindow,
    ) -> Result<Vec<PullRequest>, Error>;

    async fn create_release(&self, repo: &RepoId, release: &NewRelease<'_>) -> Result<(), Error>;
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Trouble communicating with GitHub while {activity}: {err}")]
    #[diagnostic(
        code(github::api_request_error),
        help(
            "There was a problem communicating with GitHub, this may be a network issue or a permissions issue."
        )
    )]
    ApiRequest { err: String, activity: String },
    #[error("Trouble decoding the response from GitHub while {activity}: {source}")]
    #[diagnostic(
        code(github::api_response_error),
        help("Failure to decode a response from GitHub is probably a bug.")
    )]
    ApiResponse {
        source: reqwest::Error,
        activity: String,
    },
}
