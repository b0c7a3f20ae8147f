use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use time::OffsetDateTime;
use tracing::debug;
use versionista_config::RepoId;
use versionista_versioning::PullRequest;

use super::{Commit, Error, Forge, MergedWindow, NewRelease};

mod create_release;
mod pulls;

const PER_PAGE: usize = 100;

/// [`Forge`] backed by the GitHub REST API.
#[derive(Clone, Debug)]
pub(crate) struct GitHub {
    client: Client,
    api_url: String,
    authorization: String,
}

impl GitHub {
    pub(crate) fn new(client: Client, token: &str, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {token}"),
        }
    }

    /// The client every request goes through.
    pub(crate) fn client() -> Result<Client, Error> {
        Client::builder()
            .user_agent(concat!("versionista/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| Error::ApiRequest {
                err: err.to_string(),
                activity: "setting up the HTTP client".to_string(),
            })
    }

    fn repo_url(&self, repo: &RepoId, path: &str) -> String {
        format!(
            "{api}/repos/{owner}/{name}/{path}",
            api = self.api_url,
            owner = repo.owner,
            name = repo.name
        )
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", &self.authorization)
    }

    async fn send(request: RequestBuilder, activity: &str) -> Result<Response, Error> {
        request
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|err| Error::ApiRequest {
                err: err.to_string(),
                activity: activity.to_string(),
            })
    }

    async fn json<T: DeserializeOwned>(response: Response, activity: &str) -> Result<T, Error> {
        response.json().await.map_err(|source| Error::ApiResponse {
            source,
            activity: activity.to_string(),
        })
    }

    /// Fetch one page of a list endpoint.
    async fn page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        page: u32,
        activity: &str,
    ) -> Result<Vec<T>, Error> {
        let request = self
            .get(url)
            .query(query)
            .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())]);
        let response = Self::send(request, activity).await?;
        Self::json(response, activity).await
    }

    /// Follow a list endpoint until a short page comes back.
    async fn all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        activity: &str,
    ) -> Result<Vec<T>, Error> {
        let mut items = Vec::new();
        for page in 1_u32.. {
            let batch: Vec<T> = self.page(url, &[], page, activity).await?;
            let last = batch.len() < PER_PAGE;
            items.extend(batch);
            if last {
                break;
            }
        }
        Ok(items)
    }
}

#[derive(Deserialize)]
struct LatestRelease {
    tag_name: String,
}

#[derive(Deserialize)]
struct Comparison {
    #[serde(default)]
    commits: Vec<ComparedCommit>,
}

#[derive(Deserialize)]
struct ComparedCommit {
    sha: String,
    commit: CommitDetails,
}

#[derive(Deserialize)]
struct CommitDetails {
    message: String,
}

#[derive(Deserialize)]
struct Comment {
    body: Option<String>,
}

impl Forge for GitHub {
    async fn latest_release(&self, repo: &RepoId) -> Result<Option<String>, Error> {
        let activity = format!("fetching the latest release of {repo}");
        let response = self
            .get(&self.repo_url(repo, "releases/latest"))
            .send()
            .await
            .map_err(|err| Error::ApiRequest {
                err: err.to_string(),
                activity: activity.clone(),
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("{repo} has no releases yet");
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|err| Error::ApiRequest {
                err: err.to_string(),
                activity: activity.clone(),
            })?;
        let release: LatestRelease = Self::json(response, &activity).await?;
        Ok(Some(release.tag_name))
    }

    async fn compare_commits(
        &self,
        repo: &RepoId,
        base: &str,
        head: &str,
    ) -> Result<Vec<Commit>, Error> {
        let activity = format!("comparing {base}...{head} in {repo}");
        let url = self.repo_url(repo, &format!("compare/{base}...{head}"));
        let response = Self::send(self.get(&url), &activity).await?;
        let comparison: Comparison = Self::json(response, &activity).await?;
        Ok(comparison
            .commits
            .into_iter()
            .map(|compared| Commit {
                sha: compared.sha,
                message: compared.commit.message,
            })
            .collect())
    }

    async fn pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Option<PullRequest>, Error> {
        pulls::get(self, repo, number).await
    }

    async fn pull_request_comments(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Vec<String>, Error> {
        let activity = format!("fetching comments on {repo}#{number}");
        let conversation: Vec<Comment> = self
            .all_pages(&self.repo_url(repo, &format!("issues/{number}/comments")), &activity)
            .await?;
        let review: Vec<Comment> = self
            .all_pages(&self.repo_url(repo, &format!("pulls/{number}/comments")), &activity)
            .await?;
        Ok(conversation
            .into_iter()
            .chain(review)
            .filter_map(|comment| comment.body)
            .collect())
    }

    async fn merged_pull_requests(
        &self,
        repo: &RepoId,
        window: MergedWindow,
    ) -> Result<Vec<PullRequest>, Error> {
        pulls::merged(self, repo, window).await
    }

    async fn create_release(&self, repo: &RepoId, release: &NewRelease<'_>) -> Result<(), Error> {
        create_release::create_release(self, repo, release).await
    }
}

fn merged_before(pull_request: &PullRequest, since: OffsetDateTime) -> bool {
    pull_request
        .merged_at
        .is_some_and(|merged_at| merged_at < since)
}
