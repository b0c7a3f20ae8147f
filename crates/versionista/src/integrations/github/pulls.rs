use reqwest::StatusCode;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;
use versionista_config::RepoId;
use versionista_versioning::PullRequest;

use super::{GitHub, PER_PAGE, merged_before};
use crate::integrations::{Error, MergedWindow};

#[derive(Deserialize)]
struct ResponsePullRequest {
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    user: Option<User>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    merged_at: Option<OffsetDateTime>,
}

#[derive(Deserialize)]
struct User {
    login: String,
}

impl From<ResponsePullRequest> for PullRequest {
    fn from(response: ResponsePullRequest) -> Self {
        Self {
            number: response.number,
            title: response.title,
            body: response.body.unwrap_or_default(),
            author: response.user.map(|user| user.login).unwrap_or_default(),
            merged_at: response.merged_at,
        }
    }
}

pub(super) async fn get(
    github: &GitHub,
    repo: &RepoId,
    number: u64,
) -> Result<Option<PullRequest>, Error> {
    let activity = format!("fetching pull request {repo}#{number}");
    let url = github.repo_url(repo, &format!("pulls/{number}"));
    let response = github
        .get(&url)
        .send()
        .await
        .map_err(|err| Error::ApiRequest {
            err: err.to_string(),
            activity: activity.clone(),
        })?;
    if response.status() == StatusCode::NOT_FOUND {
        debug!("{repo}#{number} is not a pull request");
        return Ok(None);
    }
    let response = response
        .error_for_status()
        .map_err(|err| Error::ApiRequest {
            err: err.to_string(),
            activity: activity.clone(),
        })?;
    let pull_request: ResponsePullRequest = GitHub::json(response, &activity).await?;
    Ok(Some(pull_request.into()))
}

/// Closed pull requests come back most recently updated first. Unmerged ones are dropped, and
/// paging stops as soon as `window` is satisfied.
pub(super) async fn merged(
    github: &GitHub,
    repo: &RepoId,
    window: MergedWindow,
) -> Result<Vec<PullRequest>, Error> {
    let mut merged = Vec::new();
    if window == MergedWindow::Latest(0) {
        return Ok(merged);
    }
    let activity = format!("listing merged pull requests of {repo}");
    let url = github.repo_url(repo, "pulls");
    let query = [
        ("state", "closed"),
        ("sort", "updated"),
        ("direction", "desc"),
    ];
    for page in 1_u32.. {
        let batch: Vec<ResponsePullRequest> = github.page(&url, &query, page, &activity).await?;
        let last = batch.len() < PER_PAGE;
        for pull_request in batch
            .into_iter()
            .filter(|pull_request| pull_request.merged_at.is_some())
            .map(PullRequest::from)
        {
            if let MergedWindow::Since(since) = window {
                if merged_before(&pull_request, since) {
                    return Ok(merged);
                }
            }
            merged.push(pull_request);
            if matches!(window, MergedWindow::Latest(count) if merged.len() >= count) {
                return Ok(merged);
            }
        }
        if last {
            break;
        }
    }
    Ok(merged)
}
