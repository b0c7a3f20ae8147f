use serde::{Deserialize, Serialize};
use tracing::info;
use versionista_config::RepoId;

use super::GitHub;
use crate::integrations::{Error, NewRelease};

#[derive(Serialize)]
struct CreateReleaseInput<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    target_commitish: &'a str,
    prerelease: bool,
    /// The body is always written by us.
    generate_release_notes: bool,
    draft: bool,
}

impl<'a> From<&NewRelease<'a>> for CreateReleaseInput<'a> {
    fn from(release: &NewRelease<'a>) -> Self {
        Self {
            tag_name: release.tag,
            name: release.name,
            body: release.body,
            target_commitish: release.target_commitish,
            prerelease: release.prerelease,
            generate_release_notes: false,
            draft: false,
        }
    }
}

#[derive(Deserialize)]
struct CreateReleaseResponse {
    html_url: String,
}

pub(super) async fn create_release(
    github: &GitHub,
    repo: &RepoId,
    release: &NewRelease<'_>,
) -> Result<(), Error> {
    let activity = format!("creating release {tag} of {repo}", tag = release.tag);
    let request = github
        .client
        .post(github.repo_url(repo, "releases"))
        .header("Accept", "application/vnd.github+json")
        .header("Authorization", &github.authorization)
        .json(&CreateReleaseInput::from(release));
    let response = GitHub::send(request, &activity).await?;
    let created: CreateReleaseResponse = GitHub::json(response, &activity).await?;
    info!("Created release {}", created.html_url);
    Ok(())
}
