#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::fs;

use serde_json::{Value, json};
use snapbox::cmd::{Command, cargo_bin};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// A directory with a `.versionista.yml` pointing at a fake GitHub.
pub struct TestCase {
    pub github: MockServer,
    dir: TempDir,
}

impl TestCase {
    /// `config` is written as-is, with `{api_url}` replaced by the fake GitHub's address.
    pub async fn new(config: &str) -> Self {
        let github = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".versionista.yml"),
            config.replace("{api_url}", &github.uri()),
        )
        .unwrap();
        Self { github, dir }
    }

    /// The binary, run in the test directory with nothing leaking in from the environment.
    pub fn command(&self, args: &str) -> Command {
        Command::new(cargo_bin!("versionista"))
            .args(args.split_whitespace())
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env_remove("GITHUB_TOKEN")
            .env_remove("VERSIONISTA_CONFIG")
            .env_remove("EDITOR")
    }

    pub async fn latest_release(&self, repo: &str, tag: Option<&str>) {
        let response = match tag {
            Some(tag) => ResponseTemplate::new(200).set_body_json(json!({ "tag_name": tag })),
            None => ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
        };
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repo}/releases/latest")))
            .respond_with(response)
            .mount(&self.github)
            .await;
    }

    /// Commits between `base` and `main`, one per message.
    pub async fn compare(&self, repo: &str, base: &str, messages: &[&str]) {
        let commits: Vec<Value> = messages
            .iter()
            .enumerate()
            .map(|(index, message)| {
                json!({ "sha": format!("{index:040x}"), "commit": { "message": message } })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repo}/compare/{base}...main")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commits": commits })))
            .mount(&self.github)
            .await;
    }

    pub async fn pull_request(&self, repo: &str, number: u64, title: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repo}/pulls/{number}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": number,
                "title": title,
                "body": null,
                "user": { "login": "octocat" },
                "merged_at": "2024-05-01T12:00:00Z",
            })))
            .mount(&self.github)
            .await;
    }
}
