use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

use crate::helpers::TestCase;

#[tokio::test(flavor = "multi_thread")]
async fn dry_run_of_a_direct_repository() {
    let case = TestCase::new(
        "
gh_token: test-token
github_api_url: {api_url}
projects:
  shop:
    - repo: acme/backend
",
    )
    .await;
    case.latest_release("acme/other", Some("v1.2.0")).await;
    case.compare(
        "acme/other",
        "v1.2.0",
        &["Add search (#12)", "Fix a typo on main"],
    )
    .await;
    case.pull_request("acme/other", 12, "Add search").await;

    case.command("release acme/other --bump minor --dry-run")
        .assert()
        .success()
        .stdout_eq(
            "\
Fetching latest versions…
other: 1 pull requests since v1.2.0
Would create release v1.3.0 of other from main with notes:
| PR # | Author | Title | Merged Date |
|------|--------|-------|-------------|
| #12 | octocat | Add search | 2024-05-01 |
acme/other versions are:
  other: v1.3.0
",
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn unattended_project_release() {
    let case = TestCase::new(
        "
gh_token: test-token
github_api_url: {api_url}
projects:
  shop:
    - repo: acme/backend
      alias: Backend
      crossLink: true
    - repo: acme/frontend
",
    )
    .await;
    case.latest_release("acme/backend", Some("v1.0.0")).await;
    case.compare("acme/backend", "v1.0.0", &["Speed up checkout (#3)"])
        .await;
    case.pull_request("acme/backend", 3, "Speed up checkout").await;
    case.latest_release("acme/frontend", Some("v2.0.0")).await;
    case.compare("acme/frontend", "v2.0.0", &[]).await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/backend/releases"))
        .and(body_partial_json(json!({
            "tag_name": "v1.0.1",
            "name": "v1.0.1",
            "target_commitish": "main",
            "draft": false,
            "body": "## Related Releases\n\n- [frontend v2.0.0](https://github.com/acme/frontend/releases/tag/v2.0.0)\n\n---\n\n| PR # | Author | Title | Merged Date |\n|------|--------|-------|-------------|\n| #3 | octocat | Speed up checkout | 2024-05-01 |",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "html_url": "https://github.com/acme/backend/releases/tag/v1.0.1"
        })))
        .expect(1)
        .mount(&case.github)
        .await;

    case.command("release --bump patch")
        .assert()
        .success()
        .stdout_eq(
            "\
Fetching latest versions…
Backend: 1 pull requests since v1.0.0
Created release https://github.com/acme/backend/releases/tag/v1.0.1
No changes to release in frontend since v2.0.0
shop versions are:
  Backend: v1.0.1
  frontend: v2.0.0
",
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_release_fails_the_run() {
    let case = TestCase::new(
        "
gh_token: test-token
github_api_url: {api_url}
projects:
  shop:
    - repo: acme/backend
",
    )
    .await;
    case.latest_release("acme/backend", Some("v1.0.0")).await;
    case.compare("acme/backend", "v1.0.0", &["Fix (#4)"]).await;
    case.pull_request("acme/backend", 4, "Fix").await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/backend/releases"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&case.github)
        .await;

    case.command("release --bump major")
        .assert()
        .failure()
        .stderr_eq(
            "\
...
[..]Problem with acme/backend
...
",
        );
}
