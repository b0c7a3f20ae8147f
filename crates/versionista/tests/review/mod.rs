use crate::helpers::TestCase;

const CONFIG: &str = "
gh_token: test-token
github_api_url: {api_url}
projects:
  shop:
    - repo: acme/backend
    - repo: acme/frontend
      alias: Web
";

#[tokio::test(flavor = "multi_thread")]
async fn review_project() {
    let case = TestCase::new(CONFIG).await;
    case.latest_release("acme/backend", Some("v1.2.3")).await;
    case.latest_release("acme/frontend", None).await;

    case.command("review").assert().success().stdout_eq(
        "\
Fetching latest versions…
shop versions are:
  backend: v1.2.3
  Web: v0.0.0
",
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn review_unknown_repository() {
    let case = TestCase::new(CONFIG).await;

    case.command("review nope").assert().failure().stderr_eq(
        "\
...
[..]Repository nope is not part of any project
...
",
    );
}
