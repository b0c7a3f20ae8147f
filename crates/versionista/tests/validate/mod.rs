use crate::helpers::TestCase;

#[tokio::test(flavor = "multi_thread")]
async fn missing_token() {
    let case = TestCase::new(
        "
projects:
  shop:
    - repo: acme/backend
",
    )
    .await;

    case.command("review").assert().failure().stderr_eq(
        "\
...
[..]No GitHub token configured
...
",
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn token_from_environment() {
    let case = TestCase::new(
        "
github_api_url: {api_url}
projects:
  shop:
    - repo: acme/backend
",
    )
    .await;
    case.latest_release("acme/backend", Some("v3.0.0")).await;

    case.command("review")
        .env("GITHUB_TOKEN", "from-env")
        .assert()
        .success()
        .stdout_eq(
            "\
Fetching latest versions…
shop versions are:
  backend: v3.0.0
",
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn jira_without_org() {
    let case = TestCase::new(
        "
gh_token: test-token
jira_boards: [PROJ]
projects:
  shop:
    - repo: acme/backend
      jira: true
",
    )
    .await;

    case.command("review").assert().failure().stderr_eq(
        "\
...
[..]acme/backend in project shop enables jira, but jira_org_id is not set
...
",
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn several_projects_need_a_choice() {
    let case = TestCase::new(
        "
gh_token: test-token
projects:
  shop:
    - repo: acme/backend
  blog:
    - repo: acme/blog
",
    )
    .await;

    case.command("release").assert().failure().stderr_eq(
        "\
...
[..]Multiple projects found: shop, blog
...
",
    );
}
