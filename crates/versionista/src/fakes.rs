//! In-memory stand-ins for GitHub, the terminal, and the editor.
#![allow(clippy::unwrap_used)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    io,
    sync::Mutex,
};

use time::OffsetDateTime;
use versionista_config::RepoId;
use versionista_versioning::PullRequest;

use crate::{
    editor::{self, Editor},
    integrations::{Commit, Error, Forge, MergedWindow, NewRelease},
    prompt::{self, Prompt},
};

/// A release that [`FakeForge`] was asked to create.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Created {
    pub(crate) repo: String,
    pub(crate) tag: String,
    pub(crate) body: String,
    pub(crate) target: String,
}

/// Repositories are keyed by name alone.
#[derive(Debug, Default)]
pub(crate) struct FakeForge {
    releases: HashMap<String, String>,
    failing: HashSet<String>,
    rejecting: HashSet<String>,
    comparisons: HashMap<(String, String), Vec<Commit>>,
    pull_requests: HashMap<(String, u64), PullRequest>,
    comments: HashMap<(String, u64), Vec<String>>,
    merged: HashMap<String, Vec<PullRequest>>,
    merged_fails: bool,
    pull_requests_fail: bool,
    created: Mutex<Vec<Created>>,
    comment_requests: Mutex<Vec<u64>>,
}

impl FakeForge {
    pub(crate) fn with_release(mut self, repo: &str, tag: &str) -> Self {
        self.releases.insert(repo.to_string(), tag.to_string());
        self
    }

    /// Every call about `repo` fails.
    pub(crate) fn failing(mut self, repo: &str) -> Self {
        self.failing.insert(repo.to_string());
        self
    }

    /// Listing merged pull requests fails everywhere.
    pub(crate) fn failing_merged_listing(mut self) -> Self {
        self.merged_fails = true;
        self
    }

    /// Fetching single pull requests fails everywhere.
    pub(crate) fn failing_pull_requests(mut self) -> Self {
        self.pull_requests_fail = true;
        self
    }

    /// Creating releases of `repo` fails.
    pub(crate) fn rejecting(mut self, repo: &str) -> Self {
        self.rejecting.insert(repo.to_string());
        self
    }

    pub(crate) fn with_commits(mut self, repo: &str, head: &str, messages: &[&str]) -> Self {
        let commits = messages
            .iter()
            .enumerate()
            .map(|(index, message)| Commit {
                sha: format!("{index:040x}"),
                message: (*message).to_string(),
            })
            .collect();
        self.comparisons
            .insert((repo.to_string(), head.to_string()), commits);
        self
    }

    pub(crate) fn with_pull_request(mut self, repo: &str, number: u64, title: &str) -> Self {
        self.pull_requests
            .insert((repo.to_string(), number), pull_request(number, title));
        self
    }

    pub(crate) fn with_comments(mut self, repo: &str, number: u64, comments: &[&str]) -> Self {
        self.comments.insert(
            (repo.to_string(), number),
            comments.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// `count` pull requests merged just now, newest (highest number) first.
    pub(crate) fn with_merged(mut self, repo: &str, count: u64) -> Self {
        let merged = (1..=count)
            .rev()
            .map(|number| pull_request(number, &format!("Change {number}")))
            .collect();
        self.merged.insert(repo.to_string(), merged);
        self
    }

    pub(crate) fn created(&self) -> Vec<Created> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn comment_requests(&self) -> Vec<u64> {
        self.comment_requests.lock().unwrap().clone()
    }

    fn check(&self, repo: &RepoId, activity: &str) -> Result<(), Error> {
        if self.failing.contains(&repo.name) {
            return Err(failure(activity));
        }
        Ok(())
    }
}

fn pull_request(number: u64, title: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        body: String::new(),
        author: "octocat".to_string(),
        merged_at: Some(OffsetDateTime::now_utc()),
    }
}

fn failure(activity: &str) -> Error {
    Error::ApiRequest {
        err: "connection reset".to_string(),
        activity: activity.to_string(),
    }
}

impl Forge for FakeForge {
    async fn latest_release(&self, repo: &RepoId) -> Result<Option<String>, Error> {
        self.check(repo, "fetching the latest release")?;
        Ok(self.releases.get(&repo.name).cloned())
    }

    async fn compare_commits(
        &self,
        repo: &RepoId,
        _base: &str,
        head: &str,
    ) -> Result<Vec<Commit>, Error> {
        self.check(repo, "comparing commits")?;
        Ok(self
            .comparisons
            .get(&(repo.name.clone(), head.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Option<PullRequest>, Error> {
        self.check(repo, "fetching a pull request")?;
        if self.pull_requests_fail {
            return Err(failure("fetching a pull request"));
        }
        Ok(self.pull_requests.get(&(repo.name.clone(), number)).cloned())
    }

    async fn pull_request_comments(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Vec<String>, Error> {
        self.check(repo, "fetching comments")?;
        self.comment_requests.lock().unwrap().push(number);
        Ok(self
            .comments
            .get(&(repo.name.clone(), number))
            .cloned()
            .unwrap_or_default())
    }

    async fn merged_pull_requests(
        &self,
        repo: &RepoId,
        window: MergedWindow,
    ) -> Result<Vec<PullRequest>, Error> {
        self.check(repo, "listing merged pull requests")?;
        if self.merged_fails {
            return Err(failure("listing merged pull requests"));
        }
        let merged = self.merged.get(&repo.name).cloned().unwrap_or_default();
        Ok(match window {
            MergedWindow::Since(since) => merged
                .into_iter()
                .filter(|pr| pr.merged_at.is_some_and(|merged_at| merged_at >= since))
                .collect(),
            MergedWindow::Latest(count) => merged.into_iter().take(count).collect(),
        })
    }

    async fn create_release(&self, repo: &RepoId, release: &NewRelease<'_>) -> Result<(), Error> {
        self.check(repo, "creating a release")?;
        if self.rejecting.contains(&repo.name) {
            return Err(failure("creating a release"));
        }
        self.created.lock().unwrap().push(Created {
            repo: repo.name.clone(),
            tag: release.tag.to_string(),
            body: release.body.to_string(),
            target: release.target_commitish.to_string(),
        });
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Answer {
    Select(usize),
    Confirm(bool),
    Text(&'static str),
    /// Escape out of whatever is asked.
    Cancel,
}

/// Answers questions in order, and panics on anything unexpected.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompt {
    answers: Mutex<VecDeque<Answer>>,
    offered: Mutex<Vec<Vec<String>>>,
}

impl ScriptedPrompt {
    pub(crate) fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            offered: Mutex::default(),
        }
    }

    /// The options of every `select` so far.
    pub(crate) fn offered(&self) -> Vec<Vec<String>> {
        self.offered.lock().unwrap().clone()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, prompt: &str) -> Answer {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no answer left for {prompt:?}"))
    }
}

impl Prompt for ScriptedPrompt {
    fn select(&self, prompt: &str, options: Vec<String>) -> Result<usize, prompt::Error> {
        self.offered.lock().unwrap().push(options);
        match self.next(prompt) {
            Answer::Select(index) => Ok(index),
            Answer::Cancel => Err(prompt::Error::Cancelled),
            other => panic!("{other:?} is not an answer to {prompt:?}"),
        }
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool, prompt::Error> {
        match self.next(prompt) {
            Answer::Confirm(answer) => Ok(answer),
            Answer::Cancel => Err(prompt::Error::Cancelled),
            other => panic!("{other:?} is not an answer to {prompt:?}"),
        }
    }

    fn text(&self, prompt: &str, _default: Option<&str>) -> Result<String, prompt::Error> {
        match self.next(prompt) {
            Answer::Text(text) => Ok(text.to_string()),
            Answer::Cancel => Err(prompt::Error::Cancelled),
            other => panic!("{other:?} is not an answer to {prompt:?}"),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum FakeEditor {
    /// Replaces the whole file with this.
    Replace(&'static str),
    Fail,
}

impl Editor for FakeEditor {
    fn edit(&self, _initial: &str) -> Result<String, editor::Error> {
        match self {
            Self::Replace(text) => Ok((*text).to_string()),
            Self::Fail => Err(editor::Error::TempFile(io::Error::other("disk full"))),
        }
    }
}
