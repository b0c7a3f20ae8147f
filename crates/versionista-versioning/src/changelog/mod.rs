//! Turning merged pull requests into release notes.

use std::sync::LazyLock;

use regex::Regex;
use time::{Date, OffsetDateTime};

pub use render::{CrossLink, TicketColumn, escape_table_cell, render, ticket_url};

use crate::tickets::{TicketExtractor, Tickets};

mod render;

/// A merged pull request as reported by the hosting platform.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    /// Login of the author, empty if the account no longer exists.
    pub author: String,
    pub merged_at: Option<OffsetDateTime>,
}

/// One row of the release notes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Entry {
    pub number: u64,
    pub merged_date: Option<Date>,
    pub author: String,
    pub title: String,
    /// The pull request body.
    pub description: String,
    pub tickets: Tickets,
}

impl Entry {
    /// Build an entry from a pull request.
    ///
    /// Tickets are only extracted when an `extractor` is given, in which case the title, body,
    /// and every one of `comments` are searched.
    #[must_use]
    pub fn from_pull_request(
        pull_request: PullRequest,
        comments: &[String],
        extractor: Option<&TicketExtractor>,
    ) -> Self {
        let tickets = extractor.map_or_else(Tickets::default, |extractor| {
            let mut text = format!("{}\n{}", pull_request.title, pull_request.body);
            for comment in comments {
                text.push('\n');
                text.push_str(comment);
            }
            extractor.extract(&text)
        });
        Self {
            number: pull_request.number,
            merged_date: pull_request.merged_at.map(OffsetDateTime::date),
            author: pull_request.author,
            title: pull_request.title,
            description: pull_request.body,
            tickets,
        }
    }
}

#[allow(clippy::unwrap_used)] // Constant patterns
static PULL_REQUEST_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"\bpull request #(\d+)\b").unwrap(),
        Regex::new(r"\(#(\d+)\)").unwrap(),
        Regex::new(r"(?:^|\s)#(\d+)\b").unwrap(),
    ]
});

/// Find the pull request a commit came from.
///
/// Merge commits (`Merge pull request #12 from ...`) win over squash suffixes (`Title (#12)`),
/// which win over a bare `#12` reference.
#[must_use]
pub fn pull_request_number(commit_message: &str) -> Option<u64> {
    PULL_REQUEST_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(commit_message)
            .and_then(|captures| captures.get(1))
            .and_then(|number| number.as_str().parse::<u64>().ok())
            .filter(|number| *number > 0)
    })
}
