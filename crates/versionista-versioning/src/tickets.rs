use indexmap::IndexMap;
use itertools::Itertools;
#[cfg(feature = "miette")]
use miette::Diagnostic;
use regex::{Regex, RegexBuilder};

/// Finds issue-tracker references like `PROJ-123` or `proj 123` for a fixed set of boards.
#[derive(Clone, Debug, Default)]
pub struct TicketExtractor {
    matcher: Option<Regex>,
}

impl TicketExtractor {
    /// Build an extractor for the board prefixes. Blank boards are ignored, and with no boards at
    /// all nothing is ever extracted.
    ///
    /// # Errors
    ///
    /// If the combined pattern is too large to compile.
    pub fn new<S: AsRef<str>>(boards: &[S]) -> Result<Self, Error> {
        let alternatives = boards
            .iter()
            .map(|board| board.as_ref().trim())
            .filter(|board| !board.is_empty())
            .map(regex::escape)
            .join("|");
        if alternatives.is_empty() {
            return Ok(Self::default());
        }
        let matcher = RegexBuilder::new(&format!(r"\b({alternatives})[-\s]\d+\b"))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            matcher: Some(matcher),
        })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.matcher.is_some()
    }

    /// Every distinct ticket in `text`, in order of first appearance, spelled as first seen.
    #[must_use]
    pub fn extract(&self, text: &str) -> Tickets {
        let Some(matcher) = &self.matcher else {
            return Tickets::default();
        };
        matcher
            .find_iter(text)
            .map(|found| found.as_str())
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("Could not build a ticket pattern from the configured boards: {0}")]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(tickets::invalid_boards),
        help("Check the `jira_boards` list in your config file"),
    )
)]
pub struct Error(#[from] regex::Error);

/// An ordered set of ticket references, unique regardless of case.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tickets(IndexMap<String, String>);

impl Tickets {
    /// Returns `false` if an equivalent ticket was already present.
    pub fn insert(&mut self, ticket: &str) -> bool {
        let key = ticket.to_uppercase();
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, ticket.to_string());
        true
    }

    /// Tickets as they were written.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// Tickets in their canonical, linkable form.
    pub fn normalized(&self) -> impl Iterator<Item = String> + '_ {
        self.iter().map(normalize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Tickets {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut tickets = Self::default();
        for ticket in iter {
            tickets.insert(ticket);
        }
        tickets
    }
}

/// Uppercase the ticket and turn every whitespace character into `-`, so `proj 12` becomes
/// `PROJ-12`. Runs of whitespace are not collapsed.
#[must_use]
pub fn normalize(ticket: &str) -> String {
    ticket
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect::<String>()
        .to_uppercase()
}
