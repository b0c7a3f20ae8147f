use itertools::Itertools;

use super::Entry;
use crate::{semver::Version, tickets};

/// A link to a sibling repository's release, shown above the table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrossLink {
    pub display_name: String,
    pub version: Version,
    pub url: String,
}

/// Whether release notes get a ticket column, and where tickets link to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketColumn<'a> {
    Hidden,
    /// Tickets link to the Atlassian site named `org_id`.
    Linked { org_id: &'a str },
}

/// Render release notes as Markdown: an optional "Related Releases" section followed by a table
/// with one row per entry, in the order given. With no entries there is no table.
#[must_use]
pub fn render(entries: &[Entry], cross_links: &[CrossLink], tickets: TicketColumn<'_>) -> String {
    let mut notes = String::new();
    if !cross_links.is_empty() {
        notes.push_str("## Related Releases\n\n");
        for link in cross_links {
            notes.push_str(&format!(
                "- [{name} {tag}]({url})\n",
                name = link.display_name,
                tag = link.version.tag(),
                url = link.url
            ));
        }
        notes.push_str("\n---\n\n");
    }
    if entries.is_empty() {
        return notes;
    }

    notes.push_str("| PR # | Author | Title | Merged Date |");
    if let TicketColumn::Linked { .. } = tickets {
        notes.push_str(" Ticket # |");
    }
    notes.push_str("\n|------|--------|-------|-------------|");
    if let TicketColumn::Linked { .. } = tickets {
        notes.push_str("----------|");
    }
    notes.push('\n');

    for entry in entries {
        let merged = entry
            .merged_date
            .map(|date| date.to_string())
            .unwrap_or_default();
        notes.push_str(&format!(
            "| #{number} | {author} | {title} | {merged} |",
            number = entry.number,
            author = escape_table_cell(&entry.author),
            title = title_cell(entry),
        ));
        if let TicketColumn::Linked { org_id } = tickets {
            let links = entry
                .tickets
                .normalized()
                .map(|ticket| format!("[{ticket}]({})", ticket_url(org_id, &ticket)))
                .join(", ");
            notes.push_str(&format!(" {links} |"));
        }
        notes.push('\n');
    }
    notes.push('\n');
    notes
}

fn title_cell(entry: &Entry) -> String {
    let title = escape_table_cell(&entry.title);
    if entry.description.is_empty() {
        return title;
    }
    let description = escape_table_cell(&entry.description);
    format!("<details><summary>{title}</summary><br>{description}</details>")
}

/// Make arbitrary text safe for a single Markdown table cell.
#[must_use]
pub fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace('\n', "<br>")
        .replace('\r', "")
        .split_ascii_whitespace()
        .join(" ")
}

/// Where a ticket lives in Jira.
#[must_use]
pub fn ticket_url(org_id: &str, ticket: &str) -> String {
    format!(
        "https://{org_id}.atlassian.net/browse/{}",
        tickets::normalize(ticket)
    )
}
