//! Everything about a release that doesn't need the network: versions, ticket references, and
//! release notes.

pub mod changelog;
pub mod semver;
pub mod tickets;

pub use changelog::{CrossLink, Entry, PullRequest, TicketColumn};
pub use crate::semver::{Bump, Error as InvalidVersionSyntax, Version, display_version};
pub use tickets::{Error as InvalidTicketBoards, TicketExtractor, Tickets};
