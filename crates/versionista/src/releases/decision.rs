use tracing::{info, warn};
use versionista_versioning::{Bump, InvalidVersionSyntax, Version};

use crate::{
    prompt::{self, Prompt},
    repository::ReleaseRepository,
};

const DEFAULT_HOTFIX_SUFFIX: &str = "hotfix";

/// What the operator wants done with one repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Decision {
    Skip,
    Bump(Bump),
    /// Release `commit` as the latest version plus `+suffix`.
    Hotfix { commit: String, suffix: String },
}

impl Decision {
    /// The version this releases, `None` for skip.
    pub(crate) fn version(&self, latest: &Version) -> Result<Option<Version>, InvalidVersionSyntax> {
        match self {
            Self::Skip => Ok(None),
            Self::Bump(bump) => Ok(Some(latest.bump(*bump))),
            Self::Hotfix { suffix, .. } => latest.hotfix(suffix).map(Some),
        }
    }
}

#[derive(Clone, Copy)]
enum Choice {
    Skip,
    Bump(Bump),
    Hotfix,
}

/// Ask how to release `repo`. Backing out of any question skips it.
///
/// Hotfixes need a previous release, so they aren't offered until there is one.
pub(crate) fn ask<P: Prompt>(
    prompt: &P,
    repo: &ReleaseRepository,
    latest: &Version,
) -> Result<Decision, prompt::Error> {
    match choose(prompt, repo, latest) {
        Err(prompt::Error::Cancelled) => {
            info!("Skipping {repo}");
            Ok(Decision::Skip)
        }
        other => other,
    }
}

fn choose<P: Prompt>(
    prompt: &P,
    repo: &ReleaseRepository,
    latest: &Version,
) -> Result<Decision, prompt::Error> {
    let mut choices = vec![("Skip".to_string(), Choice::Skip)];
    for bump in [Bump::Patch, Bump::Minor, Bump::Major] {
        choices.push((
            format!("{bump} ({})", latest.bump(bump).tag()),
            Choice::Bump(bump),
        ));
    }
    if !latest.is_bootstrap() {
        choices.push(("Hotfix".to_string(), Choice::Hotfix));
    }

    let labels = choices.iter().map(|(label, _)| label.clone()).collect();
    let index = prompt.select(
        &format!("How should {repo} be released? (currently {})", latest.tag()),
        labels,
    )?;
    match choices.get(index).map(|(_, choice)| *choice) {
        Some(Choice::Bump(bump)) => Ok(Decision::Bump(bump)),
        Some(Choice::Hotfix) => hotfix(prompt, repo),
        Some(Choice::Skip) | None => Ok(Decision::Skip),
    }
}

fn hotfix<P: Prompt>(prompt: &P, repo: &ReleaseRepository) -> Result<Decision, prompt::Error> {
    let commit = prompt
        .text(&format!("Which commit of {repo} should the hotfix release?"), None)?
        .trim()
        .to_string();
    if commit.is_empty() {
        warn!("No commit given for the hotfix of {repo}, skipping it");
        return Ok(Decision::Skip);
    }
    let suffix = prompt
        .text("Hotfix suffix", Some(DEFAULT_HOTFIX_SUFFIX))?
        .trim()
        .to_string();
    Ok(Decision::Hotfix {
        commit,
        suffix: if suffix.is_empty() {
            DEFAULT_HOTFIX_SUFFIX.to_string()
        } else {
            suffix
        },
    })
}
