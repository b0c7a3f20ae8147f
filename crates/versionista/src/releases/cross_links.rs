use versionista_versioning::{CrossLink, Version};

use crate::repository::ReleaseRepository;

/// Links from `subject`'s release notes to every other candidate, at the version given for it.
///
/// Whoever calls this picks the candidates: already published releases, or the versions about to
/// be published alongside `subject`. Candidates that were never released get no link.
pub(crate) fn cross_links<'a>(
    subject: &ReleaseRepository,
    candidates: impl IntoIterator<Item = (&'a ReleaseRepository, &'a Version)>,
) -> Vec<CrossLink> {
    candidates
        .into_iter()
        .filter(|(candidate, version)| candidate.id != subject.id && !version.is_bootstrap())
        .map(|(candidate, version)| CrossLink {
            display_name: candidate.display_name().to_string(),
            version: version.clone(),
            url: candidate.release_url(version),
        })
        .collect()
}

/// The latest published release of every repository that has one.
pub(crate) fn published(
    repos: &[ReleaseRepository],
) -> impl Iterator<Item = (&ReleaseRepository, &Version)> {
    repos
        .iter()
        .filter_map(|repo| repo.latest_release.as_ref().map(|version| (repo, version)))
}
