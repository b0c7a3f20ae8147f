use tracing::{info, warn};
use versionista_versioning::{
    Bump, CrossLink, Entry, TicketColumn, TicketExtractor, Version, changelog::render,
};

use super::{
    Error, Outcome, RepositoryError,
    cross_links::{cross_links, published},
    decision::{self, Decision},
    resolve::{ChangeSet, ChangeSetResolver},
};
use crate::{
    editor::Editor,
    integrations::{Forge, NewRelease},
    prompt::{self, Prompt},
    repository::{ReleaseRepository, Selection},
    state::RunType,
};

/// Who decides how each repository is bumped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Mode {
    /// Ask the operator for every repository, and offer to edit the notes.
    Interactive,
    /// Bump everything with changes the same way, without asking anything.
    Unattended(Bump),
}

impl From<Option<Bump>> for Mode {
    fn from(bump: Option<Bump>) -> Self {
        bump.map_or(Self::Interactive, Self::Unattended)
    }
}

/// A release that's been decided on.
#[derive(Debug)]
struct Plan {
    version: Version,
    entries: Vec<Entry>,
    /// What the tag is created from.
    target: String,
}

pub(crate) struct Releaser<'a, F, P, E> {
    forge: &'a F,
    prompt: &'a P,
    editor: &'a E,
    resolver: ChangeSetResolver<'a, F>,
    ticket_org_id: Option<&'a str>,
    mode: Mode,
    run_type: RunType<()>,
}

impl<'a, F: Forge, P: Prompt, E: Editor> Releaser<'a, F, P, E> {
    pub(crate) const fn new(
        forge: &'a F,
        prompt: &'a P,
        editor: &'a E,
        tickets: &'a TicketExtractor,
        ticket_org_id: Option<&'a str>,
        mode: Mode,
        run_type: RunType<()>,
    ) -> Self {
        Self {
            forge,
            prompt,
            editor,
            resolver: ChangeSetResolver::new(forge, tickets),
            ticket_org_id,
            mode,
            run_type,
        }
    }

    /// Release the selection, returning how each released (or considered) repository ended.
    ///
    /// # Errors
    ///
    /// Anything that stops the whole run. Failures that only affect one repository of many are
    /// in its [`Outcome`] instead.
    pub(crate) async fn run(
        &self,
        selection: Selection,
    ) -> Result<Vec<(ReleaseRepository, Outcome)>, RepositoryError> {
        let Selection {
            mut repos, focus, ..
        } = selection;
        match (focus, repos.len(), self.mode) {
            (Some(_), _, _) | (None, 1, _) => {
                let index = focus.unwrap_or_default();
                let outcome = self.release_single(&mut repos, index).await?;
                Ok(vec![(repos.swap_remove(index), outcome)])
            }
            (None, _, Mode::Interactive) => {
                let outcomes = self.release_batch(&mut repos).await?;
                Ok(repos.into_iter().zip(outcomes).collect())
            }
            (None, _, Mode::Unattended(_)) => {
                let outcomes = self.release_each(&mut repos).await;
                Ok(repos.into_iter().zip(outcomes).collect())
            }
        }
    }

    /// Release `repos[index]` on its own. The others are only there to link to, so failing to
    /// look them up is just a warning.
    async fn release_single(
        &self,
        repos: &mut [ReleaseRepository],
        index: usize,
    ) -> Result<Outcome, RepositoryError> {
        info!("Fetching latest versions…");
        let mut versions = self.resolver.resolve_versions(repos).await;
        for (sibling, (repo, result)) in repos.iter().zip(&versions).enumerate() {
            if let (true, Err(err)) = (sibling != index, result) {
                warn!("Could not fetch the latest version of {repo}, it won't be linked: {err}");
            }
        }
        let subject = &repos[index];
        let change_set = match versions.swap_remove(index) {
            Ok(latest) => self.resolver.change_set(subject, latest).await,
            Err(err) => Err(err),
        }
        .map_err(|err| RepositoryError::new(subject, err))?;
        self.release_one(subject, change_set, repos)
            .await
            .map_err(|err| RepositoryError::new(subject, err))
    }

    /// Release every repository with changes by the same bump, linking to whatever the others
    /// have already published.
    async fn release_each(&self, repos: &mut [ReleaseRepository]) -> Vec<Outcome> {
        info!("Fetching latest versions…");
        let change_sets = self.resolver.resolve_all(repos).await;
        let mut outcomes = Vec::with_capacity(repos.len());
        for (repo, change_set) in repos.iter().zip(change_sets) {
            let result = match change_set {
                Ok(change_set) => self.release_one(repo, change_set, repos).await,
                Err(err) => Err(err),
            };
            outcomes.push(result.unwrap_or_else(|err| failed(repo, err)));
        }
        outcomes
    }

    async fn release_one(
        &self,
        repo: &ReleaseRepository,
        change_set: ChangeSet,
        siblings: &[ReleaseRepository],
    ) -> Result<Outcome, Error> {
        let (latest, entries) = match change_set {
            ChangeSet::NoChanges { latest } => {
                info!("No changes to release in {repo} since {}", latest.tag());
                return Ok(Outcome::NoChanges);
            }
            ChangeSet::Pending { latest, entries } => (latest, entries),
        };
        info!("{repo}: {} pull requests since {}", entries.len(), latest.tag());
        let decision = self.decide(repo, &latest)?;
        let Some(plan) = self.plan(repo, &latest, entries, decision).await? else {
            return Ok(Outcome::Skipped);
        };
        let Some(edit) = self.wants_edit(repo)? else {
            return Ok(Outcome::Skipped);
        };
        let links = if repo.cross_link {
            cross_links(repo, published(siblings))
        } else {
            Vec::new()
        };
        let notes = self.notes(repo, &plan.entries, &links, edit);
        self.publish(repo, &plan, &notes).await?;
        Ok(Outcome::Released(plan.version))
    }

    /// Propose a release for everything at once, ask about each one, then publish.
    ///
    /// Only the repositories that end up being released link to each other, at the versions
    /// they're about to get. Backing out of the edit question drops a repository before any
    /// links are made.
    async fn release_batch(
        &self,
        repos: &mut [ReleaseRepository],
    ) -> Result<Vec<Outcome>, RepositoryError> {
        info!("Fetching latest versions…");
        let change_sets = self.resolver.resolve_all(repos).await;
        let mut outcomes: Vec<Option<Outcome>> = Vec::with_capacity(repos.len());
        let mut pending = Vec::new();
        for (index, (repo, change_set)) in repos.iter().zip(change_sets).enumerate() {
            match change_set {
                Ok(ChangeSet::NoChanges { latest }) => {
                    info!("{repo}: no changes since {}", latest.tag());
                    outcomes.push(Some(Outcome::NoChanges));
                }
                Ok(ChangeSet::Pending { latest, entries }) => {
                    info!(
                        "{repo}: {} pull requests since {}, next patch would be {}",
                        entries.len(),
                        latest.tag(),
                        latest.bump(Bump::Patch).tag()
                    );
                    pending.push((index, latest, entries));
                    outcomes.push(None);
                }
                Err(err) => outcomes.push(Some(failed(repo, err))),
            }
        }

        let mut plans = Vec::new();
        for (index, latest, entries) in pending {
            let repo = &repos[index];
            let decision = self
                .decide(repo, &latest)
                .map_err(|err| RepositoryError::new(repo, err))?;
            match self.plan(repo, &latest, entries, decision).await {
                Ok(Some(plan)) => plans.push((index, plan)),
                Ok(None) => outcomes[index] = Some(Outcome::Skipped),
                Err(err @ Error::Forge(_)) => outcomes[index] = Some(failed(repo, err)),
                Err(err) => return Err(RepositoryError::new(repo, err)),
            }
        }

        let mut confirmed = Vec::with_capacity(plans.len());
        for (index, plan) in plans {
            let repo = &repos[index];
            match self
                .wants_edit(repo)
                .map_err(|err| RepositoryError::new(repo, err))?
            {
                Some(edit) => confirmed.push((index, plan, edit)),
                None => outcomes[index] = Some(Outcome::Skipped),
            }
        }

        let mut releases = Vec::with_capacity(confirmed.len());
        for (index, plan, edit) in &confirmed {
            let repo = &repos[*index];
            let links = if repo.cross_link {
                cross_links(
                    repo,
                    confirmed
                        .iter()
                        .map(|(other, plan, _)| (&repos[*other], &plan.version)),
                )
            } else {
                Vec::new()
            };
            releases.push(self.notes(repo, &plan.entries, &links, *edit));
        }

        for ((index, plan, _), notes) in confirmed.into_iter().zip(releases) {
            let repo = &repos[index];
            outcomes[index] = Some(match self.publish(repo, &plan, &notes).await {
                Ok(()) => Outcome::Released(plan.version),
                Err(err) => failed(repo, err),
            });
        }
        Ok(outcomes
            .into_iter()
            .map(|outcome| outcome.unwrap_or(Outcome::Skipped))
            .collect())
    }

    fn decide(&self, repo: &ReleaseRepository, latest: &Version) -> Result<Decision, Error> {
        match self.mode {
            Mode::Interactive => Ok(decision::ask(self.prompt, repo, latest)?),
            Mode::Unattended(bump) => Ok(Decision::Bump(bump)),
        }
    }

    /// `None` if skipped. A hotfix gets its own changelog, up to the chosen commit.
    async fn plan(
        &self,
        repo: &ReleaseRepository,
        latest: &Version,
        entries: Vec<Entry>,
        decision: Decision,
    ) -> Result<Option<Plan>, Error> {
        let Some(version) = decision.version(latest)? else {
            return Ok(None);
        };
        let plan = match decision {
            Decision::Hotfix { commit, .. } => Plan {
                entries: self.resolver.changelog(repo, latest, &commit).await?,
                version,
                target: commit,
            },
            Decision::Skip | Decision::Bump(_) => Plan {
                version,
                entries,
                target: repo.target.clone(),
            },
        };
        Ok(Some(plan))
    }

    /// Whether to open the notes in an editor. `None` if the operator backed out, which skips
    /// the repository like any other cancelled question.
    fn wants_edit(&self, repo: &ReleaseRepository) -> Result<Option<bool>, Error> {
        if matches!(self.mode, Mode::Unattended(_)) {
            return Ok(Some(false));
        }
        match self.prompt.confirm(
            &format!("Edit the release notes of {repo} before publishing?"),
            false,
        ) {
            Ok(edit) => Ok(Some(edit)),
            Err(prompt::Error::Cancelled) => {
                info!("Skipping {repo}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The release notes, as generated or as the operator left them in the editor.
    fn notes(
        &self,
        repo: &ReleaseRepository,
        entries: &[Entry],
        links: &[CrossLink],
        edit: bool,
    ) -> String {
        let generated = render(entries, links, self.ticket_column(repo));
        if !edit {
            return generated;
        }
        match self.editor.edit(&generated) {
            Ok(edited) => edited,
            Err(err) => {
                warn!("Could not edit the release notes of {repo}, using the generated ones: {err}");
                generated
            }
        }
    }

    async fn publish(&self, repo: &ReleaseRepository, plan: &Plan, notes: &str) -> Result<(), Error> {
        let tag = plan.version.tag();
        let release = NewRelease {
            tag: &tag,
            name: &tag,
            body: notes.trim(),
            target_commitish: &plan.target,
            prerelease: plan.version.is_prerelease(),
        };
        match self.run_type.of(release) {
            RunType::DryRun(release) => {
                info!(
                    "Would create release {tag} of {repo} from {} with notes:\n{}",
                    release.target_commitish, release.body
                );
                Ok(())
            }
            RunType::Real(release) => {
                self.forge
                    .create_release(&repo.id, &release)
                    .await
                    .map_err(|source| Error::Publish {
                        tag: tag.clone(),
                        source,
                    })
            }
        }
    }

    fn ticket_column(&self, repo: &ReleaseRepository) -> TicketColumn<'a> {
        match self.ticket_org_id {
            Some(org_id) if repo.tickets_enabled => TicketColumn::Linked { org_id },
            _ => TicketColumn::Hidden,
        }
    }
}

fn failed(repo: &ReleaseRepository, err: Error) -> Outcome {
    warn!("Could not release {repo}: {err}");
    Outcome::Failed(RepositoryError::new(repo, err))
}
