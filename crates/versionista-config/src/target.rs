use crate::{Config, Error, RepoConfig, RepoId, matches_repo};

/// What a command operates on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target<'a> {
    /// A repository named directly as `owner/name`, outside of any project.
    Repository(RepoId),
    /// Every repository of a project.
    Project {
        name: &'a str,
        repos: &'a [RepoConfig],
    },
    /// One repository of a project. The rest of the project is still there for cross-links.
    Member {
        project: &'a str,
        repos: &'a [RepoConfig],
        index: usize,
    },
}

impl Config {
    /// Work out what the `--project` flag and positional target refer to.
    ///
    /// A target containing `/` is a repository on its own. Otherwise it's a project name, or failing
    /// that the name of a repository in exactly one project. With neither, the only configured
    /// project is used.
    ///
    /// # Errors
    ///
    /// If the names don't match the config, or match more than one thing.
    pub fn resolve_target<'a>(
        &'a self,
        project: Option<&'a str>,
        target: Option<&'a str>,
    ) -> Result<Target<'a>, Error> {
        let target = target.map(str::trim).filter(|target| !target.is_empty());
        if let Some(project) = project {
            let name = self.project_name(Some(project), None)?;
            return match target {
                None => Ok(self.project(name)),
                Some(target) if target == name => Ok(self.project(name)),
                Some(target) => self.member(name, target),
            };
        }
        let Some(target) = target else {
            return self.project_name(None, None).map(|name| self.project(name));
        };
        if target.contains('/') {
            return target
                .parse()
                .map(Target::Repository)
                .map_err(Error::InvalidTarget);
        }
        if self.projects.contains_key(target) {
            return self.project_name(Some(target), None).map(|name| self.project(name));
        }
        let project = self.find_project_by_repository(target)?;
        self.member(project, target)
    }

    fn project<'a>(&'a self, name: &'a str) -> Target<'a> {
        Target::Project {
            name,
            repos: self.projects.get(name).map_or(&[][..], Vec::as_slice),
        }
    }

    fn member<'a>(&'a self, project: &'a str, repo: &str) -> Result<Target<'a>, Error> {
        let repos = self.projects.get(project).map_or(&[][..], Vec::as_slice);
        repos
            .iter()
            .position(|config| matches_repo(config, repo))
            .map(|index| Target::Member {
                project,
                repos,
                index,
            })
            .ok_or_else(|| Error::NotAMember {
                project: project.to_string(),
                repo: repo.to_string(),
            })
    }
}
