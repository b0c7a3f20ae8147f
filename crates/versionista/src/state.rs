/// Whether anything should actually be published. Wraps whatever is about to be published, so
/// dry runs can't be forgotten where it matters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RunType<T> {
    /// No I/O should happen that changes anything. Just say what would have been done.
    DryRun(T),
    /// Actually do the thing.
    Real(T),
}

impl<T> RunType<T> {
    #[must_use]
    pub(crate) fn of<R>(&self, new_value: R) -> RunType<R> {
        match self {
            RunType::DryRun(_) => RunType::DryRun(new_value),
            RunType::Real(_) => RunType::Real(new_value),
        }
    }
}

impl RunType<()> {
    pub(crate) const fn new(dry_run: bool) -> Self {
        if dry_run { Self::DryRun(()) } else { Self::Real(()) }
    }
}
