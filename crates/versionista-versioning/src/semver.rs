use std::{cmp::Ordering, fmt::Display, str::FromStr};

#[cfg(feature = "miette")]
use miette::Diagnostic;

/// A released (or about to be released) version of a repository.
///
/// Equality is structural, so two versions differing only in build metadata are not equal.
/// Use [`Version::cmp_precedence`] for ordering, which ignores build metadata.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Version(semver::Version);

impl Version {
    /// Stands in for "never released". Never published itself.
    pub const BOOTSTRAP: Self = Self::new(0, 0, 0);
    /// The first release of any repository, regardless of the requested bump.
    pub const FIRST_RELEASE: Self = Self::new(1, 0, 0);

    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    #[must_use]
    pub fn is_bootstrap(&self) -> bool {
        *self == Self::BOOTSTRAP
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// The git tag (and release name) for this version.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{self}")
    }

    /// Apply a bump rule.
    ///
    /// The bootstrap version always becomes [`Version::FIRST_RELEASE`]. Otherwise lower components
    /// reset and pre-release and build data is dropped. A patch bump of a pre-release releases it
    /// as-is, so `1.2.3-rc.1` becomes `1.2.3`.
    #[must_use]
    pub fn bump(&self, bump: Bump) -> Self {
        if self.is_bootstrap() {
            return Self::FIRST_RELEASE;
        }
        let semver::Version {
            major,
            minor,
            patch,
            ..
        } = self.0;
        match bump {
            Bump::Major => Self::new(major.saturating_add(1), 0, 0),
            Bump::Minor => Self::new(major, minor.saturating_add(1), 0),
            Bump::Patch if self.is_prerelease() => Self::new(major, minor, patch),
            Bump::Patch => Self::new(major, minor, patch.saturating_add(1)),
        }
    }

    /// Mark this version as a hotfix by replacing its build metadata with `suffix`.
    ///
    /// Any existing build metadata is discarded first, so hotfixes never accumulate.
    ///
    /// # Errors
    ///
    /// If `suffix` isn't valid build metadata (for example, it contains spaces).
    pub fn hotfix(&self, suffix: &str) -> Result<Self, Error> {
        let mut core = self.0.clone();
        core.build = semver::BuildMetadata::EMPTY;
        let candidate = format!("{core}+{suffix}");
        semver::Version::parse(&candidate)
            .map(Self)
            .map_err(|source| Error {
                version: candidate,
                source,
            })
    }

    /// Order by semantic version precedence, ignoring build metadata.
    #[must_use]
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        self.0.cmp_precedence(&other.0)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = Error;

    /// Parses `1.2.3` or a tag like `v1.2.3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_prefix = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        semver::Version::parse(without_prefix)
            .map(Self)
            .map_err(|source| Error {
                version: s.to_string(),
                source,
            })
    }
}

/// Render an optional version the way it's shown to people: a tag, or `(not set)`.
#[must_use]
pub fn display_version(version: Option<&Version>) -> String {
    version.map_or_else(|| String::from("(not set)"), Version::tag)
}

#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("Found invalid semantic version {version}: {source}")]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(version::invalid_syntax),
        help(
            "Versions look like 1.2.3, optionally followed by -prerelease and +build, \
            where the extra parts may only contain letters, digits, hyphens, and dots"
        ),
    )
)]
pub struct Error {
    pub version: String,
    #[source]
    source: semver::Error,
}

/// How to move a version forward.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Bump {
    Major,
    Minor,
    #[default]
    Patch,
}

impl From<&str> for Bump {
    /// Anything other than `major` or `minor` is a patch.
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("major") {
            Self::Major
        } else if value.eq_ignore_ascii_case("minor") {
            Self::Minor
        } else {
            Self::Patch
        }
    }
}

impl Display for Bump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "Major"),
            Self::Minor => write!(f, "Minor"),
            Self::Patch => write!(f, "Patch"),
        }
    }
}
