//! Dependency patterns.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use strum::IntoEnumIterator;

use crate::{Error, Name, PkgVer, Version, VersionComparison, VersionRequirement};

/// A dependency pattern, as found in the `run_depends` list of an index
/// record.
///
/// A pattern either pairs a package name with a version requirement
/// (e.g. `awk>=0`) or names one exact package version (e.g. `awk-1.2_1`).
/// A bare package name carries neither and does not parse; callers treat
/// that as the "no package name" input error.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repodb_types::DependencyPattern;
///
/// let pattern = DependencyPattern::from_str("awk>=0")?;
/// assert_eq!(pattern.name().inner(), "awk");
/// assert!(!pattern.matches(&"gawk-5.1_1".parse()?));
/// assert!(pattern.matches(&"awk-1.2_1".parse()?));
///
/// assert!(DependencyPattern::from_str("awk").is_err());
/// # Ok::<(), repodb_types::Error>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DependencyPattern {
    /// A package name constrained by a version requirement.
    Requirement {
        /// The name of the required package.
        name: Name,
        /// The requirement its version must satisfy.
        requirement: VersionRequirement,
    },

    /// One exact package version.
    Exact(PkgVer),
}

impl DependencyPattern {
    /// Returns the name of the required package.
    pub fn name(&self) -> &Name {
        match self {
            DependencyPattern::Requirement { name, .. } => name,
            DependencyPattern::Exact(pkgver) => pkgver.name(),
        }
    }

    /// Returns `true` if the given package identifier satisfies the pattern.
    ///
    /// The name must match exactly; versions are compared in repository
    /// version order (see [`Version::vercmp`]).
    pub fn matches(&self, pkgver: &PkgVer) -> bool {
        match self {
            DependencyPattern::Requirement { name, requirement } => {
                name == pkgver.name() && requirement.is_satisfied_by(pkgver.version())
            }
            DependencyPattern::Exact(exact) => {
                exact.name() == pkgver.name()
                    && Version::vercmp(exact.version(), pkgver.version()).is_eq()
            }
        }
    }
}

impl FromStr for DependencyPattern {
    type Err = Error;

    /// Parses a [`DependencyPattern`] from a string.
    ///
    /// Comparison operators are tried first (two-character operators before
    /// their one-character prefixes), then the exact `name-version` form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDependencyPattern`] if neither form applies,
    /// i.e. no package name can be extracted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for comparison in VersionComparison::iter() {
            if let Some((name, version)) = s.split_once(comparison.as_ref()) {
                let parsed = Name::new(name).and_then(|name| {
                    Ok(DependencyPattern::Requirement {
                        name,
                        requirement: VersionRequirement::new(comparison, version.parse()?),
                    })
                });
                return parsed.map_err(|_| Error::InvalidDependencyPattern(s.to_string()));
            }
        }
        PkgVer::from_str(s)
            .map(DependencyPattern::Exact)
            .map_err(|_| Error::InvalidDependencyPattern(s.to_string()))
    }
}

impl Display for DependencyPattern {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        match self {
            DependencyPattern::Requirement { name, requirement } => {
                write!(fmt, "{name}{requirement}")
            }
            DependencyPattern::Exact(pkgver) => write!(fmt, "{pkgver}"),
        }
    }
}
