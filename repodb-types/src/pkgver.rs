//! Full package identifiers.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Name, Version};

/// A full `name-version` package identifier (e.g. `zlib-1.2_1`).
///
/// The identifier is split at the last `-` whose suffix starts with a digit;
/// the prefix must be a valid [`Name`] and the suffix a valid [`Version`].
/// Package names may themselves contain `-` (e.g. `gcc-libs-13.2_1`).
///
/// Equality and ordering are component-wise; two identifiers are equal
/// exactly when their literal strings are.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repodb_types::PkgVer;
///
/// let pkgver = PkgVer::from_str("gcc-libs-13.2_1")?;
/// assert_eq!(pkgver.name().inner(), "gcc-libs");
/// assert_eq!(pkgver.version().inner(), "13.2_1");
///
/// assert!(PkgVer::from_str("gcc-libs").is_err());
/// assert!(PkgVer::from_str("1.2_1").is_err());
/// # Ok::<(), repodb_types::Error>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PkgVer {
    name: Name,
    version: Version,
}

impl PkgVer {
    /// Creates a new [`PkgVer`] from a name and a version.
    pub fn new(name: Name, version: Version) -> Self {
        Self { name, version }
    }

    /// Returns the package name part of the identifier.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the version part of the identifier.
    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl FromStr for PkgVer {
    type Err = Error;

    /// Parses a [`PkgVer`] from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string contains no `-`, or if the parts
    /// around the last `-` are not a valid name and version.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let Some((name, version)) = input.rsplit_once('-') else {
            return Err(Error::InvalidPackageIdentifier(input.to_string()));
        };
        let name =
            Name::new(name).map_err(|_| Error::InvalidPackageIdentifier(input.to_string()))?;
        let version = Version::new(version)
            .map_err(|_| Error::InvalidPackageIdentifier(input.to_string()))?;
        Ok(Self { name, version })
    }
}

impl TryFrom<String> for PkgVer {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PkgVer> for String {
    fn from(pkgver: PkgVer) -> Self {
        pkgver.to_string()
    }
}

impl Display for PkgVer {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}-{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    #[case("zlib-1.2_1", "zlib", "1.2_1")]
    #[case("gcc-libs-13.2_1", "gcc-libs", "13.2_1")]
    #[case("a-1_1", "a", "1_1")]
    #[case("font-misc-misc-1.1.2_1", "font-misc-misc", "1.1.2_1")]
    fn splits_at_last_dash(
        #[case] input: &str,
        #[case] name: &str,
        #[case] version: &str,
    ) -> TestResult {
        let pkgver: PkgVer = input.parse()?;
        assert_eq!(pkgver.name().inner(), name);
        assert_eq!(pkgver.version().inner(), version);
        assert_eq!(pkgver.to_string(), input);
        Ok(())
    }

    #[rstest]
    #[case("zlib")]
    #[case("gcc-libs")]
    #[case("-1.2_1")]
    #[case("1.2_1")]
    #[case("")]
    fn rejects_identifiers_without_version(#[case] input: &str) {
        assert_eq!(
            PkgVer::from_str(input),
            Err(Error::InvalidPackageIdentifier(input.to_string()))
        );
    }
}
