//! Package versions and version requirements.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
};

use strum::IntoEnumIterator;

use crate::Error;

/// The version of a package, including its revision (e.g. `1.2_1`).
///
/// A `Version` wraps a `String` that is guaranteed to be non-empty, to start
/// with an ASCII digit and to consist only of alphanumeric characters and
/// `"."`, `"_"` or `"+"`.
///
/// Equality and hashing compare the literal string. Ordering follows the
/// repository version order (see [`Version::vercmp`]), falling back to byte
/// order between distinct spellings that the version order considers equal
/// (e.g. `1.0` and `1.00`), so that `Ord` stays consistent with `Eq`.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repodb_types::Version;
///
/// assert!(Version::from_str("1.2_1").is_ok());
/// assert!(Version::from_str("20240801").is_ok());
/// assert!(Version::from_str("").is_err());
/// assert!(Version::from_str("rc1").is_err());
///
/// let old = Version::from_str("1.9_1")?;
/// let new = Version::from_str("1.10_1")?;
/// assert!(old < new);
/// # Ok::<(), repodb_types::Error>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Version(String);

impl Version {
    /// Creates a new [`Version`] from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, does not start with an ASCII
    /// digit, or contains a character outside the allowed set.
    pub fn new(version: impl Into<String>) -> Result<Self, Error> {
        let version = version.into();
        let mut chars = version.chars();
        let valid = match chars.next() {
            Some(first) => {
                first.is_ascii_digit()
                    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+'))
            }
            None => false,
        };
        if valid {
            Ok(Version(version))
        } else {
            Err(Error::InvalidVersion(version))
        }
    }

    /// Returns a reference to the inner string.
    pub fn inner(&self) -> &str {
        &self.0
    }

    /// Compares two versions in repository version order.
    ///
    /// Versions are walked as alternating numeric and alphabetic segments
    /// separated by runs of non-alphanumeric characters. Numeric segments
    /// compare by value, alphabetic segments lexically, a numeric segment
    /// orders after an alphabetic one, and a longer separator run orders
    /// after a shorter one. A trailing alphabetic remainder orders before
    /// an empty one, any other remainder after it.
    ///
    /// Distinct spellings may compare [`Ordering::Equal`] here (`1.0` and
    /// `1.00`); use the [`Ord`] implementation where a total order over
    /// distinct strings is needed.
    ///
    /// ## Examples
    /// ```
    /// use std::{cmp::Ordering, str::FromStr};
    ///
    /// use repodb_types::Version;
    ///
    /// let one = Version::from_str("1_1")?;
    /// let two = Version::from_str("2_1")?;
    /// assert_eq!(Version::vercmp(&one, &two), Ordering::Less);
    /// assert_eq!(Version::vercmp(&two, &one), Ordering::Greater);
    /// assert_eq!(Version::vercmp(&one, &one), Ordering::Equal);
    /// # Ok::<(), repodb_types::Error>(())
    /// ```
    pub fn vercmp(a: &Version, b: &Version) -> Ordering {
        segment_cmp(a.inner(), b.inner())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Version::new(input)
    }
}

impl Display for Version {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        Version::vercmp(self, other).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares two version strings segment by segment.
fn segment_cmp(one: &str, two: &str) -> Ordering {
    if one == two {
        return Ordering::Equal;
    }

    let a = one.as_bytes();
    let b = two.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        let sep_start_a = i;
        let sep_start_b = j;
        while i < a.len() && !a[i].is_ascii_alphanumeric() {
            i += 1;
        }
        while j < b.len() && !b[j].is_ascii_alphanumeric() {
            j += 1;
        }
        if i >= a.len() || j >= b.len() {
            break;
        }

        // a longer separator run orders later
        if i - sep_start_a != j - sep_start_b {
            return if i - sep_start_a < j - sep_start_b {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }

        // the segment class is taken from the left-hand side
        let numeric = a[i].is_ascii_digit();
        let seg_end_a = segment_end(a, i, numeric);
        let seg_end_b = segment_end(b, j, numeric);

        // a numeric segment orders after an alphabetic one
        if seg_end_b == j {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let mut seg_a = &one[i..seg_end_a];
        let mut seg_b = &two[j..seg_end_b];
        if numeric {
            seg_a = seg_a.trim_start_matches('0');
            seg_b = seg_b.trim_start_matches('0');
            match seg_a.len().cmp(&seg_b.len()) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }
        match seg_a.cmp(seg_b) {
            Ordering::Equal => {}
            ordering => return ordering,
        }

        i = seg_end_a;
        j = seg_end_b;
    }

    let rest_a = &one[i.min(one.len())..];
    let rest_b = &two[j.min(two.len())..];
    if rest_a.is_empty() && rest_b.is_empty() {
        return Ordering::Equal;
    }

    // a trailing alphabetic remainder never beats an empty one
    let starts_alphabetic = |s: &str| s.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if (rest_a.is_empty() && !starts_alphabetic(rest_b)) || starts_alphabetic(rest_a) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Returns the end of the segment of the given class starting at `start`.
fn segment_end(bytes: &[u8], start: usize, numeric: bool) -> usize {
    let mut end = start;
    while end < bytes.len() {
        let in_class = if numeric {
            bytes[end].is_ascii_digit()
        } else {
            bytes[end].is_ascii_alphabetic()
        };
        if !in_class {
            break;
        }
        end += 1;
    }
    end
}

/// The comparison function of a [`VersionRequirement`].
///
/// # Note
///
/// The variant order matters: [`DependencyPattern`] parsing tries the
/// operators in declaration order, so the two-character operators must come
/// before their one-character prefixes.
///
/// [`DependencyPattern`]: crate::DependencyPattern
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::AsRefStr, strum::Display, strum::EnumIter)]
pub enum VersionComparison {
    /// The version must be greater than or equal to the required one (`>=`).
    #[strum(serialize = ">=")]
    GreaterOrEqual,

    /// The version must be less than or equal to the required one (`<=`).
    #[strum(serialize = "<=")]
    LessOrEqual,

    /// The version must be equal to the required one (`=`).
    #[strum(serialize = "=")]
    Equal,

    /// The version must be greater than the required one (`>`).
    #[strum(serialize = ">")]
    Greater,

    /// The version must be less than the required one (`<`).
    #[strum(serialize = "<")]
    Less,
}

impl VersionComparison {
    /// Returns `true` if an [`Ordering`] between an actual and a required
    /// version satisfies this comparison function.
    pub fn is_compatible_with(self, ordering: Ordering) -> bool {
        match self {
            VersionComparison::Less => ordering == Ordering::Less,
            VersionComparison::LessOrEqual => ordering != Ordering::Greater,
            VersionComparison::Equal => ordering == Ordering::Equal,
            VersionComparison::GreaterOrEqual => ordering != Ordering::Less,
            VersionComparison::Greater => ordering == Ordering::Greater,
        }
    }
}

/// A version requirement, e.g. for a dependency on a package.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repodb_types::{Version, VersionComparison, VersionRequirement};
///
/// let requirement = VersionRequirement::new(
///     VersionComparison::GreaterOrEqual,
///     Version::from_str("1.2_1")?,
/// );
/// assert!(requirement.is_satisfied_by(&Version::from_str("1.3_1")?));
/// assert!(!requirement.is_satisfied_by(&Version::from_str("1.1_2")?));
/// # Ok::<(), repodb_types::Error>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionRequirement {
    /// The comparison function for the version.
    pub comparison: VersionComparison,
    /// The required version.
    pub version: Version,
}

impl VersionRequirement {
    /// Creates a new [`VersionRequirement`].
    pub fn new(comparison: VersionComparison, version: Version) -> Self {
        Self {
            comparison,
            version,
        }
    }

    /// Returns `true` if the given version satisfies the requirement.
    ///
    /// Satisfaction is decided in repository version order, i.e. via
    /// [`Version::vercmp`].
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        self.comparison
            .is_compatible_with(Version::vercmp(version, &self.version))
    }
}

impl Display for VersionRequirement {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}{}", self.comparison, self.version)
    }
}

impl FromStr for VersionRequirement {
    type Err = Error;

    /// Parses a [`VersionRequirement`] from a string such as `>=1.2_1`.
    ///
    /// # Errors
    ///
    /// Returns an error if no comparison operator is present or the version
    /// part does not parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for comparison in VersionComparison::iter() {
            if let Some(version) = s.strip_prefix(comparison.as_ref()) {
                return Ok(Self {
                    comparison,
                    version: version.parse()?,
                });
            }
        }
        Err(Error::InvalidVersion(s.to_string()))
    }
}
