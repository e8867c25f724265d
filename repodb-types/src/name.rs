//! Package names.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The name of a package, virtual package or package node.
///
/// A `Name` wraps a `String` that is guaranteed to be non-empty, to consist
/// only of alphanumeric characters and `"."`, `"+"`, `"_"` or `"-"`, and to
/// not start with a `"-"` or `"."` character.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repodb_types::Name;
///
/// assert!(Name::from_str("gcc-libs").is_ok());
/// assert!(Name::from_str("libstdc++").is_ok());
/// assert!(Name::from_str("").is_err());
/// assert!(Name::from_str("-foo").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, starts with `-` or `.`, or
    /// contains a character outside the allowed set.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphanumeric() || matches!(first, '_' | '+'))
                    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '_' | '-'))
            }
            None => false,
        };
        if valid {
            Ok(Name(name))
        } else {
            Err(Error::InvalidName(name))
        }
    }

    /// Returns a reference to the inner string.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Name::new(input)
    }
}

impl TryFrom<String> for Name {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Name::new(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl Display for Name {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}
