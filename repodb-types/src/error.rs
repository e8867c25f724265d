//! Error handling.

/// The error that can occur when working with repodb types.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A package name contains invalid characters or is empty.
    #[error("Invalid package name: {0}")]
    InvalidName(String),

    /// A version string is empty or does not start with a digit.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// A package identifier does not follow the `name-version` form.
    #[error("Invalid package identifier: {0}")]
    InvalidPackageIdentifier(String),

    /// A dependency pattern carries neither a comparison operator nor a
    /// version suffix, so no package name can be extracted from it.
    #[error("Dependency pattern contains no package name: {0}")]
    InvalidDependencyPattern(String),
}
