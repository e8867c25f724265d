#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
pub use error::Error;

mod name;
pub use name::Name;

mod pattern;
pub use pattern::DependencyPattern;

mod pkgver;
pub use pkgver::PkgVer;

mod version;
pub use version::Version;
pub use version::VersionComparison;
pub use version::VersionRequirement;
