//! The index record model.

use std::collections::BTreeMap;

use repodb_types::{Name, PkgVer};
use serde::{Deserialize, Serialize};

/// An index overlay: an ordered mapping from package names to their records.
pub type Index = BTreeMap<Name, IndexRecord>;

/// One record of a repository index.
///
/// Records carry the fields the consistency engine consumes; every other
/// field of the upstream package dictionary is preserved verbatim in
/// [`IndexRecord::extra`] and written back on flush.
///
/// The relation lists are kept as plain strings: `provides` entries and
/// `run_depends` patterns from foreign packages are not guaranteed to parse,
/// and deciding what to do about that is the engine's job, not the loader's.
///
/// ## Examples
/// ```
/// use repodb_index::IndexRecord;
///
/// let record: IndexRecord = serde_json::from_str(
///     r#"{
///         "pkgver": "gawk-5.1_1",
///         "provides": ["awk-1_1"],
///         "shlib-requires": ["libc.so.6"],
///         "filename-sha256": "abc123"
///     }"#,
/// )?;
/// assert_eq!(record.pkgver.name().inner(), "gawk");
/// assert_eq!(record.provides, ["awk-1_1"]);
/// assert!(record.extra.contains_key("filename-sha256"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IndexRecord {
    /// The full `name-version` identifier of the package.
    pub pkgver: PkgVer,

    /// Virtual package identifiers this package provides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,

    /// Shared libraries this package exposes.
    #[serde(default, rename = "shlib-provides", skip_serializing_if = "Vec::is_empty")]
    pub shlib_provides: Vec<String>,

    /// Shared libraries this package links against.
    #[serde(default, rename = "shlib-requires", skip_serializing_if = "Vec::is_empty")]
    pub shlib_requires: Vec<String>,

    /// Dependency patterns this package requires at run time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run_depends: Vec<String>,

    /// All remaining fields of the upstream package dictionary.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl IndexRecord {
    /// Creates a minimal record for the given package identifier.
    pub fn new(pkgver: PkgVer) -> Self {
        Self {
            pkgver,
            provides: Vec::new(),
            shlib_provides: Vec::new(),
            shlib_requires: Vec::new(),
            run_depends: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Returns the name part of the record's package identifier.
    pub fn name(&self) -> &Name {
        self.pkgver.name()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn unknown_fields_survive_a_round_trip() -> TestResult {
        let document = serde_json::json!({
            "pkgver": "zlib-1.3_1",
            "shlib-provides": ["libz.so.1"],
            "architecture": "x86_64",
            "installed_size": 98304,
        });
        let record: IndexRecord = serde_json::from_value(document.clone())?;
        assert_eq!(record.extra.len(), 2);
        assert_eq!(serde_json::to_value(&record)?, document);
        Ok(())
    }

    #[test]
    fn relation_lists_default_to_empty() -> TestResult {
        let record: IndexRecord = serde_json::from_str(r#"{"pkgver": "a-1_1"}"#)?;
        assert!(record.provides.is_empty());
        assert!(record.shlib_provides.is_empty());
        assert!(record.shlib_requires.is_empty());
        assert!(record.run_depends.is_empty());
        Ok(())
    }
}
