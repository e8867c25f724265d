//! Standalone consistency verification of one overlay.

use std::fmt::{Display, Formatter};

use repodb_types::{DependencyPattern, Name, PkgVer};

use crate::{Graph, Interner, Overlay};

/// One inconsistency found while verifying an overlay.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Finding {
    /// A package requires a shared library that no package provides.
    MissingSharedLibrary {
        /// The requiring package.
        pkgver: PkgVer,
        /// The shared library nobody provides.
        shlib: String,
    },

    /// A dependency pattern carries no package name.
    NoPackageName {
        /// The requiring package.
        pkgver: PkgVer,
        /// The offending pattern.
        pattern: String,
    },

    /// The required package is present, but its version does not match.
    MismatchedDependency {
        /// The requiring package.
        pkgver: PkgVer,
        /// The dependency pattern.
        pattern: String,
        /// The mismatching package that is present instead.
        present: PkgVer,
    },

    /// Neither a package nor a virtual provider satisfies the pattern.
    UnsatisfiedDependency {
        /// The name of the requiring package.
        pkgname: Name,
        /// The dependency pattern.
        pattern: String,
    },
}

impl Display for Finding {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::MissingSharedLibrary { pkgver, shlib } => {
                write!(fmt, "'{pkgver}' requires unavailable shlib '{shlib}'")
            }
            Finding::NoPackageName { pkgver, pattern } => {
                write!(fmt, "'{pkgver}' requires '{pattern}' that has no package name")
            }
            Finding::MismatchedDependency {
                pkgver,
                pattern,
                present,
            } => write!(
                fmt,
                "'{pkgver}' requires package '{pattern}', but mismatching '{present}' is present",
            ),
            Finding::UnsatisfiedDependency { pkgname, pattern } => write!(
                fmt,
                "'{pkgname}' requires unavailable package or virtual package '{pattern}'",
            ),
        }
    }
}

/// Checks whether one overlay of the graph is consistent in itself.
///
/// Reports a finding for every required shared library without a provider,
/// every dependency pattern without a package name, and every dependency
/// that the overlay's package of that name mismatches or that no virtual
/// provider satisfies.
pub fn verify(graph: &Graph, interner: &Interner, overlay: Overlay) -> Vec<Finding> {
    let mut findings = Vec::new();

    for node in graph.nodes() {
        let Some(entry) = node.overlay(overlay) else {
            continue;
        };

        for shlib in &entry.record.shlib_requires {
            let provided = interner
                .get(shlib)
                .and_then(|name| graph.shlib_providers.get(&name))
                .is_some_and(|providers| !providers.is_empty());
            if !provided {
                findings.push(Finding::MissingSharedLibrary {
                    pkgver: entry.pkgver.clone(),
                    shlib: shlib.clone(),
                });
            }
        }

        for pattern_source in &entry.record.run_depends {
            let Ok(pattern) = pattern_source.parse::<DependencyPattern>() else {
                findings.push(Finding::NoPackageName {
                    pkgver: entry.pkgver.clone(),
                    pattern: pattern_source.clone(),
                });
                continue;
            };
            let dependency_name = interner.get(pattern.name().inner());

            let dependency = dependency_name
                .and_then(|name| graph.nodes.get(&name))
                .and_then(|node| node.overlay(overlay));
            if let Some(dependency) = dependency {
                if !pattern.matches(&dependency.pkgver) {
                    findings.push(Finding::MismatchedDependency {
                        pkgver: entry.pkgver.clone(),
                        pattern: pattern_source.clone(),
                        present: dependency.pkgver.clone(),
                    });
                }
                continue;
            }

            let satisfied = dependency_name
                .and_then(|name| graph.virtual_providers.get(&name))
                .is_some_and(|providers| {
                    providers
                        .values()
                        .any(|virtual_pkgver| pattern.matches(virtual_pkgver))
                });
            if !satisfied {
                findings.push(Finding::UnsatisfiedDependency {
                    pkgname: node.pkgname.clone(),
                    pattern: pattern_source.clone(),
                });
            }
        }
    }

    findings
}
