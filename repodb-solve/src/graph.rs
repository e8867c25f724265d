//! The in-memory repository graph.

use std::{collections::BTreeMap, str::FromStr};

use log::{debug, warn};
use repodb_index::{Index, IndexRecord};
use repodb_types::{Name, PkgVer, Version};

use crate::{Interner, Symbol};

/// One of the two logical views of a repository.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Overlay {
    /// The index currently served to clients.
    Public,
    /// The index of newly built packages proposed for publication.
    Stage,
}

/// A package record held by one overlay slot of a [`Node`].
#[derive(Clone, Debug)]
pub struct PackageEntry {
    /// The full `name-version` identifier of the package.
    pub pkgver: PkgVer,
    /// The upstream index record.
    pub record: IndexRecord,
    /// The input repository the record came from.
    pub repo_index: usize,
}

impl PackageEntry {
    fn new(record: &IndexRecord, repo_index: usize) -> Self {
        Self {
            pkgver: record.pkgver.clone(),
            record: record.clone(),
            repo_index,
        }
    }
}

/// One package node: up to two records (public and stage) and the
/// promotion decision taken for them.
#[derive(Debug)]
pub struct Node {
    /// The interned package name keying this node.
    pub name: Symbol,
    /// The package name as a [`Name`].
    pub pkgname: Name,
    /// The record of the public overlay, if any.
    pub public: Option<PackageEntry>,
    /// The record of the stage overlay, if any.
    pub stage: Option<PackageEntry>,
    /// The overlay whose record this node publishes.
    ///
    /// Starts out as [`Overlay::Stage`] and is reset to [`Overlay::Public`]
    /// by the solver driver for every node in the correcting subset.
    pub selection: Overlay,
}

impl Node {
    /// Returns the record of the given overlay slot.
    pub fn overlay(&self, overlay: Overlay) -> Option<&PackageEntry> {
        match overlay {
            Overlay::Public => self.public.as_ref(),
            Overlay::Stage => self.stage.as_ref(),
        }
    }

    /// Returns the record selected for publication.
    pub fn selected(&self) -> Option<&PackageEntry> {
        self.overlay(self.selection)
    }

    fn slot_mut(&mut self, overlay: Overlay) -> &mut Option<PackageEntry> {
        match overlay {
            Overlay::Public => &mut self.public,
            Overlay::Stage => &mut self.stage,
        }
    }
}

/// The repository graph: package nodes plus the global provider indexes.
///
/// The graph is built once per invocation by loading every (repository,
/// overlay) pair and then deriving the provider indexes; afterwards the
/// constraint generator and the writer consume it read-only (the solver
/// driver only touches [`Node::selection`]).
#[derive(Debug, Default)]
pub struct Graph {
    /// The package nodes, keyed by interned package name.
    pub(crate) nodes: BTreeMap<Symbol, Node>,

    /// For each shared library, the package versions exposing it.
    ///
    /// Libraries that are required but provided by nobody are present with
    /// an empty provider list.
    pub(crate) shlib_providers: BTreeMap<Symbol, Vec<PkgVer>>,

    /// For each virtual package name, the providing package versions and
    /// the virtual `name-version` each of them claims.
    pub(crate) virtual_providers: BTreeMap<Symbol, BTreeMap<PkgVer, PkgVer>>,

    /// Display labels of the input repositories, used in diagnostics.
    repos: Vec<String>,
}

impl Graph {
    /// Creates an empty graph over the given repositories.
    pub fn new(repo_labels: Vec<String>) -> Self {
        Self {
            repos: repo_labels,
            ..Self::default()
        }
    }

    /// Returns the number of input repositories.
    pub fn repo_count(&self) -> usize {
        self.repos.len()
    }

    /// Returns the display label of an input repository.
    pub fn repo_label(&self, repo_index: usize) -> &str {
        &self.repos[repo_index]
    }

    /// Returns an iterator over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Looks up a node by package name.
    pub fn node(&self, interner: &Interner, pkgname: &str) -> Option<&Node> {
        self.nodes.get(&interner.get(pkgname)?)
    }

    /// Returns the shared-library provider lists, resolved for display.
    pub fn shlib_provider_entries<'a>(
        &'a self,
        interner: &'a Interner,
    ) -> impl Iterator<Item = (&'a str, &'a [PkgVer])> {
        self.shlib_providers
            .iter()
            .map(|(shlib, providers)| (interner.resolve(*shlib), providers.as_slice()))
    }

    /// Loads one overlay of one repository into the graph.
    ///
    /// Duplicate package names within one overlay are resolved by version
    /// order: the strictly greater version wins, on equal versions the
    /// incumbent stays. Both directions log the displacement.
    pub fn load_overlay(
        &mut self,
        interner: &mut Interner,
        repo_index: usize,
        overlay: Overlay,
        index: &Index,
    ) {
        debug!(
            "loading repository '{}', overlay {overlay}",
            self.repos[repo_index]
        );
        for (pkgname, record) in index {
            let name = interner.intern(pkgname.inner());
            let node = self.nodes.entry(name).or_insert_with(|| Node {
                name,
                pkgname: pkgname.clone(),
                public: None,
                stage: None,
                selection: Overlay::Stage,
            });
            match node.slot_mut(overlay) {
                Some(existing) => {
                    if Version::vercmp(existing.pkgver.version(), record.pkgver.version()).is_ge()
                    {
                        warn!(
                            "'{}' from '{}' is about to push out '{}' from '{}'",
                            existing.pkgver,
                            self.repos[existing.repo_index],
                            record.pkgver,
                            self.repos[repo_index],
                        );
                    } else {
                        warn!(
                            "'{}' from '{}' is about to push out '{}' from '{}'",
                            record.pkgver,
                            self.repos[repo_index],
                            existing.pkgver,
                            self.repos[existing.repo_index],
                        );
                        *existing = PackageEntry::new(record, repo_index);
                    }
                }
                slot => *slot = Some(PackageEntry::new(record, repo_index)),
            }
        }
    }

    /// Builds the provider indexes from all loaded overlays and resets
    /// every node's selection to [`Overlay::Stage`].
    ///
    /// `provides` entries that are not valid `name-version` identifiers are
    /// skipped with a diagnostic. Shared libraries that are required by any
    /// record are entered into the provider index even when nobody provides
    /// them, so that the constraint generator emits their (empty) closure.
    pub fn build_provider_indexes(&mut self, interner: &mut Interner) {
        for node in self.nodes.values_mut() {
            node.selection = Overlay::Stage;
        }

        let mut shlib_providers: BTreeMap<Symbol, Vec<PkgVer>> = BTreeMap::new();
        let mut virtual_providers: BTreeMap<Symbol, BTreeMap<PkgVer, PkgVer>> = BTreeMap::new();

        for node in self.nodes.values() {
            for overlay in [Overlay::Public, Overlay::Stage] {
                let Some(entry) = node.overlay(overlay) else {
                    continue;
                };

                for shlib in &entry.record.shlib_provides {
                    shlib_providers
                        .entry(interner.intern(shlib))
                        .or_default()
                        .push(entry.pkgver.clone());
                }
                for shlib in &entry.record.shlib_requires {
                    shlib_providers.entry(interner.intern(shlib)).or_default();
                }

                for virtual_pkgver in &entry.record.provides {
                    let Ok(virtual_pkgver) = PkgVer::from_str(virtual_pkgver) else {
                        debug!(
                            "invalid virtual pkgver '{virtual_pkgver}' provided by package \
                             '{}', ignoring",
                            node.pkgname,
                        );
                        continue;
                    };
                    debug!(
                        "virtual '{}' ({virtual_pkgver}) provided by '{}'",
                        virtual_pkgver.name(),
                        node.pkgname,
                    );
                    virtual_providers
                        .entry(interner.intern(virtual_pkgver.name().inner()))
                        .or_default()
                        .insert(entry.pkgver.clone(), virtual_pkgver);
                }
            }
        }

        self.shlib_providers = shlib_providers;
        self.virtual_providers = virtual_providers;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    fn record(pkgver: &str) -> TestResult<(Name, IndexRecord)> {
        let pkgver: PkgVer = pkgver.parse()?;
        Ok((pkgver.name().clone(), IndexRecord::new(pkgver)))
    }

    fn index_of(pkgvers: &[&str]) -> TestResult<Index> {
        let mut index = Index::new();
        for pkgver in pkgvers {
            let (name, record) = record(pkgver)?;
            index.insert(name, record);
        }
        Ok(index)
    }

    #[test]
    fn nodes_hold_one_record_per_overlay() -> TestResult {
        let mut interner = Interner::new();
        let mut graph = Graph::new(vec!["repo".into()]);
        graph.load_overlay(&mut interner, 0, Overlay::Public, &index_of(&["a-1_1"])?);
        graph.load_overlay(&mut interner, 0, Overlay::Stage, &index_of(&["a-2_1"])?);

        let node = graph.node(&interner, "a").expect("node should exist");
        assert_eq!(node.public.as_ref().unwrap().pkgver.to_string(), "a-1_1");
        assert_eq!(node.stage.as_ref().unwrap().pkgver.to_string(), "a-2_1");
        assert_eq!(node.selection, Overlay::Stage);
        Ok(())
    }

    #[rstest]
    // the strictly greater version wins regardless of load order
    #[case("zlib-1.3_1", "zlib-1.2_1", "zlib-1.3_1")]
    #[case("zlib-1.2_1", "zlib-1.3_1", "zlib-1.3_1")]
    // on equal versions the incumbent stays
    #[case("zlib-1.2_1", "zlib-1.2_1", "zlib-1.2_1")]
    fn collisions_keep_the_greater_version(
        #[case] first: &str,
        #[case] second: &str,
        #[case] expected: &str,
    ) -> TestResult {
        let mut interner = Interner::new();
        let mut graph = Graph::new(vec!["first".into(), "second".into()]);
        graph.load_overlay(&mut interner, 0, Overlay::Public, &index_of(&[first])?);
        graph.load_overlay(&mut interner, 1, Overlay::Public, &index_of(&[second])?);

        let node = graph.node(&interner, "zlib").expect("node should exist");
        let entry = node.public.as_ref().unwrap();
        assert_eq!(entry.pkgver.to_string(), expected);
        let expected_repo = usize::from(second == expected && first != expected);
        assert_eq!(entry.repo_index, expected_repo);
        Ok(())
    }

    #[test]
    fn provider_indexes_cover_both_overlays() -> TestResult {
        let mut interner = Interner::new();
        let mut graph = Graph::new(vec!["repo".into()]);

        let mut public = Index::new();
        let (name, mut libz) = record("libz-1_1")?;
        libz.shlib_provides = vec!["libz.so.1".into()];
        public.insert(name, libz);

        let mut stage = Index::new();
        let (name, mut libz) = record("libz-2_1")?;
        libz.shlib_provides = vec!["libz.so.2".into()];
        stage.insert(name, libz);
        let (name, mut consumer) = record("a-1_1")?;
        consumer.shlib_requires = vec!["libcrypto.so.3".into()];
        stage.insert(name, consumer);

        graph.load_overlay(&mut interner, 0, Overlay::Public, &public);
        graph.load_overlay(&mut interner, 0, Overlay::Stage, &stage);
        graph.build_provider_indexes(&mut interner);

        let providers: BTreeMap<&str, &[PkgVer]> =
            graph.shlib_provider_entries(&interner).collect();
        assert_eq!(
            providers["libz.so.1"]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["libz-1_1"]
        );
        assert_eq!(
            providers["libz.so.2"]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["libz-2_1"]
        );
        // required but unprovided libraries appear with no providers
        assert!(providers["libcrypto.so.3"].is_empty());
        Ok(())
    }

    #[test]
    fn virtual_providers_skip_invalid_entries() -> TestResult {
        let mut interner = Interner::new();
        let mut graph = Graph::new(vec!["repo".into()]);

        let mut stage = Index::new();
        let (name, mut gawk) = record("gawk-5_1")?;
        gawk.provides = vec!["awk-1_1".into(), "not a pkgver".into()];
        stage.insert(name, gawk);

        graph.load_overlay(&mut interner, 0, Overlay::Stage, &stage);
        graph.build_provider_indexes(&mut interner);

        let awk = interner.get("awk").expect("virtual name should be interned");
        let providers = &graph.virtual_providers[&awk];
        assert_eq!(providers.len(), 1);
        assert_eq!(
            providers[&PkgVer::from_str("gawk-5_1")?].to_string(),
            "awk-1_1"
        );
        assert!(interner.get("not a pkgver").is_none());
        Ok(())
    }
}
