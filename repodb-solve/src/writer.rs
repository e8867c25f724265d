//! Assembling the new public indexes from a solved graph.

use log::debug;
use repodb_index::Index;

use crate::Graph;

/// Builds one output index per input repository from the solved graph.
///
/// Every node contributes the record of its selected overlay slot to the
/// output of the repository the record came from; nodes whose selected slot
/// is empty contribute nothing. The caller decides per repository whether
/// the output differs from the currently served index and only then flushes
/// it.
pub fn output_indexes(graph: &Graph) -> Vec<Index> {
    let mut outputs = vec![Index::new(); graph.repo_count()];
    for node in graph.nodes() {
        if let Some(entry) = node.selected() {
            debug!(
                "putting {} ({}) into '{}'",
                node.pkgname,
                entry.pkgver,
                graph.repo_label(entry.repo_index),
            );
            outputs[entry.repo_index].insert(node.pkgname.clone(), entry.record.clone());
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use repodb_index::IndexRecord;
    use repodb_types::Name;
    use testresult::TestResult;

    use super::*;
    use crate::{Interner, Overlay};

    #[test]
    fn records_land_in_their_originating_repository() -> TestResult {
        let mut interner = Interner::new();
        let mut graph = Graph::new(vec!["first".into(), "second".into()]);

        let mut first = Index::new();
        first.insert(
            Name::new("zlib")?,
            IndexRecord::new("zlib-1.3_1".parse()?),
        );
        let mut second = Index::new();
        second.insert(Name::new("awk")?, IndexRecord::new("awk-1_1".parse()?));

        graph.load_overlay(&mut interner, 0, Overlay::Stage, &first);
        graph.load_overlay(&mut interner, 1, Overlay::Stage, &second);
        graph.build_provider_indexes(&mut interner);

        let outputs = output_indexes(&graph);
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].contains_key(&Name::new("zlib")?));
        assert!(outputs[1].contains_key(&Name::new("awk")?));
        Ok(())
    }

    #[test]
    fn empty_selected_slots_contribute_nothing() -> TestResult {
        let mut interner = Interner::new();
        let mut graph = Graph::new(vec!["repo".into()]);

        let mut public = Index::new();
        public.insert(
            Name::new("zlib")?,
            IndexRecord::new("zlib-1.3_1".parse()?),
        );
        graph.load_overlay(&mut interner, 0, Overlay::Public, &public);
        graph.build_provider_indexes(&mut interner);

        // selection stays on the (empty) stage slot
        assert!(output_indexes(&graph)[0].is_empty());
        Ok(())
    }
}
