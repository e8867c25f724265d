//! End-to-end promotion scenarios over in-memory graphs.

use repodb_index::{Index, IndexRecord};
use repodb_solve::{Error, Graph, Interner, Overlay, output_indexes, promote};
use testresult::TestResult;

/// Builds an index record with the given relation lists.
fn record(
    pkgver: &str,
    provides: &[&str],
    shlib_provides: &[&str],
    shlib_requires: &[&str],
    run_depends: &[&str],
) -> TestResult<IndexRecord> {
    let mut record = IndexRecord::new(pkgver.parse()?);
    record.provides = provides.iter().map(ToString::to_string).collect();
    record.shlib_provides = shlib_provides.iter().map(ToString::to_string).collect();
    record.shlib_requires = shlib_requires.iter().map(ToString::to_string).collect();
    record.run_depends = run_depends.iter().map(ToString::to_string).collect();
    Ok(record)
}

fn index_of(records: Vec<IndexRecord>) -> Index {
    records
        .into_iter()
        .map(|record| (record.name().clone(), record))
        .collect()
}

/// Builds a one-repository graph from a public and a stage overlay.
fn build(public: Vec<IndexRecord>, stage: Vec<IndexRecord>) -> (Graph, Interner) {
    let mut interner = Interner::new();
    let mut graph = Graph::new(vec!["repo".into()]);
    graph.load_overlay(&mut interner, 0, Overlay::Public, &index_of(public));
    graph.load_overlay(&mut interner, 0, Overlay::Stage, &index_of(stage));
    graph.build_provider_indexes(&mut interner);
    (graph, interner)
}

fn published(output: &Index) -> Vec<String> {
    output
        .values()
        .map(|record| record.pkgver.to_string())
        .collect()
}

#[test]
fn identity_promotion_changes_nothing() -> TestResult {
    let public = vec![
        record("a-1_1", &[], &[], &["libz.so.1"], &[])?,
        record("libz-1_1", &[], &["libz.so.1"], &[], &[])?,
    ];
    let stage = public.clone();
    let (mut graph, mut interner) = build(public.clone(), stage);

    let promotion = promote(&mut graph, &mut interner)?;
    assert!(promotion.corrected.is_empty());
    assert!(promotion.invalid_patterns.is_empty());

    let outputs = output_indexes(&graph);
    assert_eq!(outputs[0], index_of(public));
    Ok(())
}

#[test]
fn clean_update_promotes_the_stage_version() -> TestResult {
    let (mut graph, mut interner) = build(
        vec![record("a-1_1", &[], &[], &[], &[])?],
        vec![record("a-2_1", &[], &[], &[], &[])?],
    );

    let promotion = promote(&mut graph, &mut interner)?;
    assert!(promotion.corrected.is_empty());
    assert_eq!(published(&output_indexes(&graph)[0]), ["a-2_1"]);
    Ok(())
}

#[test]
fn compatible_consumer_survives_the_update() -> TestResult {
    let (mut graph, mut interner) = build(
        vec![
            record("a-1_1", &[], &[], &[], &[])?,
            record("b-1_1", &[], &[], &[], &["a>=1"])?,
        ],
        vec![
            record("a-2_1", &[], &[], &[], &[])?,
            record("b-1_1", &[], &[], &[], &["a>=1"])?,
        ],
    );

    let promotion = promote(&mut graph, &mut interner)?;
    assert!(promotion.corrected.is_empty());
    assert_eq!(published(&output_indexes(&graph)[0]), ["a-2_1", "b-1_1"]);
    Ok(())
}

#[test]
fn breaking_update_is_rolled_back() -> TestResult {
    let (mut graph, mut interner) = build(
        vec![
            record("a-1_1", &[], &[], &[], &[])?,
            record("b-1_1", &[], &[], &[], &["a<2"])?,
        ],
        vec![record("a-2_1", &[], &[], &[], &[])?],
    );

    let promotion = promote(&mut graph, &mut interner)?;
    let corrected: Vec<String> = promotion
        .corrected
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(corrected.contains(&"a".to_string()));
    assert_eq!(published(&output_indexes(&graph)[0]), ["a-1_1", "b-1_1"]);
    Ok(())
}

#[test]
fn virtual_provider_satisfies_a_new_consumer() -> TestResult {
    let (mut graph, mut interner) = build(
        vec![],
        vec![
            record("awk-1_1", &["awk-1_1"], &[], &[], &[])?,
            record("gawk-5_1", &["awk-1_1"], &[], &[], &[])?,
            record("c-1_1", &[], &[], &[], &["awk>=0"])?,
        ],
    );

    let promotion = promote(&mut graph, &mut interner)?;
    assert!(promotion.corrected.is_empty());
    assert_eq!(
        published(&output_indexes(&graph)[0]),
        ["awk-1_1", "c-1_1", "gawk-5_1"]
    );
    Ok(())
}

#[test]
fn contradictory_state_is_explained() -> TestResult {
    let (mut graph, mut interner) = build(
        vec![record("a-1_1", &[], &[], &["libz.so.1"], &[])?],
        vec![],
    );

    let error = promote(&mut graph, &mut interner).expect_err("the state is contradictory");
    let Error::Inconsistent { explanation } = error else {
        panic!("expected an inconsistency, got: {error}");
    };
    assert!(explanation.contains(&"(¬real(a-1_1) ∨ shlib(libz.so.1))".to_string()));
    assert!(explanation.contains(&"shlib(libz.so.1) ↔ (⊥)".to_string()));
    Ok(())
}

#[test]
fn repository_order_does_not_change_the_selected_records() -> TestResult {
    let first_public = vec![record("a-1_1", &[], &[], &[], &[])?];
    let first_stage = vec![record("a-2_1", &[], &[], &[], &[])?];
    let second_public = vec![record("b-1_1", &[], &[], &[], &["a>=1"])?];
    let second_stage = vec![record("b-2_1", &[], &[], &[], &["a>=2"])?];

    let mut selected_per_order = Vec::new();
    for overlays in [
        [
            (first_public.clone(), first_stage.clone()),
            (second_public.clone(), second_stage.clone()),
        ],
        [
            (second_public.clone(), second_stage.clone()),
            (first_public.clone(), first_stage.clone()),
        ],
    ] {
        let mut interner = Interner::new();
        let mut graph = Graph::new(vec!["one".into(), "two".into()]);
        for (repo_index, (public, stage)) in overlays.into_iter().enumerate() {
            graph.load_overlay(&mut interner, repo_index, Overlay::Public, &index_of(public));
            graph.load_overlay(&mut interner, repo_index, Overlay::Stage, &index_of(stage));
        }
        graph.build_provider_indexes(&mut interner);
        promote(&mut graph, &mut interner)?;

        let mut selected: Vec<String> = output_indexes(&graph)
            .iter()
            .flat_map(published)
            .collect();
        selected.sort();
        selected_per_order.push(selected);
    }

    assert_eq!(selected_per_order[0], selected_per_order[1]);
    assert_eq!(selected_per_order[0], ["a-2_1", "b-2_1"]);
    Ok(())
}
