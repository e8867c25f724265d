//! CNF constraint generation.
//!
//! Encodes the repository graph as a Boolean formula: package identity and
//! promotion preference per node, shared-library linkage and runtime
//! dependencies per record, the bi-implication between virtual and real
//! variables, and the global provider closures.
//!
//! The same generation pass serves both solver modes. In promotion mode only
//! the clauses and assumptions are produced; in explain mode every clause
//! additionally receives a human-readable rendering and a fresh activation
//! literal, through which the solver driver recovers the unsatisfiable core.

use log::error;
use repodb_types::{DependencyPattern, PkgVer};
use std::collections::BTreeSet;
use varisat::{ExtendFormula, Lit, Solver};

use crate::{Graph, Interner, Overlay, VariablePool};

/// The output of one constraint generation pass.
#[derive(Debug, Default)]
pub(crate) struct Generation {
    /// Whether explain mode was active.
    explain: bool,

    /// The soft promotion preferences, in node order.
    pub(crate) assumptions: Vec<Lit>,

    /// Explain mode: one activation literal per emitted clause.
    pub(crate) selectors: Vec<Lit>,

    /// Explain mode: one readable rendering per emitted clause.
    ///
    /// A constraint that expands to several CNF clauses repeats its
    /// rendering once per clause, so indices stay aligned with the solver's
    /// clause numbering.
    pub(crate) text_clauses: Vec<String>,

    /// The number of clauses handed to the solver.
    pub(crate) clause_count: usize,

    /// Dependency patterns from which no package name could be extracted.
    pub(crate) invalid_patterns: Vec<String>,
}

impl Generation {
    fn new(explain: bool) -> Self {
        Self {
            explain,
            ..Self::default()
        }
    }

    /// Hands one clause to the solver.
    ///
    /// `variables` are signed DIMACS-style variable numbers. The rendering
    /// is only materialized in explain mode.
    fn emit(
        &mut self,
        solver: &mut Solver<'_>,
        pool: &mut VariablePool,
        variables: &[isize],
        text: impl FnOnce() -> String,
    ) {
        let mut lits: Vec<Lit> = variables.iter().map(|&v| Lit::from_dimacs(v)).collect();
        if self.explain {
            let selector = Lit::from_dimacs(pool.aux());
            lits.push(!selector);
            self.selectors.push(selector);
            self.text_clauses.push(text());
        }
        solver.add_clause(&lits);
        self.clause_count += 1;
    }
}

/// Generates the full constraint system for a built graph.
pub(crate) fn generate(
    graph: &Graph,
    interner: &mut Interner,
    pool: &mut VariablePool,
    solver: &mut Solver<'_>,
    explain: bool,
) -> Generation {
    let mut generation = Generation::new(explain);

    for node in graph.nodes.values() {
        match (&node.public, &node.stage) {
            (Some(public), Some(stage)) => {
                if public.pkgver == stage.pkgver {
                    // the same version on both overlays is always selected
                    let selected = pool.real(interner.intern(&public.pkgver.to_string()));
                    let pkgver = &public.pkgver;
                    generation.emit(solver, pool, &[selected], || format!("(real({pkgver}))"));
                } else {
                    let public_var = pool.real(interner.intern(&public.pkgver.to_string()));
                    let stage_var = pool.real(interner.intern(&stage.pkgver.to_string()));
                    // p ↔ ¬q  ==  (p ∨ q) ∧ (¬p ∨ ¬q)
                    let text =
                        || format!("real({}) ↔ ¬real({})", public.pkgver, stage.pkgver);
                    generation.emit(solver, pool, &[public_var, stage_var], text);
                    generation.emit(solver, pool, &[-public_var, -stage_var], text);
                    generation
                        .assumptions
                        .push(Lit::from_dimacs(stage_var));
                }
            }
            (Some(public), None) => {
                // A package that was not re-staged is immovable, so its
                // presence is a hard clause. The drop preference below can
                // never hold against it, which lands the node in the
                // correcting subset and pins its selection to PUBLIC.
                let public_var = pool.real(interner.intern(&public.pkgver.to_string()));
                let pkgver = &public.pkgver;
                generation.emit(solver, pool, &[public_var], || format!("(real({pkgver}))"));
                generation.assumptions.push(Lit::from_dimacs(-public_var));
            }
            (None, Some(stage)) => {
                let stage_var = pool.real(interner.intern(&stage.pkgver.to_string()));
                generation.assumptions.push(Lit::from_dimacs(stage_var));
            }
            (None, None) => {}
        }

        for overlay in [Overlay::Public, Overlay::Stage] {
            let Some(entry) = node.overlay(overlay) else {
                continue;
            };
            let real = pool.real(interner.intern(&entry.pkgver.to_string()));

            for shlib in &entry.record.shlib_requires {
                let available = pool.shlib(interner.intern(shlib));
                generation.emit(solver, pool, &[-real, available], || {
                    format!("(¬real({}) ∨ shlib({shlib}))", entry.pkgver)
                });
            }

            for pattern_source in &entry.record.run_depends {
                let Ok(pattern) = pattern_source.parse::<DependencyPattern>() else {
                    error!(
                        "'{}' requires '{pattern_source}' that has no package name",
                        entry.pkgver,
                    );
                    generation.invalid_patterns.push(pattern_source.clone());
                    continue;
                };
                let dependency_name = interner.get(pattern.name().inner());

                let mut clause = vec![-real];
                let mut alternatives: Vec<String> = Vec::new();
                let mut listed: Vec<&PkgVer> = Vec::new();

                if let Some(dependency) =
                    dependency_name.and_then(|name| graph.nodes.get(&name))
                {
                    if let Some(dependency_public) = &dependency.public {
                        if pattern.matches(&dependency_public.pkgver) {
                            clause.push(
                                pool.virt(
                                    interner.intern(&dependency_public.pkgver.to_string()),
                                ),
                            );
                            alternatives.push(format!("virt({})", dependency_public.pkgver));
                            listed.push(&dependency_public.pkgver);
                        }
                    }
                    if let Some(dependency_stage) = &dependency.stage {
                        let differs = dependency
                            .public
                            .as_ref()
                            .is_none_or(|public| public.pkgver != dependency_stage.pkgver);
                        if differs && pattern.matches(&dependency_stage.pkgver) {
                            clause.push(
                                pool.virt(interner.intern(&dependency_stage.pkgver.to_string())),
                            );
                            alternatives.push(format!("virt({})", dependency_stage.pkgver));
                            listed.push(&dependency_stage.pkgver);
                        }
                    }
                }
                if let Some(providers) =
                    dependency_name.and_then(|name| graph.virtual_providers.get(&name))
                {
                    for (provider, virtual_pkgver) in providers {
                        if pattern.matches(virtual_pkgver) && !listed.contains(&provider) {
                            clause.push(pool.virt(interner.intern(&provider.to_string())));
                            alternatives.push(format!("virt({provider})"));
                            listed.push(provider);
                        }
                    }
                }

                generation.emit(solver, pool, &clause, || {
                    let mut body = String::new();
                    for alternative in &alternatives {
                        body.push_str(alternative);
                        body.push_str(" ∨ ");
                    }
                    format!("real({}) → ({body}⊥) [{pattern_source}]", entry.pkgver)
                });
            }

            // virt(X) ↔ (real(X) ∨ every provider of the node's name
            // claiming exactly X)
            let virt = VariablePool::virt_of(real);
            let mut provider_vars: Vec<isize> = Vec::new();
            let mut provider_texts: Vec<String> = Vec::new();
            if let Some(providers) = graph.virtual_providers.get(&node.name) {
                for (provider, virtual_pkgver) in providers {
                    if *virtual_pkgver == entry.pkgver && *provider != entry.pkgver {
                        provider_vars.push(pool.real(interner.intern(&provider.to_string())));
                        provider_texts.push(format!("real({provider})"));
                    }
                }
            }
            let text = || {
                let mut body = format!("real({})", entry.pkgver);
                for provider in &provider_texts {
                    body.push_str(" ∨ ");
                    body.push_str(provider);
                }
                format!("virt({}) ↔ ({body})", entry.pkgver)
            };
            generation.emit(solver, pool, &[-real, virt], &text);
            for &provider_var in &provider_vars {
                generation.emit(solver, pool, &[-provider_var, virt], &text);
            }
            let mut only_if = vec![-virt, real];
            only_if.extend(provider_vars.iter().copied());
            generation.emit(solver, pool, &only_if, &text);
        }
    }

    // closure over virtual versions nobody carries as a real package
    for (virtual_name, providers) in &graph.virtual_providers {
        let mut processed: BTreeSet<&PkgVer> = BTreeSet::new();
        if let Some(node) = graph.nodes.get(virtual_name) {
            if let Some(public) = &node.public {
                processed.insert(&public.pkgver);
            }
            if let Some(stage) = &node.stage {
                processed.insert(&stage.pkgver);
            }
        }
        for outer_virtual in providers.values() {
            if !processed.insert(outer_virtual) {
                continue;
            }
            let virt = pool.virt(interner.intern(&outer_virtual.to_string()));
            let mut provider_vars: Vec<isize> = Vec::new();
            let mut provider_texts: Vec<String> = Vec::new();
            for (provider, inner_virtual) in providers {
                if inner_virtual == outer_virtual {
                    provider_vars.push(pool.real(interner.intern(&provider.to_string())));
                    provider_texts.push(format!("real({provider})"));
                }
            }
            let text = || {
                let mut body = String::new();
                for provider in &provider_texts {
                    body.push_str(provider);
                    body.push_str(" ∨ ");
                }
                format!("virt({outer_virtual}) ↔ ({body}⊥)")
            };
            for &provider_var in &provider_vars {
                generation.emit(solver, pool, &[-provider_var, virt], &text);
            }
            let mut only_if = vec![-virt];
            only_if.extend(provider_vars.iter().copied());
            generation.emit(solver, pool, &only_if, &text);
        }
    }

    // closure tying every shared-library variable to its providers
    for (shlib, providers) in &graph.shlib_providers {
        let shlib_name = interner.resolve(*shlib).to_string();
        let available = pool.shlib(*shlib);
        let mut provider_vars: Vec<isize> = Vec::new();
        let mut provider_texts: Vec<String> = Vec::new();
        for provider in providers {
            provider_vars.push(pool.real(interner.intern(&provider.to_string())));
            provider_texts.push(format!("real({provider})"));
        }
        let text = || {
            let mut body = String::new();
            for provider in &provider_texts {
                body.push_str(provider);
                body.push_str(" ∨ ");
            }
            format!("shlib({shlib_name}) ↔ ({body}⊥)")
        };
        for &provider_var in &provider_vars {
            generation.emit(solver, pool, &[-provider_var, available], &text);
        }
        let mut only_if = vec![-available];
        only_if.extend(provider_vars.iter().copied());
        generation.emit(solver, pool, &only_if, &text);
    }

    generation
}
