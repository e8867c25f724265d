//! The solver driver.
//!
//! Runs the SAT solver in two modes. *Promotion* solves under the soft
//! stage-preference assumptions and computes a minimal correcting subset:
//! the assumptions that have to be abandoned name exactly the nodes whose
//! selection falls back from STAGE to PUBLIC. *Explanation* runs without
//! assumptions over activation-guarded clauses and recovers the
//! unsatisfiable core of the input formula in human-readable form.

use std::collections::HashMap;

use log::{debug, error};
use repodb_types::{Name, PkgVer};
use varisat::{Lit, Solver};

use crate::{Error, Graph, Interner, Overlay, VariablePool, clauses};

/// The decision of a successful promotion solve.
#[derive(Debug)]
pub struct Promotion {
    /// The packages whose nodes fell back to [`Overlay::Public`].
    pub corrected: Vec<Name>,

    /// Dependency patterns from which no package name could be extracted.
    ///
    /// These are non-fatal for the solve; the orchestrator surfaces them
    /// after the run.
    pub invalid_patterns: Vec<String>,
}

/// Solves for the promotion decision and applies it to the graph.
///
/// Every node starts out selecting its stage record. Nodes named by the
/// correcting subset are reset to select their public record instead.
///
/// # Errors
///
/// Returns [`Error::Inconsistent`] (with the human-readable unsatisfiable
/// core) if the constraints are contradictory regardless of all
/// assumptions, or [`Error::Solver`] if the solver fails internally.
pub fn promote(graph: &mut Graph, interner: &mut Interner) -> Result<Promotion, Error> {
    let mut pool = VariablePool::new();
    let mut solver = Solver::new();
    let generation = clauses::generate(graph, interner, &mut pool, &mut solver, false);

    let mut active = generation.assumptions.clone();
    let mut dropped: Vec<Lit> = Vec::new();
    loop {
        solver.assume(&active);
        let satisfiable = solver
            .solve()
            .map_err(|source| Error::Solver(source.to_string()))?;
        if satisfiable {
            break;
        }
        let Some(victim) = solver
            .failed_core()
            .and_then(|core| core.last())
            .copied()
        else {
            // the hard clauses alone are contradictory
            return Err(explain(graph, interner));
        };
        active.retain(|&assumption| assumption != victim);
        dropped.push(victim);
    }

    // an abandoned assumption that can be re-adopted without losing
    // satisfiability does not belong into the correcting subset
    let mut correcting = Vec::new();
    for candidate in dropped {
        let mut trial = active.clone();
        trial.push(candidate);
        solver.assume(&trial);
        if solver
            .solve()
            .map_err(|source| Error::Solver(source.to_string()))?
        {
            active = trial;
        } else {
            correcting.push(candidate);
        }
    }

    let mut corrected = Vec::new();
    for assumption in correcting {
        let variable = assumption.var().to_dimacs();
        let pkgver: PkgVer = pool
            .origin(variable)
            .map(|symbol| interner.resolve(symbol))
            .and_then(|pkgver| pkgver.parse().ok())
            .ok_or_else(|| Error::UnknownCorrection {
                pkgver: format!("variable {variable}"),
            })?;
        debug!("correcting {pkgver}");
        let node = interner
            .get(pkgver.name().inner())
            .and_then(|name| graph.nodes.get_mut(&name))
            .ok_or_else(|| Error::UnknownCorrection {
                pkgver: pkgver.to_string(),
            })?;
        node.selection = Overlay::Public;
        corrected.push(node.pkgname.clone());
    }

    Ok(Promotion {
        corrected,
        invalid_patterns: generation.invalid_patterns,
    })
}

/// Runs the explanation pass over a contradictory graph.
///
/// A fresh solver receives every clause guarded by an activation literal;
/// assuming all activation literals reproduces the original formula, and the
/// failed assumptions of the unsatisfiable solve name the clauses of the
/// core. Their readable renderings are logged and returned.
fn explain(graph: &Graph, interner: &mut Interner) -> Error {
    let mut pool = VariablePool::new();
    let mut solver = Solver::new();
    let generation = clauses::generate(graph, interner, &mut pool, &mut solver, true);

    solver.assume(&generation.selectors);
    match solver.solve() {
        Ok(false) => {
            let positions: HashMap<Lit, usize> = generation
                .selectors
                .iter()
                .copied()
                .enumerate()
                .map(|(index, selector)| (selector, index))
                .collect();
            let core = solver.failed_core().unwrap_or(&[]);
            let mut clause_indices: Vec<usize> = core
                .iter()
                .filter_map(|selector| positions.get(selector).copied())
                .collect();
            clause_indices.sort_unstable();
            let explanation: Vec<String> = clause_indices
                .into_iter()
                .map(|index| generation.text_clauses[index].clone())
                .collect();
            for clause in &explanation {
                error!("{clause}");
            }
            Error::Inconsistent { explanation }
        }
        Ok(true) => Error::Solver(
            "formula became satisfiable during the explanation pass".to_string(),
        ),
        Err(source) => Error::Solver(source.to_string()),
    }
}
