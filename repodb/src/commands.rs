//! Implementations of the `repodb` subcommands.

use std::{io::Write, path::PathBuf};

use log::{debug, error, info};
use repodb::Error;
use repodb_index::{Compression, Repository};
use repodb_solve::{Graph, Interner, Overlay, output_indexes, promote, verify};

/// Opens and locks every repository, in command-line order.
fn open_repositories(repo_paths: &[PathBuf]) -> Result<Vec<Repository>, Error> {
    let mut repositories = Vec::with_capacity(repo_paths.len());
    for path in repo_paths {
        repositories.push(Repository::open(path)?);
    }
    Ok(repositories)
}

/// Builds the graph over the given overlays of the opened repositories.
fn build_graph(
    repositories: &[Repository],
    interner: &mut Interner,
    overlays: &[Overlay],
) -> Graph {
    let mut graph = Graph::new(
        repositories
            .iter()
            .map(|repository| repository.path.display().to_string())
            .collect(),
    );
    for (repo_index, repository) in repositories.iter().enumerate() {
        for overlay in overlays {
            let index = match overlay {
                Overlay::Public => &repository.public,
                Overlay::Stage => &repository.stage,
            };
            graph.load_overlay(interner, repo_index, *overlay, index);
        }
    }
    graph.build_provider_indexes(interner);
    graph
}

/// Promotes consistent staged packages into the public indexes.
///
/// # Errors
///
/// Returns an error if a repository cannot be locked or read, if the
/// repository state is contradictory, or if writing a new index fails.
/// Dependency patterns without a package name are reported as an error
/// only after all indexes are written.
pub fn index(compression: Compression, repo_paths: Vec<PathBuf>) -> Result<(), Error> {
    let mut repositories = open_repositories(&repo_paths)?;

    let mut interner = Interner::new();
    let mut graph = build_graph(
        &repositories,
        &mut interner,
        &[Overlay::Public, Overlay::Stage],
    );

    let promotion = promote(&mut graph, &mut interner)?;
    for pkgname in &promotion.corrected {
        info!("keeping '{pkgname}' on its public record");
    }

    let outputs = output_indexes(&graph);
    for (repository, output) in repositories.iter().zip(&outputs) {
        if *output == repository.public {
            debug!("nothing to promote for '{}'", repository.path.display());
            continue;
        }
        repository.flush(output, compression)?;
    }

    // locks release in reverse acquisition order
    while repositories.pop().is_some() {}

    if !promotion.invalid_patterns.is_empty() {
        return Err(Error::InvalidPatterns {
            count: promotion.invalid_patterns.len(),
        });
    }
    Ok(())
}

/// Checks one overlay of the given repositories for consistency.
///
/// # Errors
///
/// Returns an error if a repository cannot be locked or read, or if
/// findings were reported.
pub fn check(stage: bool, repo_paths: Vec<PathBuf>) -> Result<(), Error> {
    let repositories = open_repositories(&repo_paths)?;
    let overlay = if stage {
        Overlay::Stage
    } else {
        Overlay::Public
    };

    let mut interner = Interner::new();
    let graph = build_graph(&repositories, &mut interner, &[overlay]);

    let findings = verify(&graph, &interner, overlay);
    for finding in &findings {
        error!("{finding}");
    }
    if findings.is_empty() {
        Ok(())
    } else {
        Err(Error::FindingsReported {
            count: findings.len(),
        })
    }
}

/// Prints the shared-library provider map of the public overlays.
///
/// # Errors
///
/// Returns an error if a repository cannot be locked or read, or if writing
/// the listing fails.
pub fn providers(repo_paths: Vec<PathBuf>, output: &mut impl Write) -> Result<(), Error> {
    let repositories = open_repositories(&repo_paths)?;

    let mut interner = Interner::new();
    let graph = build_graph(&repositories, &mut interner, &[Overlay::Public]);

    for (shlib, providers) in graph.shlib_provider_entries(&interner) {
        writeln!(output, "{shlib}:").map_err(|source| Error::IoWrite {
            context: "printing a shared library name",
            source,
        })?;
        for provider in providers {
            writeln!(output, "  {provider}").map_err(|source| Error::IoWrite {
                context: "printing a shared library provider",
                source,
            })?;
        }
    }
    Ok(())
}
