//! Error handling.

/// The error that can occur while promoting staged repository updates.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A [`repodb_types::Error`].
    #[error(transparent)]
    Types(#[from] repodb_types::Error),

    /// A [`repodb_index::Error`].
    #[error(transparent)]
    Index(#[from] repodb_index::Error),

    /// The SAT solver failed internally.
    #[error("SAT solver error:\n{0}")]
    Solver(String),

    /// The repository state is contradictory in itself.
    ///
    /// Carries the human-readable clauses of the unsatisfiable core.
    #[error("Repository state is inconsistent:\n{}", explanation.join("\n"))]
    Inconsistent {
        /// The clauses of the unsatisfiable core, in clause order.
        explanation: Vec<String>,
    },

    /// A corrected solver assumption does not map back to a package node.
    #[error("No package found for corrected assumption '{pkgver}'")]
    UnknownCorrection {
        /// The package identifier (or variable) recovered from the
        /// assumption.
        pkgver: String,
    },
}
