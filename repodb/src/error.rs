//! Error handling.

/// The error that can occur when running `repodb` commands.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A [`repodb_solve::Error`].
    #[error(transparent)]
    Solve(#[from] repodb_solve::Error),

    /// A [`repodb_index::Error`].
    #[error(transparent)]
    Index(#[from] repodb_index::Error),

    /// I/O error while writing command output.
    #[error("IO write error while {context}:\n{source}")]
    IoWrite {
        /// The context in which the error occurred.
        context: &'static str,

        /// The source of the error.
        source: std::io::Error,
    },

    /// The run completed, but dependency patterns without a package name
    /// were encountered along the way.
    #[error("{count} dependency pattern(s) contain no package name")]
    InvalidPatterns {
        /// How many patterns were affected.
        count: usize,
    },

    /// The checked overlay is inconsistent.
    #[error("{count} consistency finding(s)")]
    FindingsReported {
        /// How many findings were reported.
        count: usize,
    },
}

impl Error {
    /// Maps the error to the process exit code.
    ///
    /// Repository inconsistencies exit with the protocol-error class (71),
    /// runs that only stumbled over malformed dependency patterns with the
    /// no-such-device-or-address class (6), and lock contention with the
    /// operating system error of the failed lock acquisition. Everything
    /// else exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Solve(repodb_solve::Error::Inconsistent { .. }) => 71,
            Error::InvalidPatterns { .. } => 6,
            Error::Index(repodb_index::Error::Locked { source, .. })
            | Error::Solve(repodb_solve::Error::Index(repodb_index::Error::Locked {
                source,
                ..
            })) => source
                .raw_os_error()
                .and_then(|code| u8::try_from(code).ok())
                .unwrap_or(1),
            _ => 1,
        }
    }
}
