//! Command line argument handling.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use repodb_index::Compression;

/// Command line argument handling for the `repodb` executable.
#[derive(Debug, Parser)]
#[command(
    about = "Maintains the public indexes of binary package repositories.",
    author,
    name = "repodb",
    version
)]
pub struct Cli {
    /// Log verbosity level
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    /// Available subcommands
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for the `repodb` executable.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Promote consistent staged packages into the public indexes.
    ///
    /// Each repository's stage overlay is solved against its public overlay;
    /// staged packages whose promotion would leave the public index
    /// inconsistent stay behind, and every rewritten public index keeps its
    /// repository metadata.
    Index {
        /// The compression for rewritten public indexes.
        #[arg(
            short,
            long,
            default_value_t = Compression::default(),
            value_name = "COMPRESSION"
        )]
        compression: Compression,

        /// The repository directories to index.
        #[arg(value_name = "REPO")]
        repos: Vec<PathBuf>,
    },

    /// Check one overlay of the given repositories for consistency.
    ///
    /// Reports missing shared libraries and unsatisfied or malformed
    /// dependency patterns without modifying anything.
    Check {
        /// Check the stage overlay instead of the public one.
        #[arg(short, long)]
        stage: bool,

        /// The repository directories to check.
        #[arg(value_name = "REPO")]
        repos: Vec<PathBuf>,
    },

    /// Print the shared-library provider map of the public overlays.
    Providers {
        /// The repository directories to inspect.
        #[arg(value_name = "REPO")]
        repos: Vec<PathBuf>,
    },
}
