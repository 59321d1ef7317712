//! Defines the command-line arguments and subcommands for the assembler.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure. Each subcommand is
//! one pipeline phase; the release procedure invokes them in fixed order, or
//! runs `all`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "assemble",
    version,
    about = "Assembles the distributable Arbor package from its pre-built artifacts."
)]
pub struct AssembleArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge the three artifact directories into the dist tree.
    Relocate {
        /// Workspace root holding the artifact directories.
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Normalize ambient declarations and bridge cross-module types.
    Declarations {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Synthesize the node builder registry from the node declarations.
    Builder {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Write the flat entry module re-exporting the engine operations.
    Entry {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Reduce the package descriptor to its public surface.
    Manifest {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Run every phase in release order.
    All {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
}
