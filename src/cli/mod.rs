//! The assembler's command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! pipeline phases. Fatal errors abort with a non-zero exit; a phase-local
//! builder failure under `all` degrades the build but lets the remaining
//! phases run.

use std::path::Path;
use std::process;

use clap::Parser;

use crate::cli::args::{AssembleArgs, Command};
use crate::errors::{Phase, Result};
use crate::layout::Layout;
use crate::{builder, declarations, entry, manifest, relocate};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = AssembleArgs::parse();

    let result = match args.command {
        Command::Relocate { root } => run_phase(Phase::Relocate, &root),
        Command::Declarations { root } => run_phase(Phase::Declarations, &root),
        Command::Builder { root } => run_phase(Phase::Builder, &root),
        Command::Entry { root } => run_phase(Phase::Entry, &root),
        Command::Manifest { root } => run_phase(Phase::Manifest, &root),
        Command::All { root } => run_all(&root),
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        process::exit(1);
    }
}

fn run_phase(phase: Phase, root: &Path) -> Result<()> {
    let layout = Layout::new(root);
    output::print_phase(phase);
    match phase {
        Phase::Relocate => relocate::relocate(&layout),
        Phase::Declarations => declarations::rewrite(&layout),
        Phase::Builder => builder::synthesize_builder(&layout).map(|_| ()),
        Phase::Entry => entry::compose(&layout),
        Phase::Manifest => manifest::update(&layout).map(|_| ()),
    }
}

/// Runs every phase in release order.
///
/// Relocation must succeed before anything else runs. A builder-synthesis
/// failure is phase-local: it must not block publishing of the rest of the
/// package, so it is reported and the remaining phases still run.
fn run_all(root: &Path) -> Result<()> {
    run_phase(Phase::Relocate, root)?;
    run_phase(Phase::Declarations, root)?;

    let degraded = match run_phase(Phase::Builder, root) {
        Ok(()) => false,
        Err(e) => {
            output::print_warning(&e.to_string());
            true
        }
    };

    run_phase(Phase::Entry, root)?;
    run_phase(Phase::Manifest, root)?;

    if degraded {
        output::print_degraded();
    } else {
        output::print_done("package assembled");
    }
    Ok(())
}
