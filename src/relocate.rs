//! Artifact Relocator: merges the three pre-built artifact directories into
//! the canonical `dist/` tree.
//!
//! Runs first and must succeed before any other phase: every later phase
//! dereferences paths inside the merged tree. The destination is deleted up
//! front, which is the only reason a rerun after a partial failure is safe.

use std::fs;
use std::path::Path;

use crate::errors::{AssembleError, Phase, Result};
use crate::layout::Layout;

/// Deletes any existing `dist/` tree, then moves the engine package, the
/// token bindings, and the node bindings into their fixed destinations.
///
/// Move semantics: the source directories are consumed. A missing source is
/// fatal to the whole assembly; no partial-state recovery is attempted.
pub fn relocate(layout: &Layout) -> Result<()> {
    let dist = layout.dist();
    if dist.exists() {
        fs::remove_dir_all(&dist).map_err(|e| AssembleError::io(Phase::Relocate, &dist, e))?;
    }

    move_dir(&layout.engine_pkg(), &dist)?;
    move_dir(&layout.lexer_bindings(), &layout.token_dir())?;
    move_dir(&layout.nodes_bindings(), &layout.nodes_dir())?;
    Ok(())
}

fn move_dir(source: &Path, dest: &Path) -> Result<()> {
    if !source.is_dir() {
        return Err(AssembleError::MissingArtifact {
            phase: Phase::Relocate,
            path: source.to_path_buf(),
        });
    }
    fs::rename(source, dest).map_err(|e| AssembleError::io(Phase::Relocate, source, e))
}
