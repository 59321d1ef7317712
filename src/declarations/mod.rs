//! Declaration Rewriter: normalizes ambient declarations across the merged
//! tree and injects the shared base-type inheritance.
//!
//! Three responsibilities, all over files relocation already put in place:
//! extension normalization (`*.ts` → `*.d.ts`), cross-module import bridging
//! in the root declaration, and base-type injection into the flattened node
//! declaration when the engine's single-file build mode produced one.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::errors::{AssembleError, Phase, Result};
use crate::layout::Layout;

pub mod model;

/// Import lines prepended to the root declaration so types used there
/// resolve against the relocated token and node modules.
pub const IMPORT_BRIDGE: &str = "import type { Token } from \"./token/Token\";\nimport type { Node } from \"./nodes/Node\";\n";

/// Runs the full rewriting phase over the merged tree.
///
/// A missing or unreadable declaration file is fatal to this phase only; the
/// relocated tree stays on disk, but the caller must treat the build as
/// failed since its output is incomplete.
pub fn rewrite(layout: &Layout) -> Result<()> {
    layout.verify_merged(Phase::Declarations)?;
    normalize_extensions(&layout.dist())?;
    bridge_root_imports(layout)?;

    let flat = layout.flat_declaration();
    if flat.is_file() {
        inject_inheritance(&flat)?;
    }
    Ok(())
}

/// Renames every implementation-capable `.ts` file under `root` to its
/// ambient `.d.ts` form, content untouched. Visits each descendant exactly
/// once; already-ambient files are left alone, so a second run is a no-op.
pub fn normalize_extensions(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| AssembleError::io(Phase::Declarations, root, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !needs_normalization(path) {
            continue;
        }
        let ambient = path.with_extension("d.ts");
        // A rename onto an existing ambient file would silently replace it and
        // hide a duplicate declaration from builder synthesis.
        if ambient.exists() {
            return Err(AssembleError::NormalizeClash {
                path: path.to_path_buf(),
                existing: ambient,
            });
        }
        fs::rename(path, &ambient).map_err(|e| AssembleError::io(Phase::Declarations, path, e))?;
    }
    Ok(())
}

fn needs_normalization(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".ts") && !name.ends_with(".d.ts")
}

/// Prepends the cross-module type imports to the root declaration file.
pub fn bridge_root_imports(layout: &Layout) -> Result<()> {
    let path = layout.root_declaration();
    let text =
        fs::read_to_string(&path).map_err(|e| AssembleError::io(Phase::Declarations, &path, e))?;
    if text.starts_with(IMPORT_BRIDGE) {
        return Ok(());
    }
    let bridged = format!("{IMPORT_BRIDGE}{text}");
    fs::write(&path, bridged).map_err(|e| AssembleError::io(Phase::Declarations, &path, e))
}

/// Applies the base-type injection to one flattened declaration file.
pub fn inject_inheritance(path: &Path) -> Result<()> {
    let text =
        fs::read_to_string(path).map_err(|e| AssembleError::io(Phase::Declarations, path, e))?;
    let mut file = model::DeclarationFile::parse(path, &text)?;
    model::inject_base_inheritance(&mut file);
    fs::write(path, file.render()).map_err(|e| AssembleError::io(Phase::Declarations, path, e))
}
