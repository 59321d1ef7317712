//! Entry Point Composer: writes the single public module of the package.
//!
//! Pure re-export wiring: the engine's operations and the synthesized
//! builder are bound under fixed names, with no transformation of any value.

use std::fs;

use crate::errors::{AssembleError, Phase, Result};
use crate::layout::{Layout, ENGINE_MODULE};

/// Operations every engine build exposes.
const CORE_OPERATIONS: [&str; 3] = ["lex", "parse", "generate"];

/// Evaluating variants, re-exported only when the engine exposes them.
const EVAL_OPERATIONS: [&str; 2] = ["lex_eval", "parse_eval"];

/// Writes `dist/index.js` re-exporting the engine operations plus the
/// builder registry.
///
/// The builder binding is included only when synthesis actually produced
/// `builder.js`; a degraded build must still yield an entry module that
/// loads, so nothing may `require` an artifact that is not there.
pub fn compose(layout: &Layout) -> Result<()> {
    layout.verify_merged(Phase::Entry)?;

    let declaration_path = layout.root_declaration();
    let declaration = fs::read_to_string(&declaration_path)
        .map_err(|e| AssembleError::io(Phase::Entry, &declaration_path, e))?;
    let has_builder = layout.builder_module().is_file();

    let mut module = String::new();
    module.push_str("\"use strict\";\n\n");
    module.push_str(&format!("const engine = require(\"./{ENGINE_MODULE}\");\n"));
    if has_builder {
        module.push_str("const builder = require(\"./builder.js\");\n");
    }
    module.push('\n');
    module.push_str("module.exports = {\n");
    for op in CORE_OPERATIONS {
        module.push_str(&format!("  {op}: engine.{op},\n"));
    }
    for op in EVAL_OPERATIONS {
        if exports_function(&declaration, op) {
            module.push_str(&format!("  {op}: engine.{op},\n"));
        }
    }
    if has_builder {
        module.push_str("  builder,\n");
    }
    module.push_str("};\n");

    let entry_path = layout.entry_module();
    fs::write(&entry_path, module).map_err(|e| AssembleError::io(Phase::Entry, &entry_path, e))
}

/// True when the root ambient declaration exports a function of this name.
fn exports_function(declaration: &str, name: &str) -> bool {
    declaration
        .lines()
        .any(|line| line.trim_start().starts_with(&format!("export function {name}(")))
}
