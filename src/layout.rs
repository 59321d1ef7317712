//! Fixed relative paths of the artifact sources and the merged tree.
//!
//! The whole pipeline is path-driven: three pre-built artifact directories go
//! in, one `dist/` tree comes out. `Layout` is the single place those paths
//! are spelled, anchored at a configurable workspace root so tests can run
//! against scratch directories.

use std::path::{Path, PathBuf};

use crate::errors::{AssembleError, Phase, Result};

/// Name of the engine's compiled entry module inside `dist/`.
pub const ENGINE_MODULE: &str = "arbor.js";

/// Name of the engine's root ambient declaration inside `dist/`.
pub const ROOT_DECLARATION: &str = "arbor.d.ts";

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Artifact sources, produced by the engine build and consumed exactly
    // once by relocation.

    pub fn engine_pkg(&self) -> PathBuf {
        self.root.join("crates/arbor/pkg")
    }

    pub fn lexer_bindings(&self) -> PathBuf {
        self.root.join("crates/arbor-lexer/bindings")
    }

    pub fn nodes_bindings(&self) -> PathBuf {
        self.root.join("crates/arbor-nodes/bindings")
    }

    // Merged tree.

    pub fn dist(&self) -> PathBuf {
        self.root.join("dist")
    }

    pub fn token_dir(&self) -> PathBuf {
        self.dist().join("token")
    }

    pub fn nodes_dir(&self) -> PathBuf {
        self.dist().join("nodes")
    }

    pub fn root_declaration(&self) -> PathBuf {
        self.dist().join(ROOT_DECLARATION)
    }

    /// The flattened single-file declaration produced by the engine's
    /// alternative build mode, when present.
    pub fn flat_declaration(&self) -> PathBuf {
        self.root.join("index.d.ts")
    }

    pub fn entry_module(&self) -> PathBuf {
        self.dist().join("index.js")
    }

    pub fn builder_module(&self) -> PathBuf {
        self.dist().join("builder.js")
    }

    pub fn builder_declaration(&self) -> PathBuf {
        self.dist().join("builder.d.ts")
    }

    pub fn manifest(&self) -> PathBuf {
        self.dist().join("package.json")
    }

    /// Checks the three-zone invariant every post-relocation phase assumes:
    /// the dist root, the token declarations, and the node declarations.
    pub fn verify_merged(&self, phase: Phase) -> Result<()> {
        let zones: [(&'static str, PathBuf); 3] = [
            ("dist", self.dist()),
            ("token", self.token_dir()),
            ("nodes", self.nodes_dir()),
        ];
        for (zone, path) in zones {
            if !path.is_dir() {
                return Err(AssembleError::BadTreeShape {
                    phase,
                    path: self.dist(),
                    zone,
                });
            }
        }
        Ok(())
    }
}
