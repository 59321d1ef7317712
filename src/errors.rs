//! Unified, `miette`-based diagnostics for the assembly pipeline.
//!
//! Every phase reports failures through the single [`AssembleError`] enum so
//! the CLI can render them uniformly and decide, per phase, whether a failure
//! aborts the whole assembly or only degrades it.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssembleError>;

/// The pipeline phase an error originated from.
///
/// Relocation errors abort the whole assembly; builder-synthesis errors are
/// local to that phase and leave the rest of the package publishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Relocate,
    Declarations,
    Builder,
    Entry,
    Manifest,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Relocate => "relocation",
            Phase::Declarations => "declaration rewriting",
            Phase::Builder => "builder synthesis",
            Phase::Entry => "entry point composition",
            Phase::Manifest => "package descriptor update",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum AssembleError {
    #[error("{phase} failed: source artifact directory '{}' is missing", path.display())]
    #[diagnostic(
        code(arbor_dist::relocate::missing_artifact),
        help("run the engine build first so all three artifact directories exist")
    )]
    MissingArtifact { phase: Phase, path: PathBuf },

    #[error("{phase} failed: merged tree under '{}' has no '{zone}' zone", path.display())]
    #[diagnostic(
        code(arbor_dist::layout::bad_shape),
        help("run `assemble relocate` first; every later phase assumes the merged tree exists")
    )]
    BadTreeShape {
        phase: Phase,
        path: PathBuf,
        zone: &'static str,
    },

    #[error("{phase} failed on '{}': {source}", path.display())]
    #[diagnostic(code(arbor_dist::io))]
    Io {
        phase: Phase,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("declaration file '{}' is malformed at line {line}: {reason}", path.display())]
    #[diagnostic(code(arbor_dist::declarations::malformed))]
    MalformedDeclaration {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("normalizing '{}' would overwrite '{}'", path.display(), existing.display())]
    #[diagnostic(
        code(arbor_dist::declarations::normalize_clash),
        help("the merged tree holds both an implementation-bearing and an ambient declaration of the same name; the engine build must produce exactly one per type")
    )]
    NormalizeClash { path: PathBuf, existing: PathBuf },

    #[error("builder synthesis failed: cannot derive a node type name from '{}'", path.display())]
    #[diagnostic(
        code(arbor_dist::builder::bad_node_file),
        help("node declaration files must be named after the declared type, e.g. `ForeachNode.d.ts`")
    )]
    BadNodeFile { path: PathBuf },

    #[error("builder synthesis failed: '{first}' and '{second}' both derive the key '{key}'")]
    #[diagnostic(
        code(arbor_dist::builder::key_collision),
        help("two node kinds deriving the same semantic key would silently shadow each other in the registry")
    )]
    KeyCollision {
        key: String,
        first: String,
        second: String,
    },

    #[error("synthesized builder declaration failed its structural check: {reason}")]
    #[diagnostic(code(arbor_dist::builder::check_failed))]
    BuilderCheck { reason: String },

    #[error("package descriptor '{}' is not valid JSON: {source}", path.display())]
    #[diagnostic(code(arbor_dist::manifest::unparsable))]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("package descriptor '{}' is missing required field '{field}'", path.display())]
    #[diagnostic(code(arbor_dist::manifest::missing_field))]
    ManifestField { path: PathBuf, field: &'static str },
}

impl AssembleError {
    /// Shorthand for wrapping a filesystem error with phase and path context.
    pub fn io(phase: Phase, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssembleError::Io {
            phase,
            path: path.into(),
            source,
        }
    }

    /// The phase this error belongs to, used by the pipeline driver to decide
    /// between aborting the assembly and degrading it.
    pub fn phase(&self) -> Phase {
        match self {
            AssembleError::MissingArtifact { phase, .. }
            | AssembleError::BadTreeShape { phase, .. }
            | AssembleError::Io { phase, .. } => *phase,
            AssembleError::MalformedDeclaration { .. } | AssembleError::NormalizeClash { .. } => {
                Phase::Declarations
            }
            AssembleError::BadNodeFile { .. }
            | AssembleError::KeyCollision { .. }
            | AssembleError::BuilderCheck { .. } => Phase::Builder,
            AssembleError::ManifestParse { .. } | AssembleError::ManifestField { .. } => {
                Phase::Manifest
            }
        }
    }
}
