//! Structured model of an ambient declaration file.
//!
//! The inheritance injection used to be literal text patching (a regex over
//! the class-opening string plus a verbatim member strip), which was fragile
//! against reformatting and made idempotence a property of the surrounding
//! text. Here each file is parsed into a small model, the "ends with Node →
//! extends the base type" and "drop the inherited comment members" rules are
//! applied as explicit predicates over that model, and the file is
//! re-serialized. Idempotence then holds by construction.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AssembleError, Result};

/// The shared base type injected into every node declaration.
pub const BASE_NODE_NAME: &str = "Node";

/// The node-kind enumeration type; reserved alongside the base type.
pub const NODE_KIND_ENUM: &str = "NodeType";

/// Name of the sequence alias appended with the base type.
pub const NODE_SEQUENCE_NAME: &str = "Nodes";

/// Members every node inherits from the base type once injection has run.
pub const COMMENT_MEMBERS: [&str; 2] = ["leadingComments", "trailingComments"];

/// The base type and sequence alias appended to the flattened declaration.
pub const BASE_FOOTER: &str = "export type Node = {\n  leadingComments: Nodes;\n  trailingComments: Nodes;\n};\nexport type Nodes = Array<Node>;";

static CLASS_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^export declare class ([A-Za-z_]\w*)(?:\s+extends\s+([A-Za-z_]\w*))?\s*\{\s*$")
        .unwrap()
});

static MEMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)(\?)?:\s*(.+?);?\s*$").unwrap());

/// One member of an ambient class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub ty: String,
    pub optional: bool,
}

/// An `export declare class` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub base: Option<String>,
    pub members: Vec<Member>,
}

/// One top-level item of a declaration file: either a class we model, or an
/// opaque line passed through verbatim (imports, type aliases, enums).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Class(ClassDecl),
    Raw(String),
}

/// A parsed ambient declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationFile {
    pub items: Vec<Item>,
}

impl DeclarationFile {
    /// Parses declaration text. `path` is only used for error context.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut items = Vec::new();
        let mut lines = text.lines().enumerate();

        while let Some((index, line)) = lines.next() {
            let Some(caps) = CLASS_OPEN.captures(line) else {
                items.push(Item::Raw(line.to_string()));
                continue;
            };

            let mut class = ClassDecl {
                name: caps[1].to_string(),
                base: caps.get(2).map(|m| m.as_str().to_string()),
                members: Vec::new(),
            };
            let mut closed = false;
            for (member_index, member_line) in lines.by_ref() {
                if member_line.trim() == "}" {
                    closed = true;
                    break;
                }
                if member_line.trim().is_empty() {
                    continue;
                }
                let Some(m) = MEMBER.captures(member_line) else {
                    return Err(AssembleError::MalformedDeclaration {
                        path: path.to_path_buf(),
                        line: member_index + 1,
                        reason: format!("expected a member declaration, got '{}'", member_line.trim()),
                    });
                };
                class.members.push(Member {
                    name: m[1].to_string(),
                    ty: m[3].to_string(),
                    optional: m.get(2).is_some(),
                });
            }
            if !closed {
                return Err(AssembleError::MalformedDeclaration {
                    path: path.to_path_buf(),
                    line: index + 1,
                    reason: format!("class '{}' is never closed", class.name),
                });
            }
            items.push(Item::Class(class));
        }

        Ok(Self { items })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                Item::Raw(line) => {
                    out.push_str(line);
                    out.push('\n');
                }
                Item::Class(class) => {
                    out.push_str("export declare class ");
                    out.push_str(&class.name);
                    if let Some(base) = &class.base {
                        out.push_str(" extends ");
                        out.push_str(base);
                    }
                    out.push_str(" {\n");
                    for member in &class.members {
                        out.push_str("  ");
                        out.push_str(&member.name);
                        if member.optional {
                            out.push('?');
                        }
                        out.push_str(": ");
                        out.push_str(&member.ty);
                        out.push('\n');
                    }
                    out.push_str("}\n");
                }
            }
        }
        out
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(class) => Some(class),
            Item::Raw(_) => None,
        })
    }

    /// Looks up a class by its declared name.
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes().find(|class| class.name == name)
    }
}

/// Returns true for names that declare an AST node kind: a strict `Node`
/// suffix, excluding the base type itself.
pub fn is_node_type_name(name: &str) -> bool {
    name.ends_with(BASE_NODE_NAME) && name != BASE_NODE_NAME
}

/// Injects the base-type inheritance into a flattened node declaration file:
/// every `<Name>Node` class without an explicit base now extends `Node`, the
/// two comment-sequence members it would inherit are dropped wherever they
/// occur, and the base type plus its sequence alias are appended once.
pub fn inject_base_inheritance(file: &mut DeclarationFile) {
    for item in &mut file.items {
        let Item::Class(class) = item else { continue };
        if is_node_type_name(&class.name) && class.base.is_none() {
            class.base = Some(BASE_NODE_NAME.to_string());
        }
        class
            .members
            .retain(|m| !(COMMENT_MEMBERS.contains(&m.name.as_str()) && m.ty == NODE_SEQUENCE_NAME));
    }

    let already_appended = file.items.iter().any(|item| match item {
        Item::Raw(line) => line.starts_with("export type Nodes = Array<Node>"),
        Item::Class(_) => false,
    });
    if !already_appended {
        for line in BASE_FOOTER.lines() {
            file.items.push(Item::Raw(line.to_string()));
        }
    }
}
