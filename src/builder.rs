//! Builder Synthesizer: introspects the per-node declarations and emits the
//! factory registry for constructing AST nodes by hand.
//!
//! Each node declaration file under `dist/nodes/` yields one registry entry
//! keyed by the semantic name derived from the declared type. The registry is
//! both a Rust-side model (so the factory semantics are testable here) and
//! the source of the emitted `builder.js` / `builder.d.ts` artifacts.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::declarations::model::{
    self, DeclarationFile, BASE_NODE_NAME, COMMENT_MEMBERS, NODE_KIND_ENUM,
};
use crate::errors::{AssembleError, Phase, Result};
use crate::layout::Layout;

/// The discriminant field on every normalized node object.
pub const DISCRIMINANT_FIELD: &str = "node_type";

/// Type names that never receive registry entries: the shared base type and
/// the node-kind enumeration.
pub const RESERVED_TYPES: [&str; 2] = [BASE_NODE_NAME, NODE_KIND_ENUM];

/// Derives the semantic key from a declared node type name: strip one
/// trailing `Node`, separate the remaining camel-case words with `_`, and
/// lower-case everything.
///
/// `AnonymousFunctionNode` → `anonymous_function`, `ForeachNode` → `foreach`.
pub fn semantic_key(type_name: &str) -> String {
    let stem = type_name.strip_suffix(BASE_NODE_NAME).unwrap_or(type_name);
    let mut key = String::with_capacity(stem.len() + 4);
    for ch in stem.chars() {
        if ch.is_ascii_uppercase() {
            if !key.is_empty() {
                key.push('_');
            }
            key.push(ch.to_ascii_lowercase());
        } else {
            key.push(ch);
        }
    }
    key
}

/// Read-only description of one node kind, derived from its declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTypeDescriptor {
    pub type_name: String,
    pub key: String,
    pub fields: Vec<String>,
}

/// One registry entry: semantic key, discriminant constant, and the field
/// set the factory's declaration accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderEntry {
    pub key: String,
    pub type_name: String,
    pub fields: Vec<String>,
}

/// Mapping from semantic node key to factory entry. Keys are unique;
/// insertion order is irrelevant.
#[derive(Debug, Default)]
pub struct BuilderRegistry {
    entries: BTreeMap<String, BuilderEntry>,
}

impl BuilderRegistry {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&BuilderEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &BuilderEntry> {
        self.entries.values()
    }

    /// The factory: builds a normalized node object from caller-supplied
    /// fields.
    ///
    /// The result carries the discriminant equal to the semantic key, the two
    /// comment sequences defaulted to empty when omitted (explicit values,
    /// including empty ones, pass through), and every other supplied field
    /// copied verbatim. The supplied shape is deliberately not validated
    /// against the declared field set; the factory trusts the caller.
    pub fn build_node(&self, key: &str, fields: Map<String, Value>) -> Option<Value> {
        self.entries.get(key)?;
        let mut node = fields;
        for member in COMMENT_MEMBERS {
            node.entry(member.to_string()).or_insert_with(|| json!([]));
        }
        node.insert(DISCRIMINANT_FIELD.to_string(), Value::String(key.to_string()));
        Some(Value::Object(node))
    }

    /// Renders the distributable factory module (`builder.js`).
    pub fn render_module(&self) -> String {
        let mut out = String::from(
            "\"use strict\";\n\nfunction factory(nodeType) {\n  return function (fields) {\n    const node = Object.assign({}, fields);\n    node.node_type = nodeType;\n    if (node.leadingComments === undefined) node.leadingComments = [];\n    if (node.trailingComments === undefined) node.trailingComments = [];\n    return node;\n  };\n}\n\nmodule.exports = {\n",
        );
        for entry in self.entries.values() {
            out.push_str("  ");
            out.push_str(&entry.key);
            out.push_str(": factory(\"");
            out.push_str(&entry.key);
            out.push_str("\"),\n");
        }
        out.push_str("};\n");
        out
    }

    /// Renders the accompanying typed declaration (`builder.d.ts`).
    pub fn render_declaration(&self) -> String {
        let mut out = String::from("import type { Node, Nodes } from \"./nodes/Node\";\n");
        for entry in self.entries.values() {
            out.push_str("import type { ");
            out.push_str(&entry.type_name);
            out.push_str(" } from \"./nodes/");
            out.push_str(&entry.type_name);
            out.push_str("\";\n");
        }
        out.push('\n');
        for entry in self.entries.values() {
            out.push_str("export declare function ");
            out.push_str(&entry.key);
            out.push_str("(fields: Omit<");
            out.push_str(&entry.type_name);
            out.push_str(", \"leadingComments\" | \"trailingComments\"> & { leadingComments?: Nodes; trailingComments?: Nodes }): ");
            out.push_str(&entry.type_name);
            out.push_str(";\n");
        }
        out
    }
}

/// Scans a directory holding exactly one declaration file per node kind and
/// derives a descriptor for each, skipping the reserved types.
pub fn scan_nodes(dir: &Path) -> Result<Vec<NodeTypeDescriptor>> {
    let read = fs::read_dir(dir).map_err(|e| AssembleError::io(Phase::Builder, dir, e))?;
    let mut descriptors = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| AssembleError::io(Phase::Builder, dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Err(AssembleError::BadNodeFile { path });
        };
        let Some(type_name) = declaration_stem(name) else {
            continue;
        };
        if !is_type_name(type_name) {
            return Err(AssembleError::BadNodeFile { path });
        }
        if RESERVED_TYPES.contains(&type_name) {
            continue;
        }

        let text =
            fs::read_to_string(&path).map_err(|e| AssembleError::io(Phase::Builder, &path, e))?;
        let file = DeclarationFile::parse(&path, &text)?;
        let fields = file
            .class(type_name)
            .map(|class| class.members.iter().map(|m| m.name.clone()).collect())
            .unwrap_or_default();

        descriptors.push(NodeTypeDescriptor {
            key: semantic_key(type_name),
            type_name: type_name.to_string(),
            fields,
        });
    }
    Ok(descriptors)
}

/// Strips a declaration extension, returning the declared type name.
fn declaration_stem(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(".d.ts")
        .or_else(|| file_name.strip_suffix(".ts"))
}

fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Builds the registry from scanned descriptors. Two node kinds deriving the
/// same key are a fatal synthesis error, never a silent overwrite.
pub fn synthesize(descriptors: Vec<NodeTypeDescriptor>) -> Result<BuilderRegistry> {
    let mut registry = BuilderRegistry::default();
    for descriptor in descriptors {
        if let Some(existing) = registry.entries.get(&descriptor.key) {
            return Err(AssembleError::KeyCollision {
                key: descriptor.key,
                first: existing.type_name.clone(),
                second: descriptor.type_name,
            });
        }
        registry.entries.insert(
            descriptor.key.clone(),
            BuilderEntry {
                key: descriptor.key,
                type_name: descriptor.type_name,
                fields: descriptor.fields,
            },
        );
    }
    Ok(registry)
}

/// Runs the whole synthesis phase: scan, derive, emit, self-check.
///
/// The emitted declaration is re-parsed through the declaration model as a
/// structural check before the artifacts are accepted. Any failure here is
/// local to this phase; the rest of the package remains publishable.
pub fn synthesize_builder(layout: &Layout) -> Result<BuilderRegistry> {
    layout.verify_merged(Phase::Builder)?;
    let descriptors = scan_nodes(&layout.nodes_dir())?;
    let registry = synthesize(descriptors)?;

    let declaration = registry.render_declaration();
    let checked = DeclarationFile::parse(&layout.builder_declaration(), &declaration)
        .map_err(|e| AssembleError::BuilderCheck {
            reason: e.to_string(),
        })?;
    for entry in registry.entries() {
        let exported = checked.items.iter().any(|item| match item {
            model::Item::Raw(line) => {
                line.starts_with(&format!("export declare function {}(", entry.key))
            }
            model::Item::Class(_) => false,
        });
        if !exported {
            return Err(AssembleError::BuilderCheck {
                reason: format!("entry '{}' is missing from the declaration", entry.key),
            });
        }
    }

    let module_path = layout.builder_module();
    fs::write(&module_path, registry.render_module())
        .map_err(|e| AssembleError::io(Phase::Builder, &module_path, e))?;
    let declaration_path = layout.builder_declaration();
    fs::write(&declaration_path, declaration)
        .map_err(|e| AssembleError::io(Phase::Builder, &declaration_path, e))?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(type_name: &str) -> NodeTypeDescriptor {
        NodeTypeDescriptor {
            key: semantic_key(type_name),
            type_name: type_name.to_string(),
            fields: vec![],
        }
    }

    #[test]
    fn key_derivation_reference_cases() {
        assert_eq!(semantic_key("AnonymousFunctionNode"), "anonymous_function");
        assert_eq!(semantic_key("ConstPropertyNode"), "const_property");
        assert_eq!(semantic_key("ForeachNode"), "foreach");
    }

    /// Versioned fixture over the full known node-name set. The systematic
    /// derivation is authoritative; a historical hand-written table disagreed
    /// on a few entries (trait/throw, the array_* family) and is treated as
    /// defective rather than reproduced.
    #[test]
    fn key_derivation_full_fixture() {
        let fixture = [
            ("AnonymousClassNode", "anonymous_class"),
            ("AnonymousFunctionNode", "anonymous_function"),
            ("ArgumentNode", "argument"),
            ("ArrayNode", "array"),
            ("ArrayItemNode", "array_item"),
            ("ArrayLookupNode", "array_lookup"),
            ("ArrowFunctionNode", "arrow_function"),
            ("AssignmentNode", "assignment"),
            ("AttributeNode", "attribute"),
            ("AttributeItemNode", "attribute_item"),
            ("BinNode", "bin"),
            ("BlockNode", "block"),
            ("BooleanNode", "boolean"),
            ("BreakNode", "break"),
            ("CallNode", "call"),
            ("CaseNode", "case"),
            ("CastNode", "cast"),
            ("CatchNode", "catch"),
            ("ClassNode", "class"),
            ("ClassKeywordNode", "class_keyword"),
            ("CloneNode", "clone"),
            ("CommentBlockNode", "comment_block"),
            ("CommentDocNode", "comment_doc"),
            ("CommentLineNode", "comment_line"),
            ("ConstNode", "const"),
            ("ConstPropertyNode", "const_property"),
            ("ConstructorParameterNode", "constructor_parameter"),
            ("ContinueNode", "continue"),
            ("DeclareNode", "declare"),
            ("DeclareArgumentNode", "declare_argument"),
            ("DoWhileNode", "do_while"),
            ("DoWhileConditionNode", "do_while_condition"),
            ("EchoNode", "echo"),
            ("ElseNode", "else"),
            ("EncapsedNode", "encapsed"),
            ("EncapsedPartNode", "encapsed_part"),
            ("EnumNode", "enum"),
            ("EnumItemNode", "enum_item"),
            ("EvalNode", "eval"),
            ("ExitNode", "exit"),
            ("FinallyNode", "finally"),
            ("ForNode", "for"),
            ("ForeachNode", "foreach"),
            ("FunctionNode", "function"),
            ("GlobalNode", "global"),
            ("GotoNode", "goto"),
            ("HaltCompilerNode", "halt_compiler"),
            ("HereDocNode", "here_doc"),
            ("IdentifierNode", "identifier"),
            ("IfNode", "if"),
            ("IncludeNode", "include"),
            ("InlineNode", "inline"),
            ("InterfaceNode", "interface"),
            ("IntersectionTypeNode", "intersection_type"),
            ("LabelNode", "label"),
            ("ListNode", "list"),
            ("MagicNode", "magic"),
            ("MagicMethodNode", "magic_method"),
            ("MatchNode", "match"),
            ("MatchArmNode", "match_arm"),
            ("MethodNode", "method"),
            ("NamespaceNode", "namespace"),
            ("NegateNode", "negate"),
            ("NewNode", "new"),
            ("NowDocNode", "now_doc"),
            ("NullNode", "null"),
            ("NumberNode", "number"),
            ("ObjectAccessNode", "object_access"),
            ("ParameterNode", "parameter"),
            ("ParentNode", "parent"),
            ("ParenthesisNode", "parenthesis"),
            ("PostNode", "post"),
            ("PreNode", "pre"),
            ("PrintNode", "print"),
            ("ProgramNode", "program"),
            ("PropertyNode", "property"),
            ("PropertyHookNode", "property_hook"),
            ("PropertyItemNode", "property_item"),
            ("ReferenceNode", "reference"),
            ("ReturnNode", "return"),
            ("SelfNode", "self"),
            ("SilentNode", "silent"),
            ("StaticNode", "static"),
            ("StaticKeywordNode", "static_keyword"),
            ("StaticLookupNode", "static_lookup"),
            ("StringNode", "string"),
            ("SwitchNode", "switch"),
            ("TernaryNode", "ternary"),
            ("ThisNode", "this"),
            ("ThrowNode", "throw"),
            ("TraitNode", "trait"),
            ("TraitUseNode", "trait_use"),
            ("TraitUseAliasNode", "trait_use_alias"),
            ("TraitUsePrecedenceNode", "trait_use_precedence"),
            ("TryNode", "try"),
            ("TypeNode", "type"),
            ("UnionTypeNode", "union_type"),
            ("UseNode", "use"),
            ("UseItemNode", "use_item"),
            ("VariableNode", "variable"),
            ("VariadicNode", "variadic"),
            ("WhileNode", "while"),
            ("YieldNode", "yield"),
            ("YieldFromNode", "yield_from"),
        ];
        for (type_name, expected) in fixture {
            assert_eq!(semantic_key(type_name), expected, "for {type_name}");
        }
    }

    #[test]
    fn derivation_is_injective_over_the_fixture_set() {
        let names = ["ArrayNode", "ArrayItemNode", "ArrayLookupNode", "TraitNode", "ThrowNode"];
        let mut keys: Vec<_> = names.iter().map(|n| semantic_key(n)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), names.len());
    }

    #[test]
    fn collision_is_fatal() {
        let err = synthesize(vec![descriptor("ForeachNode"), descriptor("ForeachNode")]).unwrap_err();
        match err {
            AssembleError::KeyCollision { key, .. } => assert_eq!(key, "foreach"),
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn factory_defaults_comment_sequences() {
        let registry = synthesize(vec![descriptor("EchoNode")]).unwrap();
        let node = registry.build_node("echo", Map::new()).unwrap();
        assert_eq!(node["node_type"], "echo");
        assert_eq!(node["leadingComments"], json!([]));
        assert_eq!(node["trailingComments"], json!([]));
    }

    #[test]
    fn factory_passes_supplied_fields_through_verbatim() {
        let registry = synthesize(vec![descriptor("EchoNode")]).unwrap();
        let mut fields = Map::new();
        fields.insert("expression".into(), json!({"node_type": "string"}));
        fields.insert("leadingComments".into(), json!([{"node_type": "comment_line"}]));
        fields.insert("unknown_extra".into(), json!(42));
        let node = registry.build_node("echo", fields).unwrap();
        assert_eq!(node["expression"], json!({"node_type": "string"}));
        assert_eq!(node["leadingComments"], json!([{"node_type": "comment_line"}]));
        // Structurally permissive: fields outside the declared set survive.
        assert_eq!(node["unknown_extra"], json!(42));
    }

    #[test]
    fn unknown_key_builds_nothing() {
        let registry = synthesize(vec![descriptor("EchoNode")]).unwrap();
        assert!(registry.build_node("print", Map::new()).is_none());
    }

    #[test]
    fn reserved_types_never_synthesize_entries() {
        // scan_nodes filters these before synthesis; the registry level must
        // also stay clean if fed directly.
        let registry = synthesize(vec![descriptor("EchoNode")]).unwrap();
        assert!(registry.get("").is_none());
        assert!(registry.get("node_type").is_none());
    }

    #[test]
    fn rendered_module_contains_every_entry() {
        let registry =
            synthesize(vec![descriptor("EchoNode"), descriptor("ArrayLookupNode")]).unwrap();
        let module = registry.render_module();
        assert!(module.contains("echo: factory(\"echo\")"));
        assert!(module.contains("array_lookup: factory(\"array_lookup\")"));
    }
}
