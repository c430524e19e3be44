//! AST construction from concrete syntax trees.
//!
//! Each file is shaped in two passes: a declaration walk that builds the
//! scope tree (per-language modules, with shared C/C++ and JS/TS cores),
//! then a query pass that attaches call sites as [`NodeKind::FunctionCall`]
//! nodes under their innermost enclosing declaration.

mod c;
mod c_cpp;
mod cpp;
mod javascript;
mod js_ts;
mod python;
mod typescript;

use crate::parser;
use crate::queries::{self, QueryDef};
use scopegraph_core::ast::{Ast, AstNode, NodeId, NodeKind, PendingReference, SourceSpan};
use scopegraph_core::error::{Error, Result};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::RefKind;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Query, QueryCursor};

/// Parse a source buffer and build its AST.
pub fn build_ast(language: Language, file_path: &Path, source: &str) -> Result<Ast> {
    let origin = file_path.to_string_lossy();
    let tree = parser::parse(language, source, &origin)?;
    build_ast_from_tree(language, file_path, source, &tree)
}

/// Build an AST from an externally produced concrete tree.
///
/// On success every node carries a valid parent chain to the root and the
/// file's language; unrecognized subtrees are skipped.
pub fn build_ast_from_tree(
    language: Language,
    file_path: &Path,
    source: &str,
    tree: &tree_sitter::Tree,
) -> Result<Ast> {
    let root = tree.root_node();
    if root.is_error() {
        return Err(Error::parse(
            file_path.to_string_lossy(),
            "unparseable input",
        ));
    }

    let mut ctx = BuildCtx::new(file_path, language, source);
    match language {
        Language::C => c::build(&mut ctx, root)?,
        Language::Cpp => cpp::build(&mut ctx, root)?,
        Language::Python => python::build(&mut ctx, root)?,
        Language::JavaScript => javascript::build(&mut ctx, root)?,
        Language::TypeScript => typescript::build(&mut ctx, root)?,
        Language::Unknown => {
            return Err(Error::unknown_language(file_path.to_string_lossy()));
        }
    }

    let mut ast = ctx.finish();
    collect_call_sites(&mut ast, language, tree, source)?;
    debug!(
        file = %file_path.display(),
        nodes = ast.len(),
        "built AST"
    );
    Ok(ast)
}

/// Shared state for the declaration walk.
pub(crate) struct BuildCtx<'a> {
    source: &'a str,
    ast: Ast,
    scopes: Vec<ScopeFrame>,
}

struct ScopeFrame {
    node: NodeId,
    prefix: String,
}

impl<'a> BuildCtx<'a> {
    fn new(file_path: &Path, language: Language, source: &'a str) -> Self {
        let ast = Ast::new(file_path, language);
        let root = ast.root();
        Self {
            source,
            ast,
            scopes: vec![ScopeFrame {
                node: root,
                prefix: String::new(),
            }],
        }
    }

    fn finish(self) -> Ast {
        self.ast
    }

    pub(crate) fn language(&self) -> Language {
        self.ast.language()
    }

    pub(crate) fn text(&self, node: tree_sitter::Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Current parent node for new children.
    pub(crate) fn parent(&self) -> NodeId {
        match self.scopes.last() {
            Some(frame) => frame.node,
            None => self.ast.root(),
        }
    }

    pub(crate) fn prefix(&self) -> &str {
        self.scopes.last().map(|f| f.prefix.as_str()).unwrap_or("")
    }

    /// Qualified name for `name` in the current scope.
    pub(crate) fn qualify(&self, name: &str) -> String {
        let prefix = self.prefix();
        if prefix.is_empty() || name.is_empty() {
            name.to_string()
        } else {
            format!("{}{}{}", prefix, self.language().separator(), name)
        }
    }

    /// Enter a scope: children are attached under `node`, and names
    /// qualify with `qualified` when it is non-empty.
    pub(crate) fn push_scope(&mut self, node: NodeId, qualified: impl Into<String>) {
        let qualified = qualified.into();
        let prefix = if qualified.is_empty() {
            self.prefix().to_string()
        } else {
            qualified
        };
        self.scopes.push(ScopeFrame { node, prefix });
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Attach a prepared node under the current parent.
    pub(crate) fn add_node(&mut self, node: AstNode) -> Result<NodeId> {
        let parent = self.parent();
        self.ast.add_child(parent, node)
    }

    /// Attach a declaration node: name qualified from the scope chain,
    /// span taken from the concrete node.
    pub(crate) fn add_declaration(
        &mut self,
        kind: NodeKind,
        name: &str,
        ts_node: tree_sitter::Node,
        is_definition: bool,
    ) -> Result<NodeId> {
        let mut node = AstNode::new(kind, name, self.language());
        node.qualified_name = self.qualify(name);
        node.span = SourceSpan::from_ts_node(ts_node);
        node.is_definition = is_definition;
        self.add_node(node)
    }

    /// Record a pending reference on an existing node.
    pub(crate) fn add_pending(
        &mut self,
        id: NodeId,
        kind: RefKind,
        name: impl Into<String>,
        ts_node: tree_sitter::Node,
    ) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        if let Some(node) = self.ast.get_mut(id) {
            node.pending_references.push(PendingReference {
                kind,
                name,
                span: SourceSpan::from_ts_node(ts_node),
            });
        }
    }

    pub(crate) fn qualified_name_of(&self, id: NodeId) -> String {
        self.ast
            .get(id)
            .map(|n| n.qualified_name.clone())
            .unwrap_or_default()
    }

    /// Set a string property on an existing node.
    pub(crate) fn set_property(&mut self, id: NodeId, key: &str, value: &str) {
        if let Some(node) = self.ast.get_mut(id) {
            node.properties.insert(key.to_string(), value.to_string());
        }
    }

    /// Emit the file-level module node as the first child of the root.
    pub(crate) fn add_module_node(&mut self) -> Result<NodeId> {
        let name = module_name(self.ast.file_path(), self.language());
        let mut node = AstNode::new(NodeKind::Module, name.clone(), self.language());
        node.qualified_name = name;
        let root = self.ast.root();
        self.ast.add_child(root, node)
    }
}

/// Module name for a file: C/C++ keep the full file name so textual
/// `#include "…"` targets match; the rest use the stem.
pub(crate) fn module_name(file_path: &Path, language: Language) -> String {
    let name = if language.is_c_family() {
        file_path.file_name()
    } else {
        file_path.file_stem()
    };
    name.and_then(|s| s.to_str()).unwrap_or("").to_string()
}

/// Callee names that never resolve to project symbols.
const CALLEE_SKIP: &[&str] = &["require", "import", "super"];

/// Query pass: attach call sites to the declaration tree.
fn collect_call_sites(
    ast: &mut Ast,
    language: Language,
    tree: &tree_sitter::Tree,
    source: &str,
) -> Result<()> {
    let def: QueryDef = match language {
        Language::C | Language::Cpp => queries::c::CALLS,
        Language::Python => queries::python::CALLS,
        Language::JavaScript | Language::TypeScript => queries::javascript::CALLS,
        Language::Unknown => return Ok(()),
    };

    let query = Query::new(&parser::grammar(language)?, def.query)
        .map_err(|e| Error::config(format!("bad query {}: {e}", def.name)))?;
    let site_idx = query.capture_index_for_name(def.site_capture);
    let name_idx = query.capture_index_for_name(def.name_capture);
    let args_idx = query.capture_index_for_name("args");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());
    while let Some(m) = matches.next() {
        let site = site_idx.and_then(|i| m.captures.iter().find(|c| c.index == i));
        let callee = name_idx.and_then(|i| m.captures.iter().find(|c| c.index == i));
        let (Some(site), Some(callee)) = (site, callee) else {
            continue;
        };

        let callee_text = callee
            .node
            .utf8_text(source.as_bytes())
            .unwrap_or("")
            .trim()
            .to_string();
        if callee_text.is_empty() || CALLEE_SKIP.contains(&callee_text.as_str()) {
            continue;
        }

        let parent = ast.enclosing_at(site.node.start_byte());
        let mut node = AstNode::new(NodeKind::FunctionCall, callee_text.clone(), language);
        node.span = SourceSpan::from_ts_node(site.node);
        node.is_definition = false;
        node.pending_references.push(PendingReference {
            kind: RefKind::Call,
            name: callee_text,
            span: SourceSpan::from_ts_node(callee.node),
        });

        // Identifier and member-access arguments are use-sites of their own.
        if let Some(args) = args_idx.and_then(|i| m.captures.iter().find(|c| c.index == i)) {
            let mut walker = args.node.walk();
            for arg in args.node.named_children(&mut walker) {
                let use_site = match arg.kind() {
                    "identifier" => true,
                    "field_expression" => language.is_c_family(),
                    _ => false,
                };
                if !use_site {
                    continue;
                }
                let text = arg.utf8_text(source.as_bytes()).unwrap_or("").trim();
                if !text.is_empty() {
                    node.pending_references.push(PendingReference {
                        kind: RefKind::Use,
                        name: text.to_string(),
                        span: SourceSpan::from_ts_node(arg),
                    });
                }
            }
        }

        ast.add_child(parent, node)?;
    }

    Ok(())
}
