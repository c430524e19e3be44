//! Arena-based AST model.
//!
//! Every file owns one [`Ast`]: a flat node arena rooted at a single
//! [`NodeKind::Root`] node. Parent/child structure is index-based, and
//! cross-file reference edges address nodes through [`NodeHandle`]s into
//! the project-wide [`AstSet`], so a removed file invalidates handles
//! instead of leaving dangling pointers.

use crate::error::{Error, Result};
use crate::language::Language;
use crate::resolution::RefKind;
use im::HashMap as ImHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};

/// Index of a node within one file's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a file within the project AST store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Project-wide stable address of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle {
    pub file: FileId,
    pub node: NodeId,
}

/// Type of AST node
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    Root,
    Function,
    Method,
    Class,
    Struct,
    Union,
    Interface,
    Enum,
    Typedef,
    Namespace,
    Module,
    Variable,
    Parameter,
    FunctionCall,
    Include,
    Import,
    Other,
}

impl NodeKind {
    /// Kinds that produce symbol index entries when named.
    pub fn is_symbol(&self) -> bool {
        matches!(
            self,
            NodeKind::Function
                | NodeKind::Method
                | NodeKind::Class
                | NodeKind::Struct
                | NodeKind::Union
                | NodeKind::Interface
                | NodeKind::Enum
                | NodeKind::Typedef
                | NodeKind::Namespace
                | NodeKind::Module
                | NodeKind::Variable
        )
    }
}

/// Source span of a node within its file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl SourceSpan {
    /// Create a SourceSpan from tree-sitter node positions
    pub fn from_ts_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();

        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1,
            end_line: end.row + 1,
            start_column: start.column,
            end_column: end.column,
        }
    }

    /// Whether the given byte offset falls inside this span.
    pub fn contains_byte(&self, byte: usize) -> bool {
        byte >= self.start_byte && byte < self.end_byte
    }
}

/// How an include/import statement names its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `#include "…"` — resolved against the including file's directory.
    LocalInclude,
    /// `#include <…>` — resolved against configured system roots.
    SystemInclude,
    /// A module path (`import a`, `from './x'`, `require('./x')`).
    Module,
}

/// Structured include/import target, extracted when the AST is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportTarget {
    pub kind: ImportKind,
    pub path: String,
}

/// An unresolved name use recorded during parsing.
///
/// Resolution converts pendings into [`Reference`] edges; pendings that
/// fail to resolve stay on the node for later passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReference {
    pub kind: RefKind,
    pub name: String,
    pub span: SourceSpan,
}

/// A resolved, non-owning edge to another AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub kind: RefKind,
    pub target: NodeHandle,
}

/// A single node in a file's AST.
#[derive(Debug, Clone, Serialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub name: String,
    pub qualified_name: String,
    pub language: Language,
    pub span: SourceSpan,
    pub is_definition: bool,
    /// Verbatim statement text, kept for include/import nodes.
    pub raw_content: Option<String>,
    /// Structured include/import path, extracted at build time.
    pub import_target: Option<ImportTarget>,
    pub properties: ImHashMap<String, String>,
    pub pending_references: Vec<PendingReference>,
    pub references: Vec<Reference>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl AstNode {
    pub fn new(kind: NodeKind, name: impl Into<String>, language: Language) -> Self {
        Self {
            kind,
            name: name.into(),
            qualified_name: String::new(),
            language,
            span: SourceSpan::default(),
            is_definition: true,
            raw_content: None,
            import_target: None,
            properties: ImHashMap::new(),
            pending_references: Vec::new(),
            references: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// One file's AST: a node arena plus its root.
#[derive(Debug, Clone, Serialize)]
pub struct Ast {
    file_path: PathBuf,
    language: Language,
    nodes: Vec<AstNode>,
    root: NodeId,
}

impl Ast {
    /// Create an AST containing only its root node.
    pub fn new(file_path: impl Into<PathBuf>, language: Language) -> Self {
        let root = AstNode::new(NodeKind::Root, "", language);
        Self {
            file_path: file_path.into(),
            language,
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AstNode> {
        self.nodes.get_mut(id.index())
    }

    /// Append a node under `parent`, wiring both link directions.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if `parent` is not a node of this tree.
    pub fn add_child(&mut self, parent: NodeId, mut node: AstNode) -> Result<NodeId> {
        if parent.index() >= self.nodes.len() {
            return Err(Error::invalid_input(format!(
                "parent node {} out of bounds for {}",
                parent.index(),
                self.file_path.display()
            )));
        }
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        self.nodes.push(node);
        if let Some(p) = self.nodes.get_mut(parent.index()) {
            p.children.push(id);
        }
        Ok(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent())
    }

    /// All node ids paired with their nodes, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AstNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Node ids in pre-order (parents before children, source order).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            // Reverse so the leftmost child is visited first.
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Node ids in breadth-first order from the root.
    pub fn bfs(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.children(id).iter().copied());
        }
        order
    }

    /// All node ids of a given kind, in arena order.
    pub fn find_by_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.kind == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// The deepest node whose span contains the given byte offset.
    ///
    /// Falls back to the root when no child span covers the offset.
    pub fn enclosing_at(&self, byte: usize) -> NodeId {
        let mut current = self.root;
        loop {
            let next = self
                .children(current)
                .iter()
                .copied()
                .find(|&c| self.get(c).is_some_and(|n| n.span.contains_byte(byte)));
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }
}

/// The project-wide AST store.
///
/// Slots are never reused, so a [`NodeHandle`] into a removed file resolves
/// to `None` rather than aliasing a later file.
#[derive(Debug, Default)]
pub struct AstSet {
    slots: Vec<Option<Ast>>,
}

impl AstSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ast: Ast) -> FileId {
        let id = FileId(self.slots.len() as u32);
        self.slots.push(Some(ast));
        id
    }

    pub fn ast(&self, file: FileId) -> Option<&Ast> {
        self.slots.get(file.index()).and_then(Option::as_ref)
    }

    pub fn ast_mut(&mut self, file: FileId) -> Option<&mut Ast> {
        self.slots.get_mut(file.index()).and_then(Option::as_mut)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&AstNode> {
        self.ast(handle.file).and_then(|a| a.get(handle.node))
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut AstNode> {
        self.ast_mut(handle.file).and_then(|a| a.get_mut(handle.node))
    }

    /// Remove a file's AST and prune reference edges that targeted it.
    pub fn remove(&mut self, file: FileId) -> Option<Ast> {
        let removed = self.slots.get_mut(file.index()).and_then(Option::take)?;
        for slot in self.slots.iter_mut().flatten() {
            for node in slot.nodes.iter_mut() {
                node.references.retain(|r| r.target.file != file);
            }
        }
        Some(removed)
    }

    /// Live file ids, in insertion order.
    pub fn file_ids(&self) -> Vec<FileId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| FileId(i as u32))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &Ast)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|a| (FileId(i as u32), a)))
    }

    /// Number of live files.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a live file by path.
    pub fn find_file(&self, path: &Path) -> Option<FileId> {
        self.iter()
            .find(|(_, a)| a.file_path() == path)
            .map(|(id, _)| id)
    }
}
