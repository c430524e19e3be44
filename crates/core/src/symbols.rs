//! Project-wide symbol index.
//!
//! Maps qualified names to chains of [`SymbolEntry`] rows. Chains keep
//! insertion order, so duplicate declarations and overloads coexist and
//! `lookup` returns the earliest registration.

use crate::ast::{NodeHandle, NodeKind};
use crate::error::{Error, Result};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};

/// Visibility scope of a symbol
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SymbolScope {
    Local,
    File,
    Module,
    Global,
    External,
    Class,
    Unknown,
}

/// A row in the global symbol index.
///
/// Points non-owningly at an AST node; entries must be removed (via
/// [`SymbolIndex::remove_by_file`]) before their file's AST is dropped.
///
/// Use [`SymbolEntry::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    qualified_name: String,
    simple_name: String,
    kind: NodeKind,
    file_path: PathBuf,
    node: NodeHandle,
    scope: SymbolScope,
    language: Language,
    is_definition: bool,
    module_path: Option<String>,
    parent: Option<String>,
}

impl SymbolEntry {
    pub fn builder() -> SymbolEntryBuilder {
        SymbolEntryBuilder::default()
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn scope(&self) -> SymbolScope {
        self.scope
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_definition(&self) -> bool {
        self.is_definition
    }

    pub fn module_path(&self) -> Option<&str> {
        self.module_path.as_deref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

/// Compute the simple name (last path segment) from a qualified name.
///
/// Handles both `::` and `.` separators; returns the input unchanged when
/// no separator is present.
fn compute_simple_name(qualified: &str) -> String {
    if qualified.contains("::") {
        qualified
            .rsplit("::")
            .next()
            .unwrap_or(qualified)
            .to_string()
    } else {
        qualified.rsplit('.').next().unwrap_or(qualified).to_string()
    }
}

/// Builder for constructing [`SymbolEntry`] with validation.
#[derive(Debug, Default)]
pub struct SymbolEntryBuilder {
    qualified_name: Option<String>,
    simple_name: Option<String>,
    kind: Option<NodeKind>,
    file_path: Option<PathBuf>,
    node: Option<NodeHandle>,
    scope: Option<SymbolScope>,
    language: Option<Language>,
    is_definition: Option<bool>,
    module_path: Option<String>,
    parent: Option<String>,
}

impl SymbolEntryBuilder {
    /// Set the qualified name (required).
    pub fn qualified_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = Some(qualified_name.into());
        self
    }

    /// Set the simple name. Computed from the qualified name when omitted.
    pub fn simple_name(mut self, simple_name: impl Into<String>) -> Self {
        self.simple_name = Some(simple_name.into());
        self
    }

    /// Set the node kind (required).
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the owning file path (required).
    pub fn file_path(mut self, file_path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    /// Set the target AST node (required).
    pub fn node(mut self, node: NodeHandle) -> Self {
        self.node = Some(node);
        self
    }

    /// Set the symbol scope (default: `Unknown`).
    pub fn scope(mut self, scope: SymbolScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Set the language (required).
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Set whether this entry is a definition (default: true).
    pub fn is_definition(mut self, is_definition: bool) -> Self {
        self.is_definition = Some(is_definition);
        self
    }

    /// Set the module path for import entries.
    pub fn module_path(mut self, module_path: impl Into<String>) -> Self {
        self.module_path = Some(module_path.into());
        self
    }

    /// Set the qualified name of the containing symbol.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Build the entry, validating required fields.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` when the qualified name is missing or
    /// empty, or when kind, file path, node, or language is missing.
    pub fn build(self) -> Result<SymbolEntry> {
        let qualified_name = self
            .qualified_name
            .ok_or_else(|| Error::invalid_input("SymbolEntry qualified_name is required"))?;
        if qualified_name.trim().is_empty() {
            return Err(Error::invalid_input(
                "SymbolEntry qualified_name must be non-empty",
            ));
        }

        let simple_name = match self.simple_name {
            Some(s) if !s.is_empty() => s,
            _ => compute_simple_name(&qualified_name),
        };

        let kind = self
            .kind
            .ok_or_else(|| Error::invalid_input("SymbolEntry kind is required"))?;
        let file_path = self
            .file_path
            .ok_or_else(|| Error::invalid_input("SymbolEntry file_path is required"))?;
        let node = self
            .node
            .ok_or_else(|| Error::invalid_input("SymbolEntry node is required"))?;
        let language = self
            .language
            .ok_or_else(|| Error::invalid_input("SymbolEntry language is required"))?;

        Ok(SymbolEntry {
            qualified_name,
            simple_name,
            kind,
            file_path,
            node,
            scope: self.scope.unwrap_or(SymbolScope::Unknown),
            language,
            is_definition: self.is_definition.unwrap_or(true),
            module_path: self.module_path,
            parent: self.parent,
        })
    }
}

/// The project-wide symbol index.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    entries: HashMap<String, Vec<SymbolEntry>>,
    scope_prefixes: Vec<String>,
    len: usize,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered entries (chain elements, not keys).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register an entry, appending to the chain for its qualified name.
    pub fn register(&mut self, entry: SymbolEntry) -> &SymbolEntry {
        let chain = self.entries.entry(entry.qualified_name.clone()).or_default();
        chain.push(entry);
        self.len += 1;
        match chain.last() {
            Some(e) => e,
            // The chain was pushed to one line above.
            None => unreachable!(),
        }
    }

    /// Exact-match lookup; first entry of the chain.
    pub fn lookup(&self, qualified_name: &str) -> Option<&SymbolEntry> {
        self.entries.get(qualified_name).and_then(|c| c.first())
    }

    /// All entries registered under a qualified name, in insertion order.
    pub fn lookup_all(&self, qualified_name: &str) -> &[SymbolEntry] {
        self.entries
            .get(qualified_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Scope-aware lookup.
    ///
    /// Already-qualified names behave as [`lookup`](Self::lookup).
    /// Otherwise candidates are tried in order: each dotted ancestor of
    /// `current_scope` from innermost outward prefixed to `name`, the bare
    /// name, and finally each configured scope prefix prepended.
    pub fn scope_lookup(
        &self,
        name: &str,
        current_scope: Option<&str>,
        language: Language,
    ) -> Option<&SymbolEntry> {
        let sep = language.separator();
        if name.contains(sep) {
            return self.lookup(name);
        }

        if let Some(scope) = current_scope.filter(|s| !s.is_empty()) {
            let mut segments: Vec<&str> = scope.split(sep).collect();
            while !segments.is_empty() {
                let candidate = format!("{}{}{}", segments.join(sep), sep, name);
                if let Some(entry) = self.lookup(&candidate) {
                    return Some(entry);
                }
                segments.pop();
            }
        }

        if let Some(entry) = self.lookup(name) {
            return Some(entry);
        }

        for prefix in &self.scope_prefixes {
            let candidate = format!("{prefix}{sep}{name}");
            if let Some(entry) = self.lookup(&candidate) {
                return Some(entry);
            }
        }

        None
    }

    /// Linear-scan filter by node kind.
    pub fn get_by_kind(&self, kind: NodeKind) -> Vec<&SymbolEntry> {
        self.entries
            .values()
            .flatten()
            .filter(|e| e.kind == kind)
            .collect()
    }

    /// Linear-scan filter by owning file.
    pub fn get_by_file(&self, path: &Path) -> Vec<&SymbolEntry> {
        self.entries
            .values()
            .flatten()
            .filter(|e| e.file_path == path)
            .collect()
    }

    /// Entries whose simple name matches, in arbitrary chain order.
    pub fn get_by_simple_name(&self, simple_name: &str) -> Vec<&SymbolEntry> {
        self.entries
            .values()
            .flatten()
            .filter(|e| e.simple_name == simple_name)
            .collect()
    }

    /// Remove every entry owned by `path`. Returns the number removed.
    pub fn remove_by_file(&mut self, path: &Path) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, chain| {
            let before = chain.len();
            chain.retain(|e| e.file_path != path);
            removed += before - chain.len();
            !chain.is_empty()
        });
        self.len -= removed;
        removed
    }

    /// Add an outer namespace/module prefix consulted by scope-aware lookup.
    pub fn add_scope_prefix(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        if !prefix.is_empty() && !self.scope_prefixes.contains(&prefix) {
            self.scope_prefixes.push(prefix);
        }
    }

    pub fn scope_prefixes(&self) -> &[String] {
        &self.scope_prefixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ast, AstSet};
    use pretty_assertions::assert_eq;

    fn handle(asts: &AstSet, file_index: usize) -> NodeHandle {
        let file = asts.file_ids()[file_index];
        let node = asts.ast(file).unwrap().root();
        NodeHandle { file, node }
    }

    fn entry(asts: &AstSet, qname: &str, kind: NodeKind, file: &str) -> SymbolEntry {
        SymbolEntry::builder()
            .qualified_name(qname)
            .kind(kind)
            .file_path(file)
            .node(handle(asts, 0))
            .scope(SymbolScope::Global)
            .language(Language::C)
            .build()
            .unwrap()
    }

    fn one_file_set() -> AstSet {
        let mut asts = AstSet::new();
        asts.insert(Ast::new("/p/a.c", Language::C));
        asts
    }

    #[test]
    fn test_register_and_lookup() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "f", NodeKind::Function, "/p/a.c"));

        let found = index.lookup("f").unwrap();
        assert_eq!(found.qualified_name(), "f");
        assert_eq!(found.simple_name(), "f");
        assert_eq!(found.kind(), NodeKind::Function);
        assert_eq!(index.len(), 1);
        assert!(index.lookup("g").is_none());
    }

    #[test]
    fn test_chain_preserves_insertion_order() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "f", NodeKind::Function, "/p/a.c"));
        index.register(entry(&asts, "f", NodeKind::Function, "/p/b.c"));

        let chain = index.lookup_all("f");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].file_path(), Path::new("/p/a.c"));
        // `lookup` returns the earliest registration.
        assert_eq!(index.lookup("f").unwrap().file_path(), Path::new("/p/a.c"));
    }

    #[test]
    fn test_simple_name_computed_from_qualified() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "ns::Widget::draw", NodeKind::Method, "/p/a.c"));
        index.register(entry(&asts, "pkg.mod.helper", NodeKind::Function, "/p/a.c"));

        assert_eq!(index.lookup("ns::Widget::draw").unwrap().simple_name(), "draw");
        assert_eq!(index.lookup("pkg.mod.helper").unwrap().simple_name(), "helper");
    }

    #[test]
    fn test_scope_lookup_walks_ancestors() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "app::util::trim", NodeKind::Function, "/p/a.c"));

        let found = index
            .scope_lookup("trim", Some("app::util::inner"), Language::Cpp)
            .unwrap();
        assert_eq!(found.qualified_name(), "app::util::trim");

        // Law: scope_lookup(simple, parent_qn) == lookup(parent_qn + sep + simple).
        assert_eq!(
            index
                .scope_lookup("trim", Some("app::util"), Language::Cpp)
                .map(|e| e.qualified_name()),
            index.lookup("app::util::trim").map(|e| e.qualified_name()),
        );
    }

    #[test]
    fn test_scope_lookup_qualified_name_passthrough() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "a.foo", NodeKind::Function, "/p/a.py"));

        let found = index
            .scope_lookup("a.foo", Some("b"), Language::Python)
            .unwrap();
        assert_eq!(found.qualified_name(), "a.foo");
    }

    #[test]
    fn test_scope_lookup_falls_back_to_prefixes() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "std::vector", NodeKind::Class, "/p/a.c"));
        index.add_scope_prefix("std");

        let found = index
            .scope_lookup("vector", Some("app"), Language::Cpp)
            .unwrap();
        assert_eq!(found.qualified_name(), "std::vector");
    }

    #[test]
    fn test_remove_by_file() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "f", NodeKind::Function, "/p/a.c"));
        index.register(entry(&asts, "f", NodeKind::Function, "/p/b.c"));
        index.register(entry(&asts, "g", NodeKind::Variable, "/p/a.c"));

        let removed = index.remove_by_file(Path::new("/p/a.c"));
        assert_eq!(removed, 2);
        assert_eq!(index.len(), 1);
        assert!(index.lookup("g").is_none());
        for entry in index.lookup_all("f") {
            assert_ne!(entry.file_path(), Path::new("/p/a.c"));
        }
    }

    #[test]
    fn test_get_by_kind_and_file() {
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        index.register(entry(&asts, "f", NodeKind::Function, "/p/a.c"));
        index.register(entry(&asts, "S", NodeKind::Struct, "/p/a.c"));
        index.register(entry(&asts, "g", NodeKind::Function, "/p/b.c"));

        assert_eq!(index.get_by_kind(NodeKind::Function).len(), 2);
        assert_eq!(index.get_by_kind(NodeKind::Struct).len(), 1);
        assert_eq!(index.get_by_file(Path::new("/p/a.c")).len(), 2);
    }

    #[test]
    fn test_growth_preserves_lookups() {
        // The map reallocates several times over 1,000 inserts; every
        // lookup must keep returning the entry registered for its key.
        let asts = one_file_set();
        let mut index = SymbolIndex::new();
        for i in 0..1000 {
            index.register(entry(
                &asts,
                &format!("mod_{}::sym_{i}", i % 7),
                NodeKind::Function,
                "/p/a.c",
            ));
        }
        assert_eq!(index.len(), 1000);
        for i in 0..1000 {
            let qname = format!("mod_{}::sym_{i}", i % 7);
            let found = index.lookup(&qname).unwrap();
            assert_eq!(found.qualified_name(), qname);
        }
    }

    #[test]
    fn test_builder_validation() {
        assert!(SymbolEntry::builder().build().is_err());
        assert!(SymbolEntry::builder().qualified_name("").build().is_err());
    }
}
