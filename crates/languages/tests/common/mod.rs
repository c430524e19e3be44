//! Shared helpers for language integration tests.

use scopegraph_core::ast::{Ast, AstNode, AstSet, FileId, NodeHandle, NodeId, NodeKind};
use scopegraph_core::language::Language;
use scopegraph_core::symbols::{SymbolEntry, SymbolIndex, SymbolScope};
use scopegraph_languages::build_ast;
use std::path::Path;

/// Build an AST for an in-memory source buffer.
pub fn ast_for(language: Language, path: &str, source: &str) -> Ast {
    build_ast(language, Path::new(path), source).expect("failed to build AST")
}

/// First node matching a kind and name, with its id.
pub fn find_node<'a>(ast: &'a Ast, kind: NodeKind, name: &str) -> Option<(NodeId, &'a AstNode)> {
    ast.iter().find(|(_, n)| n.kind == kind && n.name == name)
}

/// All nodes of a kind.
pub fn nodes_of_kind<'a>(ast: &'a Ast, kind: NodeKind) -> Vec<(NodeId, &'a AstNode)> {
    ast.iter().filter(|(_, n)| n.kind == kind).collect()
}

/// Register every named symbol node of a file, the way the driver does.
pub fn register_symbols(index: &mut SymbolIndex, ast: &Ast, file: FileId) {
    for id in ast.preorder() {
        let Some(node) = ast.get(id) else { continue };
        if !node.kind.is_symbol() || node.name.is_empty() || node.qualified_name.is_empty() {
            continue;
        }
        let scope = match node.kind {
            NodeKind::Method => SymbolScope::Class,
            NodeKind::Variable => SymbolScope::File,
            NodeKind::Module => SymbolScope::Module,
            _ => SymbolScope::Global,
        };
        let entry = SymbolEntry::builder()
            .qualified_name(node.qualified_name.clone())
            .simple_name(node.name.clone())
            .kind(node.kind)
            .file_path(ast.file_path())
            .node(NodeHandle { file, node: id })
            .scope(scope)
            .language(node.language)
            .is_definition(node.is_definition)
            .build()
            .expect("symbol entry");
        index.register(entry);
    }
}

/// Insert sources into an AstSet and index their symbols.
pub fn index_sources(
    sources: &[(Language, &str, &str)],
) -> (AstSet, SymbolIndex, Vec<FileId>) {
    let mut asts = AstSet::new();
    let mut index = SymbolIndex::new();
    let mut files = Vec::new();
    for (language, path, source) in sources {
        let ast = ast_for(*language, path, source);
        let file = asts.insert(ast);
        files.push(file);
    }
    for &file in &files {
        let ast = asts.ast(file).expect("ast");
        register_symbols(&mut index, ast, file);
    }
    (asts, index, files)
}
