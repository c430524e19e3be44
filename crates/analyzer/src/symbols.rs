//! Symbol registration for parsed files.

use scopegraph_core::ast::{Ast, FileId, NodeHandle, NodeId, NodeKind};
use scopegraph_core::symbols::{SymbolEntry, SymbolIndex, SymbolScope};
use tracing::debug;

/// Scope assigned to a registered symbol by its node kind.
fn scope_for(kind: NodeKind) -> SymbolScope {
    match kind {
        NodeKind::Function => SymbolScope::Global,
        NodeKind::Method => SymbolScope::Class,
        NodeKind::Class
        | NodeKind::Struct
        | NodeKind::Union
        | NodeKind::Interface
        | NodeKind::Enum
        | NodeKind::Typedef
        | NodeKind::Namespace => SymbolScope::Global,
        NodeKind::Variable => SymbolScope::File,
        NodeKind::Module => SymbolScope::Module,
        _ => SymbolScope::Unknown,
    }
}

/// Register every named symbol node of a file, in pre-order.
///
/// Returns the number of entries created.
pub(crate) fn register_file_symbols(index: &mut SymbolIndex, ast: &Ast, file: FileId) -> usize {
    let mut registered = 0;
    for id in ast.preorder() {
        let Some(node) = ast.get(id) else { continue };
        if !node.kind.is_symbol() || node.name.is_empty() || node.qualified_name.is_empty() {
            continue;
        }

        let enclosing = enclosing_symbol(ast, id);
        let scope = match (&enclosing, node.kind) {
            // Variables declared inside a function body are locals.
            (Some((_, NodeKind::Function | NodeKind::Method)), NodeKind::Variable) => {
                SymbolScope::Local
            }
            _ => scope_for(node.kind),
        };

        let mut builder = SymbolEntry::builder()
            .qualified_name(node.qualified_name.clone())
            .simple_name(node.name.clone())
            .kind(node.kind)
            .file_path(ast.file_path())
            .node(NodeHandle { file, node: id })
            .scope(scope)
            .language(node.language)
            .is_definition(node.is_definition);

        if let Some((parent, _)) = enclosing {
            builder = builder.parent(parent);
        }
        if node.kind == NodeKind::Module {
            builder = builder.module_path(ast.file_path().to_string_lossy());
        }

        match builder.build() {
            Ok(entry) => {
                index.register(entry);
                registered += 1;
            }
            Err(e) => debug!("skipping symbol {}: {e}", node.qualified_name),
        }
    }

    // `using namespace X;` widens scope-aware lookup for the project.
    for (_, node) in ast.iter() {
        if node.properties.contains_key("using_namespace") && !node.name.is_empty() {
            index.add_scope_prefix(node.name.clone());
        }
    }

    registered
}

/// Qualified name and kind of the nearest ancestor that is a symbol.
fn enclosing_symbol(ast: &Ast, id: NodeId) -> Option<(String, NodeKind)> {
    let mut current = ast.parent(id);
    while let Some(ancestor) = current {
        let node = ast.get(ancestor)?;
        if node.kind.is_symbol() && !node.qualified_name.is_empty() {
            return Some((node.qualified_name.clone(), node.kind));
        }
        current = node.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopegraph_core::ast::AstSet;
    use scopegraph_core::language::Language;
    use scopegraph_languages::build_ast;
    use std::path::Path;

    fn index_source(language: Language, path: &str, source: &str) -> (SymbolIndex, AstSet) {
        let ast = build_ast(language, Path::new(path), source).unwrap();
        let mut asts = AstSet::new();
        let file = asts.insert(ast);
        let mut index = SymbolIndex::new();
        let ast = asts.ast(file).unwrap();
        register_file_symbols(&mut index, ast, file);
        (index, asts)
    }

    #[test]
    fn test_registers_c_function_and_global() {
        let (index, _asts) = index_source(
            Language::C,
            "/p/a.c",
            "int g = 0;\nint f(int x) { return x; }\n",
        );

        let f = index.lookup("f").unwrap();
        assert_eq!(f.kind(), NodeKind::Function);
        assert_eq!(f.scope(), SymbolScope::Global);
        assert!(f.is_definition());

        let g = index.lookup("g").unwrap();
        assert_eq!(g.kind(), NodeKind::Variable);
        assert_eq!(g.scope(), SymbolScope::File);

        // The file itself registers as a module for include resolution.
        let module = index.lookup("a.c").unwrap();
        assert_eq!(module.kind(), NodeKind::Module);
        assert_eq!(module.scope(), SymbolScope::Module);
    }

    #[test]
    fn test_registers_python_scoped_names() {
        let (index, _asts) = index_source(
            Language::Python,
            "/p/a.py",
            "class Greeter:\n    def greet(self):\n        pass\n\ndef foo():\n    pass\n",
        );

        assert_eq!(index.lookup("a.foo").unwrap().kind(), NodeKind::Function);
        let method = index.lookup("a.Greeter.greet").unwrap();
        assert_eq!(method.kind(), NodeKind::Method);
        assert_eq!(method.scope(), SymbolScope::Class);
        assert_eq!(method.parent(), Some("a.Greeter"));
    }

    #[test]
    fn test_function_locals_are_local_scope() {
        let (index, _asts) = index_source(
            Language::C,
            "/p/a.c",
            "int g = 0;\nint run(void) {\n  int counter = 1;\n  return counter;\n}\n",
        );

        assert_eq!(index.lookup("g").unwrap().scope(), SymbolScope::File);
        let counter = index.lookup("run.counter").unwrap();
        assert_eq!(counter.scope(), SymbolScope::Local);
        assert_eq!(counter.parent(), Some("run"));
    }

    #[test]
    fn test_entry_file_path_matches_node() {
        let (index, asts) = index_source(Language::C, "/p/a.c", "int f(void) { return 1; }\n");
        for entry in index.get_by_file(Path::new("/p/a.c")) {
            let ast = asts.ast(entry.node().file).unwrap();
            assert_eq!(ast.file_path(), entry.file_path());
        }
    }
}
