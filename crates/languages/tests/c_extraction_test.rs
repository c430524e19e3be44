//! Integration tests for C AST construction.

mod common;

use common::{ast_for, find_node, nodes_of_kind};
use pretty_assertions::assert_eq;
use scopegraph_core::ast::{ImportKind, NodeKind};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::RefKind;

#[test]
fn test_module_node_first() {
    let ast = ast_for(Language::C, "/p/a.c", "int x;\n");
    let root = ast.root();
    let first = ast.children(root)[0];
    let module = ast.get(first).unwrap();
    assert_eq!(module.kind, NodeKind::Module);
    // C modules keep the extension so include targets match textually.
    assert_eq!(module.name, "a.c");
    assert_eq!(module.qualified_name, "a.c");
}

#[test]
fn test_function_with_parameters() {
    let ast = ast_for(
        Language::C,
        "/p/a.c",
        "int add(int a, int b) { return a + b; }\n",
    );
    let (id, func) = find_node(&ast, NodeKind::Function, "add").unwrap();
    assert_eq!(func.qualified_name, "add");
    assert!(func.is_definition);
    assert_eq!(func.language, Language::C);

    let params: Vec<_> = ast
        .children(id)
        .iter()
        .filter_map(|&c| ast.get(c))
        .filter(|n| n.kind == NodeKind::Parameter)
        .map(|n| n.name.clone())
        .collect();
    assert_eq!(params, vec!["a", "b"]);
}

#[test]
fn test_prototype_is_declaration() {
    let ast = ast_for(Language::C, "/p/a.c", "int f(int x);\n");
    let (_, func) = find_node(&ast, NodeKind::Function, "f").unwrap();
    assert!(!func.is_definition);
}

#[test]
fn test_variables_and_extern() {
    let ast = ast_for(Language::C, "/p/a.c", "int g = 0;\nextern int h;\n");
    let (_, g) = find_node(&ast, NodeKind::Variable, "g").unwrap();
    assert!(g.is_definition);
    let (_, h) = find_node(&ast, NodeKind::Variable, "h").unwrap();
    assert!(!h.is_definition);
}

#[test]
fn test_struct_members_are_children() {
    let ast = ast_for(Language::C, "/p/a.c", "struct Point { int x; int y; };\n");
    let (id, point) = find_node(&ast, NodeKind::Struct, "Point").unwrap();
    assert_eq!(point.qualified_name, "Point");

    let members: Vec<_> = ast
        .children(id)
        .iter()
        .filter_map(|&c| ast.get(c))
        .map(|n| (n.kind, n.name.clone(), n.qualified_name.clone()))
        .collect();
    assert!(members.contains(&(NodeKind::Variable, "x".into(), "Point.x".into())));
    assert!(members.contains(&(NodeKind::Variable, "y".into(), "Point.y".into())));
}

#[test]
fn test_enum_constants_stay_unscoped() {
    let ast = ast_for(Language::C, "/p/a.c", "enum Color { RED, GREEN };\n");
    find_node(&ast, NodeKind::Enum, "Color").unwrap();
    let (_, red) = find_node(&ast, NodeKind::Variable, "RED").unwrap();
    // C enumerators are visible in the enclosing scope.
    assert_eq!(red.qualified_name, "RED");
}

#[test]
fn test_typedef_anonymous_struct_keeps_members() {
    let ast = ast_for(Language::C, "/p/a.c", "typedef struct { int a; } Pair;\n");
    let (id, pair) = find_node(&ast, NodeKind::Typedef, "Pair").unwrap();
    assert_eq!(pair.qualified_name, "Pair");
    let member_names: Vec<_> = ast
        .children(id)
        .iter()
        .filter_map(|&c| ast.get(c))
        .map(|n| n.name.clone())
        .collect();
    assert!(member_names.contains(&"a".to_string()));
}

#[test]
fn test_includes_keep_raw_and_structured_path() {
    let ast = ast_for(
        Language::C,
        "/p/a.c",
        "#include \"util.h\"\n#include <stdio.h>\n",
    );
    let includes = nodes_of_kind(&ast, NodeKind::Include);
    assert_eq!(includes.len(), 2);

    let (_, local) = find_node(&ast, NodeKind::Include, "util.h").unwrap();
    let target = local.import_target.as_ref().unwrap();
    assert_eq!(target.kind, ImportKind::LocalInclude);
    assert_eq!(target.path, "util.h");
    assert!(local.raw_content.as_ref().unwrap().contains("#include"));
    assert_eq!(local.pending_references.len(), 1);
    assert_eq!(local.pending_references[0].kind, RefKind::Import);

    let (_, system) = find_node(&ast, NodeKind::Include, "stdio.h").unwrap();
    assert_eq!(
        system.import_target.as_ref().unwrap().kind,
        ImportKind::SystemInclude
    );
}

#[test]
fn test_macro_registers_as_file_scope_name() {
    let ast = ast_for(Language::C, "/p/a.c", "#define MAX 10\n");
    let (_, max) = find_node(&ast, NodeKind::Variable, "MAX").unwrap();
    assert_eq!(max.properties.get("macro").map(String::as_str), Some("true"));
}

#[test]
fn test_call_site_attaches_under_function() {
    let source = "int f(int v);\nint g = 1;\nint main(void) { return f(g); }\n";
    let ast = ast_for(Language::C, "/p/a.c", source);

    let (main_id, _) = find_node(&ast, NodeKind::Function, "main").unwrap();
    let (call_id, call) = find_node(&ast, NodeKind::FunctionCall, "f").unwrap();
    assert_eq!(ast.parent(call_id), Some(main_id));

    let kinds: Vec<_> = call
        .pending_references
        .iter()
        .map(|p| (p.kind, p.name.clone()))
        .collect();
    assert!(kinds.contains(&(RefKind::Call, "f".into())));
    assert!(kinds.contains(&(RefKind::Use, "g".into())));
}

#[test]
fn test_every_node_language_matches_file() {
    let ast = ast_for(
        Language::C,
        "/p/a.c",
        "#include \"x.h\"\nstruct S { int a; };\nint f(void) { return 0; }\n",
    );
    for (_, node) in ast.iter() {
        assert_eq!(node.language, Language::C);
    }
}

#[test]
fn test_parent_chain_invariant() {
    let ast = ast_for(
        Language::C,
        "/p/a.c",
        "struct S { int a; };\nint f(int x) { return x; }\n",
    );
    for (id, node) in ast.iter() {
        match node.parent() {
            Some(parent) => assert!(ast.children(parent).contains(&id)),
            None => assert_eq!(id, ast.root()),
        }
    }
}
