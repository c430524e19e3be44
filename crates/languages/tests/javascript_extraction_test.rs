//! Integration tests for JavaScript AST construction.

mod common;

use common::{ast_for, find_node};
use scopegraph_core::ast::{ImportKind, NodeKind};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::RefKind;

#[test]
fn test_top_level_names_stay_unprefixed() {
    let source = "function render() { }\n";
    let ast = ast_for(Language::JavaScript, "/p/view.js", source);

    let (_, module) = find_node(&ast, NodeKind::Module, "view").unwrap();
    assert_eq!(module.qualified_name, "view");

    let (_, render) = find_node(&ast, NodeKind::Function, "render").unwrap();
    assert_eq!(render.qualified_name, "render");
}

#[test]
fn test_arrow_function_binding() {
    let source = "const helper = (x) => x + 1;\n";
    let ast = ast_for(Language::JavaScript, "/p/a.js", source);
    let (_, helper) = find_node(&ast, NodeKind::Function, "helper").unwrap();
    assert!(helper.is_definition);
}

#[test]
fn test_class_with_methods() {
    let source = "class Widget {\n  render() { return 1; }\n}\n";
    let ast = ast_for(Language::JavaScript, "/p/w.js", source);

    let (_, widget) = find_node(&ast, NodeKind::Class, "Widget").unwrap();
    assert_eq!(widget.qualified_name, "Widget");

    let (_, render) = find_node(&ast, NodeKind::Method, "render").unwrap();
    assert_eq!(render.qualified_name, "Widget.render");
}

#[test]
fn test_class_extends() {
    let source = "class Base { }\nclass Child extends Base { }\n";
    let ast = ast_for(Language::JavaScript, "/p/c.js", source);

    let (_, child) = find_node(&ast, NodeKind::Class, "Child").unwrap();
    assert!(child
        .pending_references
        .iter()
        .any(|p| p.kind == RefKind::Inheritance && p.name == "Base"));
}

#[test]
fn test_prototype_method_registers_under_class() {
    let source = "function Foo() { }\nFoo.prototype.bar = function() { };\n";
    let ast = ast_for(Language::JavaScript, "/p/f.js", source);

    let (_, bar) = find_node(&ast, NodeKind::Method, "bar").unwrap();
    assert_eq!(bar.qualified_name, "Foo.bar");
    assert_eq!(bar.properties.get("class").map(String::as_str), Some("Foo"));
}

#[test]
fn test_es_module_import() {
    let source = "import { helper } from './util';\n";
    let ast = ast_for(Language::JavaScript, "/p/a.js", source);

    let (_, import) = find_node(&ast, NodeKind::Import, "util").unwrap();
    let target = import.import_target.as_ref().unwrap();
    assert_eq!(target.kind, ImportKind::Module);
    assert_eq!(target.path, "./util");
    assert!(import
        .pending_references
        .iter()
        .any(|p| p.kind == RefKind::Import && p.name == "util"));
}

#[test]
fn test_commonjs_require() {
    let source = "const util = require('./util');\n";
    let ast = ast_for(Language::JavaScript, "/p/a.js", source);

    let (_, import) = find_node(&ast, NodeKind::Import, "util").unwrap();
    assert_eq!(import.import_target.as_ref().unwrap().path, "./util");
}

#[test]
fn test_module_exports_assignment() {
    let source = "module.exports.run = function() { };\nexports.VERSION = 2;\n";
    let ast = ast_for(Language::JavaScript, "/p/a.js", source);

    let (_, run) = find_node(&ast, NodeKind::Function, "run").unwrap();
    assert_eq!(
        run.properties.get("exported").map(String::as_str),
        Some("true")
    );
    find_node(&ast, NodeKind::Variable, "VERSION").unwrap();
}

#[test]
fn test_member_call_site() {
    let source = "function use(x) { return x.bar(); }\n";
    let ast = ast_for(Language::JavaScript, "/p/a.js", source);

    let (_, call) = find_node(&ast, NodeKind::FunctionCall, "x.bar").unwrap();
    assert!(call
        .pending_references
        .iter()
        .any(|p| p.kind == RefKind::Call && p.name == "x.bar"));
}

#[test]
fn test_require_call_not_duplicated_as_call_site() {
    let source = "const util = require('./util');\n";
    let ast = ast_for(Language::JavaScript, "/p/a.js", source);
    assert!(find_node(&ast, NodeKind::FunctionCall, "require").is_none());
}
