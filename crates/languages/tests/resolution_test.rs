//! Integration tests for the resolver registry and the per-language
//! resolution chains.

mod common;

use common::{find_node, index_sources};
use pretty_assertions::assert_eq;
use scopegraph_core::ast::NodeKind;
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{
    Resolution, ResolutionStatus, ResolveContext, ResolveRequest, ResolverOptions,
};
use scopegraph_languages::resolvers::GenericResolver;
use scopegraph_languages::{LanguageResolver, ResolverRegistry};

fn default_registry() -> ResolverRegistry {
    ResolverRegistry::with_default_resolvers(ResolverOptions::default())
}

#[test]
fn test_c_cross_file_call_and_use() {
    let (mut asts, index, files) = index_sources(&[
        (
            Language::C,
            "/p/a.c",
            "int f(int v) { return v; }\nint g = 0;\n",
        ),
        (
            Language::C,
            "/p/b.c",
            "extern int g;\nint f(int v);\nint main(void) { return f(g); }\n",
        ),
    ]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[1]);
    assert_eq!(status, ResolutionStatus::Success);

    let b = asts.ast(files[1]).unwrap();
    let (_, call) = find_node(b, NodeKind::FunctionCall, "f").unwrap();
    assert_eq!(call.references.len(), 2);
    assert!(call.pending_references.is_empty());

    // Both edges land in a.c: the call on f's definition, the use on g.
    for reference in &call.references {
        assert_eq!(reference.target.file, files[0]);
    }

    let a = asts.ast(files[0]).unwrap();
    let (f_id, _) = find_node(a, NodeKind::Function, "f").unwrap();
    let (g_id, _) = find_node(a, NodeKind::Variable, "g").unwrap();
    let targets: Vec<_> = call.references.iter().map(|r| r.target.node).collect();
    assert!(targets.contains(&f_id));
    assert!(targets.contains(&g_id));
}

#[test]
fn test_cpp_qualified_and_member_resolution() {
    let (mut asts, index, files) = index_sources(&[(
        Language::Cpp,
        "/p/w.cpp",
        "namespace app {\nclass Widget {\npublic:\n  void draw() { }\n};\n}\nvoid run() { app::Widget w; }\n",
    )]);

    let mut registry = default_registry();
    let ctx = ResolveContext {
        index: &index,
        asts: &asts,
        options: ResolverOptions::default(),
    };
    let (run_id, _) = find_node(asts.ast(files[0]).unwrap(), NodeKind::Function, "run").unwrap();

    let req = ResolveRequest {
        node: scopegraph_core::ast::NodeHandle {
            file: files[0],
            node: run_id,
        },
        ref_kind: scopegraph_core::resolution::RefKind::Type,
        name: "app::Widget",
        language: Language::Cpp,
        scope: None,
    };
    let resolution = registry.resolve_node(&req, &ctx);
    let expected = index.lookup("app::Widget").unwrap().node();
    assert_eq!(resolution, Resolution::Target(expected));

    // Template arguments strip to the bare head.
    let templated = ResolveRequest {
        name: "app::Widget<int>",
        ..req
    };
    assert_eq!(registry.resolve_node(&templated, &ctx), Resolution::Target(expected));
    drop(ctx);

    let status = registry.resolve_all(&mut asts, &index);
    // Everything in this file resolves or is accepted.
    assert_eq!(status, ResolutionStatus::Success);
}

#[test]
fn test_python_import_and_attribute_call() {
    let (mut asts, index, files) = index_sources(&[
        (Language::Python, "/p/a.py", "def foo():\n    pass\n"),
        (Language::Python, "/p/b.py", "import a\n\na.foo()\n"),
    ]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[1]);
    assert_eq!(status, ResolutionStatus::Success);

    let a = asts.ast(files[0]).unwrap();
    let (module_id, _) = find_node(a, NodeKind::Module, "a").unwrap();
    let (foo_id, _) = find_node(a, NodeKind::Function, "foo").unwrap();

    let b = asts.ast(files[1]).unwrap();
    let (_, import) = find_node(b, NodeKind::Import, "a").unwrap();
    assert_eq!(import.references.len(), 1);
    assert_eq!(import.references[0].target.file, files[0]);
    assert_eq!(import.references[0].target.node, module_id);

    let (_, call) = find_node(b, NodeKind::FunctionCall, "a.foo").unwrap();
    assert_eq!(call.references.len(), 1);
    assert_eq!(call.references[0].target.node, foo_id);
}

#[test]
fn test_python_builtins_fallback() {
    let (mut asts, index, files) = index_sources(&[
        (
            Language::Python,
            "/p/builtins.py",
            "def print(value):\n    pass\n",
        ),
        (Language::Python, "/p/b.py", "print(1)\n"),
    ]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[1]);
    assert_eq!(status, ResolutionStatus::Success);

    let b = asts.ast(files[1]).unwrap();
    let (_, call) = find_node(b, NodeKind::FunctionCall, "print").unwrap();
    assert_eq!(call.references.len(), 1);
    assert_eq!(call.references[0].target.file, files[0]);
}

#[test]
fn test_typescript_primitive_type_no_edge() {
    let (mut asts, index, files) = index_sources(&[(
        Language::TypeScript,
        "/p/a.ts",
        "function greet(name: string) { }\n",
    )]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[0]);
    assert_eq!(status, ResolutionStatus::Success);

    let ast = asts.ast(files[0]).unwrap();
    let (_, greet) = find_node(ast, NodeKind::Function, "greet").unwrap();
    // Success without a reference edge; the pending is drained.
    assert!(greet.references.is_empty());
    assert!(greet.pending_references.is_empty());

    let stats = registry.stats();
    assert!(stats.resolved >= 1);
    assert_eq!(stats.total, stats.resolved + stats.unresolved());
}

#[test]
fn test_javascript_prototype_method_call() {
    let (mut asts, index, files) = index_sources(&[
        (
            Language::JavaScript,
            "/p/foo.js",
            "function Foo() { }\nFoo.prototype.bar = function() { };\n",
        ),
        (
            Language::JavaScript,
            "/p/use.js",
            "var x = new Foo();\nfunction go() { return x.bar(); }\n",
        ),
    ]);

    // The prototype assignment registered Foo.bar as a class-scoped method.
    let bar = index.lookup("Foo.bar").unwrap();
    assert_eq!(bar.kind(), NodeKind::Method);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[1]);
    assert_eq!(status, ResolutionStatus::Success);

    let use_ast = asts.ast(files[1]).unwrap();
    let (_, call) = find_node(use_ast, NodeKind::FunctionCall, "x.bar").unwrap();
    assert_eq!(call.references.len(), 1);
    assert_eq!(call.references[0].target, bar.node());
}

#[test]
fn test_javascript_ambiguous_method() {
    let (mut asts, index, files) = index_sources(&[
        (
            Language::JavaScript,
            "/p/a.js",
            "class A { render() { } }\nclass B { render() { } }\n",
        ),
        (
            Language::JavaScript,
            "/p/b.js",
            "function go(x) { return x.render(); }\n",
        ),
    ]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[1]);
    assert_eq!(status, ResolutionStatus::Ambiguous);

    let b = asts.ast(files[1]).unwrap();
    let (_, call) = find_node(b, NodeKind::FunctionCall, "x.render").unwrap();
    // Ambiguous outcomes add no edge and keep the pending.
    assert!(call.references.is_empty());
    assert!(!call.pending_references.is_empty());
}

#[test]
fn test_external_import_accepted_by_default() {
    let (mut asts, index, files) = index_sources(&[(
        Language::JavaScript,
        "/p/a.js",
        "import { debounce } from 'lodash';\n",
    )]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[0]);
    assert_eq!(status, ResolutionStatus::Success);

    let ast = asts.ast(files[0]).unwrap();
    let (_, import) = find_node(ast, NodeKind::Import, "lodash").unwrap();
    assert!(import.references.is_empty());
    assert!(import.pending_references.is_empty());
}

#[test]
fn test_external_import_strict_mode() {
    let (mut asts, index, files) = index_sources(&[(
        Language::JavaScript,
        "/p/a.js",
        "import { debounce } from 'lodash';\n",
    )]);

    let mut registry = ResolverRegistry::with_default_resolvers(ResolverOptions {
        resolve_external_symbols: true,
    });
    let status = registry.resolve_file(&mut asts, &index, files[0]);
    assert_eq!(status, ResolutionStatus::NotFound);
    assert_eq!(registry.stats().unresolved(), 1);
}

#[test]
fn test_register_replaces_and_unregister_compacts() {
    struct NeverResolves;
    impl LanguageResolver for NeverResolves {
        fn language(&self) -> Language {
            Language::C
        }
        fn resolve(
            &self,
            _req: &ResolveRequest<'_>,
            _ctx: &ResolveContext<'_>,
        ) -> Resolution {
            Resolution::NotFound
        }
    }

    let (mut asts, index, files) = index_sources(&[
        (Language::C, "/p/a.c", "int f(int v) { return v; }\n"),
        (Language::C, "/p/b.c", "int f(int v);\nint main(void) { return f(2); }\n"),
    ]);

    let mut registry = default_registry();
    registry.register(Box::new(NeverResolves));
    let status = registry.resolve_file(&mut asts, &index, files[1]);
    assert_eq!(status, ResolutionStatus::NotFound);

    // Dropping the override falls back to generic resolution.
    assert!(registry.unregister(Language::C));
    assert!(!registry.unregister(Language::C));
    assert!(registry.find(Language::C).is_none());

    let status = registry.resolve_file(&mut asts, &index, files[1]);
    assert_eq!(status, ResolutionStatus::Success);
}

#[test]
fn test_generic_resolver_scope_walk() {
    let (asts, index, files) = index_sources(&[(
        Language::Cpp,
        "/p/a.cpp",
        "namespace app {\nint helper() { return 1; }\nint caller() { return helper(); }\n}\n",
    )]);

    let registry = GenericResolver;
    let ast = asts.ast(files[0]).unwrap();
    let (caller_id, _) = find_node(ast, NodeKind::Function, "caller").unwrap();

    let ctx = ResolveContext {
        index: &index,
        asts: &asts,
        options: ResolverOptions::default(),
    };
    let req = ResolveRequest {
        node: scopegraph_core::ast::NodeHandle {
            file: files[0],
            node: caller_id,
        },
        ref_kind: scopegraph_core::resolution::RefKind::Call,
        name: "helper",
        language: Language::Cpp,
        scope: Some("app::caller"),
    };
    let resolution = registry.resolve(&req, &ctx);
    let expected = index.lookup("app::helper").unwrap().node();
    assert_eq!(resolution, Resolution::Target(expected));
}

#[test]
fn test_c_member_access_through_variable_type() {
    let (mut asts, index, files) = index_sources(&[(
        Language::C,
        "/p/a.c",
        "struct Point { int x; int y; };\nstruct Point p;\nint take(int v);\nint main(void) { return take(p.x); }\n",
    )]);

    let mut registry = default_registry();
    registry.resolve_file(&mut asts, &index, files[0]);

    let ast = asts.ast(files[0]).unwrap();
    let (point_id, _) = find_node(ast, NodeKind::Struct, "Point").unwrap();
    let x_id = ast
        .children(point_id)
        .iter()
        .copied()
        .find(|&c| ast.get(c).map(|n| n.name == "x").unwrap_or(false))
        .unwrap();

    // The use of `p.x` resolved through p's type to the struct member.
    let (_, call) = find_node(ast, NodeKind::FunctionCall, "take").unwrap();
    assert!(call
        .references
        .iter()
        .any(|r| r.target.file == files[0] && r.target.node == x_id));
}

#[test]
fn test_c_member_access_on_local_variable() {
    let (mut asts, index, files) = index_sources(&[(
        Language::C,
        "/p/a.c",
        "struct Point { int x; };\nint take(int v);\nint run(void) {\n  struct Point p;\n  return take(p.x);\n}\n",
    )]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[0]);
    assert_eq!(status, ResolutionStatus::Success);

    let ast = asts.ast(files[0]).unwrap();
    let (point_id, _) = find_node(ast, NodeKind::Struct, "Point").unwrap();
    let (_, call) = find_node(ast, NodeKind::FunctionCall, "take").unwrap();
    assert!(call
        .references
        .iter()
        .any(|r| r.target.node
            == ast
                .children(point_id)
                .iter()
                .copied()
                .find(|&c| ast.get(c).map(|n| n.name == "x").unwrap_or(false))
                .unwrap()));
}

#[test]
fn test_typescript_namespaced_type() {
    let (mut asts, index, files) = index_sources(&[(
        Language::TypeScript,
        "/p/api.ts",
        "namespace Api {\n  export interface Request { }\n}\nfunction handle(req: Api.Request) { }\n",
    )]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[0]);
    assert_eq!(status, ResolutionStatus::Success);

    let ast = asts.ast(files[0]).unwrap();
    let (request_id, _) = find_node(ast, NodeKind::Interface, "Request").unwrap();
    let (_, handle) = find_node(ast, NodeKind::Function, "handle").unwrap();
    assert!(handle
        .references
        .iter()
        .any(|r| r.target.node == request_id));
}

#[test]
fn test_python_self_import_is_circular() {
    let (mut asts, index, files) = index_sources(&[(
        Language::Python,
        "/p/a.py",
        "import a\n",
    )]);

    let mut registry = default_registry();
    let status = registry.resolve_file(&mut asts, &index, files[0]);
    assert_eq!(status, ResolutionStatus::Circular);

    let ast = asts.ast(files[0]).unwrap();
    let (_, import) = find_node(ast, NodeKind::Import, "a").unwrap();
    assert!(import.references.is_empty());
}

#[test]
fn test_stats_accumulate_per_language() {
    let (mut asts, index, files) = index_sources(&[
        (Language::C, "/p/a.c", "int f(void) { return missing(); }\n"),
        (Language::Python, "/p/b.py", "def g():\n    pass\n\ng()\n"),
    ]);

    let mut registry = default_registry();
    for &file in &files {
        registry.resolve_file(&mut asts, &index, file);
    }

    let stats = registry.stats();
    assert_eq!(stats.total, stats.resolved + stats.unresolved());
    assert!(stats.unresolved() >= 1); // missing() has no definition
    assert!(stats.resolved >= 1); // g() resolves
    assert!(stats.by_language.contains_key(&Language::C));
    assert!(stats.by_language.contains_key(&Language::Python));
}
