//! Shared declaration walk for JavaScript and TypeScript.
//!
//! TypeScript-only statement kinds route through the `typescript` module
//! when the `ts` flag is set. Top-level names stay unprefixed; the file's
//! module node exists only as an import-resolution target.

use super::{typescript, BuildCtx};
use scopegraph_core::ast::{AstNode, ImportKind, ImportTarget, NodeId, NodeKind, SourceSpan};
use scopegraph_core::error::Result;
use scopegraph_core::resolution::RefKind;
use std::path::Path;

pub(crate) fn build_program(ctx: &mut BuildCtx, root: tree_sitter::Node, ts: bool) -> Result<()> {
    ctx.add_module_node()?;
    walk_statements(ctx, root, ts)
}

pub(crate) fn walk_statements(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    ts: bool,
) -> Result<()> {
    let mut walker = node.walk();
    let children: Vec<_> = node.named_children(&mut walker).collect();
    for child in children {
        handle_statement(ctx, child, ts)?;
    }
    Ok(())
}

pub(crate) fn handle_statement(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    ts: bool,
) -> Result<()> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            function_decl(ctx, node, ts).map(|_| ())
        }
        "class_declaration" => class_decl(ctx, node, ts),
        "lexical_declaration" | "variable_declaration" => variables(ctx, node, ts),
        "import_statement" => import_statement(ctx, node),
        "export_statement" => match node.child_by_field_name("declaration") {
            Some(inner) => handle_statement(ctx, inner, ts),
            None => Ok(()),
        },
        "expression_statement" => expression_statement(ctx, node),
        kind if ts => typescript::handle_ts_statement(ctx, node, kind),
        _ => Ok(()),
    }
}

pub(crate) fn function_decl(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    ts: bool,
) -> Result<Option<NodeId>> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(None);
    };
    let name = ctx.text(name_node);
    let id = ctx.add_declaration(NodeKind::Function, name, node, true)?;
    function_signature(ctx, id, node, ts)?;
    Ok(Some(id))
}

/// Parameters and (TS) type annotations shared by functions and methods.
pub(crate) fn function_signature(
    ctx: &mut BuildCtx,
    id: NodeId,
    node: tree_sitter::Node,
    ts: bool,
) -> Result<()> {
    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);
    if let Some(params) = node.child_by_field_name("parameters") {
        let mut walker = params.walk();
        let children: Vec<_> = params.named_children(&mut walker).collect();
        for param in children {
            match param.kind() {
                "identifier" => {
                    let name = ctx.text(param).to_string();
                    ctx.add_declaration(NodeKind::Parameter, &name, param, true)?;
                }
                "required_parameter" | "optional_parameter" => {
                    if let Some(pattern) = param.child_by_field_name("pattern") {
                        if pattern.kind() == "identifier" {
                            let name = ctx.text(pattern).to_string();
                            ctx.add_declaration(NodeKind::Parameter, &name, param, true)?;
                        }
                    }
                    if let Some(annotation) = param.child_by_field_name("type") {
                        type_annotation_ref(ctx, id, annotation);
                    }
                }
                _ => {}
            }
        }
    }
    ctx.pop_scope();

    if ts {
        if let Some(annotation) = node.child_by_field_name("return_type") {
            type_annotation_ref(ctx, id, annotation);
        }
    }
    Ok(())
}

pub(crate) fn class_decl(ctx: &mut BuildCtx, node: tree_sitter::Node, ts: bool) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node);
    let id = ctx.add_declaration(NodeKind::Class, name, node, true)?;

    let mut walker = node.walk();
    let heritage: Vec<_> = node
        .children(&mut walker)
        .filter(|c| c.kind() == "class_heritage")
        .collect();
    for clause in heritage {
        heritage_refs(ctx, id, clause);
    }

    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);
    if let Some(body) = node.child_by_field_name("body") {
        let mut walker = body.walk();
        let members: Vec<_> = body.named_children(&mut walker).collect();
        for member in members {
            class_member(ctx, member, ts)?;
        }
    }
    ctx.pop_scope();
    Ok(())
}

/// `extends`/`implements` clauses for both grammars: the JS heritage holds
/// a bare expression, the TS one nested clause nodes.
fn heritage_refs(ctx: &mut BuildCtx, id: NodeId, clause: tree_sitter::Node) {
    let mut walker = clause.walk();
    let children: Vec<_> = clause.named_children(&mut walker).collect();
    for child in children {
        match child.kind() {
            "extends_clause" => {
                let mut inner = clause.walk();
                let types: Vec<_> = child.named_children(&mut inner).collect();
                for ty in types {
                    let text = base_type_text(ctx, ty);
                    ctx.add_pending(id, RefKind::Inheritance, text, ty);
                }
            }
            "implements_clause" => {
                let mut inner = clause.walk();
                let types: Vec<_> = child.named_children(&mut inner).collect();
                for ty in types {
                    let text = base_type_text(ctx, ty);
                    ctx.add_pending(id, RefKind::Implementation, text, ty);
                }
            }
            "identifier" | "member_expression" => {
                let text = ctx.text(child).to_string();
                ctx.add_pending(id, RefKind::Inheritance, text, child);
            }
            _ => {}
        }
    }
}

fn base_type_text(ctx: &BuildCtx, ty: tree_sitter::Node) -> String {
    ctx.text(ty).trim().to_string()
}

fn class_member(ctx: &mut BuildCtx, node: tree_sitter::Node, ts: bool) -> Result<()> {
    match node.kind() {
        "method_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = ctx.text(name_node);
                if !name.is_empty() {
                    let id = ctx.add_declaration(NodeKind::Method, name, node, true)?;
                    function_signature(ctx, id, node, ts)?;
                }
            }
            Ok(())
        }
        "field_definition" | "public_field_definition" => {
            if let Some(name_node) = node.child_by_field_name("property") {
                let name = ctx.text(name_node);
                if !name.is_empty() {
                    let id = ctx.add_declaration(NodeKind::Variable, name, node, true)?;
                    if let Some(annotation) = node.child_by_field_name("type") {
                        type_annotation_ref(ctx, id, annotation);
                    }
                }
            }
            Ok(())
        }
        "method_signature" | "abstract_method_signature" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = ctx.text(name_node);
                if !name.is_empty() {
                    ctx.add_declaration(NodeKind::Method, name, node, false)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `const`/`let`/`var` declarations: function values become Function
/// nodes, `require(…)` bindings become Import nodes.
fn variables(ctx: &mut BuildCtx, node: tree_sitter::Node, ts: bool) -> Result<()> {
    let mut walker = node.walk();
    let declarators: Vec<_> = node
        .named_children(&mut walker)
        .filter(|c| c.kind() == "variable_declarator")
        .collect();
    for declarator in declarators {
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        if name_node.kind() != "identifier" {
            continue;
        }
        let name = ctx.text(name_node).to_string();

        let value = declarator.child_by_field_name("value");
        match value.map(|v| v.kind()) {
            Some("arrow_function") | Some("function_expression") | Some("function")
            | Some("generator_function") => {
                let id = ctx.add_declaration(NodeKind::Function, &name, node, true)?;
                if let Some(value) = value {
                    function_signature(ctx, id, value, ts)?;
                }
            }
            Some("call_expression") => {
                let Some(value) = value else { continue };
                match require_path(ctx, value) {
                    Some(path) => {
                        require_import(ctx, node, &name, &path)?;
                    }
                    None => {
                        ctx.add_declaration(NodeKind::Variable, &name, node, true)?;
                    }
                }
            }
            _ => {
                let id = ctx.add_declaration(NodeKind::Variable, &name, node, true)?;
                if let Some(annotation) = declarator.child_by_field_name("type") {
                    type_annotation_ref(ctx, id, annotation);
                }
            }
        }
    }
    Ok(())
}

/// The quoted path of a `require('…')` call, if that is what this is.
fn require_path(ctx: &BuildCtx, call: tree_sitter::Node) -> Option<String> {
    let callee = call.child_by_field_name("function")?;
    if ctx.text(callee) != "require" {
        return None;
    }
    let args = call.child_by_field_name("arguments")?;
    let first = args.named_child(0)?;
    if first.kind() != "string" {
        return None;
    }
    let path = ctx.text(first).trim_matches(|c| c == '\'' || c == '"');
    (!path.is_empty()).then(|| path.to_string())
}

fn require_import(
    ctx: &mut BuildCtx,
    statement: tree_sitter::Node,
    binding: &str,
    path: &str,
) -> Result<()> {
    let mut node = AstNode::new(NodeKind::Import, binding, ctx.language());
    node.span = SourceSpan::from_ts_node(statement);
    node.is_definition = false;
    node.raw_content = Some(ctx.text(statement).trim_end().to_string());
    node.import_target = Some(ImportTarget {
        kind: ImportKind::Module,
        path: path.to_string(),
    });
    let id = ctx.add_node(node)?;
    let stem = module_stem(path);
    ctx.add_pending(id, RefKind::Import, stem, statement);
    Ok(())
}

/// `import … from '…'` — one Import node per statement.
fn import_statement(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(source) = node.child_by_field_name("source") else {
        return Ok(());
    };
    let path = ctx
        .text(source)
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string();
    if path.is_empty() {
        return Ok(());
    }
    let stem = module_stem(&path);

    let mut ast_node = AstNode::new(NodeKind::Import, stem.clone(), ctx.language());
    ast_node.span = SourceSpan::from_ts_node(node);
    ast_node.is_definition = false;
    ast_node.raw_content = Some(ctx.text(node).trim_end().to_string());
    ast_node.import_target = Some(ImportTarget {
        kind: ImportKind::Module,
        path,
    });
    let id = ctx.add_node(ast_node)?;
    ctx.add_pending(id, RefKind::Import, stem, node);
    Ok(())
}

/// Prototype methods and CommonJS export assignments.
fn expression_statement(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(expr) = node.named_child(0) else {
        return Ok(());
    };
    if expr.kind() != "assignment_expression" {
        return Ok(());
    }
    let Some(left) = expr.child_by_field_name("left") else {
        return Ok(());
    };
    if left.kind() != "member_expression" {
        return Ok(());
    }
    let target = ctx.text(left).to_string();
    let value_is_function = expr
        .child_by_field_name("right")
        .map(|r| {
            matches!(
                r.kind(),
                "function_expression" | "function" | "arrow_function" | "generator_function"
            )
        })
        .unwrap_or(false);

    if let Some((class_name, method)) = target.split_once(".prototype.") {
        if class_name.is_empty() || method.is_empty() || method.contains('.') {
            return Ok(());
        }
        let mut ast_node = AstNode::new(NodeKind::Method, method, ctx.language());
        ast_node.qualified_name = format!("{class_name}.{method}");
        ast_node.span = SourceSpan::from_ts_node(node);
        let id = ctx.add_node(ast_node)?;
        ctx.set_property(id, "class", class_name);
        return Ok(());
    }

    for prefix in ["module.exports.", "exports."] {
        if let Some(exported) = target.strip_prefix(prefix) {
            if exported.is_empty() || exported.contains('.') {
                return Ok(());
            }
            let kind = if value_is_function {
                NodeKind::Function
            } else {
                NodeKind::Variable
            };
            let id = ctx.add_declaration(kind, exported, node, true)?;
            ctx.set_property(id, "exported", "true");
            return Ok(());
        }
    }
    Ok(())
}

/// Register a `Type` pending for an annotation's named type.
pub(crate) fn type_annotation_ref(
    ctx: &mut BuildCtx,
    owner: NodeId,
    annotation: tree_sitter::Node,
) {
    let Some(ty) = annotation.named_child(0) else {
        return;
    };
    match ty.kind() {
        "type_identifier" | "predefined_type" | "generic_type" | "nested_type_identifier" => {
            let text = ctx.text(ty).to_string();
            ctx.add_pending(owner, RefKind::Type, text, ty);
        }
        _ => {}
    }
}

/// Module name for an import path: the file stem of its last segment.
pub(crate) fn module_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}
