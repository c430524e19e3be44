//! C++ extensions over the shared C-family walk: namespaces, classes,
//! templates, linkage blocks, and alias declarations.

use super::{c_cpp, BuildCtx};
use scopegraph_core::ast::{AstNode, NodeKind, SourceSpan};
use scopegraph_core::error::Result;
use scopegraph_core::resolution::RefKind;

pub(crate) fn build(ctx: &mut BuildCtx, root: tree_sitter::Node) -> Result<()> {
    c_cpp::build_file(ctx, root, true)
}

pub(crate) fn handle_cpp_item(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    kind: &str,
    in_class: bool,
) -> Result<()> {
    match kind {
        "namespace_definition" => namespace(ctx, node),
        "class_specifier" => c_cpp::record(ctx, node, NodeKind::Class, true),
        "template_declaration" => template(ctx, node, in_class),
        "linkage_specification" => {
            // extern "C" { … } — contents stay in the enclosing scope.
            match node.child_by_field_name("body") {
                Some(body) if body.kind() == "declaration_list" => {
                    c_cpp::walk_items(ctx, body, true, in_class)
                }
                Some(body) => c_cpp::handle_item(ctx, body, true, in_class),
                None => Ok(()),
            }
        }
        "alias_declaration" => alias(ctx, node),
        "using_declaration" => using_directive(ctx, node),
        _ => Ok(()),
    }
}

/// `using namespace X;` — X becomes a scope prefix for name lookup.
/// Plain `using X::y;` declarations are not modeled.
fn using_directive(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    if !ctx.text(node).contains("namespace") {
        return Ok(());
    }
    let mut walker = node.walk();
    let target = node
        .named_children(&mut walker)
        .find(|c| {
            matches!(
                c.kind(),
                "identifier" | "qualified_identifier" | "namespace_identifier"
            )
        })
        .map(|c| ctx.text(c).to_string());
    let Some(target) = target.filter(|t| !t.is_empty()) else {
        return Ok(());
    };

    let mut ast_node = AstNode::new(NodeKind::Other, target, ctx.language());
    ast_node.span = SourceSpan::from_ts_node(node);
    ast_node.is_definition = false;
    let id = ctx.add_node(ast_node)?;
    ctx.set_property(id, "using_namespace", "true");
    Ok(())
}

fn namespace(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(body) = node.child_by_field_name("body") else {
        return Ok(());
    };
    match node.child_by_field_name("name") {
        Some(name_node) => {
            let name = ctx.text(name_node).to_string();
            let id = ctx.add_declaration(NodeKind::Namespace, &name, node, true)?;
            let qualified = ctx.qualified_name_of(id);
            ctx.push_scope(id, qualified);
            c_cpp::walk_items(ctx, body, true, false)?;
            ctx.pop_scope();
            Ok(())
        }
        // Anonymous namespaces contribute no scope segment.
        None => c_cpp::walk_items(ctx, body, true, false),
    }
}

/// Unwrap a template declaration to the templated item.
fn template(ctx: &mut BuildCtx, node: tree_sitter::Node, in_class: bool) -> Result<()> {
    let mut walker = node.walk();
    let inner: Vec<_> = node
        .named_children(&mut walker)
        .filter(|c| !matches!(c.kind(), "template_parameter_list"))
        .collect();
    for item in inner {
        c_cpp::handle_item(ctx, item, true, in_class)?;
    }
    Ok(())
}

/// `using X = Y;` — an alias with a type reference to its target.
fn alias(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node).to_string();
    if name.is_empty() {
        return Ok(());
    }
    let id = ctx.add_declaration(NodeKind::Typedef, &name, node, true)?;
    if let Some(ty) = node.child_by_field_name("type") {
        let text = ctx.text(ty).to_string();
        ctx.add_pending(id, RefKind::Type, text, ty);
    }
    Ok(())
}
