//! Shared resolution core for the C family.

use super::generic;
use scopegraph_core::ast::{ImportKind, NodeHandle};
use scopegraph_core::resolution::{RefKind, Resolution, ResolveContext, ResolveRequest};

/// Resolution shared by C and C++. `cpp` enables `::`-qualified names,
/// template heads, and class lookup.
pub(crate) fn resolve(
    req: &ResolveRequest<'_>,
    ctx: &ResolveContext<'_>,
    cpp: bool,
) -> Resolution {
    match req.ref_kind {
        RefKind::Import => resolve_include(req, ctx),
        RefKind::Use if req.name.contains("->") || req.name.contains('.') => {
            resolve_member_access(req, ctx)
        }
        _ => {
            if cpp {
                if let Some(resolution) = cpp_paths(req, ctx) {
                    return resolution;
                }
            }
            generic::resolve(req, ctx)
        }
    }
}

/// `#include` targets resolve to the included file's module entry by the
/// written path, then by its basename. Unresolved system includes are
/// accepted unless external resolution is demanded.
fn resolve_include(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    if let Some(entry) = ctx.index.lookup(req.name) {
        return Resolution::Target(entry.node());
    }
    let basename = req.name.rsplit('/').next().unwrap_or(req.name);
    if let Some(entry) = ctx.index.lookup(basename) {
        return Resolution::Target(entry.node());
    }

    let is_system = ctx
        .asts
        .node(req.node)
        .and_then(|n| n.import_target.as_ref())
        .map(|t| t.kind == ImportKind::SystemInclude)
        .unwrap_or(false);
    if is_system && !ctx.options.resolve_external_symbols {
        return Resolution::Intrinsic;
    }
    Resolution::NotFound
}

/// `a.b` / `a->b`: resolve the owner aggregate, then scan its members.
fn resolve_member_access(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    let (owner, member) = match req.name.split_once("->") {
        Some(pair) => pair,
        None => match req.name.split_once('.') {
            Some(pair) => pair,
            None => return Resolution::NotFound,
        },
    };
    let (owner, member) = (owner.trim(), member.trim());
    if owner.is_empty() || member.is_empty() {
        return Resolution::NotFound;
    }

    let Some(owner_entry) = ctx.index.scope_lookup(owner, req.scope, req.language) else {
        return Resolution::NotFound;
    };
    find_member(ctx, owner_entry.node(), member)
        .map(Resolution::Target)
        .unwrap_or(Resolution::NotFound)
}

/// Scan an aggregate node's children for a member by name.
pub(crate) fn find_member(
    ctx: &ResolveContext<'_>,
    owner: NodeHandle,
    member: &str,
) -> Option<NodeHandle> {
    let ast = ctx.asts.ast(owner.file)?;
    let owner_node = ast.get(owner.node)?;

    // A variable owner (`instance.field`) resolves through its type first.
    let aggregate = if owner_node.kind == scopegraph_core::ast::NodeKind::Variable {
        owner_node
            .pending_references
            .iter()
            .find(|p| p.kind == RefKind::Type)
            .and_then(|p| ctx.index.lookup(&p.name))
            .map(|e| e.node())
            .or_else(|| {
                owner_node
                    .references
                    .iter()
                    .find(|r| r.kind == RefKind::Type)
                    .map(|r| r.target)
            })
            .unwrap_or(owner)
    } else {
        owner
    };

    let ast = ctx.asts.ast(aggregate.file)?;
    for &child in ast.children(aggregate.node) {
        if let Some(node) = ast.get(child) {
            if node.name == member {
                return Some(NodeHandle {
                    file: aggregate.file,
                    node: child,
                });
            }
        }
    }
    None
}

/// C++-only paths: template heads, `::`-qualified names, class lookup.
fn cpp_paths(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Option<Resolution> {
    // `X<…>` matches on the bare head.
    let name = match req.name.find('<') {
        Some(idx) => req.name[..idx].trim_end(),
        None => req.name,
    };
    if name.is_empty() {
        return None;
    }

    if let Some((namespace, rest)) = name.split_once("::") {
        if let Some(entry) = ctx.index.lookup(name) {
            return Some(Resolution::Target(entry.node()));
        }
        // Resolve the namespace, then the remainder inside it.
        if let Some(ns_entry) = ctx.index.scope_lookup(namespace, req.scope, req.language) {
            let qualified = format!("{}::{}", ns_entry.qualified_name(), rest);
            if let Some(entry) = ctx.index.lookup(&qualified) {
                return Some(Resolution::Target(entry.node()));
            }
        }
        return None;
    }

    if name.len() < req.name.len() {
        // Bare template head.
        if let Some(entry) = ctx.index.scope_lookup(name, req.scope, req.language) {
            return Some(Resolution::Target(entry.node()));
        }
        return None;
    }

    if matches!(req.ref_kind, RefKind::Type | RefKind::Inheritance) {
        if let Some(entry) = ctx.index.scope_lookup(name, req.scope, req.language) {
            return Some(Resolution::Target(entry.node()));
        }
    }

    None
}
