//! Shared resolution core for JavaScript and TypeScript.

use scopegraph_core::ast::{NodeKind, PendingReference};
use scopegraph_core::resolution::{RefKind, Resolution, ResolveContext, ResolveRequest};

/// The JavaScript resolution chain, shared with TypeScript.
pub(crate) fn resolve(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    match req.ref_kind {
        RefKind::Import => resolve_import(req, ctx),
        _ => resolve_name(req, ctx),
    }
}

/// Imports resolve to module entries by the stem of the quoted path.
fn resolve_import(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    let stem = ctx
        .asts
        .node(req.node)
        .and_then(|n| n.import_target.as_ref())
        .map(|t| module_stem(&t.path))
        .unwrap_or_else(|| req.name.to_string());

    let module = ctx
        .index
        .lookup_all(&stem)
        .iter()
        .find(|e| e.kind() == NodeKind::Module)
        .map(|e| Resolution::Target(e.node()));
    if let Some(Resolution::Target(target)) = module {
        if target.file == req.node.file {
            return Resolution::Circular;
        }
        return Resolution::Target(target);
    }

    if ctx.options.resolve_external_symbols {
        Resolution::NotFound
    } else {
        Resolution::Intrinsic
    }
}

fn resolve_name(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    let name = req.name;

    if let Some(entry) = ctx.index.lookup(name) {
        return Resolution::Target(entry.node());
    }

    // CommonJS export forms alias the bare name.
    for prefix in ["module.exports.", "exports."] {
        if let Some(stripped) = name.strip_prefix(prefix) {
            if let Some(entry) = ctx.index.lookup(stripped) {
                return Resolution::Target(entry.node());
            }
        }
    }

    // `Class.prototype.method` names the method under the class.
    if let Some((class_name, method)) = name.split_once(".prototype.") {
        if !class_name.is_empty() && !method.is_empty() {
            if ctx
                .index
                .scope_lookup(class_name, req.scope, req.language)
                .is_some()
            {
                let qualified = format!("{class_name}.{method}");
                if let Some(entry) = ctx.index.lookup(&qualified) {
                    return Resolution::Target(entry.node());
                }
            }
            return Resolution::NotFound;
        }
    }

    // `x.member` where the receiver's class is not statically known:
    // accept a unique method by simple name, flag several as ambiguous.
    if let Some(member) = name.rsplit('.').next().filter(|m| m.len() < name.len()) {
        if matches!(req.ref_kind, RefKind::Call) && !member.is_empty() {
            if let Some(resolution) = resolve_unique_method(ctx, member, req) {
                return resolution;
            }
        }
    }

    if let Some(entry) = ctx.index.scope_lookup(name, req.scope, req.language) {
        return Resolution::Target(entry.node());
    }

    Resolution::NotFound
}

/// Dynamic receivers resolve by unique simple name: one method with the
/// name resolves, several are ambiguous, none falls through.
fn resolve_unique_method(
    ctx: &ResolveContext<'_>,
    member: &str,
    req: &ResolveRequest<'_>,
) -> Option<Resolution> {
    // Try the receiver as a known binding with a resolvable class first.
    let receiver = req.name.rsplit_once('.').map(|(r, _)| r)?;
    if let Some(entry) = ctx.index.scope_lookup(receiver, req.scope, req.language) {
        if let Some(node) = ctx.asts.node(entry.node()) {
            if let Some(class_name) = variable_class(node) {
                let qualified = format!("{class_name}.{member}");
                if let Some(found) = ctx.index.lookup(&qualified) {
                    return Some(Resolution::Target(found.node()));
                }
            }
        }
    }

    let methods: Vec<_> = ctx
        .index
        .get_by_simple_name(member)
        .into_iter()
        .filter(|e| e.kind() == NodeKind::Method)
        .collect();
    match methods.len() {
        0 => None,
        1 => Some(Resolution::Target(methods[0].node())),
        _ => Some(Resolution::Ambiguous),
    }
}

/// Class named by a variable's type reference, when it has one.
fn variable_class(node: &scopegraph_core::ast::AstNode) -> Option<String> {
    if node.kind != NodeKind::Variable {
        return None;
    }
    node.pending_references
        .iter()
        .find(|p: &&PendingReference| p.kind == RefKind::Type)
        .map(|p| p.name.clone())
}

/// Module name for an import path: the file stem of its last segment.
pub(crate) fn module_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}
