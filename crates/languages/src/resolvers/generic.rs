//! Generic fallback resolution: exact lookup, then scope-aware lookup.

use super::LanguageResolver;
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{Resolution, ResolveContext, ResolveRequest};

/// Direct lookup, then scope-aware lookup from the enclosing scope.
pub(crate) fn resolve(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    if let Some(entry) = ctx.index.lookup(req.name) {
        return Resolution::Target(entry.node());
    }
    if let Some(entry) = ctx.index.scope_lookup(req.name, req.scope, req.language) {
        return Resolution::Target(entry.node());
    }
    Resolution::NotFound
}

/// The registry's fallback for languages without a dedicated resolver.
pub struct GenericResolver;

impl LanguageResolver for GenericResolver {
    fn language(&self) -> Language {
        Language::Unknown
    }

    fn resolve(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
        resolve(req, ctx)
    }
}
