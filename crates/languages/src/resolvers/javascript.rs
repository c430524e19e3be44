//! JavaScript reference resolution: the shared JS/TS core.

use super::{js_ts, LanguageResolver};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{Resolution, ResolveContext, ResolveRequest};

pub struct JavaScriptResolver;

impl LanguageResolver for JavaScriptResolver {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn resolve(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
        js_ts::resolve(req, ctx)
    }
}
