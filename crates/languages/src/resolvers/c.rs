//! C reference resolution: the shared C-family core in C mode.

use super::{c_cpp, LanguageResolver};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{Resolution, ResolveContext, ResolveRequest};

pub struct CResolver;

impl LanguageResolver for CResolver {
    fn language(&self) -> Language {
        Language::C
    }

    fn resolve(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
        c_cpp::resolve(req, ctx, false)
    }
}
