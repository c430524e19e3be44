//! C++ reference resolution: the shared C-family core with `::`-qualified
//! names, templates, and class lookup enabled.

use super::{c_cpp, LanguageResolver};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{Resolution, ResolveContext, ResolveRequest};

pub struct CppResolver;

impl LanguageResolver for CppResolver {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn resolve(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
        c_cpp::resolve(req, ctx, true)
    }
}
