//! Include/import target planning.
//!
//! Reads the structured targets the adapter stored on Include/Import
//! nodes and maps them to filesystem candidates; the driver follows the
//! first candidate that exists.

use scopegraph_core::ast::{Ast, ImportKind, NodeKind};
use scopegraph_core::config::ProjectConfig;
use scopegraph_core::language::Language;
use std::path::{Path, PathBuf};

/// One include/import edge to chase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IncludePlan {
    /// Candidate paths, in preference order.
    pub candidates: Vec<PathBuf>,
    /// Language to parse the target as, when inferable.
    pub language: Option<Language>,
    /// The path as written in source, for diagnostics.
    pub written: String,
}

/// Plan the include/import edges of one file.
pub(crate) fn plan_includes(ast: &Ast, config: &ProjectConfig) -> Vec<IncludePlan> {
    if !config.follow_includes {
        return Vec::new();
    }

    let dir = ast
        .file_path()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let language = ast.language();

    let mut plans = Vec::new();
    for (_, node) in ast.iter() {
        if !matches!(node.kind, NodeKind::Include | NodeKind::Import) {
            continue;
        }
        let Some(target) = &node.import_target else {
            continue;
        };

        let plan = match target.kind {
            ImportKind::LocalInclude => IncludePlan {
                candidates: vec![dir.join(&target.path)],
                language: Language::from_path(Path::new(&target.path)).or(Some(language)),
                written: target.path.clone(),
            },
            ImportKind::SystemInclude => {
                if !config.parse_headers {
                    continue;
                }
                IncludePlan {
                    candidates: config
                        .system_include_roots
                        .iter()
                        .map(|root| root.join(&target.path))
                        .collect(),
                    language: Language::from_path(Path::new(&target.path)).or(Some(language)),
                    written: target.path.clone(),
                }
            }
            ImportKind::Module => IncludePlan {
                candidates: module_candidates(&dir, &target.path, language),
                language: Some(language),
                written: target.path.clone(),
            },
        };
        if !plan.candidates.is_empty() {
            // Several imports of one module plan the same candidates.
            if !plans.contains(&plan) {
                plans.push(plan);
            }
        }
    }
    plans
}

/// Filesystem candidates for a module path, relative to the importing
/// file's directory.
fn module_candidates(dir: &Path, written: &str, language: Language) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    match language {
        Language::Python => {
            // `a.b` → a/b.py, with a flat fallback for sibling modules.
            let trimmed = written.trim_start_matches('.');
            if trimmed.is_empty() {
                return candidates;
            }
            let slashed = trimmed.replace('.', "/");
            candidates.push(dir.join(format!("{slashed}.py")));
            candidates.push(dir.join(slashed).join("__init__.py"));
            if trimmed.contains('.') {
                candidates.push(dir.join(format!("{trimmed}.py")));
            }
        }
        Language::JavaScript | Language::TypeScript => {
            // Bare specifiers name packages, not project files.
            if !written.starts_with('.') && !written.starts_with('/') {
                return candidates;
            }
            let base = if written.starts_with('/') {
                PathBuf::from(written)
            } else {
                dir.join(written)
            };
            if base.extension().is_some() {
                candidates.push(base);
            } else {
                let own = match language {
                    Language::TypeScript => ["ts", "js"],
                    _ => ["js", "ts"],
                };
                for ext in own {
                    candidates.push(base.with_extension(ext));
                }
                for ext in own {
                    candidates.push(base.join(format!("index.{ext}")));
                }
            }
        }
        _ => {}
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopegraph_languages::build_ast;

    #[test]
    fn test_plan_local_include() {
        let ast = build_ast(
            Language::C,
            Path::new("/proj/src/a.c"),
            "#include \"util.h\"\n#include <stdio.h>\n",
        )
        .unwrap();

        let config = ProjectConfig::default();
        let plans = plan_includes(&ast, &config);
        // System include skipped: parse_headers defaults to off.
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].candidates, vec![PathBuf::from("/proj/src/util.h")]);
        assert_eq!(plans[0].language, Some(Language::C));
    }

    #[test]
    fn test_plan_system_include_when_enabled() {
        let ast = build_ast(Language::C, Path::new("/proj/a.c"), "#include <stdio.h>\n").unwrap();

        let config = ProjectConfig::builder()
            .parse_headers(true)
            .system_include_roots(vec![PathBuf::from("/sysroot")])
            .build()
            .unwrap();
        let plans = plan_includes(&ast, &config);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].candidates, vec![PathBuf::from("/sysroot/stdio.h")]);
    }

    #[test]
    fn test_plan_respects_follow_includes() {
        let ast = build_ast(
            Language::C,
            Path::new("/proj/a.c"),
            "#include \"util.h\"\n",
        )
        .unwrap();

        let config = ProjectConfig::builder()
            .follow_includes(false)
            .build()
            .unwrap();
        assert!(plan_includes(&ast, &config).is_empty());
    }

    #[test]
    fn test_python_module_candidates() {
        let dir = PathBuf::from("/proj/mod");
        let candidates = module_candidates(&dir, "a", Language::Python);
        assert_eq!(candidates[0], PathBuf::from("/proj/mod/a.py"));

        let dotted = module_candidates(&dir, "pkg.util", Language::Python);
        assert!(dotted.contains(&PathBuf::from("/proj/mod/pkg/util.py")));
    }

    #[test]
    fn test_js_module_candidates() {
        let dir = PathBuf::from("/proj/src");
        let relative = module_candidates(&dir, "./util", Language::JavaScript);
        assert_eq!(relative[0], PathBuf::from("/proj/src/util.js"));

        // Bare package specifiers are not project files.
        assert!(module_candidates(&dir, "lodash", Language::JavaScript).is_empty());
    }
}
