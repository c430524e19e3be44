//! Directory discovery.
//!
//! A gitignore-aware walk that yields source files with their inferred
//! languages; the driver feeds the results through its add-file path.

use scopegraph_core::language::Language;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Walk a directory and collect candidate source files.
///
/// `extensions`, when given, filters case-insensitively; otherwise any
/// extension with a known language qualifies. Entries come back in walk
/// order.
pub(crate) fn walk_directory(
    dir: &Path,
    recursive: bool,
    extensions: Option<&[&str]>,
) -> Vec<(PathBuf, Language)> {
    let mut builder = ignore::WalkBuilder::new(dir);
    builder
        .standard_filters(true)
        .hidden(false)
        .require_git(false);
    if !recursive {
        builder.max_depth(Some(1));
    }

    let lowered: Option<Vec<String>> =
        extensions.map(|exts| exts.iter().map(|e| e.to_ascii_lowercase()).collect());

    let mut found = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("error reading directory entry: {e}");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if let Some(filter) = &lowered {
            if !filter.iter().any(|f| f.eq_ignore_ascii_case(ext)) {
                continue;
            }
        }
        let Some(language) = Language::from_extension(ext) else {
            continue;
        };
        found.push((path.to_path_buf(), language));
    }

    debug!(dir = %dir.display(), files = found.len(), "directory walk complete");
    found
}
