//! Language tags and file-to-language inference.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{Display, EnumString};

/// Programming language enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Language {
    C,
    Cpp,
    Python,
    JavaScript,
    TypeScript,
    Unknown,
}

impl Language {
    /// Qualified-name separator for this language.
    ///
    /// C++ scopes join with `::`; everything else uses `.`. C qualified
    /// names are bare, so its separator is never exercised in practice.
    pub fn separator(&self) -> &'static str {
        match self {
            Language::Cpp => "::",
            _ => ".",
        }
    }

    /// File extensions (lowercase, without the dot) owned by this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hh"],
            Language::Python => &["py"],
            Language::JavaScript => &["js"],
            Language::TypeScript => &["ts"],
            Language::Unknown => &[],
        }
    }

    /// Map a file extension (case-insensitive) to a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Some(Language::Cpp),
            "py" => Some(Language::Python),
            "js" => Some(Language::JavaScript),
            "ts" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Infer a language from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Infer a language from source content alone.
    ///
    /// Used only when the extension is unknown. Ties between C and C++
    /// break toward C; TypeScript is chosen over JavaScript only on
    /// TS-specific markers.
    pub fn from_content(source: &str) -> Self {
        if source.contains("#include") || source.contains("int main(") {
            if source.contains("::")
                || source.contains("namespace ")
                || source.contains("template<")
                || source.contains("template <")
            {
                return Language::Cpp;
            }
            return Language::C;
        }

        if source.contains("def ") {
            return Language::Python;
        }

        if source.contains("function ") || source.contains("const ") || source.contains("=>") {
            if source.contains(": string")
                || source.contains(": number")
                || source.contains("interface ")
            {
                return Language::TypeScript;
            }
            return Language::JavaScript;
        }

        if source.contains("import ") || source.contains("class ") {
            return Language::Python;
        }

        Language::Unknown
    }

    /// Infer a language from a path, falling back to content heuristics.
    pub fn detect(path: &Path, source: &str) -> Self {
        Self::from_path(path).unwrap_or_else(|| Self::from_content(source))
    }

    /// Whether this language belongs to the C family.
    pub fn is_c_family(&self) -> bool {
        matches!(self, Language::C | Language::Cpp)
    }

    /// Whether this language belongs to the ECMAScript family.
    pub fn is_ecmascript(&self) -> bool {
        matches!(self, Language::JavaScript | Language::TypeScript)
    }
}
