//! Languages accepted for single-snippet scans

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Languages the service accepts as a snippet hint.
///
/// The set mirrors what the engine can analyze out of the box; bulk and
/// upload scans are language-agnostic because the engine dispatches on
/// file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Typescript,
    Java,
    Go,
    Php,
    Ruby,
    C,
    Cpp,
    Csharp,
    Kotlin,
    Rust,
    Scala,
    Swift,
}

impl Language {
    /// File extension used when materializing a snippet in a workspace
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Javascript => "js",
            Language::Typescript => "ts",
            Language::Java => "java",
            Language::Go => "go",
            Language::Php => "php",
            Language::Ruby => "rb",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Csharp => "cs",
            Language::Kotlin => "kt",
            Language::Rust => "rs",
            Language::Scala => "scala",
            Language::Swift => "swift",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Csharp => "csharp",
            Language::Kotlin => "kotlin",
            Language::Rust => "rust",
            Language::Scala => "scala",
            Language::Swift => "swift",
        }
    }

    fn all() -> &'static [Language] {
        &[
            Language::Python,
            Language::Javascript,
            Language::Typescript,
            Language::Java,
            Language::Go,
            Language::Php,
            Language::Ruby,
            Language::C,
            Language::Cpp,
            Language::Csharp,
            Language::Kotlin,
            Language::Rust,
            Language::Scala,
            Language::Swift,
        ]
    }

    /// Comma-separated list of accepted identifiers, for error messages
    pub fn supported() -> String {
        Self::all()
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Error returned when a language hint is not recognized
#[derive(Debug, thiserror::Error)]
#[error("Language '{0}' not supported. Supported: {supported}", supported = Language::supported())]
pub struct UnknownLanguage(pub String);

impl std::str::FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::all()
            .iter()
            .find(|l| l.as_str() == lowered)
            .copied()
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
