use serde::{Deserialize, Serialize};
use std::fmt;

/// Language tag derived from a file extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Shell,
    /// Holds the lowercase extension without the dot (empty if none).
    Unsupported(String),
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Language::Python,
            "js" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "sh" => Language::Shell,
            other => Language::Unsupported(other.to_string()),
        }
    }

    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Self::from_extension(ext),
            _ => Language::Unsupported(String::new()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Shell => "Shell",
            Language::Unsupported(ext) => ext,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(Language::from_path("src/app.py"), Language::Python);
        assert_eq!(Language::from_path("web/index.JS"), Language::JavaScript);
        assert_eq!(Language::from_path("web/types.ts"), Language::TypeScript);
        assert_eq!(Language::from_path("scripts/run.sh"), Language::Shell);
    }

    #[test]
    fn test_unsupported_and_extensionless() {
        assert_eq!(
            Language::from_path("docs/notes.md"),
            Language::Unsupported("md".to_string())
        );
        assert_eq!(
            Language::from_path("Dockerfile"),
            Language::Unsupported(String::new())
        );
        // Dotfiles have no extension.
        assert_eq!(
            Language::from_path("cfg/.bashrc"),
            Language::Unsupported(String::new())
        );
        // A dot in a folder name is not an extension.
        assert_eq!(
            Language::from_path("v1.2/Makefile"),
            Language::Unsupported(String::new())
        );
    }
}
