//! Generation targets supported by sdkgen.
//!
//! # Examples
//!
//! ```
//! use sdkgen_core::target::TargetKind;
//! use std::str::FromStr;
//!
//! let target = TargetKind::from_str("typescript").unwrap();
//! assert_eq!(target, TargetKind::TypeScript);
//! assert_eq!(target.as_str(), "typescript");
//! assert_eq!(target.to_string(), "typescript");
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

use crate::types::Language;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Supported targets: five SDK languages and one documentation format
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
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// C# class library
    #[value(name = "csharp")]
    CSharp,
    /// Java (Maven) library
    Java,
    /// Python package
    Python,
    /// Ruby gem
    Ruby,
    /// TypeScript package
    #[value(name = "typescript")]
    TypeScript,
    /// Markdown model reference
    Markdown,
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Ok(TargetKind::CSharp),
            "java" => Ok(TargetKind::Java),
            "python" | "py" => Ok(TargetKind::Python),
            "ruby" | "rb" => Ok(TargetKind::Ruby),
            "typescript" | "ts" => Ok(TargetKind::TypeScript),
            "markdown" | "md" => Ok(TargetKind::Markdown),
            _ => Err(format!("Unknown target kind: {}", s)),
        }
    }
}

impl TargetKind {
    /// Returns the target identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::Java => "java",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::TypeScript => "typescript",
            Self::Markdown => "markdown",
        }
    }

    /// The programming language of a source target, `None` for documentation
    pub fn language(&self) -> Option<Language> {
        match self {
            Self::CSharp => Some(Language::CSharp),
            Self::Java => Some(Language::Java),
            Self::Python => Some(Language::Python),
            Self::Ruby => Some(Language::Ruby),
            Self::TypeScript => Some(Language::TypeScript),
            Self::Markdown => None,
        }
    }

    /// Returns an iterator over all available targets
    pub fn all() -> impl Iterator<Item = Self> {
        use TargetKind::*;
        [CSharp, Java, Python, Ruby, TypeScript, Markdown]
            .iter()
            .copied()
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
