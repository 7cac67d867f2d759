//! Reserved words and identifier rules per language.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Language;

static CSHARP: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
        "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
        "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
        "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
        "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
        "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
        "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
        "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
        "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

static JAVA: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
        "const", "continue", "default", "do", "double", "else", "enum", "extends", "false",
        "final", "finally", "float", "for", "goto", "if", "implements", "import", "instanceof",
        "int", "interface", "long", "native", "new", "null", "package", "private", "protected",
        "public", "return", "short", "static", "strictfp", "super", "switch", "synchronized",
        "this", "throw", "throws", "transient", "true", "try", "var", "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

static PYTHON: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield",
    ]
    .into_iter()
    .collect()
});

static RUBY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "defined?",
        "do", "else", "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next",
        "nil", "not", "or", "redo", "rescue", "retry", "return", "self", "super", "then", "true",
        "undef", "unless", "until", "when", "while", "yield",
    ]
    .into_iter()
    .collect()
});

static TYPESCRIPT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
        "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
        "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
        "true", "try", "typeof", "var", "void", "while", "with", "implements", "interface", "let",
        "package", "private", "protected", "public", "static", "yield",
    ]
    .into_iter()
    .collect()
});

/// npm refuses these as package names
const NPM_BLOCKED: [&str; 2] = ["node_modules", "favicon.ico"];

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

static GEM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("gem name regex"));

static NPM_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:@[a-z0-9-~][a-z0-9-._~]*/)?[a-z0-9-~][a-z0-9-._~]*$").expect("npm name regex")
});

pub fn is_reserved(language: Language, word: &str) -> bool {
    let set = match language {
        Language::CSharp => &CSHARP,
        Language::Java => &JAVA,
        Language::Python => &PYTHON,
        Language::Ruby => &RUBY,
        Language::TypeScript => &TYPESCRIPT,
    };
    set.contains(word)
}

pub fn is_identifier(word: &str) -> bool {
    IDENTIFIER.is_match(word)
}

/// Why a package identifier cannot be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageProblem {
    /// This segment is a keyword
    Reserved(String),
    Invalid(String),
}

/// Check a configured package identifier against the language's rules
pub fn check_package(language: Language, package: &str) -> Result<(), PackageProblem> {
    if package.is_empty() {
        return Err(PackageProblem::Invalid("must not be empty".to_string()));
    }
    match language {
        Language::CSharp | Language::Java => {
            for segment in package.split('.') {
                if !is_identifier(segment) {
                    return Err(PackageProblem::Invalid(format!(
                        "segment '{}' is not an identifier",
                        segment
                    )));
                }
                if is_reserved(language, segment) {
                    return Err(PackageProblem::Reserved(segment.to_string()));
                }
            }
            Ok(())
        }
        Language::Python => {
            if !is_identifier(package) {
                return Err(PackageProblem::Invalid(
                    "must contain only letters, digits, and underscores".to_string(),
                ));
            }
            if is_reserved(language, package) {
                return Err(PackageProblem::Reserved(package.to_string()));
            }
            Ok(())
        }
        Language::Ruby => {
            if !GEM_NAME.is_match(package) {
                return Err(PackageProblem::Invalid(
                    "must be lower snake case".to_string(),
                ));
            }
            if is_reserved(language, package) {
                return Err(PackageProblem::Reserved(package.to_string()));
            }
            Ok(())
        }
        Language::TypeScript => {
            if package.len() > 214 || !NPM_NAME.is_match(package) {
                return Err(PackageProblem::Invalid("not a valid npm package name".to_string()));
            }
            if NPM_BLOCKED.contains(&package) {
                return Err(PackageProblem::Reserved(package.to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert!(is_reserved(Language::Python, "import"));
        assert!(is_reserved(Language::CSharp, "namespace"));
        assert!(is_reserved(Language::Ruby, "end"));
        assert!(!is_reserved(Language::Python, "invoice"));
        assert!(!is_reserved(Language::TypeScript, "Invoice"));
    }

    #[test]
    fn test_check_package() {
        assert_eq!(check_package(Language::Python, "billing_sdk"), Ok(()));
        assert_eq!(
            check_package(Language::Python, "import"),
            Err(PackageProblem::Reserved("import".into()))
        );
        assert_eq!(
            check_package(Language::Java, "com.example.class"),
            Err(PackageProblem::Reserved("class".into()))
        );
        assert!(matches!(
            check_package(Language::CSharp, "Billing..Sdk"),
            Err(PackageProblem::Invalid(_))
        ));
        assert_eq!(check_package(Language::TypeScript, "@acme/billing-sdk"), Ok(()));
        assert!(matches!(
            check_package(Language::TypeScript, "Billing SDK"),
            Err(PackageProblem::Invalid(_))
        ));
        assert!(matches!(
            check_package(Language::Ruby, "BillingSdk"),
            Err(PackageProblem::Invalid(_))
        ));
    }
}
