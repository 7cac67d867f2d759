//! String transformation utilities for code generation

use serde::{Deserialize, Serialize};

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            // Word boundary on a lower-to-upper transition only
            if i > 0 && prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if ch == '-' || ch == '_' || ch == ' ' || ch == '.' || ch == '/' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    // Remove duplicate underscores and trim
    let mut final_result = String::new();
    let mut prev_underscore = false;
    for ch in result.chars() {
        if ch == '_' {
            if !prev_underscore && !final_result.is_empty() {
                final_result.push(ch);
            }
            prev_underscore = true;
        } else {
            final_result.push(ch);
            prev_underscore = false;
        }
    }

    final_result.trim_matches('_').to_string()
}

/// Convert a string to UpperCamelCase (PascalCase)
pub fn to_upper_camel_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect()
}

/// Convert a string to lowerCamelCase
pub fn to_lower_camel_case(s: &str) -> String {
    let upper_camel = to_upper_camel_case(s);
    let mut chars = upper_camel.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Convert a string to kebab-case
pub fn to_kebab_case(s: &str) -> String {
    to_snake_case(s).replace('_', "-")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Casing rule applied to emitted identifiers and file names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    /// Keep the name exactly as declared in the API description
    Preserve,
    /// snake_case
    Snake,
    /// lowerCamelCase
    Camel,
    /// UpperCamelCase
    Pascal,
    /// kebab-case
    Kebab,
}

impl Casing {
    pub fn apply(&self, s: &str) -> String {
        match self {
            Self::Preserve => s.to_string(),
            Self::Snake => to_snake_case(s),
            Self::Camel => to_lower_camel_case(s),
            Self::Pascal => to_upper_camel_case(s),
            Self::Kebab => to_kebab_case(s),
        }
    }
}

/// Naive English pluralization, enough for resource names like `Invoice`
/// or `Activity`. Words already ending in `s` are left alone.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if word.is_empty() || lower.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y').or_else(|| word.strip_suffix('Y')) {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{}ies", stem);
        }
    }
    if lower.ends_with('x') || lower.ends_with("ch") || lower.ends_with("sh") {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

/// Reference page anchor for an endpoint, e.g. `GET /invoices/{id}` becomes
/// `get_invoices-id`.
pub fn reference_slug(method: &str, path: &str) -> String {
    let fixed_path = path
        .trim_start_matches('/')
        .to_lowercase()
        .replace('/', "-")
        .replace(['{', '}'], "");
    format!("{}_{}", method.to_lowercase(), fixed_path)
}

/// Split a documentation string into trimmed lines suitable for doc comments
pub fn doc_lines(text: &str) -> Vec<String> {
    let lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("FindPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
        assert_eq!(to_snake_case("find_pets_by_status"), "find_pets_by_status");
        assert_eq!(to_snake_case("HTTPResponse"), "httpresponse");
        assert_eq!(to_snake_case("getHTTPResponse"), "get_httpresponse");
        assert_eq!(to_snake_case("get HTTP Response"), "get_http_response");
        assert_eq!(to_snake_case("address1Line"), "address1_line");
        assert_eq!(to_snake_case("com.example.sdk"), "com_example_sdk");
    }

    #[test]
    fn test_to_upper_camel_case() {
        assert_eq!(to_upper_camel_case("find_pets_by_status"), "FindPetsByStatus");
        assert_eq!(to_upper_camel_case("findPetsByStatus"), "FindPetsByStatus");
        assert_eq!(to_upper_camel_case("find-pets-by-status"), "FindPetsByStatus");
        assert_eq!(to_upper_camel_case("FIND_PETS_BY_STATUS"), "FindPetsByStatus");
        assert_eq!(to_upper_camel_case("http_response"), "HttpResponse");
    }

    #[test]
    fn test_to_lower_camel_case() {
        assert_eq!(to_lower_camel_case("find_pets_by_status"), "findPetsByStatus");
        assert_eq!(to_lower_camel_case("FindPetsByStatus"), "findPetsByStatus");
        assert_eq!(to_lower_camel_case("FIND_PETS_BY_STATUS"), "findPetsByStatus");
        assert_eq!(to_lower_camel_case(""), "");
    }

    #[test]
    fn test_casing_apply() {
        assert_eq!(Casing::Preserve.apply("invoiceId"), "invoiceId");
        assert_eq!(Casing::Snake.apply("invoiceId"), "invoice_id");
        assert_eq!(Casing::Pascal.apply("invoiceId"), "InvoiceId");
        assert_eq!(Casing::Kebab.apply("invoiceId"), "invoice-id");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("Invoice"), "Invoices");
        assert_eq!(pluralize("Activity"), "Activities");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Batch"), "Batches");
        assert_eq!(pluralize("Contacts"), "Contacts");
    }

    #[test]
    fn test_slugs() {
        assert_eq!(reference_slug("GET", "/invoices/{id}"), "get_invoices-id");
        assert_eq!(reference_slug("post", "/v1/Payments"), "post_v1-payments");
    }

    #[test]
    fn test_doc_lines_trims_blank_edges() {
        assert_eq!(doc_lines("\n  \nfirst\n\nsecond  \n\n"), vec!["first", "", "second"]);
        assert!(doc_lines("").is_empty());
    }
}
