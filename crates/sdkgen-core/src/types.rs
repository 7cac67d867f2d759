//! Mapping from IR types to each target language's native type syntax.
//!
//! [`map_type`] is total over [`PrimitiveKind`]: the primitive set is a closed
//! enum, so a primitive a language table forgot is a compile error rather
//! than a runtime condition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{DataTypeRef, PrimitiveKind, TypeKind};

/// Programming languages with a source-code backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Java,
    Python,
    Ruby,
    TypeScript,
}

impl Language {
    pub fn all() -> impl Iterator<Item = Self> {
        use Language::*;
        [CSharp, Java, Python, Ruby, TypeScript].iter().copied()
    }
}

/// A type as written in a target language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeExpression(String);

impl TypeExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map an IR type reference to the language's nearest native type
pub fn map_type(data_type: &DataTypeRef, language: Language) -> TypeExpression {
    let text = match language {
        Language::TypeScript => typescript(data_type),
        Language::CSharp => csharp(data_type),
        Language::Java => java(data_type),
        Language::Python => python(data_type),
        Language::Ruby => ruby(data_type),
    };
    TypeExpression(text)
}

fn typescript(t: &DataTypeRef) -> String {
    let base = match &t.kind {
        TypeKind::Named(name) => name.clone(),
        TypeKind::Primitive(p) => match p {
            PrimitiveKind::String | PrimitiveKind::DateTime => "string",
            PrimitiveKind::Integer | PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Binary => "Blob",
        }
        .to_string(),
    };
    let mut out = base;
    if t.is_array {
        out = if t.item_nullable {
            format!("({} | null)[]", out)
        } else {
            format!("{}[]", out)
        };
    }
    if t.is_nullable {
        out = format!("{} | null", out);
    }
    out
}

fn csharp(t: &DataTypeRef) -> String {
    let base = match &t.kind {
        TypeKind::Named(name) => name.clone(),
        TypeKind::Primitive(p) => match p {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "int",
            PrimitiveKind::Number => "double",
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::DateTime => "DateTimeOffset",
            PrimitiveKind::Binary => "byte[]",
        }
        .to_string(),
    };
    let mut out = base;
    if t.is_array {
        let item = if t.item_nullable { format!("{}?", out) } else { out };
        out = format!("List<{}>", item);
    }
    if t.is_nullable {
        out.push('?');
    }
    out
}

fn java(t: &DataTypeRef) -> String {
    // Unboxed primitives only where the value can never be null
    let (unboxed, boxed) = match &t.kind {
        TypeKind::Named(name) => (name.clone(), name.clone()),
        TypeKind::Primitive(p) => {
            let (u, b) = match p {
                PrimitiveKind::String => ("String", "String"),
                PrimitiveKind::Integer => ("int", "Integer"),
                PrimitiveKind::Number => ("double", "Double"),
                PrimitiveKind::Boolean => ("boolean", "Boolean"),
                PrimitiveKind::DateTime => ("OffsetDateTime", "OffsetDateTime"),
                PrimitiveKind::Binary => ("byte[]", "byte[]"),
            };
            (u.to_string(), b.to_string())
        }
    };
    let out = if t.is_array {
        let item = if t.item_nullable {
            format!("@Nullable {}", boxed)
        } else {
            boxed
        };
        format!("List<{}>", item)
    } else if t.is_nullable {
        boxed
    } else {
        unboxed
    };
    if t.is_nullable {
        format!("@Nullable {}", out)
    } else {
        out
    }
}

fn python(t: &DataTypeRef) -> String {
    let base = match &t.kind {
        TypeKind::Named(name) => name.clone(),
        TypeKind::Primitive(p) => match p {
            PrimitiveKind::String => "str",
            PrimitiveKind::Integer => "int",
            PrimitiveKind::Number => "float",
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::DateTime => "datetime",
            PrimitiveKind::Binary => "bytes",
        }
        .to_string(),
    };
    let mut out = base;
    if t.is_array {
        let item = if t.item_nullable {
            format!("Optional[{}]", out)
        } else {
            out
        };
        out = format!("List[{}]", item);
    }
    if t.is_nullable {
        out = format!("Optional[{}]", out);
    }
    out
}

/// YARD type notation, used in generated documentation comments
fn ruby(t: &DataTypeRef) -> String {
    let base = match &t.kind {
        TypeKind::Named(name) => name.clone(),
        TypeKind::Primitive(p) => match p {
            PrimitiveKind::String | PrimitiveKind::Binary => "String",
            PrimitiveKind::Integer => "Integer",
            PrimitiveKind::Number => "Float",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::DateTime => "Time",
        }
        .to_string(),
    };
    let mut out = base;
    if t.is_array {
        out = if t.item_nullable {
            format!("Array<{}, nil>", out)
        } else {
            format!("Array<{}>", out)
        };
    }
    if t.is_nullable {
        out = format!("{}, nil", out);
    }
    out
}
