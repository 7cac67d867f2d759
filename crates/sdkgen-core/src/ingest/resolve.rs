//! Resolution of raw JSON schema fragments into [`DataTypeRef`]s.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use crate::error::IngestError;
use crate::schema::{DataTypeRef, PrimitiveKind};

/// Alias chains longer than this are treated as reference cycles
const MAX_DEPTH: usize = 32;

const REF_PREFIXES: [&str; 2] = ["#/components/schemas/", "#/definitions/"];

/// `^.{MIN,MAX}$` style patterns that only constrain length
static LENGTH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\^?\.\{(\d*)(?:(,)(\d*))?\}\$?$").expect("length pattern regex")
});

/// How a named definition participates in the IR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Becomes a [`SchemaItem`](crate::schema::SchemaItem); references stay named
    Object,
    /// Enum, primitive, or array definition; references are replaced by its type
    Alias,
}

/// Field-level markers that sit beside the type
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Markers {
    pub description: String,
    pub read_only: bool,
    pub deprecated: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

/// Resolves schema fragments against the document's named definitions
pub(crate) struct Resolver<'a> {
    pub definitions: &'a Map<String, JsonValue>,
    /// Pointer prefix of the definitions section, for error locations
    pub prefix: &'static str,
}

impl<'a> Resolver<'a> {
    pub fn new(definitions: &'a Map<String, JsonValue>, prefix: &'static str) -> Self {
        Self {
            definitions,
            prefix,
        }
    }

    pub fn definition_location(&self, name: &str) -> String {
        format!("{}{}", self.prefix, pointer_escape(name))
    }

    /// Extract the definition name from a `$ref`, failing if it is not declared
    pub fn ref_name(&self, reference: &str, location: &str) -> Result<String, IngestError> {
        let raw = REF_PREFIXES
            .iter()
            .find_map(|prefix| reference.strip_prefix(prefix))
            .ok_or_else(|| {
                IngestError::malformed(
                    location,
                    format!("unsupported schema reference '{}'", reference),
                )
            })?;
        let name = pointer_unescape(raw);
        if !self.definitions.contains_key(&name) {
            return Err(IngestError::unresolved(name, location));
        }
        Ok(name)
    }

    pub fn shape_of(&self, name: &str) -> Shape {
        self.definitions
            .get(name)
            .and_then(JsonValue::as_object)
            .map_or(Shape::Object, shape)
    }

    /// Resolve a schema fragment to a type reference
    pub fn resolve(&self, schema: &JsonValue, location: &str) -> Result<DataTypeRef, IngestError> {
        self.resolve_at(schema, location, 0)
    }

    fn resolve_at(
        &self,
        schema: &JsonValue,
        location: &str,
        depth: usize,
    ) -> Result<DataTypeRef, IngestError> {
        if depth > MAX_DEPTH {
            return Err(IngestError::malformed(location, "reference cycle"));
        }
        let obj = schema
            .as_object()
            .ok_or_else(|| IngestError::malformed(location, "schema must be an object"))?;
        let mut nullable = explicit_nullable(obj);

        if let Some(reference) = obj.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| IngestError::malformed(location, "$ref must be a string"))?;
            let name = self.ref_name(reference, location)?;
            let resolved = match self.shape_of(&name) {
                Shape::Object => DataTypeRef::named(name),
                Shape::Alias => {
                    let def_location = self.definition_location(&name);
                    self.resolve_at(&self.definitions[&name], &def_location, depth + 1)?
                }
            };
            let nullable = resolved.is_nullable || nullable;
            return Ok(resolved.nullable(nullable));
        }

        for key in ["allOf", "oneOf", "anyOf"] {
            let Some(members) = obj.get(key) else { continue };
            let members = members.as_array().ok_or_else(|| {
                IngestError::malformed(location, format!("{} must be an array", key))
            })?;
            let (nulls, rest): (Vec<_>, Vec<_>) = members.iter().partition(|m| is_null_schema(m));
            if !nulls.is_empty() {
                nullable = true;
            }
            // Inline members without type information only annotate the others
            let (rest, annotations): (Vec<_>, Vec<_>) =
                rest.into_iter().partition(|m| carries_type(m));
            if annotations
                .iter()
                .filter_map(|m| m.as_object())
                .any(explicit_nullable)
            {
                nullable = true;
            }
            return match rest.as_slice() {
                [single] => {
                    let inner =
                        self.resolve_at(single, &format!("{}/{}/0", location, key), depth + 1)?;
                    let nullable = inner.is_nullable || nullable;
                    Ok(inner.nullable(nullable))
                }
                [] => Err(IngestError::malformed(
                    location,
                    format!("{} has no non-null member", key),
                )),
                many => Err(IngestError::malformed(
                    location,
                    format!(
                        "{} with {} members cannot be expressed; declare a named model",
                        key,
                        many.len()
                    ),
                )),
            };
        }

        let (type_name, null_in_type) = primary_type(obj, location)?;
        nullable |= null_in_type;

        let resolved = match type_name.as_str() {
            "array" => {
                let items = obj
                    .get("items")
                    .ok_or_else(|| IngestError::malformed(location, "array without items"))?;
                let item = self.resolve_at(items, &format!("{}/items", location), depth + 1)?;
                if item.is_array {
                    return Err(IngestError::malformed(location, "nested arrays are not supported"));
                }
                DataTypeRef::array_of(item)
            }
            "object" => {
                return Err(IngestError::malformed(
                    location,
                    "inline object schemas are not supported; declare a named model",
                ))
            }
            other => {
                let format = obj.get("format").and_then(JsonValue::as_str);
                let kind = primitive_for(other, format).ok_or_else(|| {
                    IngestError::malformed(location, format!("unknown type '{}'", other))
                })?;
                DataTypeRef::primitive(kind)
            }
        };
        Ok(resolved.nullable(nullable))
    }
}

/// Decide whether a named definition is a model or an alias
pub(crate) fn shape(obj: &Map<String, JsonValue>) -> Shape {
    if obj.contains_key("properties") || obj.contains_key("allOf") {
        return Shape::Object;
    }
    if obj.contains_key("$ref") {
        return Shape::Alias;
    }
    for key in ["oneOf", "anyOf"] {
        if let Some(members) = obj.get(key).and_then(JsonValue::as_array) {
            let non_null = members.iter().filter(|m| !is_null_schema(m)).count();
            // Unions of several types stay as field-less marker models
            return if non_null == 1 { Shape::Alias } else { Shape::Object };
        }
    }
    match primary_type(obj, "").ok().map(|(t, _)| t) {
        Some(t) if t == "object" => Shape::Object,
        Some(_) => Shape::Alias,
        None => Shape::Object,
    }
}

/// The declared type without `null`, and whether `null` was part of it.
///
/// Untyped schemas are inferred from `items`/`properties`/`enum`.
fn primary_type(
    obj: &Map<String, JsonValue>,
    location: &str,
) -> Result<(String, bool), IngestError> {
    match obj.get("type") {
        Some(JsonValue::String(t)) => Ok((t.clone(), false)),
        Some(JsonValue::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(JsonValue::as_str).collect();
            let has_null = names.contains(&"null");
            let rest: Vec<&str> = names.into_iter().filter(|t| *t != "null").collect();
            match rest.as_slice() {
                [single] => Ok((single.to_string(), has_null)),
                _ => Err(IngestError::malformed(
                    location,
                    "type lists must name exactly one non-null type",
                )),
            }
        }
        Some(_) => Err(IngestError::malformed(location, "type must be a string or list")),
        None => {
            if obj.contains_key("items") {
                Ok(("array".to_string(), false))
            } else if obj.contains_key("properties") {
                Ok(("object".to_string(), false))
            } else if let Some(first) = obj
                .get("enum")
                .and_then(JsonValue::as_array)
                .and_then(|e| e.first())
            {
                let inferred = match first {
                    JsonValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
                    JsonValue::Number(_) => "number",
                    JsonValue::Bool(_) => "boolean",
                    _ => "string",
                };
                Ok((inferred.to_string(), false))
            } else {
                Err(IngestError::malformed(location, "schema has no type"))
            }
        }
    }
}

fn primitive_for(type_name: &str, format: Option<&str>) -> Option<PrimitiveKind> {
    match (type_name, format) {
        ("string", Some("date" | "date-time")) => Some(PrimitiveKind::DateTime),
        ("string", Some("binary" | "byte")) => Some(PrimitiveKind::Binary),
        ("string", _) => Some(PrimitiveKind::String),
        ("integer", _) => Some(PrimitiveKind::Integer),
        ("number", _) => Some(PrimitiveKind::Number),
        ("boolean", _) => Some(PrimitiveKind::Boolean),
        ("file", _) => Some(PrimitiveKind::Binary),
        _ => None,
    }
}

fn explicit_nullable(obj: &Map<String, JsonValue>) -> bool {
    ["nullable", "x-nullable"]
        .iter()
        .any(|k| obj.get(*k).and_then(JsonValue::as_bool).unwrap_or(false))
}

/// Whether a composition member says anything about the type, as opposed to
/// only carrying markers such as `readOnly` or `description`
fn carries_type(schema: &JsonValue) -> bool {
    const TYPE_KEYS: [&str; 8] =
        ["$ref", "type", "items", "properties", "enum", "allOf", "oneOf", "anyOf"];
    match schema.as_object() {
        Some(obj) => TYPE_KEYS.iter().any(|k| obj.contains_key(*k)),
        None => true,
    }
}

fn is_null_schema(schema: &JsonValue) -> bool {
    schema.get("type").and_then(JsonValue::as_str) == Some("null")
}

fn flag(obj: &Map<String, JsonValue>, key: &str) -> bool {
    obj.get(key).and_then(JsonValue::as_bool).unwrap_or(false)
}

/// Collect description, read-only, deprecated, and length markers of a field.
///
/// Markers may sit on the property itself or on the inline members of an
/// `allOf` wrapper around a `$ref`.
pub(crate) fn markers(schema: &JsonValue) -> Markers {
    let Some(obj) = schema.as_object() else {
        return Markers::default();
    };
    let inline_members: Vec<&Map<String, JsonValue>> = obj
        .get("allOf")
        .and_then(JsonValue::as_array)
        .map(|members| {
            members
                .iter()
                .filter_map(JsonValue::as_object)
                .filter(|m| !m.contains_key("$ref"))
                .collect()
        })
        .unwrap_or_default();
    let all = || std::iter::once(obj).chain(inline_members.iter().copied());

    let description = all()
        .find_map(|o| o.get("description").and_then(JsonValue::as_str))
        .unwrap_or_default()
        .to_string();
    let read_only = all().any(|o| flag(o, "readOnly"));
    let deprecated = all().any(|o| flag(o, "deprecated") || flag(o, "x-deprecated"));

    let mut min_length = obj.get("minLength").and_then(JsonValue::as_u64);
    let mut max_length = obj.get("maxLength").and_then(JsonValue::as_u64);
    if min_length.is_none() && max_length.is_none() {
        if let Some(pattern) = obj.get("pattern").and_then(JsonValue::as_str) {
            (min_length, max_length) = lengths_from_pattern(pattern);
        }
    }

    Markers {
        description,
        read_only,
        deprecated,
        min_length,
        max_length,
    }
}

/// `^.{1,20}$` → (1, 20), `^.{5}$` → (5, 5), `^.{0,500}$` → (None, 500)
fn lengths_from_pattern(pattern: &str) -> (Option<u64>, Option<u64>) {
    let Some(caps) = LENGTH_PATTERN.captures(pattern) else {
        return (None, None);
    };
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    let min = number(1).filter(|n| *n > 0);
    let max = if caps.get(2).is_some() { number(3) } else { number(1) };
    (min, max)
}

pub(crate) fn pointer_escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn pointer_unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
