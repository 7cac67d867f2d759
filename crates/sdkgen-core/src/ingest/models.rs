//! Named definitions → [`SchemaItem`]s

use std::collections::HashSet;

use serde_json::{Map, Value as JsonValue};

use super::resolve::{markers, pointer_escape, Resolver, Shape};
use crate::error::IngestError;
use crate::schema::{PrimitiveKind, SchemaField, SchemaItem, TypeKind};

/// Properties gathered from a definition and everything it inherits
#[derive(Default)]
struct Collected<'a> {
    properties: Vec<(String, &'a JsonValue, String)>,
    required: HashSet<String>,
    has_required_list: bool,
}

impl<'a> Collected<'a> {
    fn push(&mut self, name: &str, schema: &'a JsonValue, location: String) {
        // A redeclared property overrides the inherited one in place
        if let Some(slot) = self.properties.iter_mut().find(|(n, _, _)| n == name) {
            slot.1 = schema;
            slot.2 = location;
        } else {
            self.properties.push((name.to_string(), schema, location));
        }
    }
}

/// Build one item per named definition, in declared order
pub(crate) fn build_items(resolver: &Resolver<'_>) -> Result<Vec<SchemaItem>, IngestError> {
    let definitions = resolver.definitions;
    definitions
        .iter()
        .map(|(name, definition)| build_item(resolver, name, definition))
        .collect()
}

fn build_item<'a>(
    resolver: &Resolver<'a>,
    name: &str,
    definition: &'a JsonValue,
) -> Result<SchemaItem, IngestError> {
    let location = resolver.definition_location(name);
    let obj = definition
        .as_object()
        .ok_or_else(|| IngestError::malformed(&location, "definition must be an object"))?;

    let description = obj
        .get("description")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let item = SchemaItem::new(name).describe(description);

    if resolver.shape_of(name) == Shape::Alias {
        log::debug!("{} is an alias; no fields emitted", name);
        return Ok(item);
    }

    let mut collected = Collected::default();
    let mut visited = HashSet::from([name.to_string()]);
    collect(resolver, obj, &location, &mut collected, &mut visited)?;

    let mut item = item;
    for (field_name, schema, field_location) in collected.properties {
        let mut data_type = resolver.resolve(schema, &field_location)?;
        if collected.has_required_list && !collected.required.contains(&field_name) {
            data_type.is_nullable = true;
        }
        let m = markers(schema);

        let string_like =
            !data_type.is_array && data_type.kind == TypeKind::Primitive(PrimitiveKind::String);
        let (min_length, max_length) = if string_like {
            (m.min_length, m.max_length)
        } else {
            if m.min_length.is_some() || m.max_length.is_some() {
                log::debug!("ignoring length bounds on non-string field {}", field_location);
            }
            (None, None)
        };

        item.fields.push(SchemaField {
            name: field_name,
            nullable: data_type.is_nullable,
            data_type,
            description: m.description,
            read_only: m.read_only,
            deprecated: m.deprecated,
            min_length,
            max_length,
        });
    }
    Ok(item)
}

/// Gather properties of `obj`, flattening `allOf` members in order
fn collect<'a>(
    resolver: &Resolver<'a>,
    obj: &'a Map<String, JsonValue>,
    location: &str,
    out: &mut Collected<'a>,
    visited: &mut HashSet<String>,
) -> Result<(), IngestError> {
    if let Some(members) = obj.get("allOf") {
        let members = members
            .as_array()
            .ok_or_else(|| IngestError::malformed(location, "allOf must be an array"))?;
        for (i, member) in members.iter().enumerate() {
            let member_location = format!("{}/allOf/{}", location, i);
            let member_obj = member.as_object().ok_or_else(|| {
                IngestError::malformed(&member_location, "allOf member must be an object")
            })?;

            match member_obj.get("$ref").and_then(JsonValue::as_str) {
                Some(reference) => {
                    let parent = resolver.ref_name(reference, &member_location)?;
                    if !visited.insert(parent.clone()) {
                        return Err(IngestError::malformed(&member_location, "inheritance cycle"));
                    }
                    let parent_location = resolver.definition_location(&parent);
                    let definitions = resolver.definitions;
                    let parent_obj = definitions[&parent].as_object().ok_or_else(|| {
                        IngestError::malformed(&parent_location, "definition must be an object")
                    })?;
                    collect(resolver, parent_obj, &parent_location, out, visited)?;
                    // Only the current inheritance path counts toward cycles
                    visited.remove(&parent);
                }
                None => collect(resolver, member_obj, &member_location, out, visited)?,
            }
        }
    }

    if let Some(properties) = obj.get("properties") {
        let properties = properties
            .as_object()
            .ok_or_else(|| IngestError::malformed(location, "properties must be an object"))?;
        for (name, schema) in properties {
            let field_location = format!("{}/properties/{}", location, pointer_escape(name));
            out.push(name, schema, field_location);
        }
    }

    if let Some(required) = obj.get("required").and_then(JsonValue::as_array) {
        out.has_required_list = true;
        out.required
            .extend(required.iter().filter_map(JsonValue::as_str).map(String::from));
    }

    Ok(())
}
