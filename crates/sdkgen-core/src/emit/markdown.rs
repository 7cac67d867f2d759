//! Markdown model documentation.
//!
//! One document per model with fields. The `list` layout groups fields into
//! sections (see [`FieldBucket`](super::sections::FieldBucket)); the `table`
//! layout puts every field in a single table.

use std::collections::HashSet;
use std::fmt::Write;

use super::sections::{partition, used_by};
use super::{Artifact, Emitter};
use crate::config::{DocFormat, TargetConfig};
use crate::error::EmitError;
use crate::schema::{ApiSchema, SchemaField, SchemaItem};
use crate::target::TargetKind;
use crate::utils::reference_slug;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownEmitter;

impl Emitter for MarkdownEmitter {
    fn target(&self) -> TargetKind {
        TargetKind::Markdown
    }

    fn emit(&self, schema: &ApiSchema, config: &TargetConfig) -> Result<Vec<Artifact>, EmitError> {
        let mut names = HashSet::new();
        let mut artifacts = Vec::new();
        for item in schema.documented_schemas() {
            let name = format!("{}.md", doc_slug(&item.name));
            if !names.insert(name.clone()) {
                return Err(EmitError::NameCollision {
                    target: TargetKind::Markdown,
                    scope: "documents".to_string(),
                    name,
                });
            }
            artifacts.push(Artifact::new(name, render_model(schema, item, config.doc_format)));
        }
        Ok(artifacts)
    }
}

/// Slug a model document is published under
pub fn doc_slug(model: &str) -> String {
    model.to_lowercase()
}

/// Render one model's documentation page
pub fn render_model(schema: &ApiSchema, item: &SchemaItem, format: DocFormat) -> String {
    match format {
        DocFormat::List => render_list(schema, item),
        DocFormat::Table => render_table(schema, item),
    }
}

fn method_links(schema: &ApiSchema, item: &SchemaItem) -> Vec<String> {
    used_by(schema, item)
        .into_iter()
        .map(|e| format!("* [{}](/reference/{})", e.name, reference_slug(&e.http_method, &e.path)))
        .collect()
}

fn render_list(schema: &ApiSchema, item: &SchemaItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", item.description);

    let methods = method_links(schema, item);
    if !methods.is_empty() {
        out.push_str("## Methods\n\nThe following API methods use this data model.\n\n");
        for line in methods {
            let _ = writeln!(out, "{}", line);
        }
        out.push('\n');
    }

    for (bucket, fields) in partition(item) {
        let _ = writeln!(out, "## {}\n", bucket.title());
        if let Some(intro) = bucket.intro() {
            let _ = writeln!(out, "{}\n", intro);
        }
        for field in fields {
            out.push_str(&field_block(field));
        }
    }
    out
}

fn field_block(field: &SchemaField) -> String {
    let mut modifiers = vec![type_label(field)];
    if field.nullable {
        modifiers.push("nullable".to_string());
    }
    if field.read_only {
        modifiers.push("read-only".to_string());
    }
    match (field.min_length, field.max_length) {
        (Some(min), Some(max)) => modifiers.push(format!("{}-{} characters", min, max)),
        (Some(min), None) => modifiers.push(format!("min {} characters", min)),
        (None, Some(max)) => modifiers.push(format!("max {} characters", max)),
        (None, None) => {}
    }
    format!(
        "### {}\n\n_{}_\n\n{}\n\n\n",
        field.name,
        modifiers.join(", "),
        field.description
    )
}

/// `[Invoice](/docs/invoice)[]` for named types, `string` for primitives
fn type_label(field: &SchemaField) -> String {
    let data_type = &field.data_type;
    let base = match data_type.model_name() {
        Some(name) => format!("[{}](/docs/{})", name, doc_slug(name)),
        None => data_type.base_name().to_string(),
    };
    if data_type.is_array {
        format!("{}[]", base)
    } else {
        base
    }
}

fn render_table(schema: &ApiSchema, item: &SchemaItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", item.description);

    for line in method_links(schema, item) {
        let _ = writeln!(out, "{}", line);
    }

    out.push_str("# Fields\n| Field | Type | Notes |\n|--|--|--|\n");
    for field in &item.fields {
        let mut modifiers = String::new();
        if field.nullable {
            modifiers.push_str("(nullable) ");
        }
        if field.read_only {
            modifiers.push_str("(read-only) ");
        }
        if field.deprecated {
            modifiers.push_str("(deprecated) ");
        }
        match (field.min_length, field.max_length) {
            (Some(min), Some(max)) => {
                let _ = write!(modifiers, "(between {} and {} characters) ", min, max);
            }
            (Some(min), None) => {
                let _ = write!(modifiers, "(minimum {} characters) ", min);
            }
            (None, Some(max)) => {
                let _ = write!(modifiers, "(maximum {} characters) ", max);
            }
            (None, None) => {}
        }
        let _ = writeln!(
            out,
            "| **{}** | {} {}| {} |",
            field.name,
            type_label(field),
            modifiers,
            field.description.replace("\r\n", "<br />").replace('\n', "<br />")
        );
    }
    out
}
