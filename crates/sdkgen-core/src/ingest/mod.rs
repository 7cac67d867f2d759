//! Building the [`ApiSchema`] IR from a raw API description.
//!
//! Ingestion is all-or-nothing: every construct of the document is either
//! normalized into the IR or reported as an [`IngestError`], and the result
//! passes [`ApiSchema::validate`] before it is returned.
//!
//! Normalization rules:
//!
//! - OpenAPI 3.x (`components/schemas`) and Swagger 2.0 (`definitions`) are
//!   both accepted.
//! - Object definitions become [`SchemaItem`](crate::schema::SchemaItem)s with
//!   `allOf` parents flattened in. Enum, primitive, and array definitions
//!   become field-less markers; references to them resolve to the underlying
//!   type.
//! - A field is nullable when marked `nullable`/`x-nullable`, when its type
//!   list or composition includes `null`, or when its object declares a
//!   `required` list that does not name it.
//! - Inline objects, nested arrays, multi-member unions, and `formData`
//!   parameters are rejected.
//!
//! # Examples
//!
//! ```
//! use sdkgen_core::config::IngestOptions;
//! use sdkgen_core::ingest::ingest_str;
//!
//! let schema = ingest_str(
//!     r#"{"openapi": "3.0.0", "info": {"title": "T", "version": "v2"}, "paths": {}}"#,
//!     &IngestOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(schema.version, "2.0.0");
//! ```

mod endpoints;
mod models;
mod resolve;

use serde_json::{Map, Value as JsonValue};

use crate::config::IngestOptions;
use crate::description::ApiDescription;
use crate::error::IngestError;
use crate::schema::ApiSchema;

use endpoints::EndpointBuilder;
use resolve::Resolver;

/// Build the IR from a loaded description
pub fn ingest(
    description: &ApiDescription,
    options: &IngestOptions,
) -> Result<ApiSchema, IngestError> {
    let document = description.as_json();
    let empty = Map::new();

    let (definitions, prefix) = match (document.get("openapi"), document.get("swagger")) {
        (Some(version), _) => {
            let version = version.as_str().unwrap_or_default();
            if !version.starts_with("3.") {
                return Err(IngestError::malformed(
                    "#/openapi",
                    format!("unsupported OpenAPI version '{}'", version),
                ));
            }
            let schemas = document.pointer("/components/schemas");
            (section(schemas, "#/components/schemas", &empty)?, "#/components/schemas/")
        }
        (None, Some(version)) => {
            let version = version.as_str().unwrap_or_default();
            if version != "2.0" {
                return Err(IngestError::malformed(
                    "#/swagger",
                    format!("unsupported Swagger version '{}'", version),
                ));
            }
            (section(document.get("definitions"), "#/definitions", &empty)?, "#/definitions/")
        }
        (None, None) => {
            return Err(IngestError::malformed(
                "#",
                "missing 'openapi' or 'swagger' version field",
            ))
        }
    };

    let declared = options.version.as_deref().or_else(|| description.version());
    let version = match declared {
        Some(raw) => normalize_version(raw).ok_or_else(|| {
            IngestError::malformed(
                "#/info/version",
                format!("'{}' is not a semantic version", raw),
            )
        })?,
        None => return Err(IngestError::malformed("#/info/version", "missing API version")),
    };

    let resolver = Resolver::new(definitions, prefix);
    let schemas = models::build_items(&resolver)?;
    let endpoints = EndpointBuilder {
        document,
        resolver: &resolver,
        items: &schemas,
        options,
    }
    .build()?;

    let schema = ApiSchema {
        title: description.title().map(String::from),
        version,
        schemas,
        endpoints,
    };
    schema.validate()?;

    log::info!(
        "Ingested {} models and {} endpoints (version {})",
        schema.schemas.len(),
        schema.endpoints.len(),
        schema.version
    );
    Ok(schema)
}

/// Parse and ingest raw JSON or YAML text
pub fn ingest_str(content: &str, options: &IngestOptions) -> Result<ApiSchema, IngestError> {
    let description = ApiDescription::parse_content(content)?;
    ingest(&description, options)
}

fn section<'a>(
    value: Option<&'a JsonValue>,
    location: &str,
    empty: &'a Map<String, JsonValue>,
) -> Result<&'a Map<String, JsonValue>, IngestError> {
    match value {
        None => Ok(empty),
        Some(value) => value
            .as_object()
            .ok_or_else(|| IngestError::malformed(location, "must be an object")),
    }
}

/// Normalize to three-component `MAJOR.MINOR.PATCH`.
///
/// A leading `v` is dropped, missing components become `0`, and a fourth
/// component is kept as build metadata (`1.2.3.4` → `1.2.3+4`). Pre-release
/// and build suffixes are preserved.
pub fn normalize_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);

    let parts = core
        .split('.')
        .map(|p| {
            let digits = !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
            p.parse::<u64>().ok().filter(|_| digits)
        })
        .collect::<Option<Vec<_>>>()?;

    let (numbers, build) = match parts.as_slice() {
        [major] => ([*major, 0, 0], None),
        [major, minor] => ([*major, *minor, 0], None),
        [major, minor, patch] => ([*major, *minor, *patch], None),
        [major, minor, patch, build] => ([*major, *minor, *patch], Some(*build)),
        _ => return None,
    };

    let mut version = format!("{}.{}.{}", numbers[0], numbers[1], numbers[2]);
    match build {
        Some(build) if suffix.is_empty() => version.push_str(&format!("+{}", build)),
        Some(_) => return None,
        None => version.push_str(suffix),
    }
    Some(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataTypeRef, ParameterKind, PrimitiveKind};

    fn opts() -> IngestOptions {
        IngestOptions::default()
    }

    const BILLING: &str = r##"{
        "openapi": "3.0.1",
        "info": { "title": "Billing", "version": "v1.4" },
        "paths": {
            "/invoices": {
                "get": {
                    "operationId": "listInvoices",
                    "summary": "List invoices",
                    "tags": ["Invoices"],
                    "parameters": [
                        { "name": "filter", "in": "query", "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": { "description": "ok", "content": { "application/json": {
                            "schema": { "$ref": "#/components/schemas/InvoiceFetchResult" } } } }
                    }
                },
                "post": {
                    "operationId": "createInvoice",
                    "requestBody": { "content": { "application/json": {
                        "schema": { "$ref": "#/components/schemas/Invoice" } } } },
                    "responses": {
                        "201": { "description": "created", "content": { "application/json": {
                            "schema": { "$ref": "#/components/schemas/Invoice" } } } }
                    }
                }
            },
            "/invoices/{id}": {
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }
                ],
                "delete": { "responses": { "204": { "description": "gone" } } }
            }
        },
        "components": {
            "schemas": {
                "Invoice": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "readOnly": true },
                        "memo": { "type": "string", "nullable": true, "maxLength": 500 }
                    }
                },
                "InvoiceFetchResult": {
                    "type": "object",
                    "properties": {
                        "records": { "type": "array", "items": { "$ref": "#/components/schemas/Invoice" } },
                        "totalCount": { "type": "integer" }
                    }
                }
            }
        }
    }"##;

    #[test]
    fn test_ingest_billing() {
        let schema = ingest_str(BILLING, &opts()).unwrap();
        assert_eq!(schema.title.as_deref(), Some("Billing"));
        assert_eq!(schema.version, "1.4.0");
        assert_eq!(schema.schemas.len(), 2);

        let ids: Vec<_> = schema.endpoints.iter().map(|e| e.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["listInvoices", "createInvoice", "delete_invoices_id"]);

        let list = &schema.endpoints[0];
        assert_eq!(list.name, "List invoices");
        assert_eq!(list.http_method, "GET");
        assert_eq!(list.item_type.as_deref(), Some("Invoice"));
        assert_eq!(list.parameters[0].kind, ParameterKind::Query);
        assert!(!list.parameters[0].required);

        let create = &schema.endpoints[1];
        assert_eq!(create.request_body, Some(DataTypeRef::named("Invoice")));

        let delete = &schema.endpoints[2];
        assert_eq!(delete.return_data_type, None);
        assert_eq!(
            delete.parameters[0].data_type,
            DataTypeRef::primitive(PrimitiveKind::Integer)
        );
        assert!(delete.parameters[0].required);
    }

    #[test]
    fn test_unresolved_reference_names_type_and_location() {
        let doc = r##"{
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1.0.0" },
            "paths": {
                "/invoices": { "get": { "responses": { "200": { "description": "ok",
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Invoice" } } } } } } }
            }
        }"##;
        let err = ingest_str(doc, &opts()).unwrap_err();
        assert_eq!(
            err,
            IngestError::unresolved("Invoice", "#/paths/~1invoices/get/responses/200")
        );
    }

    #[test]
    fn test_swagger2_body_and_definitions() {
        let doc = r##"
swagger: "2.0"
info: { title: Legacy, version: "2.1.0.7" }
paths:
  /customers/{customerId}:
    put:
      parameters:
        - { name: body, in: body, schema: { $ref: "#/definitions/Customer" } }
      responses:
        "200": { description: ok, schema: { $ref: "#/definitions/Customer" } }
definitions:
  Customer:
    type: object
    required: [name]
    properties:
      name: { type: string, pattern: "^.{1,40}$" }
      email: { type: string }
"##;
        let schema = ingest_str(doc, &opts()).unwrap();
        assert_eq!(schema.version, "2.1.0+7");
        let put = &schema.endpoints[0];
        assert_eq!(put.request_body, Some(DataTypeRef::named("Customer")));
        // customerId was never declared and is synthesized as a string
        assert_eq!(put.parameters.len(), 1);
        assert_eq!(put.parameters[0].name, "customerId");

        let customer = &schema.schemas[0];
        assert_eq!(customer.fields[0].min_length, Some(1));
        assert_eq!(customer.fields[0].max_length, Some(40));
        assert!(!customer.fields[0].nullable);
        assert!(customer.fields[1].nullable);
    }

    #[test]
    fn test_envelope_field_rule() {
        let doc = BILLING.replace("InvoiceFetchResult", "InvoicePage");
        let schema = ingest_str(&doc, &opts()).unwrap();
        assert_eq!(schema.endpoints[0].item_type.as_deref(), Some("InvoicePage"));

        let options = IngestOptions {
            envelope_fields: vec!["records".into()],
            ..opts()
        };
        let schema = ingest_str(&doc, &options).unwrap();
        assert_eq!(schema.endpoints[0].item_type.as_deref(), Some("Invoice"));
    }

    #[test]
    fn test_version_override() {
        let options = IngestOptions {
            version: Some("3".into()),
            ..opts()
        };
        assert_eq!(ingest_str(BILLING, &options).unwrap().version, "3.0.0");
    }

    #[test]
    fn test_rejects_unknown_dialects() {
        for doc in [
            r#"{"info": {"version": "1"}, "paths": {}}"#,
            r#"{"openapi": "2.5", "info": {"version": "1"}, "paths": {}}"#,
            r#"{"openapi": "3.0.0", "info": {"version": "latest"}, "paths": {}}"#,
        ] {
            assert!(matches!(
                ingest_str(doc, &opts()),
                Err(IngestError::MalformedDescription { .. })
            ));
        }
    }

    #[test]
    fn test_form_data_rejected() {
        let doc = r#"{
            "swagger": "2.0",
            "info": { "version": "1.0" },
            "paths": { "/upload": { "post": {
                "parameters": [ { "name": "file", "in": "formData", "type": "file" } ],
                "responses": {}
            } } }
        }"#;
        let err = ingest_str(doc, &opts()).unwrap_err();
        assert!(matches!(err, IngestError::MalformedDescription { location, .. }
            if location == "#/paths/~1upload/post/parameters/0"));
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("1.2.3").as_deref(), Some("1.2.3"));
        assert_eq!(normalize_version("v2").as_deref(), Some("2.0.0"));
        assert_eq!(normalize_version("1.02").as_deref(), Some("1.2.0"));
        assert_eq!(normalize_version("1.0.0-beta.1").as_deref(), Some("1.0.0-beta.1"));
        assert_eq!(normalize_version("4.1.0.12").as_deref(), Some("4.1.0+12"));
        assert_eq!(normalize_version("latest"), None);
        assert_eq!(normalize_version("1..2"), None);
        assert_eq!(normalize_version("1.2.3.4.5"), None);
    }
}
