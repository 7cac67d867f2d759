//! Path items → [`Endpoint`]s

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use super::resolve::{markers, pointer_escape, Resolver};
use crate::config::IngestOptions;
use crate::error::IngestError;
use crate::schema::{DataTypeRef, Endpoint, Parameter, ParameterKind, PrimitiveKind, SchemaItem};

const METHODS: [&str; 7] = ["get", "put", "post", "delete", "patch", "head", "options"];

static PATH_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("path placeholder regex"));

pub(crate) struct EndpointBuilder<'a> {
    pub document: &'a JsonValue,
    pub resolver: &'a Resolver<'a>,
    pub items: &'a [SchemaItem],
    pub options: &'a IngestOptions,
}

impl<'a> EndpointBuilder<'a> {
    /// All operations, in path then method declaration order
    pub fn build(&self) -> Result<Vec<Endpoint>, IngestError> {
        let paths = self
            .document
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| IngestError::malformed("#/paths", "missing 'paths' object"))?;

        let mut endpoints = Vec::new();
        for (path, path_item) in paths {
            let location = format!("#/paths/{}", pointer_escape(path));
            let path_item = path_item
                .as_object()
                .ok_or_else(|| IngestError::malformed(&location, "path item must be an object"))?;
            let shared = path_item
                .get("parameters")
                .and_then(JsonValue::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for (method, operation) in path_item {
                if !METHODS.contains(&method.as_str()) {
                    continue;
                }
                let op_location = format!("{}/{}", location, method);
                let operation = operation.as_object().ok_or_else(|| {
                    IngestError::malformed(&op_location, "operation must be an object")
                })?;
                endpoints.push(self.endpoint(path, method, operation, shared, &op_location)?);
            }
        }
        Ok(endpoints)
    }

    fn endpoint(
        &self,
        path: &str,
        method: &str,
        operation: &'a Map<String, JsonValue>,
        shared: &'a [JsonValue],
        location: &str,
    ) -> Result<Endpoint, IngestError> {
        let text = |key: &str| operation.get(key).and_then(JsonValue::as_str).map(str::trim);

        let operation_id = text("operationId")
            .filter(|id| !id.is_empty())
            .map(String::from)
            .unwrap_or_else(|| derive_operation_id(method, path));

        let mut endpoint = Endpoint::new(operation_id, method, path);
        if let Some(summary) = text("summary").filter(|s| !s.is_empty()) {
            endpoint.name = summary.to_string();
        }
        endpoint.description = text("description").unwrap_or_default().to_string();
        endpoint.deprecated = operation
            .get("deprecated")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        endpoint.tags = operation
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|tags| tags.iter().filter_map(JsonValue::as_str).map(String::from).collect())
            .unwrap_or_default();

        let own = operation
            .get("parameters")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let path_location = location.rsplit_once('/').map_or(location, |(p, _)| p);
        let declared = shared
            .iter()
            .enumerate()
            .map(|(i, p)| (p, format!("{}/parameters/{}", path_location, i)))
            .chain(
                own.iter()
                    .enumerate()
                    .map(|(i, p)| (p, format!("{}/parameters/{}", location, i))),
            );

        for (raw, param_location) in declared {
            let raw = self.dereference(raw, &param_location)?;
            match self.parameter(raw, &param_location)? {
                ParsedParameter::Body(body) => endpoint.request_body = Some(body),
                ParsedParameter::Regular(parameter) => {
                    // Operation-level parameters override path-level ones
                    if let Some(existing) = endpoint
                        .parameters
                        .iter_mut()
                        .find(|p| p.name == parameter.name && p.kind == parameter.kind)
                    {
                        *existing = parameter;
                    } else {
                        endpoint.parameters.push(parameter);
                    }
                }
            }
        }

        for placeholder in path_placeholders(path) {
            let declared = endpoint
                .parameters
                .iter()
                .any(|p| p.kind == ParameterKind::Path && p.name == placeholder);
            if !declared {
                log::debug!("synthesizing path parameter '{}' for {}", placeholder, location);
                endpoint.parameters.push(Parameter {
                    name: placeholder,
                    kind: ParameterKind::Path,
                    data_type: DataTypeRef::primitive(PrimitiveKind::String),
                    required: true,
                    description: String::new(),
                });
            }
        }

        if let Some(body) = operation.get("requestBody") {
            let body_location = format!("{}/requestBody", location);
            let body = self.dereference(body, &body_location)?;
            if let Some(schema) = media_schema(body) {
                endpoint.request_body = Some(self.resolver.resolve(schema, &body_location)?);
            }
        }

        if let Some(returns) = self.return_type(operation, location)? {
            endpoint.item_type = self.unwrap_envelope(&returns);
            endpoint.return_data_type = Some(returns);
        }

        Ok(endpoint)
    }

    fn parameter(&self, raw: &JsonValue, location: &str) -> Result<ParsedParameter, IngestError> {
        let name = raw
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| IngestError::malformed(location, "parameter without a name"))?;
        let kind = match raw.get("in").and_then(JsonValue::as_str) {
            Some("path") => ParameterKind::Path,
            Some("query") => ParameterKind::Query,
            Some("header") => ParameterKind::Header,
            Some("cookie") => ParameterKind::Cookie,
            Some("body") => {
                let schema = raw.get("schema").ok_or_else(|| {
                    IngestError::malformed(location, "body parameter without schema")
                })?;
                let body = self.resolver.resolve(schema, &format!("{}/schema", location))?;
                return Ok(ParsedParameter::Body(body));
            }
            Some("formData") => {
                return Err(IngestError::malformed(
                    location,
                    "formData parameters are not supported",
                ))
            }
            Some(other) => {
                return Err(IngestError::malformed(
                    location,
                    format!("unknown parameter location '{}'", other),
                ))
            }
            None => return Err(IngestError::malformed(location, "parameter without 'in'")),
        };

        // OAS3 nests the type under `schema` or `content`; Swagger 2 inlines it
        let schema = match (raw.get("schema"), raw.get("content")) {
            (Some(schema), _) => schema,
            (None, Some(_)) => media_schema(raw).ok_or_else(|| {
                IngestError::malformed(location, "parameter content without schema")
            })?,
            (None, None) => raw,
        };
        let data_type = self.resolver.resolve(schema, location)?;
        let required = kind == ParameterKind::Path
            || raw.get("required").and_then(JsonValue::as_bool).unwrap_or(false);

        Ok(ParsedParameter::Regular(Parameter {
            name: name.to_string(),
            kind,
            data_type,
            required,
            description: markers(raw).description,
        }))
    }

    /// First 2xx response that carries a schema
    fn return_type(
        &self,
        operation: &'a Map<String, JsonValue>,
        location: &str,
    ) -> Result<Option<DataTypeRef>, IngestError> {
        let Some(responses) = operation.get("responses").and_then(JsonValue::as_object) else {
            return Ok(None);
        };
        for (status, response) in responses {
            if !status.starts_with('2') {
                continue;
            }
            let response_location = format!("{}/responses/{}", location, status);
            let response = self.dereference(response, &response_location)?;
            let schema = response.get("schema").or_else(|| media_schema(response));
            if let Some(schema) = schema {
                return self.resolver.resolve(schema, &response_location).map(Some);
            }
        }
        Ok(None)
    }

    /// The model callers actually receive once any pagination envelope is removed
    fn unwrap_envelope(&self, returns: &DataTypeRef) -> Option<String> {
        let name = returns.model_name()?;
        let exists = |candidate: &str| {
            self.items
                .iter()
                .any(|i| i.name == candidate && i.has_fields())
        };

        for suffix in &self.options.envelope_suffixes {
            if let Some(inner) = name.strip_suffix(suffix.as_str()) {
                if !inner.is_empty() && exists(inner) {
                    return Some(inner.to_string());
                }
            }
        }

        if let Some(envelope) = self.items.iter().find(|i| i.name == name) {
            for field_name in &self.options.envelope_fields {
                let payload = envelope
                    .fields
                    .iter()
                    .find(|f| &f.name == field_name && f.data_type.is_array)
                    .and_then(|f| f.data_type.model_name());
                if let Some(inner) = payload {
                    return Some(inner.to_string());
                }
            }
        }

        Some(name.to_string())
    }

    /// Follow a local `$ref` to a parameter, body, or response object
    fn dereference(
        &self,
        value: &'a JsonValue,
        location: &str,
    ) -> Result<&'a JsonValue, IngestError> {
        let mut current = value;
        for _ in 0..8 {
            let Some(reference) = current.get("$ref").and_then(JsonValue::as_str) else {
                return Ok(current);
            };
            let pointer = reference.strip_prefix('#').ok_or_else(|| {
                IngestError::malformed(
                    location,
                    format!("external reference '{}' is not supported", reference),
                )
            })?;
            current = self
                .document
                .pointer(pointer)
                .ok_or_else(|| IngestError::unresolved(reference, location))?;
        }
        Err(IngestError::malformed(location, "reference cycle"))
    }
}

enum ParsedParameter {
    Regular(Parameter),
    /// Swagger 2 `in: body`
    Body(DataTypeRef),
}

/// `get_invoices_id` for `GET /invoices/{id}`
fn derive_operation_id(method: &str, path: &str) -> String {
    let path = path
        .trim_matches('/')
        .replace(['{', '}'], "")
        .replace(['/', '-', '.'], "_");
    if path.is_empty() {
        method.to_string()
    } else {
        format!("{}_{}", method, path)
    }
}

fn path_placeholders(path: &str) -> Vec<String> {
    PATH_PLACEHOLDER
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// Schema of the preferred media type under `content`
fn media_schema(object: &JsonValue) -> Option<&JsonValue> {
    let content = object.get("content")?.as_object()?;
    let media = content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(media_type, _)| media_type.contains("json"))
                .map(|(_, v)| v)
        })
        .or_else(|| content.values().next())?;
    media.get("schema")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_operation_id() {
        assert_eq!(derive_operation_id("get", "/invoices/{id}"), "get_invoices_id");
        assert_eq!(derive_operation_id("post", "/"), "post");
        assert_eq!(
            derive_operation_id("delete", "/line-items/{lineId}"),
            "delete_line_items_lineId"
        );
    }

    #[test]
    fn test_path_placeholders() {
        assert_eq!(
            path_placeholders("/customers/{customerId}/invoices/{id}"),
            vec!["customerId", "id"]
        );
        assert!(path_placeholders("/invoices").is_empty());
    }

    #[test]
    fn test_media_schema_prefers_json() {
        let body = serde_json::json!({
            "content": {
                "text/plain": { "schema": { "type": "string" } },
                "application/vnd.api+json": { "schema": { "type": "integer" } }
            }
        });
        assert_eq!(media_schema(&body).unwrap()["type"], "integer");
    }
}
