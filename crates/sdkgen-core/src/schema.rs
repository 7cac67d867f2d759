//! Language-neutral intermediate representation of an API.
//!
//! An [`ApiSchema`] is produced once by the [ingestor](crate::ingest) and then
//! shared read-only with every backend. Nothing in this module performs I/O;
//! [`ApiSchema::validate`] is the single place the IR invariants are checked.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// The closed set of primitive kinds a [`DataTypeRef`] can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
    DateTime,
    Binary,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::DateTime => "date-time",
            Self::Binary => "binary",
        }
    }
}

/// What a [`DataTypeRef`] points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Named(String),
}

/// A reference to a primitive or a named model, with array and null modifiers.
///
/// `is_nullable` applies to the whole value and `item_nullable` to the
/// elements of an array, so `int?[]` and `int[]?` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataTypeRef {
    pub kind: TypeKind,
    pub is_array: bool,
    pub is_nullable: bool,
    pub item_nullable: bool,
}

impl DataTypeRef {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            kind: TypeKind::Primitive(kind),
            is_array: false,
            is_nullable: false,
            item_nullable: false,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Named(name.into()),
            is_array: false,
            is_nullable: false,
            item_nullable: false,
        }
    }

    /// Wrap this type as an array; the current nullability moves to the items
    pub fn array_of(item: DataTypeRef) -> Self {
        Self {
            kind: item.kind,
            is_array: true,
            is_nullable: false,
            item_nullable: item.is_nullable,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    /// The referenced model name, if this is not a primitive
    pub fn model_name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Named(name) => Some(name),
            TypeKind::Primitive(_) => None,
        }
    }

    /// Language-neutral base name without modifiers
    pub fn base_name(&self) -> &str {
        match &self.kind {
            TypeKind::Named(name) => name,
            TypeKind::Primitive(p) => p.as_str(),
        }
    }
}

impl fmt::Display for DataTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_name())?;
        if self.is_array {
            if self.item_nullable {
                write!(f, "?")?;
            }
            write!(f, "[]")?;
        }
        if self.is_nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// One field of a [`SchemaItem`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub data_type: DataTypeRef,
    pub description: String,
    pub nullable: bool,
    pub read_only: bool,
    pub deprecated: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

impl SchemaField {
    /// A required, writable, undocumented field
    pub fn new(name: impl Into<String>, data_type: DataTypeRef) -> Self {
        let nullable = data_type.is_nullable;
        Self {
            name: name.into(),
            data_type,
            description: String::new(),
            nullable,
            read_only: false,
            deprecated: false,
            min_length: None,
            max_length: None,
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self.data_type.is_nullable = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn min_length(mut self, n: u64) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: u64) -> Self {
        self.max_length = Some(n);
        self
    }
}

/// A named complex type ("model")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaItem {
    pub name: String,
    pub description: String,
    /// Declared order is preserved into every artifact
    pub fields: Vec<SchemaField>,
}

impl SchemaItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    /// Items without fields are markers (enums, aliases) that backends skip
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// Where an operation parameter travels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

/// One operation parameter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub data_type: DataTypeRef,
    pub required: bool,
    pub description: String,
}

/// One API operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Display name (the operation summary, else its id)
    pub name: String,
    /// Declared `operationId`, or one derived from method and path
    pub operation_id: String,
    pub path: String,
    /// Upper-case HTTP method
    pub http_method: String,
    pub description: String,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<DataTypeRef>,
    pub return_data_type: Option<DataTypeRef>,
    /// Model the return type resolves to once pagination envelopes are removed
    pub item_type: Option<String>,
}

impl Endpoint {
    pub fn new(
        operation_id: impl Into<String>,
        http_method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let operation_id = operation_id.into();
        Self {
            name: operation_id.clone(),
            operation_id,
            path: path.into(),
            http_method: http_method.into().to_uppercase(),
            description: String::new(),
            tags: Vec::new(),
            deprecated: false,
            parameters: Vec::new(),
            request_body: None,
            return_data_type: None,
            item_type: None,
        }
    }

    /// Set the return type; the envelope-unwrapped item defaults to the named type
    pub fn returning(mut self, data_type: DataTypeRef) -> Self {
        self.item_type = data_type.model_name().map(String::from);
        self.return_data_type = Some(data_type);
        self
    }

    /// Named types this endpoint refers to, with a location label each
    fn references(&self) -> impl Iterator<Item = (&str, String)> {
        let params = self.parameters.iter().filter_map(move |p| {
            p.data_type
                .model_name()
                .map(|n| (n, format!("{} parameter '{}'", self.operation_id, p.name)))
        });
        let body = self
            .request_body
            .as_ref()
            .and_then(DataTypeRef::model_name)
            .map(|n| (n, format!("{} request body", self.operation_id)));
        let ret = self
            .return_data_type
            .as_ref()
            .and_then(DataTypeRef::model_name)
            .map(|n| (n, format!("{} response", self.operation_id)));
        let item = self
            .item_type
            .as_deref()
            .map(|n| (n, format!("{} response item", self.operation_id)));
        params.chain(body).chain(ret).chain(item)
    }
}

/// The IR root
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSchema {
    pub title: Option<String>,
    /// Three-component semantic version
    pub version: String,
    pub schemas: Vec<SchemaItem>,
    pub endpoints: Vec<Endpoint>,
}

impl ApiSchema {
    pub fn find_schema(&self, name: &str) -> Option<&SchemaItem> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Items that backends document and emit
    pub fn documented_schemas(&self) -> impl Iterator<Item = &SchemaItem> {
        self.schemas.iter().filter(|s| s.has_fields())
    }

    /// Endpoints whose unwrapped return type is `name`, in declared order
    pub fn endpoints_returning<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Endpoint> + 'n
    where
        'a: 'n,
    {
        self.endpoints
            .iter()
            .filter(move |e| e.item_type.as_deref() == Some(name))
    }

    /// Check every IR invariant, reporting the first violation found.
    pub fn validate(&self) -> Result<(), IngestError> {
        let mut names = HashSet::new();
        for item in &self.schemas {
            if !names.insert(item.name.as_str()) {
                return Err(IngestError::malformed(
                    format!("schema '{}'", item.name),
                    "duplicate model name",
                ));
            }
        }

        for item in &self.schemas {
            let mut field_names = HashSet::new();
            for field in &item.fields {
                let location = format!("{}.{}", item.name, field.name);
                if !field_names.insert(field.name.as_str()) {
                    return Err(IngestError::malformed(location, "duplicate field name"));
                }
                if let (Some(min), Some(max)) = (field.min_length, field.max_length) {
                    if min > max {
                        return Err(IngestError::malformed(
                            location,
                            format!("minLength {} exceeds maxLength {}", min, max),
                        ));
                    }
                }
                if field.nullable != field.data_type.is_nullable {
                    return Err(IngestError::malformed(
                        location,
                        "field nullability disagrees with its type",
                    ));
                }
                if let Some(target) = field.data_type.model_name() {
                    if !names.contains(target) {
                        return Err(IngestError::unresolved(target, location));
                    }
                }
            }
        }

        for endpoint in &self.endpoints {
            for (target, location) in endpoint.references() {
                if !names.contains(target) {
                    return Err(IngestError::unresolved(target, location));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice_schema() -> ApiSchema {
        ApiSchema {
            title: Some("Billing".into()),
            version: "1.0.0".into(),
            schemas: vec![
                SchemaItem::new("Invoice")
                    .field(
                        SchemaField::new("id", DataTypeRef::primitive(PrimitiveKind::Integer))
                            .read_only(),
                    )
                    .field(SchemaField::new(
                        "lines",
                        DataTypeRef::array_of(DataTypeRef::named("Line")),
                    )),
                SchemaItem::new("Line").field(
                    SchemaField::new("memo", DataTypeRef::primitive(PrimitiveKind::String))
                        .nullable(),
                ),
            ],
            endpoints: vec![Endpoint::new("getInvoice", "get", "/invoices/{id}")
                .returning(DataTypeRef::named("Invoice"))],
        }
    }

    #[test]
    fn test_valid_schema_passes() {
        assert_eq!(invoice_schema().validate(), Ok(()));
    }

    #[test]
    fn test_dangling_field_reference() {
        let mut schema = invoice_schema();
        schema.schemas.retain(|s| s.name != "Line");
        let err = schema.validate().unwrap_err();
        assert_eq!(err, IngestError::unresolved("Line", "Invoice.lines"));
    }

    #[test]
    fn test_dangling_endpoint_reference() {
        let mut schema = invoice_schema();
        schema.endpoints[0] = Endpoint::new("getThing", "get", "/things")
            .returning(DataTypeRef::named("Thing"));
        assert!(matches!(
            schema.validate(),
            Err(IngestError::UnresolvedReference { name, .. }) if name == "Thing"
        ));
    }

    #[test]
    fn test_length_bounds_invariant() {
        let mut schema = invoice_schema();
        schema.schemas[1].fields[0].min_length = Some(10);
        schema.schemas[1].fields[0].max_length = Some(5);
        assert!(matches!(
            schema.validate(),
            Err(IngestError::MalformedDescription { .. })
        ));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut schema = invoice_schema();
        let dup = schema.schemas[1].fields[0].clone();
        schema.schemas[1].fields.push(dup);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_display_distinguishes_array_nullability() {
        let int = DataTypeRef::primitive(PrimitiveKind::Integer);
        let nullable_items = DataTypeRef::array_of(int.clone().nullable(true));
        let nullable_array = DataTypeRef::array_of(int).nullable(true);
        assert_eq!(nullable_items.to_string(), "integer?[]");
        assert_eq!(nullable_array.to_string(), "integer[]?");
    }

    #[test]
    fn test_endpoints_returning_in_declared_order() {
        let mut schema = invoice_schema();
        schema.endpoints.push(
            Endpoint::new("listInvoices", "get", "/invoices")
                .returning(DataTypeRef::array_of(DataTypeRef::named("Invoice"))),
        );
        let ids: Vec<_> = schema
            .endpoints_returning("Invoice")
            .map(|e| e.operation_id.as_str())
            .collect();
        assert_eq!(ids, vec!["getInvoice", "listInvoices"]);
    }
}
