//! Serializable template contexts for the source backends.
//!
//! The driver in [`source`](super::source) resolves every name, type, and
//! path expression in Rust; templates only lay the values out.

use serde::Serialize;

/// Context shared by every template of one target
#[derive(Debug, Clone, Serialize)]
pub struct PackageContext {
    /// API title, or the package identifier when the description has none
    pub title: String,
    /// Three-component version stamped on the package manifest
    pub version: String,
    /// Package identifier exactly as configured
    pub package: String,
    /// Package identifier as a directory path (`com/example/billing`)
    pub package_path: String,
    /// Namespace or module the generated code lives in (`BillingSdk`)
    pub module: String,
    /// Name of the root client type
    pub client_name: String,
    /// Named API roots, in configured order
    pub environments: Vec<EnvironmentContext>,
    pub models: Vec<ModelContext>,
    pub clients: Vec<ClientContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentContext {
    pub name: String,
    pub url: String,
}

/// One emitted model type
#[derive(Debug, Clone, Serialize)]
pub struct ModelContext {
    /// Type name, as declared in the API description
    pub name: String,
    /// File stem after the target's file casing
    pub file_name: String,
    /// Description split into lines
    pub doc: Vec<String>,
    pub fields: Vec<FieldContext>,
    /// Other models this one refers to
    pub imports: Vec<ImportContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportContext {
    pub name: String,
    pub file_name: String,
}

/// One model field
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    /// Property name on the wire
    pub wire_name: String,
    /// Member name after casing and reserved-word escaping
    pub member: String,
    /// Pascal-cased name for accessors (`getTotalCount`)
    pub accessor: String,
    /// Native type expression
    pub type_expr: String,
    pub doc: Vec<String>,
    pub nullable: bool,
    pub read_only: bool,
    pub deprecated: bool,
    pub is_array: bool,
    pub is_date_time: bool,
    /// Referenced model, for nested (de)serialization
    pub model: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

/// One resource client (a group of endpoints)
#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    /// Type name, e.g. `InvoicesClient`
    pub name: String,
    pub file_name: String,
    /// Member name of this client on the root client
    pub accessor: String,
    pub methods: Vec<MethodContext>,
    /// Models used by the methods' signatures
    pub imports: Vec<ImportContext>,
}

/// One endpoint rendered as a client method
#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub name: String,
    pub operation_id: String,
    /// Upper-case HTTP method
    pub http_method: String,
    /// Path as declared, placeholders included
    pub path: String,
    /// Target-language expression building the request path
    pub path_expr: String,
    pub summary: String,
    pub doc: Vec<String>,
    pub deprecated: bool,
    /// Signature order: path, body, required, then optional parameters
    pub params: Vec<ParamContext>,
    pub query_params: Vec<ParamContext>,
    pub header_params: Vec<ParamContext>,
    pub body: Option<ParamContext>,
    /// Native return type, absent for operations without a response body
    pub return_type: Option<String>,
    pub return_model: Option<String>,
    pub returns_array: bool,
}

/// One method argument
#[derive(Debug, Clone, Serialize)]
pub struct ParamContext {
    pub wire_name: String,
    pub member: String,
    pub type_expr: String,
    pub required: bool,
    pub doc: String,
}
