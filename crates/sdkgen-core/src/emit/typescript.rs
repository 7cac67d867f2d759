//! TypeScript package: interfaces per model, a class per resource client, and
//! a root client with a `fetch`-based request helper.

use super::reserved;
use super::source::{Dialect, ForEach, PathPart, TemplateFile};
use crate::target::TargetKind;
use crate::types::Language;
use crate::utils::Casing;

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScript;

static TEMPLATES: [TemplateFile; 6] = [
    TemplateFile {
        name: "model.ts",
        source: include_str!("../../templates/typescript/model.ts.tera"),
        destination: "src/models/{{ model.file_name }}.ts",
        for_each: Some(ForEach::Model),
    },
    TemplateFile {
        name: "client.ts",
        source: include_str!("../../templates/typescript/client.ts.tera"),
        destination: "src/clients/{{ client.file_name }}.ts",
        for_each: Some(ForEach::Client),
    },
    TemplateFile {
        name: "root.ts",
        source: include_str!("../../templates/typescript/root.ts.tera"),
        destination: "src/{{ client_name }}.ts",
        for_each: None,
    },
    TemplateFile {
        name: "index.ts",
        source: include_str!("../../templates/typescript/index.ts.tera"),
        destination: "src/index.ts",
        for_each: None,
    },
    TemplateFile {
        name: "package.json",
        source: include_str!("../../templates/typescript/package.json.tera"),
        destination: "package.json",
        for_each: None,
    },
    TemplateFile {
        name: "tsconfig.json",
        source: include_str!("../../templates/typescript/tsconfig.json.tera"),
        destination: "tsconfig.json",
        for_each: None,
    },
];

impl Dialect for TypeScript {
    const TARGET: TargetKind = TargetKind::TypeScript;
    const LANGUAGE: Language = Language::TypeScript;
    const MEMBER_CASE: Casing = Casing::Preserve;
    const METHOD_CASE: Casing = Casing::Camel;
    const FILE_CASE: Casing = Casing::Preserve;
    const NULLABLE_OPTIONALS: bool = false;

    fn templates(&self) -> &'static [TemplateFile] {
        &TEMPLATES
    }

    fn path_expression(&self, parts: &[PathPart<'_>]) -> String {
        let mut out = String::from("`");
        for part in parts {
            match part {
                PathPart::Literal(text) => {
                    out.push_str(&text.replace('`', "\\`").replace("${", "\\${"))
                }
                PathPart::Param(member) => {
                    out.push_str(&format!("${{encodeURIComponent(String({}))}}", member))
                }
            }
        }
        out.push('`');
        out
    }

    /// Interface keys mirror the wire; names that are not identifiers are quoted
    fn field_member(&self, name: &str, case: Casing) -> String {
        let cased = case.apply(name);
        if reserved::is_identifier(&cased) {
            cased
        } else {
            format!("\"{}\"", cased.replace('"', "\\\""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, TargetConfig};
    use crate::emit::source::SourceEmitter;
    use crate::emit::Emitter;
    use crate::error::EmitError;
    use crate::schema::{
        ApiSchema, DataTypeRef, Endpoint, Parameter, ParameterKind, PrimitiveKind, SchemaField,
        SchemaItem,
    };
    use url::Url;

    fn schema() -> ApiSchema {
        let int = DataTypeRef::primitive(PrimitiveKind::Integer);
        let mut get = Endpoint::new("getInvoice", "get", "/invoices/{id}")
            .returning(DataTypeRef::named("Invoice"));
        get.parameters = vec![
            Parameter {
                name: "id".into(),
                kind: ParameterKind::Path,
                data_type: int.clone(),
                required: true,
                description: "Invoice id".into(),
            },
            Parameter {
                name: "include".into(),
                kind: ParameterKind::Query,
                data_type: DataTypeRef::primitive(PrimitiveKind::String),
                required: false,
                description: String::new(),
            },
        ];
        let mut old = Endpoint::new("deleteInvoice", "delete", "/invoices/{id}");
        old.parameters = vec![get.parameters[0].clone()];
        old.deprecated = true;
        ApiSchema {
            title: Some("Billing".into()),
            version: "1.4.0".into(),
            schemas: vec![SchemaItem::new("Invoice")
                .describe("A bill.")
                .field(SchemaField::new("id", int).read_only())
                .field(SchemaField::new(
                    "total-count",
                    DataTypeRef::primitive(PrimitiveKind::Number),
                ))
                .field(
                    SchemaField::new("memo", DataTypeRef::primitive(PrimitiveKind::String))
                        .nullable()
                        .max_length(500),
                )
                .field(
                    SchemaField::new("code", DataTypeRef::primitive(PrimitiveKind::String))
                        .min_length(0)
                        .max_length(12),
                )],
            endpoints: vec![get, old],
        }
    }

    fn emit() -> Vec<crate::emit::Artifact> {
        let config = TargetConfig::new(TargetKind::TypeScript, "sdk/ts", "billing-sdk");
        SourceEmitter::new(TypeScript).emit(&schema(), &config).unwrap()
    }

    fn artifact<'a>(artifacts: &'a [crate::emit::Artifact], name: &str) -> &'a str {
        &artifacts
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("missing {}", name))
            .content
    }

    #[test]
    fn test_artifact_layout() {
        let names: Vec<_> = emit().into_iter().map(|a| a.name).collect();
        assert_eq!(
            names,
            vec![
                "src/models/Invoice.ts",
                "src/clients/InvoicesClient.ts",
                "src/BillingClient.ts",
                "src/index.ts",
                "package.json",
                "tsconfig.json"
            ]
        );
    }

    #[test]
    fn test_model_interface() {
        let artifacts = emit();
        let model = artifact(&artifacts, "src/models/Invoice.ts");
        assert!(model.contains("export interface Invoice {"));
        assert!(model.contains("  readonly id: number;"));
        assert!(model.contains("  \"total-count\": number;"));
        assert!(model.contains("  memo?: string | null;"));
        assert!(model.contains("@maxLength 500"));
    }

    #[test]
    fn test_zero_length_bound_is_rendered() {
        let artifacts = emit();
        let model = artifact(&artifacts, "src/models/Invoice.ts");
        assert!(model.contains("   * @minLength 0\n   * @maxLength 12\n"));
    }

    #[test]
    fn test_client_methods() {
        let artifacts = emit();
        let client = artifact(&artifacts, "src/clients/InvoicesClient.ts");
        assert!(client.contains("import type { Invoice } from \"../models/Invoice\";"));
        assert!(client.contains("getInvoice(id: number, include?: string): Promise<Invoice> {"));
        assert!(client.contains("`/invoices/${encodeURIComponent(String(id))}`"));
        assert!(client.contains("\"include\": include"));
        assert!(client.contains("deleteInvoice(id: number): Promise<void> {"));
        assert!(client.contains("@deprecated"));
    }

    #[test]
    fn test_manifest_carries_version() {
        let artifacts = emit();
        let manifest = artifact(&artifacts, "package.json");
        assert!(manifest.contains("\"name\": \"billing-sdk\""));
        assert!(manifest.contains("\"version\": \"1.4.0\""));
        let root = artifact(&artifacts, "src/BillingClient.ts");
        assert!(root.contains("readonly invoices: InvoicesClient;"));
        assert!(root.contains("static readonly version = \"1.4.0\";"));
    }

    #[test]
    fn test_environments_constant() {
        let mut config = TargetConfig::new(TargetKind::TypeScript, "sdk/ts", "billing-sdk");
        config.environments = vec![
            Environment::new("production", Url::parse("https://api.example.com").unwrap()),
            Environment::new("sandbox", Url::parse("https://sandbox.example.com/v1/").unwrap()),
        ];
        let artifacts = SourceEmitter::new(TypeScript).emit(&schema(), &config).unwrap();
        let root = artifact(&artifacts, "src/BillingClient.ts");
        assert!(root.contains(
            "export const Environments = {\n  \"production\": \"https://api.example.com/\",\n  \
             \"sandbox\": \"https://sandbox.example.com/v1/\",\n} as const;\n"
        ));

        let plain = emit();
        assert!(!artifact(&plain, "src/BillingClient.ts").contains("Environments"));

        config.environments.push(config.environments[0].clone());
        let err = SourceEmitter::new(TypeScript).emit(&schema(), &config).unwrap_err();
        assert!(matches!(err, EmitError::NameCollision { name, .. } if name == "production"));
    }

    #[test]
    fn test_path_expression() {
        let parts = [
            PathPart::Literal("/a/"),
            PathPart::Param("id"),
            PathPart::Literal("/b"),
        ];
        assert_eq!(
            TypeScript.path_expression(&parts),
            "`/a/${encodeURIComponent(String(id))}/b`"
        );
    }
}
