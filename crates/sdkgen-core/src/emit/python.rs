//! Python package: keyword-only dataclasses with `from_dict`/`to_dict`, and
//! resource clients over `requests`.

use super::source::{Dialect, ForEach, PathPart, TemplateFile};
use crate::target::TargetKind;
use crate::types::Language;
use crate::utils::Casing;

#[derive(Debug, Clone, Copy, Default)]
pub struct Python;

static TEMPLATES: [TemplateFile; 8] = [
    TemplateFile {
        name: "model.py",
        source: include_str!("../../templates/python/model.py.tera"),
        destination: "src/{{ package }}/models/{{ model.file_name }}.py",
        for_each: Some(ForEach::Model),
    },
    TemplateFile {
        name: "models_init.py",
        source: include_str!("../../templates/python/models_init.py.tera"),
        destination: "src/{{ package }}/models/__init__.py",
        for_each: None,
    },
    TemplateFile {
        name: "client.py",
        source: include_str!("../../templates/python/client.py.tera"),
        destination: "src/{{ package }}/clients/{{ client.file_name }}.py",
        for_each: Some(ForEach::Client),
    },
    TemplateFile {
        name: "clients_init.py",
        source: include_str!("../../templates/python/clients_init.py.tera"),
        destination: "src/{{ package }}/clients/__init__.py",
        for_each: None,
    },
    TemplateFile {
        name: "root.py",
        source: include_str!("../../templates/python/root.py.tera"),
        destination: "src/{{ package }}/client.py",
        for_each: None,
    },
    TemplateFile {
        name: "serde.py",
        source: include_str!("../../templates/python/serde.py.tera"),
        destination: "src/{{ package }}/_serde.py",
        for_each: None,
    },
    TemplateFile {
        name: "package_init.py",
        source: include_str!("../../templates/python/package_init.py.tera"),
        destination: "src/{{ package }}/__init__.py",
        for_each: None,
    },
    TemplateFile {
        name: "pyproject.toml",
        source: include_str!("../../templates/python/pyproject.toml.tera"),
        destination: "pyproject.toml",
        for_each: None,
    },
];

impl Dialect for Python {
    const TARGET: TargetKind = TargetKind::Python;
    const LANGUAGE: Language = Language::Python;
    const MEMBER_CASE: Casing = Casing::Snake;
    const METHOD_CASE: Casing = Casing::Snake;
    const FILE_CASE: Casing = Casing::Snake;

    fn templates(&self) -> &'static [TemplateFile] {
        &TEMPLATES
    }

    fn path_expression(&self, parts: &[PathPart<'_>]) -> String {
        let mut out = String::from("f\"");
        for part in parts {
            match part {
                PathPart::Literal(text) => out.push_str(
                    &text
                        .replace('\\', "\\\\")
                        .replace('"', "\\\"")
                        .replace('{', "{{")
                        .replace('}', "}}"),
                ),
                PathPart::Param(member) => {
                    out.push_str(&format!("{{quote(str({}), safe='')}}", member))
                }
            }
        }
        out.push('"');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use crate::emit::source::SourceEmitter;
    use crate::emit::{Artifact, Emitter};
    use crate::schema::{
        ApiSchema, DataTypeRef, Endpoint, Parameter, ParameterKind, PrimitiveKind, SchemaField,
        SchemaItem,
    };

    fn schema() -> ApiSchema {
        let mut create = Endpoint::new("createInvoice", "post", "/customers/{customerId}/invoices")
            .returning(DataTypeRef::named("Invoice"));
        create.request_body = Some(DataTypeRef::named("Invoice"));
        create.parameters.push(Parameter {
            name: "customerId".into(),
            kind: ParameterKind::Path,
            data_type: DataTypeRef::primitive(PrimitiveKind::String),
            required: true,
            description: String::new(),
        });
        create.parameters.push(Parameter {
            name: "dryRun".into(),
            kind: ParameterKind::Query,
            data_type: DataTypeRef::primitive(PrimitiveKind::Boolean),
            required: false,
            description: "Validate only".into(),
        });
        let list = Endpoint::new("listInvoices", "get", "/invoices")
            .returning(DataTypeRef::array_of(DataTypeRef::named("Invoice")));
        ApiSchema {
            title: Some("Billing".into()),
            version: "2.0.1".into(),
            schemas: vec![
                SchemaItem::new("Invoice")
                    .field(SchemaField::new("class", DataTypeRef::primitive(PrimitiveKind::String)))
                    .field(SchemaField::new(
                        "issuedAt",
                        DataTypeRef::primitive(PrimitiveKind::DateTime),
                    ))
                    .field(
                        SchemaField::new("lines", DataTypeRef::array_of(DataTypeRef::named("Line")))
                            .nullable(),
                    ),
                SchemaItem::new("Line").field(SchemaField::new(
                    "amount",
                    DataTypeRef::primitive(PrimitiveKind::Number),
                )),
            ],
            endpoints: vec![create, list],
        }
    }

    fn emit() -> Vec<Artifact> {
        let config = TargetConfig::new(TargetKind::Python, "sdk/python", "billing_sdk");
        SourceEmitter::new(Python).emit(&schema(), &config).unwrap()
    }

    fn artifact<'a>(artifacts: &'a [Artifact], name: &str) -> &'a str {
        &artifacts
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("missing {}", name))
            .content
    }

    #[test]
    fn test_package_layout() {
        let artifacts = emit();
        for name in [
            "src/billing_sdk/models/invoice.py",
            "src/billing_sdk/models/line.py",
            "src/billing_sdk/models/__init__.py",
            "src/billing_sdk/clients/invoices_client.py",
            "src/billing_sdk/clients/customers_client.py",
            "src/billing_sdk/client.py",
            "src/billing_sdk/__init__.py",
            "pyproject.toml",
        ] {
            artifact(&artifacts, name);
        }
    }

    #[test]
    fn test_dataclass_fields() {
        let artifacts = emit();
        let model = artifact(&artifacts, "src/billing_sdk/models/invoice.py");
        assert!(model.contains("@dataclass(kw_only=True)\nclass Invoice:"));
        assert!(model.contains("    class_: str\n"));
        assert!(model.contains("    issued_at: datetime\n"));
        assert!(model.contains("    lines: Optional[List[Line]] = None\n"));
        assert!(model.contains("class_=data.get(\"class\")"));
        assert!(model.contains("issued_at=opt(data.get(\"issuedAt\"), parse_datetime)"));
        assert!(model.contains("lines=opt_list(data.get(\"lines\"), Line.from_dict)"));
        assert!(model.contains("\"class\": dump(self.class_)"));
    }

    #[test]
    fn test_client_method() {
        let artifacts = emit();
        let client = artifact(&artifacts, "src/billing_sdk/clients/customers_client.py");
        assert!(client.contains(
            "def create_invoice(self, customer_id: str, body: Invoice, dry_run: Optional[bool] = None) -> Invoice:"
        ));
        assert!(client.contains("f\"/customers/{quote(str(customer_id), safe='')}/invoices\""));
        assert!(client.contains("\"dryRun\": dry_run"));
        assert!(client.contains("return opt(data, Invoice.from_dict)"));

        let list = artifact(&artifacts, "src/billing_sdk/clients/invoices_client.py");
        assert!(list.contains("return opt_list(data, Invoice.from_dict)"));
    }

    #[test]
    fn test_project_version() {
        let artifacts = emit();
        let project = artifact(&artifacts, "pyproject.toml");
        assert!(project.contains("name = \"billing_sdk\""));
        assert!(project.contains("version = \"2.0.1\""));
    }

    #[test]
    fn test_path_expression_escapes_braces() {
        let parts = [PathPart::Literal("/a{b}/"), PathPart::Param("id")];
        assert_eq!(
            Python.path_expression(&parts),
            "f\"/a{{b}}/{quote(str(id), safe='')}\""
        );
    }
}
