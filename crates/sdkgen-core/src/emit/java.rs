//! Java library: Jackson-annotated beans and resource clients over
//! `java.net.http`. Nullability is expressed with JSpecify's `@Nullable`.

use super::source::{Dialect, ForEach, PathPart, TemplateFile};
use crate::target::TargetKind;
use crate::types::Language;
use crate::utils::Casing;

#[derive(Debug, Clone, Copy, Default)]
pub struct Java;

static TEMPLATES: [TemplateFile; 5] = [
    TemplateFile {
        name: "Model.java",
        source: include_str!("../../templates/java/Model.java.tera"),
        destination: "src/main/java/{{ package_path }}/models/{{ model.file_name }}.java",
        for_each: Some(ForEach::Model),
    },
    TemplateFile {
        name: "Client.java",
        source: include_str!("../../templates/java/Client.java.tera"),
        destination: "src/main/java/{{ package_path }}/clients/{{ client.file_name }}.java",
        for_each: Some(ForEach::Client),
    },
    TemplateFile {
        name: "Root.java",
        source: include_str!("../../templates/java/Root.java.tera"),
        destination: "src/main/java/{{ package_path }}/{{ client_name }}.java",
        for_each: None,
    },
    TemplateFile {
        name: "ApiException.java",
        source: include_str!("../../templates/java/ApiException.java.tera"),
        destination: "src/main/java/{{ package_path }}/ApiException.java",
        for_each: None,
    },
    TemplateFile {
        name: "pom.xml",
        source: include_str!("../../templates/java/pom.xml.tera"),
        destination: "pom.xml",
        for_each: None,
    },
];

impl Dialect for Java {
    const TARGET: TargetKind = TargetKind::Java;
    const LANGUAGE: Language = Language::Java;
    const MEMBER_CASE: Casing = Casing::Camel;
    const METHOD_CASE: Casing = Casing::Camel;
    const FILE_CASE: Casing = Casing::Preserve;
    const NULLABLE_RETURNS: bool = true;

    fn templates(&self) -> &'static [TemplateFile] {
        &TEMPLATES
    }

    fn path_expression(&self, parts: &[PathPart<'_>]) -> String {
        if parts.is_empty() {
            return "\"\"".to_string();
        }
        parts
            .iter()
            .map(|part| match part {
                PathPart::Literal(text) => {
                    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
                }
                PathPart::Param(member) => format!("client.encode({})", member),
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn package_path(&self, package: &str) -> String {
        package.replace('.', "/")
    }

    /// A public class must live in a file of the same name
    fn file_case(&self, _configured: Option<Casing>) -> Casing {
        Casing::Preserve
    }
}
