//! C# library: POCO models with `System.Text.Json` attributes and async
//! resource clients over `HttpClient`.

use super::source::{Dialect, ForEach, PathPart, TemplateFile};
use crate::target::TargetKind;
use crate::types::Language;
use crate::utils::Casing;

#[derive(Debug, Clone, Copy, Default)]
pub struct CSharp;

static TEMPLATES: [TemplateFile; 5] = [
    TemplateFile {
        name: "Model.cs",
        source: include_str!("../../templates/csharp/Model.cs.tera"),
        destination: "src/{{ package }}/Models/{{ model.file_name }}.cs",
        for_each: Some(ForEach::Model),
    },
    TemplateFile {
        name: "Client.cs",
        source: include_str!("../../templates/csharp/Client.cs.tera"),
        destination: "src/{{ package }}/Clients/{{ client.file_name }}.cs",
        for_each: Some(ForEach::Client),
    },
    TemplateFile {
        name: "Root.cs",
        source: include_str!("../../templates/csharp/Root.cs.tera"),
        destination: "src/{{ package }}/{{ client_name }}.cs",
        for_each: None,
    },
    TemplateFile {
        name: "ApiException.cs",
        source: include_str!("../../templates/csharp/ApiException.cs.tera"),
        destination: "src/{{ package }}/ApiException.cs",
        for_each: None,
    },
    TemplateFile {
        name: "Project.csproj",
        source: include_str!("../../templates/csharp/Project.csproj.tera"),
        destination: "src/{{ package }}/{{ package }}.csproj",
        for_each: None,
    },
];

impl Dialect for CSharp {
    const TARGET: TargetKind = TargetKind::CSharp;
    const LANGUAGE: Language = Language::CSharp;
    const MEMBER_CASE: Casing = Casing::Pascal;
    const METHOD_CASE: Casing = Casing::Pascal;
    const FILE_CASE: Casing = Casing::Pascal;

    fn templates(&self) -> &'static [TemplateFile] {
        &TEMPLATES
    }

    /// Verbatim identifiers: `@class`
    fn escape(&self, word: &str) -> String {
        format!("@{}", word)
    }

    fn path_expression(&self, parts: &[PathPart<'_>]) -> String {
        let mut out = String::from("$\"");
        for part in parts {
            match part {
                PathPart::Literal(text) => out.push_str(
                    &text
                        .replace('\\', "\\\\")
                        .replace('"', "\\\"")
                        .replace('{', "{{")
                        .replace('}', "}}"),
                ),
                PathPart::Param(member) => out.push_str(&format!(
                    "{{Uri.EscapeDataString(Format({}))}}",
                    member
                )),
            }
        }
        out.push('"');
        out
    }
}
