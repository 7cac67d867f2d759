//! Ruby gem: plain model classes with `from_hash`/`to_h` and resource clients
//! over `net/http`, documented with YARD tags.

use super::source::{Dialect, ForEach, PathPart, TemplateFile};
use crate::target::TargetKind;
use crate::types::Language;
use crate::utils::{to_upper_camel_case, Casing};

#[derive(Debug, Clone, Copy, Default)]
pub struct Ruby;

static TEMPLATES: [TemplateFile; 6] = [
    TemplateFile {
        name: "model.rb",
        source: include_str!("../../templates/ruby/model.rb.tera"),
        destination: "lib/{{ package }}/models/{{ model.file_name }}.rb",
        for_each: Some(ForEach::Model),
    },
    TemplateFile {
        name: "client.rb",
        source: include_str!("../../templates/ruby/client.rb.tera"),
        destination: "lib/{{ package }}/clients/{{ client.file_name }}.rb",
        for_each: Some(ForEach::Client),
    },
    TemplateFile {
        name: "root.rb",
        source: include_str!("../../templates/ruby/root.rb.tera"),
        destination: "lib/{{ package }}/client.rb",
        for_each: None,
    },
    TemplateFile {
        name: "serde.rb",
        source: include_str!("../../templates/ruby/serde.rb.tera"),
        destination: "lib/{{ package }}/serde.rb",
        for_each: None,
    },
    TemplateFile {
        name: "entry.rb",
        source: include_str!("../../templates/ruby/entry.rb.tera"),
        destination: "lib/{{ package }}.rb",
        for_each: None,
    },
    TemplateFile {
        name: "gemspec",
        source: include_str!("../../templates/ruby/gemspec.tera"),
        destination: "{{ package }}.gemspec",
        for_each: None,
    },
];

impl Dialect for Ruby {
    const TARGET: TargetKind = TargetKind::Ruby;
    const LANGUAGE: Language = Language::Ruby;
    const MEMBER_CASE: Casing = Casing::Snake;
    const METHOD_CASE: Casing = Casing::Snake;
    const FILE_CASE: Casing = Casing::Snake;

    fn templates(&self) -> &'static [TemplateFile] {
        &TEMPLATES
    }

    fn path_expression(&self, parts: &[PathPart<'_>]) -> String {
        let mut out = String::from("\"");
        for part in parts {
            match part {
                PathPart::Literal(text) => out.push_str(
                    &text
                        .replace('\\', "\\\\")
                        .replace('"', "\\\"")
                        .replace('#', "\\#"),
                ),
                PathPart::Param(member) => {
                    out.push_str(&format!("#{{ERB::Util.url_encode({}.to_s)}}", member))
                }
            }
        }
        out.push('"');
        out
    }

    /// `billing_sdk` lives in `module BillingSdk`
    fn module_name(&self, package: &str) -> String {
        to_upper_camel_case(package)
    }
}
