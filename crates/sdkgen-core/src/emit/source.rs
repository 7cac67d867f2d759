//! Shared driver for the programming-language backends.
//!
//! A [`Dialect`] supplies what differs between languages: casing defaults,
//! reserved-word escaping, path interpolation, and the embedded template
//! manifest. [`SourceEmitter`] does everything else: package validation,
//! grouping endpoints into resource clients, collision checks, building the
//! [contexts](super::context), and rendering.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tera::{Context, Tera};

use super::context::{
    ClientContext, EnvironmentContext, FieldContext, ImportContext, MethodContext, ModelContext,
    PackageContext, ParamContext,
};
use super::reserved::{self, PackageProblem};
use super::{Artifact, Emitter};
use crate::config::TargetConfig;
use crate::error::EmitError;
use crate::schema::{
    ApiSchema, DataTypeRef, Endpoint, ParameterKind, PrimitiveKind, SchemaItem, TypeKind,
};
use crate::target::TargetKind;
use crate::types::{map_type, Language};
use crate::utils::{doc_lines, pluralize, to_upper_camel_case, Casing};

static PATH_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("path placeholder regex"));

/// Template file repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForEach {
    /// Once per emitted model, with `model` in the context
    Model,
    /// Once per resource client, with `client` in the context
    Client,
}

/// One entry of a dialect's template manifest
#[derive(Debug)]
pub struct TemplateFile {
    /// Template name, unique within the manifest
    pub name: &'static str,
    /// Template body
    pub source: &'static str,
    /// Template of the artifact path, rendered with the same context
    pub destination: &'static str,
    pub for_each: Option<ForEach>,
}

/// A piece of an endpoint path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPart<'a> {
    Literal(&'a str),
    /// A placeholder, holding the argument's member name
    Param(&'a str),
}

/// Per-language rules for [`SourceEmitter`]
pub trait Dialect: Sized + Send + Sync + 'static {
    const TARGET: TargetKind;
    const LANGUAGE: Language;
    /// Default casing of fields and parameters
    const MEMBER_CASE: Casing;
    const METHOD_CASE: Casing;
    /// Default casing of model and client file names
    const FILE_CASE: Casing;
    /// Optional arguments take a nullable type instead of optional-argument syntax
    const NULLABLE_OPTIONALS: bool = true;
    /// Response types are always nullable (an empty body yields no value)
    const NULLABLE_RETURNS: bool = false;

    fn templates(&self) -> &'static [TemplateFile];

    /// Expression that evaluates to the request path
    fn path_expression(&self, parts: &[PathPart<'_>]) -> String;

    /// Make a reserved word usable as an identifier
    fn escape(&self, word: &str) -> String {
        format!("{}_", word)
    }

    fn package_path(&self, package: &str) -> String {
        package.to_string()
    }

    fn module_name(&self, package: &str) -> String {
        package.to_string()
    }

    fn file_case(&self, configured: Option<Casing>) -> Casing {
        configured.unwrap_or(Self::FILE_CASE)
    }

    /// Member name of a model field
    fn field_member(&self, name: &str, case: Casing) -> String {
        identifier(self, name, case)
    }
}

/// Apply casing, then force the result into a legal, non-reserved identifier
pub fn identifier<D: Dialect>(dialect: &D, name: &str, case: Casing) -> String {
    let mut ident: String = case
        .apply(name)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if reserved::is_reserved(D::LANGUAGE, &ident) {
        dialect.escape(&ident)
    } else {
        ident
    }
}

/// Claims names within one scope and reports the first collision
struct Names {
    target: TargetKind,
    scope: String,
    seen: HashSet<String>,
    fold_case: bool,
}

impl Names {
    fn new(target: TargetKind, scope: impl Into<String>) -> Self {
        Self {
            target,
            scope: scope.into(),
            seen: HashSet::new(),
            fold_case: false,
        }
    }

    /// File names collide case-insensitively
    fn files(target: TargetKind, scope: impl Into<String>) -> Self {
        Self {
            fold_case: true,
            ..Self::new(target, scope)
        }
    }

    fn claim(&mut self, name: &str) -> Result<(), EmitError> {
        let key = if self.fold_case {
            name.to_lowercase()
        } else {
            name.to_string()
        };
        if self.seen.insert(key) {
            Ok(())
        } else {
            Err(EmitError::NameCollision {
                target: self.target,
                scope: self.scope.clone(),
                name: name.to_string(),
            })
        }
    }
}

/// Resolved naming for one emit run
struct Naming {
    member_case: Casing,
    file_case: Casing,
    pluralize_clients: bool,
}

/// Source-code backend driven by a [`Dialect`]
#[derive(Debug, Clone, Default)]
pub struct SourceEmitter<D> {
    dialect: D,
}

impl<D: Dialect> SourceEmitter<D> {
    pub fn new(dialect: D) -> Self {
        Self { dialect }
    }

    fn package_context(
        &self,
        schema: &ApiSchema,
        config: &TargetConfig,
    ) -> Result<PackageContext, EmitError> {
        let target = D::TARGET;
        let package = config.package_identifier.as_str();
        reserved::check_package(D::LANGUAGE, package).map_err(|problem| match problem {
            PackageProblem::Reserved(identifier) => {
                EmitError::ReservedIdentifier { target, identifier }
            }
            PackageProblem::Invalid(reason) => EmitError::InvalidIdentifier {
                target,
                identifier: package.to_string(),
                reason,
            },
        })?;

        let naming = Naming {
            member_case: config.naming.member_case.unwrap_or(D::MEMBER_CASE),
            file_case: self.dialect.file_case(config.naming.file_case),
            pluralize_clients: config.naming.pluralize_clients,
        };
        let emitted: HashSet<&str> = schema.documented_schemas().map(|s| s.name.as_str()).collect();

        let mut type_names = Names::new(target, "types");
        let mut model_files = Names::files(target, "models");
        let mut models = Vec::new();
        for item in schema.documented_schemas() {
            self.check_type_name(&item.name)?;
            type_names.claim(&item.name)?;
            let model = self.model_context(item, &emitted, &naming)?;
            model_files.claim(&model.file_name)?;
            models.push(model);
        }

        let title = schema.title.clone().unwrap_or_else(|| package.to_string());
        let root = to_upper_camel_case(&title);
        let client_name = format!("{}Client", if root.is_empty() { "Api" } else { &root });
        type_names.claim(&client_name)?;

        let clients = self.client_contexts(schema, &emitted, &naming, &mut type_names)?;

        let mut environment_names = Names::new(target, "environments");
        let mut environments = Vec::with_capacity(config.environments.len());
        for environment in &config.environments {
            environment_names.claim(&environment.name)?;
            environments.push(EnvironmentContext {
                name: environment.name.clone(),
                url: environment.url.to_string(),
            });
        }

        Ok(PackageContext {
            title,
            version: schema.version.clone(),
            package: package.to_string(),
            package_path: self.dialect.package_path(package),
            module: self.dialect.module_name(package),
            client_name,
            environments,
            models,
            clients,
        })
    }

    fn check_type_name(&self, name: &str) -> Result<(), EmitError> {
        let target = D::TARGET;
        if !reserved::is_identifier(name) {
            return Err(EmitError::InvalidIdentifier {
                target,
                identifier: name.to_string(),
                reason: "model names must be identifiers".to_string(),
            });
        }
        if reserved::is_reserved(D::LANGUAGE, name) {
            return Err(EmitError::ReservedIdentifier {
                target,
                identifier: name.to_string(),
            });
        }
        Ok(())
    }

    fn model_context(
        &self,
        item: &SchemaItem,
        emitted: &HashSet<&str>,
        naming: &Naming,
    ) -> Result<ModelContext, EmitError> {
        let mut members = Names::new(D::TARGET, item.name.clone());
        let mut imports = Vec::new();
        let mut fields = Vec::new();

        for field in &item.fields {
            let model = field.data_type.model_name();
            if let Some(name) = model {
                if !emitted.contains(name) {
                    return Err(EmitError::UnrenderableType {
                        target: D::TARGET,
                        model: item.name.clone(),
                        field: field.name.clone(),
                        reason: format!("'{}' has no fields and is not emitted", name),
                    });
                }
                if name != item.name {
                    push_import(&mut imports, name, naming.file_case);
                }
            }

            let member = self.dialect.field_member(&field.name, naming.member_case);
            members.claim(&member)?;
            let accessor = to_upper_camel_case(&field.name);
            fields.push(FieldContext {
                wire_name: field.name.clone(),
                accessor: if accessor.is_empty() { member.clone() } else { accessor },
                member,
                type_expr: map_type(&field.data_type, D::LANGUAGE).into_string(),
                doc: doc_lines(&field.description),
                nullable: field.nullable,
                read_only: field.read_only,
                deprecated: field.deprecated,
                is_array: field.data_type.is_array,
                is_date_time: field.data_type.kind == TypeKind::Primitive(PrimitiveKind::DateTime),
                model: model.map(String::from),
                min_length: field.min_length,
                max_length: field.max_length,
            });
        }

        Ok(ModelContext {
            name: item.name.clone(),
            file_name: naming.file_case.apply(&item.name),
            doc: doc_lines(&item.description),
            fields,
            imports,
        })
    }

    fn client_contexts(
        &self,
        schema: &ApiSchema,
        emitted: &HashSet<&str>,
        naming: &Naming,
        type_names: &mut Names,
    ) -> Result<Vec<ClientContext>, EmitError> {
        let mut groups: Vec<(String, Vec<&Endpoint>)> = Vec::new();
        for endpoint in &schema.endpoints {
            let key = group_key(endpoint);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(endpoint),
                None => groups.push((key, vec![endpoint])),
            }
        }

        let mut client_files = Names::files(D::TARGET, "clients");
        let mut accessors = Names::new(D::TARGET, "root client");
        let mut clients = Vec::new();
        for (key, endpoints) in groups {
            let mut base = to_upper_camel_case(&key);
            if base.is_empty() {
                base = "Default".to_string();
            }
            if naming.pluralize_clients {
                base = pluralize(&base);
            }
            let name = format!("{}Client", base);
            type_names.claim(&name)?;
            let file_name = naming.file_case.apply(&name);
            client_files.claim(&file_name)?;
            let accessor = identifier(&self.dialect, &base, D::METHOD_CASE);
            accessors.claim(&accessor)?;

            let mut method_names = Names::new(D::TARGET, name.clone());
            let mut imports = Vec::new();
            let mut methods = Vec::new();
            for endpoint in endpoints {
                let method = self.method_context(endpoint, &name, emitted, naming, &mut imports)?;
                method_names.claim(&method.name)?;
                methods.push(method);
            }

            clients.push(ClientContext {
                name,
                file_name,
                accessor,
                methods,
                imports,
            });
        }
        Ok(clients)
    }

    fn method_context(
        &self,
        endpoint: &Endpoint,
        client: &str,
        emitted: &HashSet<&str>,
        naming: &Naming,
        imports: &mut Vec<ImportContext>,
    ) -> Result<MethodContext, EmitError> {
        let name = identifier(&self.dialect, &endpoint.operation_id, D::METHOD_CASE);
        let mut check = |data_type: &DataTypeRef, what: &str| -> Result<(), EmitError> {
            if let Some(model) = data_type.model_name() {
                if !emitted.contains(model) {
                    return Err(EmitError::UnrenderableType {
                        target: D::TARGET,
                        model: endpoint.operation_id.clone(),
                        field: what.to_string(),
                        reason: format!("'{}' has no fields and is not emitted", model),
                    });
                }
                push_import(imports, model, naming.file_case);
            }
            Ok(())
        };

        let mut members = Names::new(D::TARGET, format!("{}.{}", client, name));
        let mut param = |p: &crate::schema::Parameter| -> Result<ParamContext, EmitError> {
            let member = identifier(&self.dialect, &p.name, naming.member_case);
            members.claim(&member)?;
            let data_type = if !p.required && D::NULLABLE_OPTIONALS {
                p.data_type.clone().nullable(true)
            } else {
                p.data_type.clone()
            };
            Ok(ParamContext {
                wire_name: p.name.clone(),
                member,
                type_expr: map_type(&data_type, D::LANGUAGE).into_string(),
                required: p.required,
                doc: p.description.clone(),
            })
        };

        // Path arguments follow placeholder order
        let mut path_params = Vec::new();
        for placeholder in PATH_PLACEHOLDER.captures_iter(&endpoint.path) {
            let declared = endpoint
                .parameters
                .iter()
                .find(|p| p.kind == ParameterKind::Path && p.name == placeholder[1]);
            if let Some(p) = declared {
                check(&p.data_type, &p.name)?;
                path_params.push(param(p)?);
            }
        }

        let mut query_params = Vec::new();
        let mut header_params = Vec::new();
        for p in &endpoint.parameters {
            let bucket = match p.kind {
                ParameterKind::Query => &mut query_params,
                ParameterKind::Header => &mut header_params,
                ParameterKind::Path => continue,
                ParameterKind::Cookie => {
                    log::debug!(
                        "{}: cookie parameter '{}' is not emitted",
                        endpoint.operation_id,
                        p.name
                    );
                    continue;
                }
            };
            check(&p.data_type, &p.name)?;
            bucket.push(param(p)?);
        }

        let body = match &endpoint.request_body {
            Some(data_type) => {
                check(data_type, "request body")?;
                let member = identifier(&self.dialect, "body", naming.member_case);
                members.claim(&member)?;
                Some(ParamContext {
                    wire_name: "body".to_string(),
                    member,
                    type_expr: map_type(data_type, D::LANGUAGE).into_string(),
                    required: true,
                    doc: "Request body".to_string(),
                })
            }
            None => None,
        };

        if let Some(returns) = &endpoint.return_data_type {
            check(returns, "response")?;
        }

        let mut params: Vec<ParamContext> = path_params.clone();
        params.extend(body.clone());
        let rest = query_params.iter().chain(header_params.iter());
        params.extend(rest.clone().filter(|p| p.required).cloned());
        params.extend(rest.filter(|p| !p.required).cloned());

        let parts = path_parts(&endpoint.path, &path_params);
        Ok(MethodContext {
            name,
            operation_id: endpoint.operation_id.clone(),
            http_method: endpoint.http_method.clone(),
            path: endpoint.path.clone(),
            path_expr: self.dialect.path_expression(&parts),
            summary: endpoint.name.clone(),
            doc: doc_lines(&endpoint.description),
            deprecated: endpoint.deprecated,
            params,
            query_params,
            header_params,
            body,
            return_type: endpoint.return_data_type.as_ref().map(|t| {
                let t = t.clone().nullable(t.is_nullable || D::NULLABLE_RETURNS);
                map_type(&t, D::LANGUAGE).into_string()
            }),
            return_model: endpoint
                .return_data_type
                .as_ref()
                .and_then(DataTypeRef::model_name)
                .map(String::from),
            returns_array: endpoint.return_data_type.as_ref().map_or(false, |t| t.is_array),
        })
    }

    fn render(&self, package: &PackageContext) -> Result<Vec<Artifact>, EmitError> {
        let target = D::TARGET;
        let templates = self.dialect.templates();

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        let raw = templates.iter().flat_map(|file| {
            [
                (file.name.to_string(), file.source),
                (destination_name(file), file.destination),
            ]
        });
        tera.add_raw_templates(raw)
            .map_err(|e| EmitError::template(target, e))?;

        let base = Context::from_serialize(package).map_err(|e| EmitError::template(target, e))?;
        let mut names = Names::files(target, "artifacts");
        let mut artifacts = Vec::new();

        for file in templates {
            let contexts: Vec<Context> = match file.for_each {
                None => vec![base.clone()],
                Some(ForEach::Model) => package
                    .models
                    .iter()
                    .map(|model| {
                        let mut context = base.clone();
                        context.insert("model", model);
                        context
                    })
                    .collect(),
                Some(ForEach::Client) => package
                    .clients
                    .iter()
                    .map(|client| {
                        let mut context = base.clone();
                        context.insert("client", client);
                        context
                    })
                    .collect(),
            };

            for context in contexts {
                let name = tera
                    .render(&destination_name(file), &context)
                    .map_err(|e| EmitError::template(target, e))?
                    .trim()
                    .to_string();
                let content = tera
                    .render(file.name, &context)
                    .map_err(|e| EmitError::template(target, e))?;
                names.claim(&name)?;
                log::debug!("{}: rendered {} ({} bytes)", target, name, content.len());
                artifacts.push(Artifact::new(name, content));
            }
        }

        Ok(artifacts)
    }
}

impl<D: Dialect> Emitter for SourceEmitter<D> {
    fn target(&self) -> TargetKind {
        D::TARGET
    }

    fn emit(&self, schema: &ApiSchema, config: &TargetConfig) -> Result<Vec<Artifact>, EmitError> {
        let package = self.package_context(schema, config)?;
        self.render(&package)
    }
}

fn destination_name(file: &TemplateFile) -> String {
    format!("{}#destination", file.name)
}

fn push_import(imports: &mut Vec<ImportContext>, name: &str, file_case: Casing) {
    if !imports.iter().any(|i| i.name == name) {
        imports.push(ImportContext {
            name: name.to_string(),
            file_name: file_case.apply(name),
        });
    }
}

/// First tag, else first literal path segment
fn group_key(endpoint: &Endpoint) -> String {
    endpoint
        .tags
        .iter()
        .find(|t| !t.trim().is_empty())
        .cloned()
        .or_else(|| {
            endpoint
                .path
                .split('/')
                .find(|s| !s.is_empty() && !s.starts_with('{'))
                .map(String::from)
        })
        .unwrap_or_else(|| "default".to_string())
}

/// Split a path into literals and the member names of its placeholders
fn path_parts<'a>(path: &'a str, path_params: &'a [ParamContext]) -> Vec<PathPart<'a>> {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in PATH_PLACEHOLDER.captures_iter(path) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(PathPart::Literal(&path[last..whole.start()]));
        }
        let member = path_params
            .iter()
            .find(|p| p.wire_name == name.as_str())
            .map_or(name.as_str(), |p| p.member.as_str());
        parts.push(PathPart::Param(member));
        last = whole.end();
    }
    if last < path.len() {
        parts.push(PathPart::Literal(&path[last..]));
    }
    parts
}
