//! Backends that turn an [`ApiSchema`] into target artifacts.
//!
//! Every backend implements [`Emitter`]. Emission is pure: the same schema
//! and configuration always yield byte-identical artifacts, and nothing is
//! written to disk here (see [`crate::output`]).
//!
//! The five programming-language backends share one driver,
//! [`SourceEmitter`](source::SourceEmitter), parameterized by a per-language
//! [`Dialect`](source::Dialect). Markdown documentation has its own emitter.

pub mod context;
pub mod csharp;
pub mod java;
pub mod markdown;
pub mod python;
pub mod reserved;
pub mod ruby;
pub mod sections;
pub mod source;
pub mod typescript;

use serde::Serialize;

use crate::config::TargetConfig;
use crate::error::EmitError;
use crate::schema::ApiSchema;
use crate::target::TargetKind;

/// One generated file: a path relative to the target's output directory and its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub content: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A backend for one [`TargetKind`]
pub trait Emitter: Send + Sync {
    fn target(&self) -> TargetKind;

    /// Render every artifact of this target
    fn emit(&self, schema: &ApiSchema, config: &TargetConfig) -> Result<Vec<Artifact>, EmitError>;
}

/// Dispatch table from target kind to backend
pub fn emitter_for(kind: TargetKind) -> Box<dyn Emitter> {
    match kind {
        TargetKind::CSharp => Box::new(source::SourceEmitter::new(csharp::CSharp)),
        TargetKind::Java => Box::new(source::SourceEmitter::new(java::Java)),
        TargetKind::Python => Box::new(source::SourceEmitter::new(python::Python)),
        TargetKind::Ruby => Box::new(source::SourceEmitter::new(ruby::Ruby)),
        TargetKind::TypeScript => Box::new(source::SourceEmitter::new(typescript::TypeScript)),
        TargetKind::Markdown => Box::new(markdown::MarkdownEmitter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_covers_every_target() {
        for kind in TargetKind::all() {
            assert_eq!(emitter_for(kind).target(), kind);
        }
    }
}
