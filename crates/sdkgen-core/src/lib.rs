//! sdkgen core library
//!
//! Turns an OpenAPI 3.x or Swagger 2.0 description into client SDKs for
//! several languages plus Markdown model documentation. A run ingests the
//! description once into a language-neutral [`ApiSchema`] and hands it to
//! every configured backend.

pub mod config;
pub mod description;
pub mod emit;
pub mod error;
pub mod generate;
pub mod ingest;
pub mod output;
pub mod readme;
pub mod schema;
pub mod target;
pub mod types;
pub mod utils;

pub use crate::{
    config::{ProjectConfig, TargetConfig},
    description::ApiDescription,
    error::{Error, Result},
    generate::{generate, generate_project, GenerationReport},
    schema::ApiSchema,
    target::TargetKind,
};
