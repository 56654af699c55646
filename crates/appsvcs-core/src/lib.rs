//! Conversion engine for standalone handler sources.
//!
//! Splits source files containing free-standing named functions into one
//! App Services function per handler, plus the function and HTTPS endpoint
//! registries.
//!
//! # Architecture
//!
//! ```text
//! src/*.js ──► HandlerExtractor ──► DirectiveProcessor ──► InvocationRewriter ──► ArtifactEmitter
//!                 (Handler)          (EffectiveLine)       (TransformedHandler)        │
//!                                                                                      ├─► functions/<name>.js
//!                                                                                      ├─► functions/config.json
//!                                                                                      └─► http_endpoints/config.json
//! ```

mod error;

pub mod directive;
pub mod emit;
pub mod extract;
pub mod handler;
pub mod manifest;
pub mod paths;
pub mod pipeline;
pub mod rewrite;
pub mod skeleton;

pub use directive::{Directive, DirectiveProcessor, DirectiveState, EffectiveLine, apply_directives};
pub use emit::{ArtifactEmitter, Emission, EmitStats, TransformedHandler};
pub use error::{ConvertError, ConvertResult};
pub use extract::{HandlerExtractor, extract_handlers};
pub use handler::{Category, Endpoint, Handler, HttpVerb, TRANSFERABLE_PREFIXES};
pub use manifest::{EndpointConfig, FunctionConfig, ManifestWriter, read_manifest};
pub use paths::ProjectDirs;
pub use pipeline::{
    ConversionReport, ConvertOptions, Pipeline, ProjectSettings, SourceUnit, collect_source_files,
    convert_project, transform_source,
};
pub use rewrite::{AppServicesDispatch, CallSite, Dispatcher, InvocationRewriter, find_call_site};
pub use skeleton::create_skeleton;

use std::path::Path;

/// Generate functions and endpoints into an existing project directory.
pub fn generate_functions(
    source_dir: impl AsRef<Path>,
    app_dir: impl AsRef<Path>,
    options: ConvertOptions,
) -> ConvertResult<ConversionReport> {
    let dirs = ProjectDirs::from_app_dir(app_dir)?;
    Pipeline::new(options).run(source_dir.as_ref(), dirs)
}
