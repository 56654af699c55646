//! Artifact and manifest emission.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::directive::apply_directives;
use crate::error::{ConvertError, ConvertResult};
use crate::handler::{Category, Endpoint, Handler};
use crate::manifest::{EndpointConfig, FunctionConfig, ManifestWriter};
use crate::paths::ProjectDirs;
use crate::rewrite::{Dispatcher, InvocationRewriter};

/// A handler after directive processing and invocation rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedHandler {
    pub name: String,
    pub is_async: bool,
    pub param_signature: String,
    pub category: Category,
    pub lines: Vec<String>,
}

impl TransformedHandler {
    /// Run a handler body through the directive processor and the rewriter.
    pub fn from_handler<D: Dispatcher>(handler: Handler, rewriter: &InvocationRewriter<D>) -> Self {
        let category = handler.category();
        let effective = apply_directives(&handler.body_lines);

        Self {
            lines: rewriter.rewrite_body(effective),
            category,
            name: handler.name,
            is_async: handler.is_async,
            param_signature: handler.param_signature,
        }
    }

    /// First artifact line: the declaration in exported-function form.
    pub fn declaration_line(&self) -> String {
        format!(
            "exports = {}function({}",
            if self.is_async { "async " } else { "" },
            self.param_signature
        )
    }

    /// Full artifact text, every line newline-terminated.
    pub fn artifact_source(&self) -> String {
        let mut source = self.declaration_line();
        source.push('\n');
        for line in &self.lines {
            source.push_str(line);
            source.push('\n');
        }
        source
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        Endpoint::from_name(&self.name)
    }
}

/// What the emitter produced for one handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    pub artifact: Option<PathBuf>,
    pub endpoint: Option<Endpoint>,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub artifacts_written: usize,
    pub endpoints_registered: usize,
}

/// Writes artifacts and appends registry entries.
///
/// Owns both manifests for the whole run; [`ArtifactEmitter::finish`] closes them.
pub struct ArtifactEmitter {
    dirs: ProjectDirs,
    functions: ManifestWriter,
    endpoints: ManifestWriter,
    artifacts: HashSet<PathBuf>,
}

impl ArtifactEmitter {
    /// Open both manifests (truncating any previous content).
    pub fn open(dirs: ProjectDirs) -> ConvertResult<Self> {
        let functions = ManifestWriter::create(&dirs.functions_config)?;
        let endpoints = ManifestWriter::create(&dirs.endpoints_config)?;
        Ok(Self {
            dirs,
            functions,
            endpoints,
            artifacts: HashSet::new(),
        })
    }

    /// Emit one handler. Excluded handlers produce nothing.
    pub fn emit(&mut self, handler: &TransformedHandler) -> ConvertResult<Emission> {
        if !handler.category.is_transferable() {
            return Ok(Emission::default());
        }

        let artifact = self.write_artifact(handler)?;
        self.functions
            .append(&FunctionConfig::new(&handler.name, handler.category))?;

        let endpoint = handler.endpoint();
        if let Some(endpoint) = &endpoint {
            self.endpoints
                .append(&EndpointConfig::new(&handler.name, endpoint))?;
            tracing::debug!(
                "Registered endpoint {} {} -> {}",
                endpoint.verb,
                endpoint.route(),
                handler.name
            );
        }

        Ok(Emission {
            artifact: Some(artifact),
            endpoint,
        })
    }

    /// Close both manifests.
    pub fn finish(self) -> ConvertResult<EmitStats> {
        let stats = EmitStats {
            artifacts_written: self.artifacts.len(),
            endpoints_registered: self.endpoints.len(),
        };
        self.endpoints.finish()?;
        self.functions.finish()?;
        Ok(stats)
    }

    fn write_artifact(&mut self, handler: &TransformedHandler) -> ConvertResult<PathBuf> {
        let path = self.dirs.artifact_path(&handler.name);
        if self.artifacts.contains(&path) {
            tracing::warn!(
                "Overwriting artifact {} (handler name defined more than once)",
                path.display()
            );
        }

        fs::write(&path, handler.artifact_source()).map_err(|e| ConvertError::write(&path, e))?;
        tracing::debug!("Wrote {} ({} lines)", path.display(), handler.lines.len() + 1);
        self.artifacts.insert(path.clone());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_handlers;
    use crate::handler::HttpVerb;
    use crate::manifest::read_manifest;
    use crate::rewrite::AppServicesDispatch;

    fn transform(source: &str) -> Vec<TransformedHandler> {
        let rewriter = InvocationRewriter::<AppServicesDispatch>::default();
        extract_handlers(source.lines())
            .map(|h| TransformedHandler::from_handler(h, &rewriter))
            .collect()
    }

    #[test]
    fn test_declaration_line() {
        let handlers = transform(
            "async function GET_status(request, response) {\n  return 1;\n}\nfunction PUB_ping() {\n}\n",
        );
        assert_eq!(
            handlers[0].declaration_line(),
            "exports = async function(request, response) {"
        );
        assert_eq!(handlers[1].declaration_line(), "exports = function() {");
    }

    #[test]
    fn test_transform_applies_directives_then_rewrites() {
        let source = r#"async function GET_data(request, response) {
  const key = context_values_get("KEY");
  // ACTION: REMOVE
  const local = true;
  const rows = await PRIV_query(key);
  return rows;
}
"#;
        let handlers = transform(source);
        assert_eq!(handlers[0].category, Category::Http(HttpVerb::Get));
        assert_eq!(
            handlers[0].lines,
            [
                r#"  const key = context.values.get("KEY");"#,
                "  const rows = await context.functions.execute('PRIV_query', key);",
                "  return rows;",
                "};",
            ]
        );
    }

    #[test]
    fn test_emit_writes_artifact_and_entries() {
        let temp = tempfile::TempDir::new().unwrap();
        let dirs = ProjectDirs::from_app_dir(temp.path().join("app")).unwrap();
        let mut emitter = ArtifactEmitter::open(dirs.clone()).unwrap();

        let source = "function PRIV_helper(x) {\n  return x;\n}\nfunction GET_Orders(request) {\n  return [];\n}\nfunction local() {\n}\n";
        let mut emissions = Vec::new();
        for handler in transform(source) {
            emissions.push(emitter.emit(&handler).unwrap());
        }
        let stats = emitter.finish().unwrap();

        assert_eq!(stats.artifacts_written, 2);
        assert_eq!(stats.endpoints_registered, 1);
        assert!(emissions[0].endpoint.is_none());
        assert_eq!(emissions[1].endpoint.as_ref().unwrap().route(), "/Orders");
        assert_eq!(emissions[2], Emission::default());

        let artifact = fs::read_to_string(dirs.artifact_path("PRIV_helper")).unwrap();
        assert_eq!(artifact, "exports = function(x) {\n  return x;\n};\n");
        assert!(!dirs.artifact_path("local").exists());

        let functions: Vec<FunctionConfig> = read_manifest(&dirs.functions_config).unwrap();
        assert_eq!(functions.len(), 2);
        assert!(functions.iter().all(|f| f.private));

        let endpoints: Vec<EndpointConfig> = read_manifest(&dirs.endpoints_config).unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].route, "/Orders");
        assert_eq!(endpoints[0].http_method, "GET");
        assert_eq!(endpoints[0].function_name, "GET_Orders");
    }

    #[test]
    fn test_duplicate_name_counts_one_artifact() {
        let temp = tempfile::TempDir::new().unwrap();
        let dirs = ProjectDirs::from_app_dir(temp.path().join("app")).unwrap();
        let mut emitter = ArtifactEmitter::open(dirs.clone()).unwrap();

        let source = "function PUB_dup() {\n  return 1;\n}\nfunction PUB_dup() {\n  return 2;\n}\n";
        for handler in transform(source) {
            emitter.emit(&handler).unwrap();
        }
        let stats = emitter.finish().unwrap();

        assert_eq!(stats.artifacts_written, 1);
        let artifact = fs::read_to_string(dirs.artifact_path("PUB_dup")).unwrap();
        assert_eq!(artifact, "exports = function() {\n  return 2;\n};\n");

        let functions: Vec<FunctionConfig> = read_manifest(&dirs.functions_config).unwrap();
        assert_eq!(functions.len(), 2);
    }
}
