//! Generated project directory layout.
//!
//! ```text
//! app/
//! ├── functions/
//! │   ├── config.json      # handler registry
//! │   └── <name>.js        # one artifact per handler
//! └── http_endpoints/
//!     └── config.json      # endpoint registry
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult};

/// Extension of the generated per-handler artifacts.
pub const ARTIFACT_EXTENSION: &str = "js";

const MANIFEST_FILE: &str = "config.json";

/// Directory structure of a generated App Services project.
#[derive(Debug, Clone)]
pub struct ProjectDirs {
    /// The project root.
    pub app_dir: PathBuf,

    /// Directory receiving handler artifacts.
    pub functions_dir: PathBuf,

    /// Handler registry manifest.
    pub functions_config: PathBuf,

    /// Directory holding the endpoint registry.
    pub endpoints_dir: PathBuf,

    /// Endpoint registry manifest.
    pub endpoints_config: PathBuf,
}

impl ProjectDirs {
    /// Derive the layout under `app_dir`, creating the directories.
    ///
    /// # Errors
    /// Returns an error if directory creation fails.
    pub fn from_app_dir(app_dir: impl AsRef<Path>) -> ConvertResult<Self> {
        let dirs = Self::layout(app_dir);

        for dir in [&dirs.functions_dir, &dirs.endpoints_dir] {
            fs::create_dir_all(dir).map_err(|e| ConvertError::write(dir, e))?;
        }

        Ok(dirs)
    }

    /// Derive the layout without touching the filesystem.
    pub fn layout(app_dir: impl AsRef<Path>) -> Self {
        let app_dir = app_dir.as_ref().to_path_buf();
        let functions_dir = app_dir.join("functions");
        let endpoints_dir = app_dir.join("http_endpoints");

        Self {
            functions_config: functions_dir.join(MANIFEST_FILE),
            endpoints_config: endpoints_dir.join(MANIFEST_FILE),
            app_dir,
            functions_dir,
            endpoints_dir,
        }
    }

    /// Path of the artifact for a handler.
    pub fn artifact_path(&self, handler_name: &str) -> PathBuf {
        self.functions_dir
            .join(format!("{handler_name}.{ARTIFACT_EXTENSION}"))
    }
}
