//! Streaming JSON array manifests.
//!
//! Both registries are written incrementally: `[` on creation, one entry per
//! append, `\n]` on finish. A run that aborts part way leaves an unterminated
//! array behind.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::handler::{Category, Endpoint};

/// Secret whose value must be supplied as the `secret` query parameter.
pub const ENDPOINT_SECRET_NAME: &str = "HTTPS_TMP_PWD_SECRET";

/// Endpoint authentication scheme.
pub const ENDPOINT_VALIDATION_METHOD: &str = "SECRET_AS_QUERY_PARAM";

/// Handler registry entry (`functions/config.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    pub name: String,
    pub private: bool,
    pub run_as_system: bool,
    pub disable_arg_logs: bool,
}

impl FunctionConfig {
    pub fn new(name: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            private: category.is_private(),
            run_as_system: true,
            disable_arg_logs: true,
        }
    }
}

/// Endpoint registry entry (`http_endpoints/config.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub route: String,
    pub http_method: String,
    pub function_name: String,
    pub validation_method: String,
    pub secret_name: String,
    pub respond_result: bool,
    pub fetch_custom_user_data: bool,
    pub create_user_on_auth: bool,
    pub disabled: bool,
    pub return_type: String,
}

impl EndpointConfig {
    pub fn new(function_name: &str, endpoint: &Endpoint) -> Self {
        Self {
            route: endpoint.route(),
            http_method: endpoint.verb.to_string(),
            function_name: function_name.to_string(),
            validation_method: ENDPOINT_VALIDATION_METHOD.to_string(),
            secret_name: ENDPOINT_SECRET_NAME.to_string(),
            respond_result: true,
            fetch_custom_user_data: false,
            create_user_on_auth: false,
            disabled: false,
            return_type: "JSON".to_string(),
        }
    }
}

/// Append-only writer for one manifest document.
pub struct ManifestWriter {
    path: PathBuf,
    file: File,
    entries: usize,
}

impl ManifestWriter {
    /// Create (truncating) the manifest and open the array.
    pub fn create(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| ConvertError::write(&path, e))?;

        let mut writer = Self {
            path,
            file,
            entries: 0,
        };
        writer.write_raw("[")?;
        Ok(writer)
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Append one entry, preceded by a separator unless it is the first.
    pub fn append<T: Serialize>(&mut self, entry: &T) -> ConvertResult<()> {
        let json = serde_json::to_string_pretty(entry)?;
        let indented = json
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n");

        let separator = if self.entries == 0 { "\n" } else { ",\n" };
        self.write_raw(&format!("{separator}{indented}"))?;
        self.entries += 1;
        Ok(())
    }

    /// Close the array and flush to disk.
    pub fn finish(mut self) -> ConvertResult<PathBuf> {
        self.write_raw("\n]")?;
        self.file
            .sync_all()
            .map_err(|e| ConvertError::write(&self.path, e))?;
        Ok(self.path)
    }

    fn write_raw(&mut self, text: &str) -> ConvertResult<()> {
        self.file
            .write_all(text.as_bytes())
            .map_err(|e| ConvertError::write(&self.path, e))
    }
}

/// Read back a finished manifest.
pub fn read_manifest<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> ConvertResult<Vec<T>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConvertError::read(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
