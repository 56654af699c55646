//! Project skeleton creation from a template directory.

use std::fs;
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};

/// Token replaced by the application name in `realm_config.json`.
pub const APP_NAME_TOKEN: &str = "__APP_NAME__";

/// Token replaced by the cluster name in the Atlas data source config.
pub const CLUSTER_NAME_TOKEN: &str = "__CLUSTER_NAME__";

/// Replace the project at `app_dir` with a fresh copy of `template_dir`,
/// filling in the application and cluster names.
///
/// # Errors
/// Returns [`ConvertError::MissingDirectory`] if the template does not exist,
/// or a read/write error if copying or token substitution fails.
pub fn create_skeleton(
    template_dir: impl AsRef<Path>,
    app_dir: impl AsRef<Path>,
    app_name: &str,
    cluster_name: &str,
) -> ConvertResult<()> {
    let template_dir = template_dir.as_ref();
    let app_dir = app_dir.as_ref();

    if !template_dir.is_dir() {
        return Err(ConvertError::MissingDirectory(template_dir.to_path_buf()));
    }

    if app_dir.exists() {
        tracing::debug!("Removing previous project at {}", app_dir.display());
        fs::remove_dir_all(app_dir).map_err(|e| ConvertError::write(app_dir, e))?;
    }

    copy_dir_recursive(template_dir, app_dir)?;

    replace_token_in_file(&app_dir.join("realm_config.json"), APP_NAME_TOKEN, app_name)?;
    replace_token_in_file(
        &app_dir
            .join("data_sources")
            .join("mongodb-atlas")
            .join("config.json"),
        CLUSTER_NAME_TOKEN,
        cluster_name,
    )?;

    tracing::info!(
        "Created project skeleton {} from {}",
        app_dir.display(),
        template_dir.display()
    );
    Ok(())
}

/// Copy a directory tree.
pub fn copy_dir_recursive(source: &Path, target: &Path) -> ConvertResult<()> {
    fs::create_dir_all(target).map_err(|e| ConvertError::write(target, e))?;

    for entry in fs::read_dir(source).map_err(|e| ConvertError::read(source, e))? {
        let entry = entry?;
        let src = entry.path();
        let dst = target.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&src, &dst)?;
        } else {
            fs::copy(&src, &dst).map_err(|e| ConvertError::write(&dst, e))?;
        }
    }

    Ok(())
}

/// Replace every occurrence of `token` in a file.
pub fn replace_token_in_file(path: &Path, token: &str, value: &str) -> ConvertResult<()> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::read(path, e))?;
    fs::write(path, content.replace(token, value)).map_err(|e| ConvertError::write(path, e))
}
