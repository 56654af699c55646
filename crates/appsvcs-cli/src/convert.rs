//! Convert and functions commands.

use std::path::Path;
use std::time::Instant;

use appsvcs_core::{
    ConversionReport, ConvertOptions, ProjectSettings, convert_project, generate_functions,
};

use crate::SourceArgs;
use crate::colors;

impl SourceArgs {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            source_extensions: self
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            parallel: self.parallel,
        }
    }
}

/// Execute the convert command: skeleton plus functions.
pub fn execute_project(
    source: &SourceArgs,
    app_name: &str,
    cluster_name: &str,
    template: &Path,
) -> anyhow::Result<()> {
    if !source.source_dir.is_dir() {
        anyhow::bail!("Source folder not found: {}", source.source_dir.display());
    }
    if !template.is_dir() {
        anyhow::bail!("Template folder not found: {}", template.display());
    }

    print_header();
    let start = Instant::now();

    let settings = ProjectSettings {
        app_name: app_name.to_string(),
        cluster_name: cluster_name.to_string(),
        source_dir: source.source_dir.clone(),
        template_dir: template.to_path_buf(),
        app_dir: source.app_dir.clone(),
        options: source.options(),
    };
    let report = convert_project(&settings)?;

    print_report(&report, start);
    println!(
        "Converted standalone Node.js code to Atlas App Services functions and generated new app services app project in sub-folder: {}",
        source.app_dir.display()
    );
    Ok(())
}

/// Execute the functions command against an existing project.
pub fn execute_functions(source: &SourceArgs) -> anyhow::Result<()> {
    if !source.source_dir.is_dir() {
        anyhow::bail!("Source folder not found: {}", source.source_dir.display());
    }

    print_header();
    let start = Instant::now();

    let report = generate_functions(&source.source_dir, &source.app_dir, source.options())?;

    print_report(&report, start);
    println!(
        "Generated App Services functions and HTTPS endpoints in: {}",
        source.app_dir.display()
    );
    Ok(())
}

fn print_header() {
    println!(
        "\n{}appsvcs{} - Converting handlers to App Services functions",
        colors::BOLD,
        colors::RESET
    );
    println!("{}", "─".repeat(50));
}

fn print_report(report: &ConversionReport, start: Instant) {
    println!(
        "  {} source files, {} handlers ({} skipped)",
        report.files_scanned, report.handlers_extracted, report.handlers_skipped
    );
    println!(
        "  {}✓{} {} functions, {} endpoints {}({:.2}ms){}",
        colors::GREEN,
        colors::RESET,
        report.artifacts_written,
        report.endpoints_registered,
        colors::DIM,
        start.elapsed().as_secs_f64() * 1000.0,
        colors::RESET
    );
}
