//! Inspect command: dry-run listing of a source file's handlers.

use std::fs;
use std::path::Path;

use anyhow::Context;
use appsvcs_core::extract_handlers;

use crate::colors;

/// Execute the inspect command.
pub fn execute(file: &Path) -> anyhow::Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Source file not found: {}", file.display()))?;

    println!(
        "\n{}{}{}",
        colors::BOLD,
        file.file_name().unwrap_or_default().to_string_lossy(),
        colors::RESET
    );
    println!("{}", "─".repeat(50));

    let mut count = 0;
    for handler in extract_handlers(source.lines()) {
        count += 1;
        let category = handler.category();
        let modifier = if handler.is_async { "async " } else { "" };

        let target = match handler.endpoint() {
            Some(endpoint) => format!("{} {}", endpoint.verb, endpoint.route()),
            None if category.is_transferable() => "function".to_string(),
            None => "not emitted".to_string(),
        };

        println!(
            "  {}{:<8}{} {}{} {}→ {}{}",
            colors::CYAN,
            category.label(),
            colors::RESET,
            modifier,
            handler.name,
            colors::DIM,
            target,
            colors::RESET
        );
    }

    println!("\n{} handlers", count);
    Ok(())
}
