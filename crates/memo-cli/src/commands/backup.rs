//! Backup command handlers

use std::path::Path;

use anyhow::{Context, Result};

use memo_core::{ImportMode, Store};

use crate::editor::confirm;
use crate::output::Output;

/// Write every note to a backup file
pub fn export(store: &Store, path: &Path, output: &Output) -> Result<()> {
    let count = store
        .export_to(path)
        .with_context(|| format!("Failed to export to {:?}", path))?;

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({"path": path, "totalCount": count})
        );
    } else {
        output.success(&format!("Exported {} note(s) to {}", count, path.display()));
    }
    Ok(())
}

/// Load a backup file into the store
pub fn import(store: &mut Store, path: &Path, replace: bool, output: &Output) -> Result<()> {
    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    if replace && output.should_prompt() {
        let current = store.note_count()?;
        println!(
            "Replace all {} note(s) with the contents of {}",
            current,
            path.display()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let summary = store
        .import_from(path, mode)
        .with_context(|| format!("Failed to import {:?}", path))?;
    output.print_import_summary(&summary);
    Ok(())
}
