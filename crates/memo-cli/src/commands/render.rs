//! Render command handler

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use memo_core::markdown;

use crate::output::Output;

/// Render a markdown file, or stdin when no file is given
pub fn render(file: Option<&Path>, output: &Output) -> Result<()> {
    let source = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    debug!("Rendering {} bytes of markdown", source.len());
    output.print_html(&markdown::render(&source));
    Ok(())
}
