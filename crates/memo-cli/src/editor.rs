//! $EDITOR round trips and yes/no prompts

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Lines starting with this are hints and never become note content
const HINT_PREFIX: &str = "<!--";

/// Open `content` in the user's editor under a hint line and return the
/// edited body with hints removed and whitespace trimmed
pub fn edit_content(hint: &str, content: &str) -> Result<String> {
    let editor = editor_command()?;
    let path = env::temp_dir().join(format!("memo-{}.md", std::process::id()));

    fs::write(&path, format!("{} {} -->\n{}", HINT_PREFIX, hint, content))
        .with_context(|| format!("Failed to write draft {:?}", path))?;

    let status = Command::new(&editor).arg(&path).status();
    let edited = match status {
        Ok(status) if status.success() => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read draft {:?}", path)),
        Ok(status) => Err(anyhow::anyhow!("{} exited with {}", editor, status)),
        Err(e) => Err(anyhow::Error::new(e).context(format!("Could not start editor '{}'", editor))),
    };
    let _ = fs::remove_file(&path);

    Ok(strip_hints(&edited?))
}

fn strip_hints(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with(HINT_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// $VISUAL, then $EDITOR, then vi
fn editor_command() -> Result<String> {
    let chosen = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty());

    match chosen {
        Some(editor) => Ok(editor),
        None if cfg!(unix) => Ok("vi".to_string()),
        None => bail!("Set $EDITOR, or pass the text with --content"),
    }
}

/// Ask a yes/no question on the terminal; anything but y/yes is no
///
/// Without a terminal on stdin the answer is always no.
pub fn confirm(question: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
