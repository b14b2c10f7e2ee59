use anyhow::{Context as _, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Two-line marker pointing at a byte offset of the filter text.
pub fn error_marker(text: &str, position: usize) -> String {
    let column = text
        .get(..position)
        .map(|prefix| prefix.chars().count())
        .unwrap_or_else(|| text.chars().count());
    let line: String = text
        .chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .collect();
    format!("  {line}\n  {}^", " ".repeat(column))
}

pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
