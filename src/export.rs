//! Copy and export of snippet code.

use crate::snippet::Snippet;
use anyhow::{Context, Result};
use arboard::Clipboard;
use std::fs;
use std::path::{Path, PathBuf};

/// Copy the snippet's code to the system clipboard.
pub fn copy_to_clipboard(snippet: &Snippet) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Clipboard is not available")?;
    clipboard
        .set_text(snippet.code.clone())
        .context("Failed to copy to clipboard")?;
    Ok(())
}

/// File name used when exporting a snippet.
///
/// # Details
/// Every run of whitespace in the title becomes one underscore; the
/// extension follows the language, `txt` for unknown ones.
pub fn export_file_name(snippet: &Snippet) -> String {
    let mut stem = String::with_capacity(snippet.title.len());
    let mut in_space = false;
    for ch in snippet.title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(ch);
            in_space = false;
        }
    }
    format!("{}.{}", stem, snippet.language.extension())
}

/// Write the snippet's code into `dir`.
///
/// # Arguments
/// * `snippet` - Snippet to export
/// * `dir` - Target directory, created when missing
///
/// # Returns
/// * `Result<PathBuf>` - Path of the written file or error
pub fn export_to_file(snippet: &Snippet, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    // Titles may contain path separators.
    let name = export_file_name(snippet).replace(['/', '\\'], "-");
    let path = dir.join(name);
    fs::write(&path, &snippet.code)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    tracing::info!(path = %path.display(), "snippet exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::{Language, test_snippet};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_export_file_name() {
        let mut snippet = test_snippet("1", "Binary  search\tin place", Utc::now());
        snippet.language = Language::Python;
        assert_eq!(export_file_name(&snippet), "Binary_search_in_place.py");

        snippet.language = Language::Other("elixir".into());
        snippet.title = " padded".into();
        assert_eq!(export_file_name(&snippet), "_padded.txt");
    }

    #[test]
    fn test_export_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut snippet = test_snippet("1", "a/b query", Utc::now());
        snippet.language = Language::Sql;
        snippet.code = "select * from snippets;".into();

        let path = export_to_file(&snippet, &temp_dir.path().join("out")).unwrap();
        assert_eq!(path.file_name().unwrap(), "a-b_query.sql");
        assert_eq!(fs::read_to_string(path).unwrap(), "select * from snippets;");
    }
}
