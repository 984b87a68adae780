//! `ContentDef` loader.

use std::fs;
use std::path::Path;

use alcove_data::{ContentDef, validate_content};
use anyhow::{Context, Result, bail};
use log::info;

/// Load and validate a `ContentDef` from a RON file.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, or failed validation.
pub fn load_content(path: &Path) -> Result<ContentDef> {
    let content = load_content_unchecked(path)?;
    check_content(&content)?;
    info!(
        "{} descriptions, {} items and {} placements loaded from '{}'",
        content.descriptions.len(),
        content.items.len(),
        content.placements.len(),
        path.display()
    );
    Ok(content)
}

/// Load a `ContentDef` without validating references.
///
/// # Errors
/// Errors bubble up from file IO or deserialization.
pub fn load_content_unchecked(path: &Path) -> Result<ContentDef> {
    let text = fs::read_to_string(path).with_context(|| format!("reading content from '{}'", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing content RON from '{}'", path.display()))
}

/// Validate content and return a single aggregated error.
fn check_content(content: &ContentDef) -> Result<()> {
    let errors = validate_content(content);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("content validation failed:\n{details}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(text.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn loads_valid_content() {
        let file = write_temp(
            r#"(
                descriptions: [(id: "bench", kind: object, text: "<s>On the bench is <il></il>.</s>")],
                items: [(id: "towel", name: "TOWEL", singular: "a TOWEL")],
                placements: [(item: "towel", container: "bench")],
            )"#,
        );
        let content = load_content(file.path()).expect("content loads");
        assert_eq!(content.descriptions.len(), 1);
        assert_eq!(content.placements[0].container, "bench");
    }

    #[test]
    fn invalid_references_fail_with_details() {
        let file = write_temp(r#"(placements: [(item: "towel", container: "bench")])"#);
        let err = load_content(file.path()).expect_err("dangling references");
        let message = format!("{err:#}");
        assert!(message.contains("content validation failed"), "{message}");
        assert!(message.contains("refers to unknown item 'towel'"), "{message}");
        assert!(load_content_unchecked(file.path()).is_ok());
    }

    #[test]
    fn io_and_syntax_errors_name_the_file() {
        let missing = load_content(Path::new("definitely/not/here.ron")).expect_err("missing file");
        assert!(format!("{missing:#}").contains("reading content from"));

        let file = write_temp("(descriptions: [");
        let broken = load_content(file.path()).expect_err("broken ron");
        assert!(format!("{broken:#}").contains("parsing content RON"));
    }
}
