//! Sample context loader.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result, bail};
use log::info;

use crate::context::Context;

/// Load a context file, choosing the format by extension (`.json` or `.toml`).
///
/// # Errors
/// Errors bubble up from file IO, an unknown extension, or an invalid document.
pub fn load_context(path: &Path) -> Result<Context> {
    let text = fs::read_to_string(path).with_context(|| format!("reading context from '{}'", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let ctx = match extension.as_deref() {
        Some("json") => Context::from_json(&text),
        Some("toml") => Context::from_toml(&text),
        _ => bail!("context file '{}' must end in .json or .toml", path.display()),
    }
    .with_context(|| format!("parsing context from '{}'", path.display()))?;

    info!("{} context values loaded from '{}'", ctx.len(), path.display());
    Ok(ctx)
}
