//! `alcove.toml` configuration.
//!
//! The file names the content and sample-context files used by the CLI and
//! sets the wrap width for rendered output. Missing sections take defaults,
//! and an unreadable or invalid file falls back to defaults entirely.
//!
//! ```toml
//! [content]
//! path = "data/content.ron"
//!
//! [context]
//! path = "data/context.toml"   # optional
//!
//! [output]
//! width = 80                   # 0 disables wrapping
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data_paths::data_path;

/// Complete CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub content: ContentSection,
    pub context: ContextSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    /// RON file holding the `ContentDef`.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSection {
    /// Sample context (`.json` or `.toml`) used when rendering and linting.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Wrap width for rendered text; 0 disables wrapping.
    pub width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content: ContentSection::default(),
            context: ContextSection {
                path: Some(data_path("context.toml")).filter(|p| p.is_file()),
            },
            output: OutputSection::default(),
        }
    }
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            path: data_path("content.ron"),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self { width: 80 }
    }
}

/// Location of `alcove.toml` when none is given on the command line.
pub fn default_config_path() -> PathBuf {
    data_path("alcove.toml")
}

/// Loads configuration from a TOML file, falling back to defaults on error.
///
/// Relative paths inside the file are resolved against the file's directory.
/// This function never fails.
pub fn load_config(toml_path: &Path) -> Config {
    match try_load_config(toml_path) {
        Ok(config) => {
            info!("configuration loaded from '{}'", toml_path.display());
            config
        },
        Err(e) => {
            warn!(
                "Could not load configuration from '{}': {e:#}. Using defaults.",
                toml_path.display()
            );
            Config::default()
        },
    }
}

/// Attempts to load configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn try_load_config(toml_path: &Path) -> Result<Config> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading configuration from '{}'", toml_path.display()))?;
    let file: ConfigFile =
        toml::from_str(&text).with_context(|| format!("parsing configuration from '{}'", toml_path.display()))?;

    let base = toml_path.parent().unwrap_or_else(|| Path::new(""));
    let defaults = Config::default();
    Ok(Config {
        content: ContentSection {
            path: file.content.path.map_or(defaults.content.path, |p| base.join(p)),
        },
        context: ContextSection {
            path: file.context.path.map(|p| base.join(p)).or(defaults.context.path),
        },
        output: file.output,
    })
}

/// On-disk shape: paths stay optional so defaults can be told apart.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    content: PathSection,
    context: PathSection,
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PathSection {
    path: Option<PathBuf>,
}
