//! Catalog configuration.
//!
//! Configuration comes from a JSON file (`icon-search.json` in the scan
//! root by default) with CLI flags layered on top, so small mods can run
//! entirely from the command line. All fields have defaults; unknown keys
//! are rejected to catch typos early.
//!
//! ## Configuration options
//!
//! ```json
//! {
//!   "title": "My Mod Icon Search",
//!   "favicon": "favicon.png",
//!   "template": "github-pages/index.template",
//!   "output": "index.html",
//!   "stamp_date": false,
//!   "sections": [
//!     { "key": "goals", "gfx": ["interface/mymod_goals.gfx"] },
//!     { "key": "ideas", "gfx": ["interface"], "strip_prefix": "GFX_idea_" },
//!     { "key": "news_events", "token": "NEWSEVENTS", "gfx": [] }
//!   ],
//!   "dlcs": [
//!     {
//!       "name": "Gotterdammerung",
//!       "asset_dir": "dlc/gotterdammerung",
//!       "interface_dirs": ["dlc/gotterdammerung/interface"]
//!     }
//!   ],
//!   "processing": { "max_workers": 4 }
//! }
//! ```
//!
//! A section's `token` defaults to the uppercased key. `gfx` entries may
//! be single `.gfx` files or directories searched recursively. Sections
//! with no gfx paths render as empty (their `@TOKEN_NUM` becomes 0).
//!
//! The stock config (`gen-config` subcommand) ships the eleven standard
//! categories with the placeholder tokens the published templates use.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("bad --gfx override '{0}': expected KEY=PATH")]
    BadGfxOverride(String),
}

/// Top-level configuration for one catalog build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Page title substituted for `@TITLE`. Required by the time a
    /// command runs; supplied here or via `--title`.
    pub title: String,
    /// Favicon path substituted for `@FAVICON`; empty string when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// HTML template with `@TOKEN` placeholders, relative to the root.
    pub template: String,
    /// Output HTML file, relative to the root.
    pub output: String,
    /// Substitute the current UTC time for `@UPDATE_DATE`.
    pub stamp_date: bool,
    pub sections: Vec<SectionConfig>,
    pub dlcs: Vec<DlcConfig>,
    pub processing: ProcessingConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            favicon: None,
            template: default_template(),
            output: default_output(),
            stamp_date: false,
            sections: stock_sections(),
            dlcs: Vec::new(),
            processing: ProcessingConfig::default(),
        }
    }
}

fn default_template() -> String {
    "github-pages/index.template".to_string()
}

fn default_output() -> String {
    "index.html".to_string()
}

/// One catalog category and where to find its gfx files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    pub key: String,
    /// Placeholder stem; defaults to the uppercased key. The stock
    /// sections pin the historical spellings (`NEWSEVENTS` etc.) so
    /// existing templates keep working.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Files or directories (searched recursively for `*.gfx`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gfx: Vec<String>,
    /// Substring removed from sprite names for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,
}

impl SectionConfig {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            token: None,
            gfx: Vec::new(),
            strip_prefix: None,
        }
    }

    fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn with_strip_prefix(mut self, prefix: &str) -> Self {
        self.strip_prefix = Some(prefix.to_string());
        self
    }

    /// Resolved placeholder stem for this section.
    pub fn token_name(&self) -> String {
        self.token
            .clone()
            .unwrap_or_else(|| self.key.to_uppercase())
    }
}

/// A DLC whose sprites are tagged and whose textures may live under an
/// alternate asset root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DlcConfig {
    pub name: String,
    /// Alternate root tried when a tagged sprite's texture is not found
    /// under the scan root.
    pub asset_dir: String,
    /// Gfx directories whose sprites carry this DLC's name.
    #[serde(default)]
    pub interface_dirs: Vec<String>,
}

/// Worker pool settings for the convert stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Max parallel conversions (omit for auto = CPU cores).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

/// Effective worker count: configured value capped at the number of
/// available cores — users can constrain down, not up.
pub fn effective_workers(processing: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match processing.max_workers {
        Some(n) if n > 0 => n.min(cores),
        _ => cores,
    }
}

impl CatalogConfig {
    /// Validate config values. Called after CLI overrides are merged so
    /// `--title` can satisfy the title requirement.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "title must be set (config file or --title)".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for section in &self.sections {
            if section.key.trim().is_empty() {
                return Err(ConfigError::Validation("section key must not be empty".into()));
            }
            if !seen.insert(section.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate section key '{}'",
                    section.key
                )));
            }
        }
        for dlc in &self.dlcs {
            if dlc.name.trim().is_empty() {
                return Err(ConfigError::Validation("dlc name must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Append a gfx path to the named section, creating the section if
    /// it does not exist yet. `spec` has the form `KEY=PATH`.
    pub fn apply_gfx_override(&mut self, spec: &str) -> Result<(), ConfigError> {
        let (key, path) = spec
            .split_once('=')
            .ok_or_else(|| ConfigError::BadGfxOverride(spec.to_string()))?;
        if key.is_empty() || path.is_empty() {
            return Err(ConfigError::BadGfxOverride(spec.to_string()));
        }
        match self.sections.iter_mut().find(|s| s.key == key) {
            Some(section) => section.gfx.push(path.to_string()),
            None => {
                let mut section = SectionConfig::new(key);
                section.gfx.push(path.to_string());
                self.sections.push(section);
            }
        }
        Ok(())
    }
}

/// Load a config file. Validation happens later, after CLI overrides.
pub fn load_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: CatalogConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// The eleven standard categories with their historical template tokens.
fn stock_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new("goals"),
        SectionConfig::new("ideas").with_strip_prefix("GFX_idea_"),
        SectionConfig::new("ideas_dod").with_strip_prefix("GFX_idea_"),
        SectionConfig::new("character_ideas").with_strip_prefix("GFX_idea_"),
        SectionConfig::new("texticons"),
        SectionConfig::new("events"),
        SectionConfig::new("news_events").with_token("NEWSEVENTS"),
        SectionConfig::new("agencies"),
        SectionConfig::new("decisions"),
        SectionConfig::new("decisions_cat").with_token("DECISIONSCAT"),
        SectionConfig::new("decisions_pics").with_token("DECISIONSPICS"),
    ]
}

/// Stock config with a placeholder title, for `gen-config`.
pub fn stock_config() -> CatalogConfig {
    CatalogConfig {
        title: "Icon Search".to_string(),
        ..CatalogConfig::default()
    }
}

/// Stock config as pretty JSON, ready to redirect to `icon-search.json`.
pub fn stock_config_json() -> String {
    // Serializing our own value, cannot fail
    let mut json = serde_json::to_string_pretty(&stock_config()).unwrap_or_default();
    json.push('\n');
    json
}
