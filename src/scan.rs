//! Gfx scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Expands each section's configured gfx
//! paths, extracts sprite records, resolves texture paths, and produces
//! the manifest the convert and render stages consume.
//!
//! ## Best-effort policy
//!
//! A section path that does not exist, a file that cannot be read, or a
//! texture with the wrong on-disk casing never aborts the scan: each
//! problem is recorded as an [`Issue`] and processing continues. The
//! manifest carries the issues so the final report covers the whole run.
//!
//! ## Deduplication
//!
//! Sprites are deduplicated per section by name. A redefinition replaces
//! the earlier record in place (the game engine's own behavior — later
//! files override) and is recorded as a duplicate issue. First-occurrence
//! order is preserved, so the catalog keeps a stable layout.
//!
//! ## DLC tagging
//!
//! A sprite parsed from a file under a configured DLC's interface
//! directory carries that DLC's name, and its texture path resolution
//! additionally tries the DLC's asset directory. The tag surfaces in the
//! rendered catalog as searchable text.

use crate::config::{CatalogConfig, DlcConfig};
use crate::gfx;
use crate::types::{Issue, Section, Sprite};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Name of the scan manifest file within the temp directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Manifest output from the scan stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub sections: Vec<Section>,
    /// Config as resolved for this run, so later stages need no reload.
    pub config: CatalogConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

pub fn scan(config: &CatalogConfig, root: &Path) -> Result<Manifest, ScanError> {
    let mut sections = Vec::new();
    let mut issues = Vec::new();

    for section_config in &config.sections {
        let gfx_files = expand_gfx_paths(root, &section_config.gfx, &mut issues);

        let mut sprites: Vec<Sprite> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for file in &gfx_files {
            let contents = match fs::read_to_string(file) {
                Ok(c) => c,
                Err(e) => {
                    issues.push(Issue::new(file.display().to_string(), e.to_string()));
                    continue;
                }
            };

            let rel_file = file.strip_prefix(root).unwrap_or(file);
            let dlc = dlc_for(config, rel_file);

            for raw in gfx::extract_sprites(&contents) {
                let texturefile = resolve_texture(root, dlc, &raw.texturefile, &mut issues);
                let sprite = Sprite {
                    name: raw.name,
                    texturefile,
                    frames: raw.frames,
                    dlc: dlc.map(|d| d.name.clone()),
                };
                match by_name.get(&sprite.name) {
                    Some(&slot) => {
                        issues.push(Issue::new(
                            rel_file.display().to_string(),
                            format!(
                                "duplicate sprite '{}' overrides an earlier definition",
                                sprite.name
                            ),
                        ));
                        sprites[slot] = sprite;
                    }
                    None => {
                        by_name.insert(sprite.name.clone(), sprites.len());
                        sprites.push(sprite);
                    }
                }
            }
        }

        sections.push(Section {
            key: section_config.key.clone(),
            token: section_config.token_name(),
            strip_prefix: section_config.strip_prefix.clone(),
            sprites,
        });
    }

    Ok(Manifest {
        sections,
        config: config.clone(),
        issues,
    })
}

/// Expand configured gfx paths: directories are searched recursively for
/// `*.gfx` files (sorted for stable output), files are taken as-is, and
/// missing paths or unreadable directories become issues.
fn expand_gfx_paths(root: &Path, paths: &[String], issues: &mut Vec<Issue>) -> Vec<PathBuf> {
    let mut expanded = Vec::new();

    for configured in paths {
        let path = root.join(configured);
        if path.is_dir() {
            for entry in WalkDir::new(&path).sort_by_file_name() {
                match entry {
                    Ok(entry) => {
                        if entry.file_type().is_file() && is_gfx_file(entry.path()) {
                            expanded.push(entry.path().to_path_buf());
                        }
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| configured.clone());
                        issues.push(Issue::new(path, e.to_string()));
                    }
                }
            }
        } else if path.is_file() {
            expanded.push(path);
        } else {
            issues.push(Issue::new(configured.clone(), "does not exist"));
        }
    }

    expanded
}

fn is_gfx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gfx"))
}

/// DLC whose interface directory contains the given root-relative file.
fn dlc_for<'a>(config: &'a CatalogConfig, rel_file: &Path) -> Option<&'a DlcConfig> {
    config.dlcs.iter().find(|dlc| {
        dlc.interface_dirs
            .iter()
            .any(|dir| rel_file.starts_with(dir))
    })
}

/// Resolve a raw texture path against the scan root.
///
/// Tries, in order: the normalized path itself, the sprite's DLC asset
/// directory, and a component-wise case-insensitive match (recorded as a
/// wrong-case issue). An unresolvable path is kept as-is; the convert
/// stage reports it as missing.
fn resolve_texture(
    root: &Path,
    dlc: Option<&DlcConfig>,
    raw: &str,
    issues: &mut Vec<Issue>,
) -> PathBuf {
    let normalized = gfx::normalize_texture_path(raw);
    if root.join(&normalized).is_file() {
        return normalized;
    }

    if let Some(dlc) = dlc {
        let candidate = Path::new(&dlc.asset_dir).join(&normalized);
        if root.join(&candidate).is_file() {
            return candidate;
        }
    }

    if let Some(recovered) = gfx::resolve_case_insensitive(root, &normalized) {
        issues.push(Issue::new(
            normalized.display().to_string(),
            format!(
                "wrong case: {} doesn't exist, but {} does",
                normalized.display(),
                recovered.display()
            ),
        ));
        return recovered;
    }

    normalized
}

/// Write the manifest as pretty JSON into the temp directory.
pub fn write_manifest(manifest: &Manifest, temp_dir: &Path) -> Result<PathBuf, ScanError> {
    fs::create_dir_all(temp_dir)?;
    let path = temp_dir.join(MANIFEST_FILENAME);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Load the manifest written by a previous `scan`.
pub fn load_manifest(temp_dir: &Path) -> Result<Manifest, ScanError> {
    let content = fs::read_to_string(temp_dir.join(MANIFEST_FILENAME))?;
    Ok(serde_json::from_str(&content)?)
}
