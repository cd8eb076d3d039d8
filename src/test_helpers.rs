//! Shared test utilities for the hoi4-icon-search test suite.
//!
//! Fixture builders write gfx files and small real images into temp
//! directories; lookup helpers panic with a clear message on a miss.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CatalogConfig, SectionConfig};
use crate::scan::Manifest;
use crate::types::Section;

/// Write `contents` at `rel` under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Write a real encodable image at `path`; format from the extension
/// (bmp/tga/png — the formats the convert tests use as sources).
pub fn write_image(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 40 % 255) as u8, (y * 40 % 255) as u8, 128, 255])
    });
    img.save(path).unwrap();
}

/// Config with a test title and the given `(key, gfx_path)` sections,
/// replacing the stock section list.
pub fn test_config(sections: &[(&str, &str)]) -> CatalogConfig {
    let mut config = CatalogConfig {
        title: "Test Icon Search".into(),
        ..CatalogConfig::default()
    };
    config.sections = sections
        .iter()
        .map(|(key, path)| SectionConfig {
            key: key.to_string(),
            token: None,
            gfx: vec![path.to_string()],
            strip_prefix: None,
        })
        .collect();
    config
}

/// Find a section by key. Panics if not found.
pub fn section<'a>(manifest: &'a Manifest, key: &str) -> &'a Section {
    manifest
        .sections
        .iter()
        .find(|s| s.key == key)
        .unwrap_or_else(|| {
            let keys: Vec<&str> = manifest.sections.iter().map(|s| s.key.as_str()).collect();
            panic!("section '{key}' not found. Available: {keys:?}")
        })
}
