//! # HOI4 Icon Search
//!
//! Generates a searchable HTML icon catalog for a Hearts of Iron IV mod.
//! The mod directory is the data source: `.gfx` files declare sprites,
//! each pointing at a texture (DDS/TGA/BMP) somewhere under the mod root.
//! The catalog shows every icon with its `GFX_` name ready to copy into
//! game scripts.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! The catalog is built in three independent stages, each consuming the
//! JSON manifest the previous one produced:
//!
//! ```text
//! 1. Scan      *.gfx files  →  manifest.json   (sprite records + config)
//! 2. Convert   manifest     →  *.png           (browser-ready textures)
//! 3. Render    manifest     →  index.html      (template substitution)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Debuggability**: the manifest is human-readable JSON you can inspect
//!   when a sprite is missing from the page.
//! - **Incremental builds**: convert caches by content hash, so re-running
//!   after a template tweak touches no images.
//! - **Testability**: convert and render are functions of the manifest, so
//!   tests exercise them without a full mod checkout.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — expands gfx paths, extracts sprites, resolves textures, produces the manifest |
//! | [`convert`] | Stage 2 — converts referenced textures to PNG in parallel, with caching |
//! | [`render`] | Stage 3 — substitutes icon entries into the HTML template |
//! | [`gfx`] | `spriteType` block extraction and texture path normalization |
//! | [`config`] | JSON config loading, validation, CLI override merging |
//! | [`cache`] | Content-hash conversion cache for incremental runs |
//! | [`types`] | Shared types serialized between stages (`Sprite`, `Section`, `Issue`) |
//! | [`output`] | CLI output formatting for all stages |
//!
//! # Design Decisions
//!
//! ## Best-Effort Error Policy
//!
//! Mod repositories accumulate broken references: sprites pointing at
//! deleted textures, paths with the wrong case (fine on Windows, fatal on
//! a Linux web server), duplicated names. None of these abort a build —
//! each becomes an [`types::Issue`] and the run continues, so one bad
//! entry in a ten-thousand-sprite mod never hides the other 9,999. The
//! single fail-fast error is a missing template, because there is nothing
//! to produce without it.
//!
//! ## Maud Over Template Engines
//!
//! Icon entries are generated with [Maud](https://maud.lambda.xyz/), a
//! compile-time HTML macro system. Sprite names come from mod files, so
//! auto-escaped interpolation matters; malformed markup is a build error
//! rather than a broken page. The outer page stays a plain template file
//! with `@TOKEN` placeholders so existing community templates keep
//! working unchanged.
//!
//! ## Pure-Rust Imaging
//!
//! Texture decoding and PNG encoding use the `image` crate — no
//! ImageMagick, no external converters. The binary is self-contained,
//! which matters because the primary deployment target is a bare CI
//! runner rebuilding a mod's GitHub Pages site on every push.

pub mod cache;
pub mod config;
pub mod convert;
pub mod gfx;
pub mod output;
pub mod render;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
