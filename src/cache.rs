//! Conversion cache for incremental builds.
//!
//! DDS decoding and PNG encoding dominate a full build of a large mod —
//! thousands of textures, most unchanged between runs. This module lets
//! the convert stage skip a texture when its bytes and conversion
//! parameters match the previous run.
//!
//! Lookups are by output path with a content check: a hit requires the
//! stored SHA-256 of the source bytes and of the conversion parameters
//! to match, and the output PNG to still exist on disk. Hashing the
//! content rather than mtimes means the cache survives `git checkout`,
//! which resets modification times.
//!
//! The cache manifest is a JSON file in the temp directory. `--no-cache`
//! bypasses the freshness lookup, forcing every texture through
//! conversion, but the manifest is still loaded and updated.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

/// Name of the cache manifest file within the temp directory.
const MANIFEST_FILENAME: &str = "convert-cache.json";

/// Bump to invalidate existing caches when the format or key
/// computation changes.
const MANIFEST_VERSION: u32 = 1;

/// Hashes recorded for one converted texture.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest mapping root-relative PNG paths to the hashes
/// they were produced from.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Empty manifest (used for `--no-cache` or a first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the temp directory. Returns an empty manifest if the
    /// file is missing, unparsable, or from another version.
    pub fn load(temp_dir: &Path) -> Self {
        let path = temp_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the temp directory.
    pub fn save(&self, temp_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(temp_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(temp_dir.join(MANIFEST_FILENAME), json)
    }

    /// Whether the recorded conversion of `output_rel` is still valid:
    /// same source bytes, same parameters, and the PNG still on disk
    /// under `root`.
    pub fn is_fresh(
        &self,
        output_rel: &str,
        source_hash: &str,
        params_hash: &str,
        root: &Path,
    ) -> bool {
        match self.entries.get(output_rel) {
            Some(entry) => {
                entry.source_hash == source_hash
                    && entry.params_hash == params_hash
                    && root.join(output_rel).is_file()
            }
            None => false,
        }
    }

    /// Record a conversion.
    pub fn insert(&mut self, output_rel: String, source_hash: String, params_hash: String) {
        self.entries.insert(
            output_rel,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// SHA-256 hash of a file's contents, as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the conversion parameters. Currently only the frame
/// count feeds the crop; a change re-converts the texture.
pub fn hash_convert_params(frames: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"convert\0");
    hasher.update(frames.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a convert run.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} converted ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} converted", self.misses)
        }
    }
}
