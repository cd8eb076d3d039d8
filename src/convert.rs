//! Texture to PNG conversion.
//!
//! Stage 2 of the build pipeline. Collects the distinct texture files
//! referenced by the scan manifest and converts each to a browser-ready
//! PNG written next to its source (`focus_army.dds` → `focus_army.png`).
//!
//! ## Frame strips
//!
//! Multi-frame textures are horizontal strips; the catalog shows frame 1,
//! so a texture with `noOfFrames = 4` is cropped to the leftmost quarter
//! before encoding. The frame count comes from the first sprite that
//! referenced the texture, matching how the catalog has always behaved
//! when records disagree.
//!
//! ## Parallelism and failure
//!
//! Conversions are independent: they are dispatched onto the rayon pool
//! (sized by `processing.max_workers`) with no shared mutable state and
//! no ordering requirement. The final join collects per-texture failures
//! into the issue list without aborting the batch — one corrupt DDS file
//! must not take down a thousand-texture build.
//!
//! ## Incremental runs
//!
//! A [`CacheManifest`](crate::cache::CacheManifest) in the temp directory
//! skips textures whose bytes and frame count are unchanged. `--only`
//! restricts the batch to the listed textures, for CI runs that know
//! which images a commit touched.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::scan::Manifest;
use crate::types::Issue;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One conversion job: a distinct texture and the frame count from the
/// first sprite that referenced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertJob {
    pub texturefile: PathBuf,
    pub frames: u32,
}

/// How a single texture was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureStatus {
    Converted,
    Cached,
    /// Source is already a PNG; left in place untouched.
    KeptPng,
    Failed(String),
}

/// Progress event streamed to the printer thread during conversion.
#[derive(Debug, Clone)]
pub enum ConvertEvent {
    Started {
        total: usize,
    },
    Texture {
        path: String,
        frames: u32,
        status: TextureStatus,
    },
}

/// Result of a convert run.
#[derive(Debug)]
pub struct ConvertResult {
    pub stats: CacheStats,
    pub issues: Vec<Issue>,
}

/// Distinct textures across all sections, in first-reference order.
pub fn collect_jobs(manifest: &Manifest) -> Vec<ConvertJob> {
    let mut seen: HashSet<&Path> = HashSet::new();
    let mut jobs = Vec::new();

    for section in &manifest.sections {
        for sprite in &section.sprites {
            if seen.insert(sprite.texturefile.as_path()) {
                jobs.push(ConvertJob {
                    texturefile: sprite.texturefile.clone(),
                    frames: sprite.frames,
                });
            }
        }
    }

    jobs
}

pub fn convert(
    manifest: &Manifest,
    root: &Path,
    temp_dir: &Path,
    use_cache: bool,
    only: Option<&HashSet<PathBuf>>,
    events: Option<Sender<ConvertEvent>>,
) -> Result<ConvertResult, ConvertError> {
    let jobs: Vec<ConvertJob> = collect_jobs(manifest)
        .into_iter()
        .filter(|job| only.is_none_or(|set| set.contains(&job.texturefile)))
        .collect();

    // Always loaded: --no-cache skips the freshness lookup (gated in
    // run_job) but the manifest is kept and extended, so entries for
    // textures outside an --only filter survive the run.
    let cache_manifest = CacheManifest::load(temp_dir);

    if let Some(tx) = &events {
        let _ = tx.send(ConvertEvent::Started { total: jobs.len() });
    }

    // Independent conversions; outcomes collected in job order
    let outcomes: Vec<Outcome> = jobs
        .par_iter()
        .map_with(events, |tx, job| {
            let outcome = run_job(job, root, use_cache, &cache_manifest);
            if let Some(tx) = tx {
                let _ = tx.send(ConvertEvent::Texture {
                    path: job.texturefile.display().to_string(),
                    frames: job.frames,
                    status: outcome.status(),
                });
            }
            outcome
        })
        .collect();

    // Final join: fold outcomes into stats, cache entries, and issues
    let mut stats = CacheStats::default();
    let mut issues = Vec::new();
    let mut next_cache = cache_manifest;
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match outcome {
            Outcome::Cached => stats.hit(),
            Outcome::KeptPng => {}
            Outcome::Converted {
                source_hash,
                params_hash,
            } => {
                stats.miss();
                next_cache.insert(png_rel(job), source_hash, params_hash);
            }
            Outcome::Failed(message) => {
                issues.push(Issue::new(job.texturefile.display().to_string(), message));
            }
        }
    }
    next_cache.save(temp_dir)?;

    Ok(ConvertResult { stats, issues })
}

enum Outcome {
    Converted {
        source_hash: String,
        params_hash: String,
    },
    Cached,
    KeptPng,
    Failed(String),
}

impl Outcome {
    fn status(&self) -> TextureStatus {
        match self {
            Outcome::Converted { .. } => TextureStatus::Converted,
            Outcome::Cached => TextureStatus::Cached,
            Outcome::KeptPng => TextureStatus::KeptPng,
            Outcome::Failed(m) => TextureStatus::Failed(m.clone()),
        }
    }
}

fn png_rel(job: &ConvertJob) -> String {
    job.texturefile.with_extension("png").display().to_string()
}

fn run_job(job: &ConvertJob, root: &Path, use_cache: bool, cache: &CacheManifest) -> Outcome {
    let source = root.join(&job.texturefile);
    if !source.is_file() {
        return Outcome::Failed("does not exist".into());
    }
    if is_png(&source) {
        return Outcome::KeptPng;
    }

    // Hashes are recorded even on --no-cache runs so the next cached
    // run starts warm; only the lookup is skipped.
    let source_hash = match cache::hash_file(&source) {
        Ok(h) => h,
        Err(e) => return Outcome::Failed(e.to_string()),
    };
    let params_hash = cache::hash_convert_params(job.frames);

    if use_cache && cache.is_fresh(&png_rel(job), &source_hash, &params_hash, root) {
        return Outcome::Cached;
    }

    let dest = root.join(job.texturefile.with_extension("png"));
    match convert_texture(&source, &dest, job.frames) {
        Ok(()) => Outcome::Converted {
            source_hash,
            params_hash,
        },
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Decode a texture, crop multi-frame strips to frame 1, and encode PNG.
///
/// Also used by the render stage for on-demand conversion of sprites
/// whose PNG is missing at render time.
pub fn convert_texture(source: &Path, dest: &Path, frames: u32) -> Result<(), image::ImageError> {
    let img = image::open(source)?;
    let img = if frames > 1 {
        let frame_width = (img.width() / frames).max(1);
        img.crop_imm(0, 0, frame_width, img.height())
    } else {
        img
    };
    img.save_with_format(dest, image::ImageFormat::Png)
}
