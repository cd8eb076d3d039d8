//! Shared types serialized between pipeline stages.
//!
//! These types travel through `manifest.json` (scan → convert → render)
//! and must stay identical across all three modules.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A sprite record extracted from a `spriteType = { ... }` block.
///
/// `texturefile` is the normalized path from the gfx file, relative to the
/// scan root (leading slash stripped, backslashes converted). It may point
/// at a file that does not exist — missing sources are reported by the
/// convert stage, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    pub texturefile: PathBuf,
    /// Horizontal frame count. Multi-frame strips are cropped to frame 1.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Name of the DLC whose interface directory this sprite came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlc: Option<String>,
}

fn default_frames() -> u32 {
    1
}

impl Sprite {
    /// Path of the web-friendly PNG this sprite renders from: same
    /// directory and stem as the texture, `.png` extension.
    pub fn png_path(&self) -> PathBuf {
        self.texturefile.with_extension("png")
    }
}

/// One catalog category (goals, ideas, events, ...) with its
/// deduplicated sprites in first-occurrence order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    /// Placeholder stem: entries land in `@<token>_ICONS`, the count in
    /// `@<token>_NUM`.
    pub token: String,
    /// Substring removed from sprite names for display (e.g. `GFX_idea_`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,
    pub sprites: Vec<Sprite>,
}

/// A per-file or per-record problem recorded during a run.
///
/// Issues never abort the pipeline; they accumulate across stages and
/// are printed as a final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
