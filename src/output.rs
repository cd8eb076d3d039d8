//! CLI output formatting for all pipeline stages.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Sections
//! 001 goals (128 sprites)
//!     Source: interface/goals.gfx
//! 002 ideas (64 sprites)
//!     Source: interface/ideas.gfx
//!     Source: dlc/nsb/interface/ideas.gfx
//!
//! Scanned 2 sections, 192 sprites (1 issue)
//! ```
//!
//! ## Convert
//!
//! ```text
//! Converting 42 textures
//!     gfx/interface/goals/focus_army.dds: converted
//!     gfx/interface/ideas/idea_tank.dds (4 frames): cached
//!     gfx/interface/broken.dds: FAILED (Format error decoding Dds)
//! ```
//!
//! ## Render
//!
//! ```text
//! 001 goals → @GOALS_ICONS (128 icons)
//! 002 ideas → @IDEAS_ICONS (63 icons, 1 skipped)
//!
//! Generated index.html (412876 chars)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::convert::{ConvertEvent, ConvertResult, TextureStatus};
use crate::render::RenderReport;
use crate::scan::Manifest;
use crate::types::Issue;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Count with singular/plural noun.
fn counted(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the sections and sprite counts
/// discovered, with the configured gfx sources as indented context.
pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Sections".to_string());
    let mut total_sprites = 0;
    for (i, section) in manifest.sections.iter().enumerate() {
        total_sprites += section.sprites.len();
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            section.key,
            counted(section.sprites.len(), "sprite")
        ));
        if let Some(config) = manifest
            .config
            .sections
            .iter()
            .find(|s| s.key == section.key)
        {
            for gfx in &config.gfx {
                lines.push(format!("    Source: {}", gfx));
            }
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "Scanned {}, {}",
        counted(manifest.sections.len(), "section"),
        counted(total_sprites, "sprite")
    );
    if !manifest.issues.is_empty() {
        summary.push_str(&format!(" ({})", counted(manifest.issues.len(), "issue")));
    }
    lines.push(summary);

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Convert output
// ============================================================================

/// Format a single convert progress event as display lines.
pub fn format_convert_event(event: &ConvertEvent) -> Vec<String> {
    match event {
        ConvertEvent::Started { total } => {
            vec![format!("Converting {}", counted(*total, "texture"))]
        }
        ConvertEvent::Texture {
            path,
            frames,
            status,
        } => {
            let frames_str = if *frames > 1 {
                format!(" ({} frames)", frames)
            } else {
                String::new()
            };
            let status_str = match status {
                TextureStatus::Converted => "converted".to_string(),
                TextureStatus::Cached => "cached".to_string(),
                TextureStatus::KeptPng => "kept".to_string(),
                TextureStatus::Failed(message) => format!("FAILED ({})", message),
            };
            vec![format!("    {}{}: {}", path, frames_str, status_str)]
        }
    }
}

/// Format the end-of-run conversion summary.
pub fn format_convert_summary(result: &ConvertResult) -> Vec<String> {
    let mut lines = vec![String::new(), format!("Textures: {}", result.stats)];
    if !result.issues.is_empty() {
        lines.push(format!(
            "{} failed",
            counted(result.issues.len(), "texture")
        ));
    }
    lines
}

/// Print the conversion summary to stdout.
pub fn print_convert_summary(result: &ConvertResult) {
    for line in format_convert_summary(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 3: Render output
// ============================================================================

/// Format render stage output: per-section icon counts and the output
/// file, each section showing the token it filled.
pub fn format_render_report(report: &RenderReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, section) in report.sections.iter().enumerate() {
        let skipped = if section.skipped > 0 {
            format!(", {} skipped", section.skipped)
        } else {
            String::new()
        };
        lines.push(format!(
            "{} {} \u{2192} @{}_ICONS ({}{})",
            format_index(i + 1),
            section.key,
            section.token,
            counted(section.rendered, "icon"),
            skipped
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} ({} chars)",
        report.output.display(),
        report.chars
    ));

    lines
}

/// Print render output to stdout.
pub fn print_render_report(report: &RenderReport) {
    for line in format_render_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Issue report
// ============================================================================

/// Format the collected issue list, shared by `check` and the end of
/// `build`.
pub fn format_issue_report(issues: &[Issue]) -> Vec<String> {
    if issues.is_empty() {
        return vec!["No issues found".to_string()];
    }

    let mut lines = vec![format!("{}", counted(issues.len(), "issue"))];
    for issue in issues {
        lines.push(format!("    {}: {}", issue.path, issue.message));
    }
    lines
}

/// Print the issue report to stdout.
pub fn print_issue_report(issues: &[Issue]) {
    for line in format_issue_report(issues) {
        println!("{}", line);
    }
}
