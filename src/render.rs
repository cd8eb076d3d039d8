//! HTML catalog generation.
//!
//! Stage 3 of the build pipeline. Substitutes icon entries into a
//! caller-supplied HTML template and writes the final page.
//!
//! ## Template contract
//!
//! The template is plain HTML with literal `@TOKEN` placeholders; this
//! is single-pass batch substitution, not a template language. For each
//! section with token `GOALS`:
//!
//! - `@GOALS_ICONS` — concatenated icon entries
//! - `@GOALS_NUM` — count of rendered icons
//!
//! plus the page-level `@TITLE`, `@FAVICON` (empty string when unset)
//! and `@UPDATE_DATE` (current UTC time, only when `stamp_date` is on).
//!
//! Icon entries themselves are built with [maud] so names lifted from
//! mod files are escaped into attributes correctly:
//!
//! ```html
//! <div data-clipboard-text="..." data-search-text="..." title="..." class="icon">
//!   <img src="gfx/interface/goals/focus_army.png" alt="...">
//! </div>
//! ```
//!
//! ## Failure policy
//!
//! A missing template is the one fail-fast error in the program — there
//! is nothing useful to produce without it. Everything else stays best
//! effort: a sprite whose PNG is missing gets one on-demand conversion
//! attempt (so `render` works even without a prior `convert`) and is
//! skipped, not counted, if it still has no image.

use crate::convert;
use crate::scan::Manifest;
use crate::types::{Issue, Section};
use chrono::Utc;
use maud::{Markup, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template not found: {0}")]
    TemplateMissing(PathBuf),
}

/// Per-section render counts for the CLI report.
#[derive(Debug)]
pub struct SectionReport {
    pub key: String,
    pub token: String,
    pub rendered: usize,
    /// Sprites without a usable PNG, excluded from the page and counts.
    pub skipped: usize,
}

/// Result of a render run.
#[derive(Debug)]
pub struct RenderReport {
    pub sections: Vec<SectionReport>,
    pub output: PathBuf,
    pub chars: usize,
    pub issues: Vec<Issue>,
}

pub fn render(manifest: &Manifest, root: &Path) -> Result<RenderReport, RenderError> {
    let config = &manifest.config;

    let template_path = root.join(&config.template);
    if !template_path.is_file() {
        return Err(RenderError::TemplateMissing(template_path));
    }
    let mut html = fs::read_to_string(&template_path)?;

    let mut issues = Vec::new();
    let mut section_reports = Vec::new();

    for section in &manifest.sections {
        let (entries, report) = render_section(section, root, &mut issues);
        html = html.replace(&format!("@{}_ICONS", section.token), &entries);
        html = html.replace(
            &format!("@{}_NUM", section.token),
            &report.rendered.to_string(),
        );
        section_reports.push(report);
    }

    html = html.replace("@TITLE", &config.title);
    html = html.replace("@FAVICON", config.favicon.as_deref().unwrap_or(""));
    if config.stamp_date {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        html = html.replace("@UPDATE_DATE", &now);
    }

    let output = root.join(&config.output);
    let chars = html.chars().count();
    fs::write(&output, &html)?;

    Ok(RenderReport {
        sections: section_reports,
        output,
        chars,
        issues,
    })
}

/// Render one section's icon entries. Sprites without a PNG on disk get
/// a single on-demand conversion attempt before being skipped.
fn render_section(
    section: &Section,
    root: &Path,
    issues: &mut Vec<Issue>,
) -> (String, SectionReport) {
    let mut entries = String::new();
    let mut rendered = 0;
    let mut skipped = 0;

    for sprite in &section.sprites {
        let png = sprite.png_path();
        let png_abs = root.join(&png);

        if !png_abs.is_file() {
            let source = root.join(&sprite.texturefile);
            if let Err(e) = convert::convert_texture(&source, &png_abs, sprite.frames) {
                issues.push(Issue::new(
                    sprite.texturefile.display().to_string(),
                    e.to_string(),
                ));
            }
        }

        if png_abs.is_file() {
            let display = display_name(&sprite.name, section.strip_prefix.as_deref());
            let src = png.display().to_string();
            entries.push_str(&icon_entry(&display, &src, sprite.dlc.as_deref()).into_string());
            rendered += 1;
        } else {
            skipped += 1;
        }
    }

    let report = SectionReport {
        key: section.key.clone(),
        token: section.token.clone(),
        rendered,
        skipped,
    };
    (entries, report)
}

/// Display name with the section's strip prefix removed.
fn display_name(name: &str, strip_prefix: Option<&str>) -> String {
    match strip_prefix {
        Some(prefix) => name.replace(prefix, ""),
        None => name.to_string(),
    }
}

/// One icon cell: clipboard text, search text (DLC tag included so
/// tagged icons can be filtered), and the converted PNG.
fn icon_entry(display: &str, src: &str, dlc: Option<&str>) -> Markup {
    let search = match dlc {
        Some(d) => format!("{display} {d}"),
        None => display.to_string(),
    };
    html! {
        div data-clipboard-text=(display) data-search-text=(search) title=(display) data-dlc=[dlc] class="icon" {
            img src=(src) alt=(display);
        }
    }
}
