//! End-to-end pipeline tests: scan → convert → render over a mod fixture
//! in a temp directory, exercising the manifest hand-off between stages.

use hoi4_icon_search::config::{CatalogConfig, SectionConfig};
use hoi4_icon_search::{convert, output, render, scan};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GOALS_GFX: &str = r#"
# national focus icons
spriteTypes = {
    spriteType = {
        name = "GFX_focus_army"
        texturefile = "gfx/interface/goals/focus_army.bmp"
    }
    spriteType = {
        name = "GFX_focus_strip"
        texturefile = "gfx/interface/goals/focus_strip.bmp"
        noOfFrames = 2
    }
}
"#;

const IDEAS_GFX: &str = r#"
spriteType = {
    name = "GFX_idea_tank_corps"
    texturefile = "gfx/interface/ideas/tank_corps.bmp"
}
spriteType = {
    name = "GFX_idea_lost"
    texturefile = "gfx/interface/ideas/lost.dds"
}
"#;

const TEMPLATE: &str = "<html><head><title>@TITLE</title></head><body>\
<h1>Goals (@GOALS_NUM)</h1><div>@GOALS_ICONS</div>\
<h1>Ideas (@IDEAS_NUM)</h1><div>@IDEAS_ICONS</div>\
</body></html>";

fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
}

fn write_image(root: &Path, rel: &str, width: u32, height: u32) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 50 % 255) as u8, (y * 50 % 255) as u8, 200, 255])
    });
    img.save(&path).unwrap();
}

fn mod_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "interface/goals.gfx", GOALS_GFX);
    write_file(tmp.path(), "interface/ideas.gfx", IDEAS_GFX);
    write_image(tmp.path(), "gfx/interface/goals/focus_army.bmp", 4, 4);
    write_image(tmp.path(), "gfx/interface/goals/focus_strip.bmp", 8, 4);
    write_image(tmp.path(), "gfx/interface/ideas/tank_corps.bmp", 4, 4);
    // ideas/lost.dds intentionally absent
    write_file(tmp.path(), "github-pages/index.template", TEMPLATE);
    tmp
}

fn fixture_config() -> CatalogConfig {
    let mut config = CatalogConfig {
        title: "Fixture Mod Icons".into(),
        ..CatalogConfig::default()
    };
    config.sections = vec![
        SectionConfig {
            key: "goals".into(),
            token: None,
            gfx: vec!["interface/goals.gfx".into()],
            strip_prefix: None,
        },
        SectionConfig {
            key: "ideas".into(),
            token: None,
            gfx: vec!["interface/ideas.gfx".into()],
            strip_prefix: Some("GFX_idea_".into()),
        },
    ];
    config
}

#[test]
fn full_pipeline_produces_catalog() {
    let tmp = mod_fixture();
    let temp_dir = tmp.path().join(".temp");
    let config = fixture_config();

    // Stage 1: scan, round-tripping the manifest through the temp dir
    let manifest = scan::scan(&config, tmp.path()).unwrap();
    scan::write_manifest(&manifest, &temp_dir).unwrap();
    let manifest = scan::load_manifest(&temp_dir).unwrap();

    assert_eq!(manifest.sections.len(), 2);
    assert_eq!(manifest.sections[0].sprites.len(), 2);
    assert_eq!(manifest.sections[1].sprites.len(), 2);
    assert!(manifest.issues.is_empty());

    // Stage 2: convert (the missing dds becomes an issue, not an error)
    let result = convert::convert(&manifest, tmp.path(), &temp_dir, true, None, None).unwrap();
    assert_eq!(result.stats.misses, 3);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].path, "gfx/interface/ideas/lost.dds");

    // Frame strip cropped to frame 1
    let strip = tmp.path().join("gfx/interface/goals/focus_strip.png");
    assert_eq!(image::image_dimensions(&strip).unwrap(), (4, 4));

    // Stage 3: render
    let report = render::render(&manifest, tmp.path()).unwrap();
    assert_eq!(report.sections[0].rendered, 2);
    assert_eq!(report.sections[1].rendered, 1);
    assert_eq!(report.sections[1].skipped, 1);

    let html = fs::read_to_string(tmp.path().join("index.html")).unwrap();
    assert!(html.contains("<title>Fixture Mod Icons</title>"));
    assert!(html.contains("Goals (2)"));
    assert!(html.contains("Ideas (1)"));
    assert!(html.contains(r#"data-clipboard-text="GFX_focus_army""#));
    assert!(html.contains(r#"src="gfx/interface/goals/focus_army.png""#));
    // Idea names shown without the GFX_idea_ prefix
    assert!(html.contains(r#"data-clipboard-text="tank_corps""#));
    assert!(!html.contains("@GOALS_ICONS"));
    assert!(!html.contains("@IDEAS_NUM"));
}

#[test]
fn second_build_hits_the_conversion_cache() {
    let tmp = mod_fixture();
    let temp_dir = tmp.path().join(".temp");
    let config = fixture_config();

    let manifest = scan::scan(&config, tmp.path()).unwrap();
    let first = convert::convert(&manifest, tmp.path(), &temp_dir, true, None, None).unwrap();
    assert_eq!(first.stats.misses, 3);

    let second = convert::convert(&manifest, tmp.path(), &temp_dir, true, None, None).unwrap();
    assert_eq!(second.stats.hits, 3);
    assert_eq!(second.stats.misses, 0);
}

#[test]
fn render_without_convert_falls_back_to_on_demand_conversion() {
    let tmp = mod_fixture();
    let config = fixture_config();

    let manifest = scan::scan(&config, tmp.path()).unwrap();
    let report = render::render(&manifest, tmp.path()).unwrap();

    // Everything with a source on disk still made it into the page
    assert_eq!(report.sections[0].rendered, 2);
    assert_eq!(report.sections[1].rendered, 1);
    assert!(tmp.path().join("gfx/interface/goals/focus_army.png").exists());
}

#[test]
fn issues_accumulate_across_stages() {
    let tmp = mod_fixture();
    let temp_dir = tmp.path().join(".temp");
    let mut config = fixture_config();
    // One section path that does not exist
    config.sections[0].gfx.push("interface/extra".into());

    let manifest = scan::scan(&config, tmp.path()).unwrap();
    assert_eq!(manifest.issues.len(), 1);

    let result = convert::convert(&manifest, tmp.path(), &temp_dir, true, None, None).unwrap();
    let report = render::render(&manifest, tmp.path()).unwrap();

    let mut issues = manifest.issues.clone();
    issues.extend(result.issues);
    issues.extend(report.issues);
    // scan: missing path; convert: missing dds; render: retried dds
    assert_eq!(issues.len(), 3);
}

#[test]
fn every_stage_feeds_the_final_issue_report() {
    let tmp = mod_fixture();
    let temp_dir = tmp.path().join(".temp");
    let mut config = fixture_config();
    config.sections[0].gfx.push("interface/extra".into());

    let manifest = scan::scan(&config, tmp.path()).unwrap();
    let report = output::format_issue_report(&manifest.issues);
    assert_eq!(report[0], "1 issue");
    assert_eq!(report[1], "    interface/extra: does not exist");

    let result = convert::convert(&manifest, tmp.path(), &temp_dir, true, None, None).unwrap();
    let mut issues = manifest.issues.clone();
    issues.extend(result.issues);
    let report = output::format_issue_report(&issues);
    assert_eq!(report[0], "2 issues");
    assert!(report[2].starts_with("    gfx/interface/ideas/lost.dds: "));

    let rendered = render::render(&manifest, tmp.path()).unwrap();
    issues.extend(rendered.issues);
    let report = output::format_issue_report(&issues);
    assert_eq!(report[0], "3 issues");
    assert_eq!(
        report
            .iter()
            .filter(|l| l.contains("lost.dds"))
            .count(),
        2
    );
}
