//! Sprite extraction from Paradox `.gfx` interface files.
//!
//! The gfx format is a loose `key = value` block syntax. Full parsing is
//! not needed — sprite definitions are flat blocks, so extraction is
//! regex-based:
//!
//! ```text
//! spriteType = {
//!     name = "GFX_focus_generic_army"     # case-insensitive keys
//!     texturefile = "gfx/interface/goals/focus_generic_army.dds"
//!     noOfFrames = 2                      # optional, default 1
//! }
//! ```
//!
//! Line comments are stripped first and newlines collapsed, so a block
//! can be matched with a single non-greedy, brace-free body pattern.
//! Blocks missing a name or texturefile are dropped silently — vanilla
//! files contain plenty of both.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[^\n]*").unwrap());

static SPRITE_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)spriteType\s*=\s*\{[^{}]*?\}").unwrap());

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+name\s*=\s*"(.+?)""#).unwrap());

static TEXTUREFILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+texturefile\s*=\s*"(.+?)""#).unwrap());

static FRAMES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+noOfFrames\s*=\s*([0-9]+)").unwrap());

/// A sprite block as written in a gfx file, before path resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSprite {
    pub name: String,
    pub texturefile: String,
    pub frames: u32,
}

/// Extract all complete sprite definitions from gfx file contents.
pub fn extract_sprites(contents: &str) -> Vec<RawSprite> {
    let stripped = COMMENT_RE.replace_all(contents, " ");
    let flat = stripped.replace('\n', " ");

    SPRITE_TYPE_RE
        .find_iter(&flat)
        .filter_map(|block| parse_block(block.as_str()))
        .collect()
}

fn parse_block(block: &str) -> Option<RawSprite> {
    let name = NAME_RE.captures(block)?.get(1)?.as_str().to_string();
    let texturefile = TEXTUREFILE_RE.captures(block)?.get(1)?.as_str().to_string();
    let frames = FRAMES_RE
        .captures(block)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1);

    Some(RawSprite {
        name,
        texturefile,
        frames,
    })
}

/// Normalize a texture path from a gfx file: backslashes become forward
/// slashes and one leading separator is stripped, so the result is
/// relative to the scan root.
pub fn normalize_texture_path(raw: &str) -> PathBuf {
    let forward = raw.replace('\\', "/");
    let trimmed = forward.strip_prefix('/').unwrap_or(&forward);
    PathBuf::from(trimmed)
}

/// Find `rel` under `root` matching each path component without regard
/// to ASCII case. Returns the path as it exists on disk, relative to
/// `root`. Gfx files written on Windows routinely disagree with the
/// on-disk casing, which only breaks on case-sensitive filesystems.
pub fn resolve_case_insensitive(root: &Path, rel: &Path) -> Option<PathBuf> {
    let mut current = root.to_path_buf();
    let mut resolved = PathBuf::new();

    for component in rel.components() {
        let wanted = component.as_os_str().to_str()?;
        let entries = std::fs::read_dir(&current).ok()?;
        let found = entries.filter_map(|e| e.ok()).find(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.eq_ignore_ascii_case(wanted))
        })?;
        resolved.push(found.file_name());
        current.push(found.file_name());
    }

    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const GOALS_GFX: &str = r#"
spriteTypes = {
    spriteType = {
        name = "GFX_focus_generic_army"
        texturefile = "gfx/interface/goals/focus_generic_army.dds"
    }
    spriteType = {
        name = "GFX_focus_shaded"
        texturefile = "gfx/interface/goals/focus_shaded.dds"
        noOfFrames = 2
    }
}
"#;

    #[test]
    fn extracts_all_sprites() {
        let sprites = extract_sprites(GOALS_GFX);
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].name, "GFX_focus_generic_army");
        assert_eq!(
            sprites[0].texturefile,
            "gfx/interface/goals/focus_generic_army.dds"
        );
    }

    #[test]
    fn frames_default_to_one() {
        let sprites = extract_sprites(GOALS_GFX);
        assert_eq!(sprites[0].frames, 1);
        assert_eq!(sprites[1].frames, 2);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let contents = r#"
SpriteType = {
    Name = "GFX_a"
    textureFile = "gfx/a.dds"
    noofframes = 3
}
"#;
        let sprites = extract_sprites(contents);
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].frames, 3);
    }

    #[test]
    fn comments_are_stripped() {
        let contents = r#"
spriteType = {
    name = "GFX_a"  # the army focus
    # texturefile = "gfx/commented_out.dds"
    texturefile = "gfx/a.dds"
}
"#;
        let sprites = extract_sprites(contents);
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].texturefile, "gfx/a.dds");
    }

    #[test]
    fn single_line_blocks_match() {
        let contents = r#"spriteType = { name = "GFX_a" texturefile = "gfx/a.dds" }"#;
        assert_eq!(extract_sprites(contents).len(), 1);
    }

    #[test]
    fn block_without_name_is_dropped() {
        let contents = r#"
spriteType = {
    texturefile = "gfx/a.dds"
}
"#;
        assert!(extract_sprites(contents).is_empty());
    }

    #[test]
    fn block_without_texturefile_is_dropped() {
        let contents = r#"
spriteType = {
    name = "GFX_a"
    noOfFrames = 4
}
"#;
        assert!(extract_sprites(contents).is_empty());
    }

    #[test]
    fn frame_sprites_parse_alongside_plain_ones() {
        let contents = r#"
frameAnimatedSpriteType = {
    name = "GFX_anim"
    texturefile = "gfx/anim.dds"
    noOfFrames = 8
}
spriteType = {
    name = "GFX_plain"
    texturefile = "gfx/plain.dds"
}
"#;
        // frameAnimatedSpriteType ends in "spriteType" and matches too,
        // which is exactly what the catalog wants
        let sprites = extract_sprites(contents);
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].frames, 8);
    }

    #[test]
    fn normalize_strips_leading_separator() {
        assert_eq!(
            normalize_texture_path("/gfx/interface/a.dds"),
            PathBuf::from("gfx/interface/a.dds")
        );
        assert_eq!(
            normalize_texture_path(r"\gfx\interface\a.dds"),
            PathBuf::from("gfx/interface/a.dds")
        );
    }

    #[test]
    fn normalize_keeps_relative_paths() {
        assert_eq!(
            normalize_texture_path("gfx/interface/a.dds"),
            PathBuf::from("gfx/interface/a.dds")
        );
    }

    #[test]
    fn resolve_recovers_wrong_case() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("gfx/Interface");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Focus_Army.dds"), "x").unwrap();

        let resolved =
            resolve_case_insensitive(tmp.path(), Path::new("gfx/interface/focus_army.dds"));
        assert_eq!(resolved, Some(PathBuf::from("gfx/Interface/Focus_Army.dds")));
    }

    #[test]
    fn resolve_returns_none_when_missing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("gfx")).unwrap();

        let resolved = resolve_case_insensitive(tmp.path(), Path::new("gfx/nope.dds"));
        assert_eq!(resolved, None);
    }

    #[test]
    fn resolve_exact_case_passes_through() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("gfx");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.dds"), "x").unwrap();

        let resolved = resolve_case_insensitive(tmp.path(), Path::new("gfx/a.dds"));
        assert_eq!(resolved, Some(PathBuf::from("gfx/a.dds")));
    }
}
