//! Deterministic placeholder illustrations.
//!
//! This is the reliability backstop of the image pipeline: when every remote
//! backend fails, a scene still gets a rendered card with a gradient
//! background and a caption block. Pure CPU, no network, and the only I/O is
//! the final file write.

use std::path::Path;

use chrono::Utc;
use image::{Rgb, RgbImage};
use tracing::debug;
use tw_core::{Error, ImageArtifact, ImageStrategy, Result, SceneId};

pub mod font;

const CANVAS_SIZE: u32 = 512;
const EXCERPT_MAX_CHARS: usize = 50;
const WRAP_WIDTH_CHARS: usize = 36;
const TITLE_SCALE: u32 = 3;
const BODY_SCALE: u32 = 2;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const SHADOW: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Rgb<u8>,
    accent: Rgb<u8>,
}

/// Style table mirroring the remote prompt styles; anything unknown gets the
/// neutral pair.
fn palette(art_style: &str) -> Palette {
    let (background, accent) = match art_style {
        "cartoon" => ([0xff, 0x6b, 0x6b], [0x4e, 0xcd, 0xc4]),
        "realistic" => ([0x2c, 0x3e, 0x50], [0x34, 0x98, 0xdb]),
        "anime" => ([0x8e, 0x44, 0xad], [0xf3, 0x9c, 0x12]),
        "watercolor" => ([0x74, 0xb9, 0xff], [0xfd, 0x79, 0xa8]),
        _ => ([0x4a, 0x55, 0x68], [0xed, 0x89, 0x36]),
    };
    Palette {
        background: Rgb(background),
        accent: Rgb(accent),
    }
}

/// Render a placeholder for `scene` and persist it under `out_dir`.
///
/// Must succeed for any input, including empty text and styles missing from
/// the palette table; the only failure modes are filesystem ones.
pub fn render(
    scene: SceneId,
    source_text: &str,
    art_style: &str,
    out_dir: &Path,
) -> Result<ImageArtifact> {
    let img = compose(scene, source_text, art_style);

    std::fs::create_dir_all(out_dir)?;
    let file_name = format!(
        "fallback_{}_{}.png",
        scene.slug(),
        Utc::now().timestamp_millis()
    );
    let path = out_dir.join(&file_name);
    img.save(&path)
        .map_err(|e| Error::Render(format!("failed to save placeholder: {e}")))?;

    debug!(scene = scene.name(), file = %file_name, "rendered placeholder");

    Ok(ImageArtifact {
        scene,
        file_name,
        path,
        strategy: ImageStrategy::LocalRender,
        source_model: None,
    })
}

/// Compose the placeholder image in memory. Deterministic for fixed inputs.
pub fn compose(scene: SceneId, source_text: &str, art_style: &str) -> RgbImage {
    let palette = palette(art_style);
    let mut img = RgbImage::new(CANVAS_SIZE, CANVAS_SIZE);

    paint_gradient(&mut img, palette);
    draw_caption_block(&mut img, scene, source_text, art_style, palette);

    img
}

/// Vertical linear gradient from background (top) to accent (bottom).
fn paint_gradient(img: &mut RgbImage, palette: Palette) {
    let height = img.height();
    for y in 0..height {
        let blend = y as f32 / height as f32;
        let row_color = Rgb([
            lerp(palette.background.0[0], palette.accent.0[0], blend),
            lerp(palette.background.0[1], palette.accent.0[1], blend),
            lerp(palette.background.0[2], palette.accent.0[2], blend),
        ]);
        for x in 0..img.width() {
            img.put_pixel(x, y, row_color);
        }
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 * (1.0 - t) + b as f32 * t) as u8
}

struct CaptionLine {
    text: String,
    scale: u32,
    accent: bool,
}

fn draw_caption_block(
    img: &mut RgbImage,
    scene: SceneId,
    source_text: &str,
    art_style: &str,
    palette: Palette,
) {
    let mut lines = vec![
        CaptionLine {
            text: scene.decoration().to_string(),
            scale: TITLE_SCALE,
            accent: true,
        },
        CaptionLine {
            text: scene.name().to_uppercase(),
            scale: TITLE_SCALE,
            accent: true,
        },
        CaptionLine {
            text: String::new(),
            scale: BODY_SCALE,
            accent: false,
        },
        CaptionLine {
            text: "AI IMAGE UNAVAILABLE".to_string(),
            scale: BODY_SCALE,
            accent: false,
        },
        CaptionLine {
            text: "PLACEHOLDER ILLUSTRATION".to_string(),
            scale: BODY_SCALE,
            accent: false,
        },
        CaptionLine {
            text: String::new(),
            scale: BODY_SCALE,
            accent: false,
        },
        CaptionLine {
            text: "STORY PREVIEW:".to_string(),
            scale: BODY_SCALE,
            accent: false,
        },
    ];

    for wrapped in wrap_text(&excerpt(source_text), WRAP_WIDTH_CHARS) {
        lines.push(CaptionLine {
            text: wrapped,
            scale: BODY_SCALE,
            accent: false,
        });
    }

    lines.push(CaptionLine {
        text: String::new(),
        scale: BODY_SCALE,
        accent: false,
    });
    lines.push(CaptionLine {
        text: format!("STYLE: {}", art_style.to_uppercase()),
        scale: BODY_SCALE,
        accent: true,
    });

    let mut y: i64 = 72;
    for line in &lines {
        let line_height = font::line_height(line.scale) as i64;
        if !line.text.is_empty() {
            let width = font::text_width(&line.text, line.scale) as i64;
            let x = (CANVAS_SIZE as i64 - width) / 2;
            let color = if line.accent { palette.accent } else { WHITE };
            // 1px drop-shadow duplicate for legibility on light gradients.
            font::draw_text(img, &line.text, x + 1, y + 1, line.scale, SHADOW);
            font::draw_text(img, &line.text, x, y, line.scale, color);
        }
        y += line_height + if line.scale == TITLE_SCALE { 14 } else { 8 };
    }
}

fn excerpt(source_text: &str) -> String {
    let trimmed = source_text.trim();
    let mut cut: String = trimmed.chars().take(EXCERPT_MAX_CHARS).collect();
    if trimmed.chars().count() > EXCERPT_MAX_CHARS {
        cut.push_str("...");
    }
    cut
}

/// Greedy word wrap; words longer than the width are hard-split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            let head: String = word.chars().take(width).collect();
            let tail: String = word.chars().skip(width).collect();
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(head);
            word = tail;
        }
        let needed = word.chars().count() + if current.is_empty() { 0 } else { 1 };
        if current.chars().count() + needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_render_every_scene_and_style() {
        let dir = tempdir().unwrap();
        for scene in SceneId::ALL {
            for style in ["cartoon", "realistic", "anime", "watercolor"] {
                let artifact = render(scene, "A hero sets out at dawn.", style, dir.path())
                    .expect("placeholder render must not fail");
                assert_eq!(artifact.strategy, ImageStrategy::LocalRender);
                assert!(artifact.source_model.is_none());
                assert!(artifact.path.exists());
                assert!(artifact.file_name.starts_with("fallback_"));
                assert!(artifact.file_name.ends_with(".png"));
            }
        }
    }

    #[test]
    fn test_render_unknown_style_and_empty_text() {
        let dir = tempdir().unwrap();
        let artifact = render(SceneId::Climax, "", "pointillism", dir.path()).unwrap();
        assert!(artifact.path.exists());
        let decoded = image::open(&artifact.path).unwrap();
        assert_eq!(decoded.width(), CANVAS_SIZE);
        assert_eq!(decoded.height(), CANVAS_SIZE);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let a = compose(SceneId::Introduction, "same text", "anime");
        let b = compose(SceneId::Introduction, "same text", "anime");
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_gradient_endpoints() {
        let img = compose(SceneId::Resolution, "", "realistic");
        // Top-left is above the caption block: pure background color.
        assert_eq!(img.get_pixel(0, 0), &Rgb([0x2c, 0x3e, 0x50]));
        // Bottom row has fully blended toward the accent.
        let bottom = img.get_pixel(0, CANVAS_SIZE - 1);
        assert!(bottom.0[2] > 0x90);
    }

    #[test]
    fn test_unknown_style_uses_default_palette() {
        let unknown = compose(SceneId::Climax, "", "no-such-style");
        let default = compose(SceneId::Climax, "", "also-unknown");
        assert_eq!(unknown.as_raw(), default.as_raw());
    }

    #[test]
    fn test_excerpt_caps_length() {
        let long = "x".repeat(200);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_MAX_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short"), "short");
        assert_eq!(excerpt(""), "");
    }

    #[test]
    fn test_wrap_text() {
        assert!(wrap_text("", 10).is_empty());
        assert_eq!(wrap_text("one two", 10), vec!["one two"]);
        let lines = wrap_text("alpha beta gamma delta", 11);
        assert!(lines.iter().all(|l| l.chars().count() <= 11));
        assert_eq!(lines.join(" "), "alpha beta gamma delta");
        // A single oversized word is hard-split rather than dropped.
        let split = wrap_text("abcdefghijkl", 5);
        assert_eq!(split, vec!["abcde", "fghij", "kl"]);
    }
}
