// TrueType text rasterized straight to 1-bit ink (no anti-aliasing on a two-colour panel).

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, Pixel, Point};
use std::path::{Path, PathBuf};

/// Minimum glyph coverage that becomes an ink pixel.
const INK_THRESHOLD: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("reading font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a usable TrueType font or collection")]
    Invalid { path: PathBuf },
}

/// One face of a font file at one size.
pub struct Typeface {
    font: FontVec,
    path: PathBuf,
    size: f32,
    scale: PxScale,
}

impl Typeface {
    /// Load face 0 of a `.ttf`/`.ttc`. `size` is the em size in pixels.
    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self, FontError> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|source| FontError::Io {
            path: path.clone(),
            source,
        })?;
        let font = FontVec::try_from_vec_and_index(data, 0)
            .map_err(|_| FontError::Invalid { path: path.clone() })?;
        let units_per_em = font
            .units_per_em()
            .ok_or_else(|| FontError::Invalid { path: path.clone() })?;
        // ab_glyph scales by ascent-to-descent height; convert from em size
        let scale = PxScale::from(size * font.height_unscaled() / units_per_em);
        Ok(Self {
            font,
            path,
            size,
            scale,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Draw `text` with the top of its line box at `origin`, left aligned.
    pub fn draw_text<D>(&self, target: &mut D, origin: Point, text: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let scaled = self.font.as_scaled(self.scale);
        let baseline = origin.y as f32 + scaled.ascent();
        let mut caret = origin.x as f32;
        let mut previous: Option<GlyphId> = None;
        let mut ink = Vec::new();

        for c in text.chars().filter(|c| !c.is_control()) {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(self.scale, ab_glyph::point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                if coverage >= INK_THRESHOLD {
                    ink.push(Pixel(
                        Point::new(bounds.min.x as i32 + x as i32, bounds.min.y as i32 + y as i32),
                        BinaryColor::On,
                    ));
                }
            });
        }
        target.draw_iter(ink)
    }
}

/// Faces loaded at startup.
pub struct Fonts {
    pub body: Typeface,
    /// Loaded alongside the body face but not used by the standard layout.
    pub title: Typeface,
}

impl Fonts {
    pub fn load(config: &crate::config::FontConfig) -> Result<Self, FontError> {
        Ok(Self {
            body: Typeface::load(&config.body_path, config.body_size)?,
            title: Typeface::load(&config.title_path, config.title_size)?,
        })
    }
}
