use crate::atlas::AtlasSurface;
use crate::index::GlyphRecord;

/// RGBA8 pen color, straight (non-premultiplied) alpha.
pub type Rgba8 = [u8; 4];

/// A rectangle inside the atlas to composite from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl From<&GlyphRecord> for SourceRect {
    fn from(record: &GlyphRecord) -> Self {
        Self {
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
        }
    }
}

/// Destination surface for software compositing: RGBA8, row-major.
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    fn blend_pixel(&mut self, x: i64, y: i64, pen: Rgba8, coverage: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let alpha = coverage as u32 * pen[3] as u32 / 255;
        if alpha == 0 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        for c in 0..3 {
            let dst = self.pixels[i + c] as u32;
            self.pixels[i + c] = ((pen[c] as u32 * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        let dst_a = self.pixels[i + 3] as u32;
        self.pixels[i + 3] = (alpha + dst_a * (255 - alpha) / 255) as u8;
    }
}

/// Backend capability for drawing cached glyphs: an over-blend from the
/// atlas's coverage bytes, tinted with the pen color. Implemented once per
/// rendering backend.
pub trait Compositor {
    fn composite(
        &self,
        dest: &mut PixelSurface,
        atlas: &AtlasSurface,
        src: SourceRect,
        dest_point: (i32, i32),
        pen_color: Rgba8,
    );
}

/// CPU reference compositor. Glyphs partially or fully outside the
/// destination are clipped.
pub struct SoftwareCompositor;

impl SoftwareCompositor {
    /// Over-blends a raw coverage bitmap into the destination. Used for
    /// glyphs the cache could not place in the atlas.
    pub fn blend_coverage(
        dest: &mut PixelSurface,
        coverage: &[u8],
        width: u32,
        height: u32,
        dest_point: (i32, i32),
        pen_color: Rgba8,
    ) {
        for row in 0..height {
            for col in 0..width {
                let cov = coverage[(row * width + col) as usize];
                dest.blend_pixel(
                    dest_point.0 as i64 + col as i64,
                    dest_point.1 as i64 + row as i64,
                    pen_color,
                    cov,
                );
            }
        }
    }
}

impl Compositor for SoftwareCompositor {
    fn composite(
        &self,
        dest: &mut PixelSurface,
        atlas: &AtlasSurface,
        src: SourceRect,
        dest_point: (i32, i32),
        pen_color: Rgba8,
    ) {
        for row in 0..src.height {
            for col in 0..src.width {
                let cov = atlas.coverage_at(src.x + col, src.y + row);
                dest.blend_pixel(
                    dest_point.0 as i64 + col as i64,
                    dest_point.1 as i64 + row as i64,
                    pen_color,
                    cov,
                );
            }
        }
    }
}
