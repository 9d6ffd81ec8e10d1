/// Opaque font identity. The cache only ever compares these; it never
/// dereferences a font through one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontId(pub u32);

/// A rasterized glyph as produced by the backend rasterizer: an 8-bit
/// coverage bitmap plus the metrics needed to position it.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    /// Alpha-only coverage bytes, row-major, `width * height` long.
    pub coverage: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Vertical offset from the baseline to the top of the bitmap.
    pub bearing: i32,
    /// Horizontal pen advance for this glyph.
    pub advance: u32,
}

pub trait GlyphRasterizer {
    /// Rasterizes a codepoint from the given font.
    ///
    /// Returns `None` for glyphs that have an advance but no visual form
    /// (space and friends); the cache turns those into a fixed-advance
    /// result without touching the atlas.
    fn rasterize(&self, font: FontId, codepoint: u32) -> Option<RasterizedGlyph>;

    /// Advance to use for glyphs without a visual form.
    fn blank_advance(&self, font: FontId) -> u32;
}
