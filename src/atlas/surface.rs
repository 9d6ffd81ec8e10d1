use crate::error::CacheError;

/// The shared pixel surface glyph bitmaps are packed into: one 8-bit
/// coverage byte per pixel, row-major.
pub struct AtlasSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AtlasSurface {
    /// Allocates the backing buffer. Fails rather than aborting when the
    /// buffer cannot be reserved.
    pub fn new(width: u32, height: u32) -> Result<Self, CacheError> {
        let len = width as usize * height as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| CacheError::SurfaceAllocation { width, height })?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copies a coverage bitmap into the surface at `(x, y)`.
    ///
    /// The destination rectangle must already have been handed out by the
    /// shelf allocator, so it is in bounds by construction; the debug
    /// assertion catches a caller that bypassed it.
    pub fn blit(&mut self, coverage: &[u8], width: u32, height: u32, x: u32, y: u32) {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        debug_assert_eq!(coverage.len(), (width * height) as usize);

        for row in 0..height {
            let src_start = (row * width) as usize;
            let dst_start = ((y + row) * self.width + x) as usize;
            self.pixels[dst_start..dst_start + width as usize]
                .copy_from_slice(&coverage[src_start..src_start + width as usize]);
        }
    }

    /// Coverage byte at `(x, y)`; 0 outside the surface.
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
