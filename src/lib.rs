//! Shared glyph cache and texture-atlas allocator.
//!
//! Rasterizing a glyph and uploading its bitmap is expensive; drawing the
//! same character twice should not pay twice. This crate caches rasterized
//! glyphs from any number of fonts into one shared coverage surface (the
//! atlas), packed by a monotonic shelf allocator and indexed by a
//! red-black tree keyed on `(codepoint, font)`. Rendering surfaces share
//! the atlas through reference-counted acquisition; the surface and index
//! are created together on first acquire and torn down together on last
//! release.
//!
//! The cache is a single-lock subsystem by design: every operation,
//! including the rasterizer call on a miss, runs under one mutex. Glyph
//! eviction, atlas resizing and lock-free access are out of scope.

pub mod atlas;
pub mod cache;
pub mod composite;
pub mod config;
pub mod error;
pub mod index;
pub mod raster;

pub use cache::{AtlasHandle, GlyphCache, Resolution};
pub use composite::{Compositor, PixelSurface, Rgba8, SoftwareCompositor, SourceRect};
pub use config::CacheSettings;
pub use error::CacheError;
pub use index::{GlyphKey, GlyphRecord};
pub use raster::{FontId, GlyphRasterizer, RasterizedGlyph};
