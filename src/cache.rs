use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::atlas::{AtlasSurface, ShelfAllocator};
use crate::config::CacheSettings;
use crate::error::CacheError;
use crate::index::{GlyphIndex, GlyphKey, GlyphRecord};
use crate::raster::{FontId, GlyphRasterizer, RasterizedGlyph};

/// Proof of an outstanding [`GlyphCache::acquire`]. Hand it back to
/// [`GlyphCache::release`] on the same cache when the owning rendering
/// surface goes away; the handle remembers which cache minted it.
#[derive(Debug)]
pub struct AtlasHandle {
    owner: u64,
}

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(0);

/// Outcome of a [`GlyphCache::resolve`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The glyph lives in the atlas; composite from the recorded rectangle.
    Cached(GlyphRecord),
    /// The glyph was rasterized but could not be cached (atlas exhausted or
    /// never acquired). Draw it directly from the returned bitmap; the rest
    /// of the cache is unaffected.
    Uncached(RasterizedGlyph),
    /// The glyph has no visual form. Advance the pen and draw nothing.
    Blank { advance: u32 },
}

/// Surface, packer and index live and die together.
struct AtlasState {
    surface: AtlasSurface,
    shelf: ShelfAllocator,
    index: GlyphIndex,
}

struct Inner {
    refcount: u32,
    state: Option<AtlasState>,
    hits: u64,
    misses: u64,
}

/// Shared glyph cache: one atlas and one index serving every rendering
/// surface of a backend.
///
/// This is an explicit context object; the backend creates one at init
/// time and hands references to every drawing call site. All state sits
/// behind a single mutex, held for the whole of each operation including
/// the rasterizer call on the miss path. Coarse, but rotations and the
/// allocation cursor are never observable half-done.
pub struct GlyphCache<R> {
    id: u64,
    settings: CacheSettings,
    rasterizer: R,
    inner: Mutex<Inner>,
}

impl<R: GlyphRasterizer> GlyphCache<R> {
    pub fn new(settings: CacheSettings, rasterizer: R) -> Self {
        Self {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            settings,
            rasterizer,
            inner: Mutex::new(Inner {
                refcount: 0,
                state: None,
                hits: 0,
                misses: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock means another holder panicked mid-operation and
        // the structures may be torn; propagate rather than recover.
        self.inner.lock().expect("glyph cache mutex poisoned")
    }

    /// Registers a rendering surface as a user of the shared atlas.
    ///
    /// The first acquisition allocates the surface and resets the packer
    /// and index; on failure the refcount is left untouched and the cache
    /// stays unusable, so callers fall back to direct rendering.
    pub fn acquire(&self) -> Result<AtlasHandle, CacheError> {
        let mut inner = self.lock();
        if inner.refcount == 0 {
            let (width, height) = (self.settings.atlas_width, self.settings.atlas_height);
            if !self.settings.is_valid() {
                return Err(CacheError::SurfaceAllocation { width, height });
            }
            let surface = AtlasSurface::new(width, height)?;
            inner.state = Some(AtlasState {
                surface,
                shelf: ShelfAllocator::new(width, height),
                index: GlyphIndex::new(),
            });
            log::debug!("Created {}x{} glyph atlas", width, height);
        }
        inner.refcount += 1;
        Ok(AtlasHandle { owner: self.id })
    }

    /// Drops one user of the atlas. When the last handle goes, the surface
    /// is freed and the index torn down as a unit.
    ///
    /// A handle minted by a different cache does not count against this
    /// one: releasing it here is an error and changes nothing.
    pub fn release(&self, handle: AtlasHandle) -> Result<(), CacheError> {
        if handle.owner != self.id {
            return Err(CacheError::UnbalancedRelease);
        }
        let mut inner = self.lock();
        if inner.refcount == 0 {
            return Err(CacheError::UnbalancedRelease);
        }
        inner.refcount -= 1;
        if inner.refcount == 0 {
            inner.state = None;
            log::debug!("Released glyph atlas");
        }
        Ok(())
    }

    /// Produces a drawable result for `(font, codepoint)`.
    ///
    /// Hit: a pure read returning the cached record. Miss: rasterize,
    /// allocate a shelf rectangle, copy the coverage bitmap in, insert the
    /// record. Atlas exhaustion degrades only this glyph to
    /// [`Resolution::Uncached`].
    pub fn resolve(&self, font: FontId, codepoint: u32) -> Resolution {
        let mut inner = self.lock();
        let key = GlyphKey::new(font, codepoint);

        if let Some(record) = inner.state.as_ref().and_then(|s| s.index.find(key)) {
            let record = *record;
            inner.hits += 1;
            return Resolution::Cached(record);
        }
        inner.misses += 1;

        let Some(glyph) = self.rasterizer.rasterize(font, codepoint) else {
            return Resolution::Blank {
                advance: self.rasterizer.blank_advance(font),
            };
        };
        if glyph.width == 0 || glyph.height == 0 {
            return Resolution::Blank {
                advance: glyph.advance,
            };
        }

        let Some(state) = inner.state.as_mut() else {
            return Resolution::Uncached(glyph);
        };
        let Some((x, y)) = state.shelf.allocate(glyph.width, glyph.height) else {
            return Resolution::Uncached(glyph);
        };

        state
            .surface
            .blit(&glyph.coverage, glyph.width, glyph.height, x, y);
        let record = GlyphRecord {
            x,
            y,
            width: glyph.width,
            height: glyph.height,
            bearing: glyph.bearing,
            advance: glyph.advance,
        };
        state.index.insert(key, record);
        Resolution::Cached(record)
    }

    /// Resolves a batch of codepoints up front, so first paint does not pay
    /// per-glyph rasterization.
    pub fn warm_up(&self, font: FontId, codepoints: impl IntoIterator<Item = u32>) {
        let mut count = 0usize;
        for cp in codepoints {
            self.resolve(font, cp);
            count += 1;
        }
        log::info!("Pre-populated {} glyphs for font {:?}", count, font);
    }

    /// Runs `f` against the atlas surface under the cache lock, for
    /// compositing cached glyphs. `None` while the atlas is not acquired.
    pub fn with_surface<T>(&self, f: impl FnOnce(&AtlasSurface) -> T) -> Option<T> {
        let inner = self.lock();
        inner.state.as_ref().map(|s| f(&s.surface))
    }

    pub fn is_active(&self) -> bool {
        self.lock().state.is_some()
    }

    pub fn glyph_count(&self) -> usize {
        self.lock().state.as_ref().map_or(0, |s| s.index.len())
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        let inner = self.lock();
        (inner.hits, inner.misses)
    }
}
