/// Row-based ("shelf") packer for the glyph atlas.
///
/// Blocks are placed left-to-right along the current row; when a block no
/// longer fits, the cursor wraps to a fresh row below the tallest block
/// seen so far. Nothing is ever reclaimed: the cursor only moves right and
/// down, and packing state resets only when the whole atlas is released.
pub struct ShelfAllocator {
    width: u32,
    height: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl ShelfAllocator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
        }
    }

    /// Allocates a `width x height` block, returning its top-left corner.
    ///
    /// Returns `None` when the block cannot fit: wider than the atlas, or
    /// it would run past the atlas bottom in both the current row and a
    /// fresh one. A failed allocation leaves the cursor untouched, so the
    /// remainder of the current row stays available.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width > self.width {
            return None;
        }

        // Fits in the current row?
        if self.cursor_x + width <= self.width {
            if self.cursor_y + height > self.height {
                log::warn!("Glyph atlas full, cannot allocate {}x{}", width, height);
                return None;
            }
            self.row_height = self.row_height.max(height);
            let x = self.cursor_x;
            self.cursor_x += width;
            return Some((x, self.cursor_y));
        }

        // Start a new row, committing cursor state only on success.
        let new_row_y = self.cursor_y + self.row_height;
        if new_row_y + height > self.height {
            log::warn!("Glyph atlas full, cannot allocate {}x{}", width, height);
            return None;
        }
        self.cursor_y = new_row_y;
        self.cursor_x = width;
        self.row_height = height;
        Some((0, new_row_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_allocation_at_origin() {
        let mut shelf = ShelfAllocator::new(256, 256);
        assert_eq!(shelf.allocate(10, 12), Some((0, 0)));
    }

    #[test]
    fn test_same_row_packing() {
        let mut shelf = ShelfAllocator::new(256, 256);
        assert_eq!(shelf.allocate(10, 12), Some((0, 0)));
        assert_eq!(shelf.allocate(8, 12), Some((10, 0)));
        assert_eq!(shelf.allocate(8, 10), Some((18, 0)));
    }

    #[test]
    fn test_row_wrap_uses_tallest_block() {
        let mut shelf = ShelfAllocator::new(24, 256);
        assert_eq!(shelf.allocate(10, 12), Some((0, 0)));
        assert_eq!(shelf.allocate(8, 12), Some((10, 0)));
        // 18 + 14 > 24, so this wraps below the 12-tall row.
        assert_eq!(shelf.allocate(14, 20), Some((0, 12)));
    }

    #[test]
    fn test_row_height_tracks_maximum() {
        let mut shelf = ShelfAllocator::new(20, 256);
        assert_eq!(shelf.allocate(10, 8), Some((0, 0)));
        assert_eq!(shelf.allocate(10, 16), Some((10, 0)));
        // Next row starts at the taller of the two.
        assert_eq!(shelf.allocate(10, 4), Some((0, 16)));
    }

    #[test]
    fn test_vertical_exhaustion_fails() {
        let mut shelf = ShelfAllocator::new(16, 20);
        assert_eq!(shelf.allocate(16, 12), Some((0, 0)));
        // A new row would start at y=12; 12 + 12 > 20.
        assert_eq!(shelf.allocate(16, 12), None);
    }

    #[test]
    fn test_too_tall_block_fails_without_wrapping() {
        let mut shelf = ShelfAllocator::new(64, 16);
        assert_eq!(shelf.allocate(8, 32), None);
        // Failure must not consume space.
        assert_eq!(shelf.allocate(8, 16), Some((0, 0)));
    }

    #[test]
    fn test_too_wide_block_fails() {
        let mut shelf = ShelfAllocator::new(32, 256);
        assert_eq!(shelf.allocate(40, 8), None);
        assert_eq!(shelf.allocate(32, 8), Some((0, 0)));
    }

    #[test]
    fn test_failed_allocation_keeps_later_allocations_valid() {
        let mut shelf = ShelfAllocator::new(32, 24);
        assert_eq!(shelf.allocate(32, 16), Some((0, 0)));
        assert_eq!(shelf.allocate(32, 16), None);
        // Shorter block still fits in the remaining strip.
        assert_eq!(shelf.allocate(32, 8), Some((0, 16)));
    }

    #[test]
    fn test_failed_wrap_preserves_current_row() {
        let mut shelf = ShelfAllocator::new(32, 20);
        assert_eq!(shelf.allocate(10, 12), Some((0, 0)));
        // Too wide for the row remainder and too tall for a new row.
        assert_eq!(shelf.allocate(30, 9), None);
        // The current row is still open where the failure left it.
        assert_eq!(shelf.allocate(20, 9), Some((10, 0)));
    }

    #[test]
    fn test_cursor_is_monotonic() {
        let mut shelf = ShelfAllocator::new(50, 1000);
        let mut last_y = 0;
        let mut last_x = 0;
        for i in 0..60 {
            let w = 7 + (i % 5);
            let h = 9 + (i % 7);
            if let Some((x, y)) = shelf.allocate(w, h) {
                assert!(y >= last_y);
                if y == last_y {
                    assert!(x >= last_x);
                }
                last_x = x;
                last_y = y;
            }
        }
    }
}
