use std::cmp::Ordering;

use crate::raster::FontId;

/// Lookup key for a cached glyph.
///
/// Ordered by codepoint first so runs of text from one script stay close
/// together in the tree, with the font ordinal as a tie-break so glyphs
/// from many fonts can share one index and one atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphKey {
    pub font: FontId,
    pub codepoint: u32,
}

impl GlyphKey {
    pub fn new(font: FontId, codepoint: u32) -> Self {
        Self { font, codepoint }
    }
}

impl Ord for GlyphKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.codepoint
            .cmp(&other.codepoint)
            .then(self.font.cmp(&other.font))
    }
}

impl PartialOrd for GlyphKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Where a cached glyph lives in the atlas, plus the metrics needed to
/// position and advance past it. Immutable once inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRecord {
    /// X position in the atlas.
    pub x: u32,
    /// Y position in the atlas.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Vertical offset from the baseline to the top of the bitmap.
    pub bearing: i32,
    /// Horizontal pen advance.
    pub advance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

struct Node {
    key: GlyphKey,
    record: GlyphRecord,
    color: Color,
    left: Link,
    right: Link,
}

type Link = Option<Box<Node>>;

impl Node {
    fn new(key: GlyphKey, record: GlyphRecord) -> Self {
        Self {
            key,
            record,
            color: Color::Red,
            left: None,
            right: None,
        }
    }
}

/// Left-leaning red-black tree mapping `GlyphKey` to `GlyphRecord`.
///
/// Insert-only: the index grows until the whole atlas is released, at
/// which point the tree is torn down as a unit. Children are exclusively
/// owned, so teardown is the ordinary recursive drop.
pub struct GlyphIndex {
    root: Link,
    len: usize,
}

impl GlyphIndex {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn find(&self, key: GlyphKey) -> Option<&GlyphRecord> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.record),
            };
        }
        None
    }

    /// Inserts a record, replacing any existing record under the same key.
    pub fn insert(&mut self, key: GlyphKey, record: GlyphRecord) {
        let mut root = insert_node(self.root.take(), key, record, &mut self.len);
        root.color = Color::Black;
        self.root = Some(root);
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }
}

impl Default for GlyphIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn is_red(link: &Link) -> bool {
    matches!(link, Some(node) if node.color == Color::Red)
}

/// Left rotation: the red right child becomes the subtree root, taking the
/// old root's color; the old root turns red and drops to the left.
fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut right) = node.right.take() else {
        return node;
    };
    node.right = right.left.take();
    std::mem::swap(&mut node.color, &mut right.color);
    right.left = Some(node);
    right
}

/// Mirror of `rotate_left` for a red left child.
fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut left) = node.left.take() else {
        return node;
    };
    node.left = left.right.take();
    std::mem::swap(&mut node.color, &mut left.color);
    left.right = Some(node);
    left
}

/// Both children red: push the redness up to this node.
fn flip_colors(node: &mut Node) {
    node.color = Color::Red;
    if let Some(left) = node.left.as_deref_mut() {
        left.color = Color::Black;
    }
    if let Some(right) = node.right.as_deref_mut() {
        right.color = Color::Black;
    }
}

fn insert_node(link: Link, key: GlyphKey, record: GlyphRecord, len: &mut usize) -> Box<Node> {
    let mut node = match link {
        None => {
            *len += 1;
            return Box::new(Node::new(key, record));
        }
        Some(node) => node,
    };

    match key.cmp(&node.key) {
        Ordering::Less => node.left = Some(insert_node(node.left.take(), key, record, len)),
        Ordering::Greater => node.right = Some(insert_node(node.right.take(), key, record, len)),
        Ordering::Equal => node.record = record,
    }

    // Fix up on the way back to the root: lean red links left, break up
    // consecutive reds, then push redness upward.
    if is_red(&node.right) && !is_red(&node.left) {
        node = rotate_left(node);
    }
    if is_red(&node.left) && node.left.as_deref().is_some_and(|l| is_red(&l.left)) {
        node = rotate_right(node);
    }
    if is_red(&node.left) && is_red(&node.right) {
        flip_colors(&mut node);
    }

    node
}

#[cfg(test)]
impl GlyphIndex {
    /// Panics unless the red-black invariants hold: black root, no red
    /// node with a red child, equal black count on every root-to-leaf
    /// path, and binary-search ordering throughout.
    fn check_invariants(&self) {
        fn walk(link: &Link, parent_red: bool, lower: Option<GlyphKey>, upper: Option<GlyphKey>) -> usize {
            let Some(node) = link.as_deref() else {
                return 1;
            };
            if let Some(lower) = lower {
                assert!(node.key > lower, "ordering violated");
            }
            if let Some(upper) = upper {
                assert!(node.key < upper, "ordering violated");
            }
            let red = node.color == Color::Red;
            assert!(!(parent_red && red), "red node has a red child");
            let left_black = walk(&node.left, red, lower, Some(node.key));
            let right_black = walk(&node.right, red, Some(node.key), upper);
            assert_eq!(left_black, right_black, "unequal black height");
            left_black + if red { 0 } else { 1 }
        }

        if let Some(root) = self.root.as_deref() {
            assert_eq!(root.color, Color::Black, "root is red");
        }
        walk(&self.root, false, None, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: u32) -> GlyphRecord {
        GlyphRecord {
            x: tag * 10,
            y: tag,
            width: 8,
            height: 16,
            bearing: 12,
            advance: 9,
        }
    }

    #[test]
    fn test_empty_index() {
        let index = GlyphIndex::new();
        assert!(index.is_empty());
        assert!(index.find(GlyphKey::new(FontId(0), 65)).is_none());
        index.check_invariants();
    }

    #[test]
    fn test_find_returns_inserted_record() {
        let mut index = GlyphIndex::new();
        let key = GlyphKey::new(FontId(1), 'A' as u32);
        index.insert(key, record(3));
        assert_eq!(index.find(key), Some(&record(3)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_missing_key_misses() {
        let mut index = GlyphIndex::new();
        index.insert(GlyphKey::new(FontId(1), 65), record(1));
        assert!(index.find(GlyphKey::new(FontId(1), 66)).is_none());
        assert!(index.find(GlyphKey::new(FontId(2), 65)).is_none());
    }

    #[test]
    fn test_duplicate_insert_replaces_record() {
        let mut index = GlyphIndex::new();
        let key = GlyphKey::new(FontId(0), 65);
        index.insert(key, record(1));
        index.insert(key, record(2));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(key), Some(&record(2)));
        index.check_invariants();
    }

    #[test]
    fn test_font_identity_tie_break() {
        let mut index = GlyphIndex::new();
        let key1 = GlyphKey::new(FontId(1), 'A' as u32);
        let key2 = GlyphKey::new(FontId(2), 'A' as u32);
        index.insert(key1, record(1));
        index.insert(key2, record(2));
        assert_eq!(index.len(), 2);
        assert_eq!(index.find(key1), Some(&record(1)));
        assert_eq!(index.find(key2), Some(&record(2)));
        index.check_invariants();
    }

    #[test]
    fn test_invariants_hold_under_ascending_inserts() {
        let mut index = GlyphIndex::new();
        for cp in 0..256 {
            index.insert(GlyphKey::new(FontId(0), cp), record(cp));
            index.check_invariants();
        }
        assert_eq!(index.len(), 256);
        for cp in 0..256 {
            assert_eq!(index.find(GlyphKey::new(FontId(0), cp)), Some(&record(cp)));
        }
    }

    #[test]
    fn test_invariants_hold_under_descending_inserts() {
        let mut index = GlyphIndex::new();
        for cp in (0..256).rev() {
            index.insert(GlyphKey::new(FontId(0), cp), record(cp));
            index.check_invariants();
        }
        assert_eq!(index.len(), 256);
    }

    #[test]
    fn test_invariants_hold_under_scrambled_inserts() {
        // Fixed-seed LCG so the scramble is reproducible.
        let mut state: u32 = 0x2545_f491;
        let mut index = GlyphIndex::new();
        let mut inserted = Vec::new();
        for _ in 0..500 {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let cp = state % 4096;
            let font = FontId((state >> 16) % 4);
            let key = GlyphKey::new(font, cp);
            if !inserted.contains(&key) {
                inserted.push(key);
            }
            index.insert(key, record(cp));
            index.check_invariants();
        }
        assert_eq!(index.len(), inserted.len());
        for key in inserted {
            assert!(index.find(key).is_some());
        }
    }

    #[test]
    fn test_clear_empties_the_tree() {
        let mut index = GlyphIndex::new();
        for cp in 0..64 {
            index.insert(GlyphKey::new(FontId(0), cp), record(cp));
        }
        index.clear();
        assert!(index.is_empty());
        assert!(index.find(GlyphKey::new(FontId(0), 0)).is_none());
        index.check_invariants();
    }

    #[test]
    fn test_key_ordering_codepoint_before_font() {
        let low = GlyphKey::new(FontId(9), 10);
        let high = GlyphKey::new(FontId(0), 11);
        assert!(low < high);
        assert!(GlyphKey::new(FontId(0), 10) < GlyphKey::new(FontId(1), 10));
    }
}
