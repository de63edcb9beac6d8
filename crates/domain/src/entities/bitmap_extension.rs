use serde::{Deserialize, Serialize};

/// Pages on each side of the default bitmap window.
pub const EXTENSION_TICKARRAY_BITMAP_SIZE: usize = 14;
/// 64-bit words per extension page (512 bits).
pub const EXTENSION_PAGE_WORDS: usize = 8;

/// One 512-bit page, little-endian words.
pub type BitmapPage = [u64; EXTENSION_PAGE_WORDS];

/// Out-of-range bitmap pages covering tick arrays beyond the default window.
///
/// Positive page `p` covers array indices `[512(p+1), 512(p+2))`, negative
/// page `p` covers `[-512(p+2), -512(p+1))`; bit `o` of a page is the array
/// at `page_min + o`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickArrayBitmapExtension {
    /// Pages for arrays above the default window.
    pub positive_tick_array_bitmap: [BitmapPage; EXTENSION_TICKARRAY_BITMAP_SIZE],
    /// Pages for arrays below the default window.
    pub negative_tick_array_bitmap: [BitmapPage; EXTENSION_TICKARRAY_BITMAP_SIZE],
}

impl TickArrayBitmapExtension {
    /// True when no page has a bit set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positive_tick_array_bitmap
            .iter()
            .chain(self.negative_tick_array_bitmap.iter())
            .all(|page| page.iter().all(|w| *w == 0))
    }
}
