//! Tick-array bitmap search.
//!
//! Every tick array is identified by its array index `start / (60 * spacing)`.
//! The pool account carries a 1024-bit default bitmap for indices
//! `[-512, 512)`; the extension account carries fourteen 512-bit pages on
//! either side. Both are laid out here on one global bit axis,
//! `bit = array_index + 7680`, so a single word scan can walk from one region
//! into the next.

use clmm_quote_domain::entities::bitmap_extension::{
    EXTENSION_PAGE_WORDS, EXTENSION_TICKARRAY_BITMAP_SIZE, TickArrayBitmapExtension,
};
use clmm_quote_domain::entities::pool::TICK_ARRAY_BITMAP_WORDS;
use clmm_quote_domain::entities::tick_array::{check_start_index, tick_array_start_index, tick_count};
use clmm_quote_domain::enums::SwapDirection;
use clmm_quote_domain::error::{QuoteError, Result};
use std::ops::Range;

/// Array indices covered by each half of the default bitmap.
pub const TICK_ARRAY_BITMAP_SIZE: i32 = 512;

const PAGE_BITS: usize = EXTENSION_PAGE_WORDS * 64;
/// Offset added to an array index to get its global bit.
const ARRAY_INDEX_OFFSET: i32 = TICK_ARRAY_BITMAP_SIZE * (EXTENSION_TICKARRAY_BITMAP_SIZE as i32 + 1);
const NEGATIVE_WORDS: Range<usize> = 0..EXTENSION_TICKARRAY_BITMAP_SIZE * EXTENSION_PAGE_WORDS;
const DEFAULT_WORDS: Range<usize> = NEGATIVE_WORDS.end..NEGATIVE_WORDS.end + TICK_ARRAY_BITMAP_WORDS;
const POSITIVE_WORDS: Range<usize> =
    DEFAULT_WORDS.end..DEFAULT_WORDS.end + EXTENSION_TICKARRAY_BITMAP_SIZE * EXTENSION_PAGE_WORDS;

/// A bitmap over (part of) the global tick-array bit axis.
pub trait TickArrayBitmap {
    /// Global word indices this bitmap owns.
    fn word_range(&self) -> Range<usize>;

    /// Word at a global index; zero outside [`TickArrayBitmap::word_range`].
    fn word(&self, index: usize) -> u64;

    /// Tests one global bit.
    fn test_bit(&self, bit: usize) -> bool {
        (self.word(bit / 64) >> (bit % 64)) & 1 == 1
    }

    /// Nearest set bit at or beyond `from` (upward) or at or below it
    /// (downward), scanning whole words at a time.
    fn next_set_bit(&self, from: usize, upward: bool) -> Option<usize> {
        let range = self.word_range();
        if range.is_empty() {
            return None;
        }
        let (first_bit, end_bit) = (range.start * 64, range.end * 64);

        if upward {
            let from = from.max(first_bit);
            if from >= end_bit {
                return None;
            }
            let mut index = from / 64;
            let mut word = self.word(index) & (u64::MAX << (from % 64));
            loop {
                if word != 0 {
                    return Some(index * 64 + word.trailing_zeros() as usize);
                }
                index += 1;
                if index >= range.end {
                    return None;
                }
                word = self.word(index);
            }
        } else {
            if from < first_bit {
                return None;
            }
            let from = from.min(end_bit - 1);
            let mut index = from / 64;
            let mut word = self.word(index) & (u64::MAX >> (63 - from % 64));
            loop {
                if word != 0 {
                    return Some(index * 64 + 63 - word.leading_zeros() as usize);
                }
                if index == range.start {
                    return None;
                }
                index -= 1;
                word = self.word(index);
            }
        }
    }
}

/// The pool account's own 1024-bit bitmap.
#[derive(Debug, Clone, Copy)]
pub struct DefaultTickArrayBitmap<'a> {
    words: &'a [u64; TICK_ARRAY_BITMAP_WORDS],
}

impl<'a> DefaultTickArrayBitmap<'a> {
    #[must_use]
    pub fn new(words: &'a [u64; TICK_ARRAY_BITMAP_WORDS]) -> Self {
        Self { words }
    }
}

impl TickArrayBitmap for DefaultTickArrayBitmap<'_> {
    fn word_range(&self) -> Range<usize> {
        DEFAULT_WORDS
    }

    fn word(&self, index: usize) -> u64 {
        if DEFAULT_WORDS.contains(&index) {
            self.words[index - DEFAULT_WORDS.start]
        } else {
            0
        }
    }
}

/// The extension account's pages on both sides of the default window.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionTickArrayBitmap<'a> {
    extension: &'a TickArrayBitmapExtension,
}

impl<'a> ExtensionTickArrayBitmap<'a> {
    #[must_use]
    pub fn new(extension: &'a TickArrayBitmapExtension) -> Self {
        Self { extension }
    }
}

/// Negative pages are stored nearest-first, so the global order reverses them.
fn negative_page_of_word(index: usize) -> (usize, usize) {
    let block = index / EXTENSION_PAGE_WORDS;
    (EXTENSION_TICKARRAY_BITMAP_SIZE - 1 - block, index % EXTENSION_PAGE_WORDS)
}

fn positive_page_of_word(index: usize) -> (usize, usize) {
    let relative = index - POSITIVE_WORDS.start;
    (relative / EXTENSION_PAGE_WORDS, relative % EXTENSION_PAGE_WORDS)
}

impl TickArrayBitmap for ExtensionTickArrayBitmap<'_> {
    fn word_range(&self) -> Range<usize> {
        NEGATIVE_WORDS.start..POSITIVE_WORDS.end
    }

    fn word(&self, index: usize) -> u64 {
        if NEGATIVE_WORDS.contains(&index) {
            let (page, word) = negative_page_of_word(index);
            self.extension.negative_tick_array_bitmap[page][word]
        } else if POSITIVE_WORDS.contains(&index) {
            let (page, word) = positive_page_of_word(index);
            self.extension.positive_tick_array_bitmap[page][word]
        } else {
            0
        }
    }
}

/// Default bitmap and optional extension seen as one.
#[derive(Debug, Clone, Copy)]
pub struct MergedTickArrayBitmap<'a> {
    default: DefaultTickArrayBitmap<'a>,
    extension: Option<ExtensionTickArrayBitmap<'a>>,
}

impl<'a> MergedTickArrayBitmap<'a> {
    #[must_use]
    pub fn new(
        words: &'a [u64; TICK_ARRAY_BITMAP_WORDS],
        extension: Option<&'a TickArrayBitmapExtension>,
    ) -> Self {
        Self {
            default: DefaultTickArrayBitmap::new(words),
            extension: extension.map(ExtensionTickArrayBitmap::new),
        }
    }
}

impl TickArrayBitmap for MergedTickArrayBitmap<'_> {
    fn word_range(&self) -> Range<usize> {
        match &self.extension {
            Some(extension) => extension.word_range(),
            None => self.default.word_range(),
        }
    }

    fn word(&self, index: usize) -> u64 {
        let extended = self.extension.as_ref().map_or(0, |e| e.word(index));
        self.default.word(index) | extended
    }
}

fn bit_of_array_index(array_index: i32) -> Option<usize> {
    usize::try_from(array_index + ARRAY_INDEX_OFFSET)
        .ok()
        .filter(|bit| *bit < POSITIVE_WORDS.end * 64)
}

fn array_index_of_bit(bit: usize) -> i32 {
    bit as i32 - ARRAY_INDEX_OFFSET
}

/// Marks the array starting at `start_index` as initialised in whichever
/// bitmap covers it. Used to assemble snapshots from decoded arrays.
///
/// # Errors
/// Fails for misaligned or out-of-bound start indices.
pub fn mark_tick_array_initialized(
    bitmap: &mut [u64; TICK_ARRAY_BITMAP_WORDS],
    extension: &mut TickArrayBitmapExtension,
    start_index: i32,
    tick_spacing: u16,
) -> Result<()> {
    check_start_index(start_index, tick_spacing)?;
    let array_index = start_index / tick_count(tick_spacing);
    let bit = bit_of_array_index(array_index).ok_or(QuoteError::InvalidTickArrayStartIndex {
        start_index,
        tick_spacing,
    })?;
    let (index, mask) = (bit / 64, 1u64 << (bit % 64));

    if DEFAULT_WORDS.contains(&index) {
        bitmap[index - DEFAULT_WORDS.start] |= mask;
    } else if NEGATIVE_WORDS.contains(&index) {
        let (page, word) = negative_page_of_word(index);
        extension.negative_tick_array_bitmap[page][word] |= mask;
    } else {
        let (page, word) = positive_page_of_word(index);
        extension.positive_tick_array_bitmap[page][word] |= mask;
    }
    Ok(())
}

/// Finds populated tick arrays for one pool snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BitmapNavigator<'a> {
    tick_spacing: u16,
    bitmap: MergedTickArrayBitmap<'a>,
}

impl<'a> BitmapNavigator<'a> {
    #[must_use]
    pub fn new(
        tick_spacing: u16,
        words: &'a [u64; TICK_ARRAY_BITMAP_WORDS],
        extension: Option<&'a TickArrayBitmapExtension>,
    ) -> Self {
        Self {
            tick_spacing,
            bitmap: MergedTickArrayBitmap::new(words, extension),
        }
    }

    fn bit_of(&self, start_index: i32) -> Result<usize> {
        check_start_index(start_index, self.tick_spacing)?;
        bit_of_array_index(start_index / tick_count(self.tick_spacing)).ok_or(
            QuoteError::InvalidTickArrayStartIndex {
                start_index,
                tick_spacing: self.tick_spacing,
            },
        )
    }

    /// Converts a found bit back into a start index, dropping anything past
    /// the pool's tick bound.
    fn start_of(&self, bit: usize) -> Option<i32> {
        let start_index = array_index_of_bit(bit).checked_mul(tick_count(self.tick_spacing))?;
        check_start_index(start_index, self.tick_spacing)
            .ok()
            .map(|()| start_index)
    }

    /// Whether the array starting at `start_index` holds an initialised tick.
    ///
    /// # Errors
    /// Fails for misaligned or out-of-bound start indices.
    pub fn is_tick_array_initialized(&self, start_index: i32) -> Result<bool> {
        Ok(self.bitmap.test_bit(self.bit_of(start_index)?))
    }

    /// Nearest initialised array strictly beyond `from_start_index` in the
    /// swap direction, or `None` if the pool has none left that way.
    ///
    /// # Errors
    /// Fails for misaligned or out-of-bound start indices.
    pub fn next_initialized_tick_array(
        &self,
        from_start_index: i32,
        direction: SwapDirection,
    ) -> Result<Option<i32>> {
        let bit = self.bit_of(from_start_index)?;
        let found = match direction {
            SwapDirection::ZeroForOne => bit
                .checked_sub(1)
                .and_then(|from| self.bitmap.next_set_bit(from, false)),
            SwapDirection::OneForZero => self.bitmap.next_set_bit(bit + 1, true),
        };
        Ok(found.and_then(|bit| self.start_of(bit)))
    }

    /// The array holding `tick_current` if it is initialised, otherwise the
    /// next initialised one in the swap direction.
    ///
    /// # Errors
    /// Fails when `tick_current` lies outside the tick bound.
    pub fn first_initialized_tick_array(
        &self,
        tick_current: i32,
        direction: SwapDirection,
    ) -> Result<Option<i32>> {
        let start_index = tick_array_start_index(tick_current, self.tick_spacing);
        if self.is_tick_array_initialized(start_index)? {
            return Ok(Some(start_index));
        }
        self.next_initialized_tick_array(start_index, direction)
    }

    /// Up to `count_per_side` initialised arrays below `start_index` and up
    /// to `count_per_side` at or above it, ascending.
    ///
    /// # Errors
    /// Fails for misaligned or out-of-bound start indices.
    pub fn initialized_tick_arrays_around(
        &self,
        start_index: i32,
        count_per_side: usize,
    ) -> Result<Vec<i32>> {
        let bit = self.bit_of(start_index)?;
        let mut starts = Vec::with_capacity(count_per_side * 2);

        let mut cursor = bit.checked_sub(1);
        for _ in 0..count_per_side {
            let Some(found) = cursor.and_then(|from| self.bitmap.next_set_bit(from, false)) else {
                break;
            };
            starts.extend(self.start_of(found));
            cursor = found.checked_sub(1);
        }

        let mut cursor = bit;
        for _ in 0..count_per_side {
            let Some(found) = self.bitmap.next_set_bit(cursor, true) else {
                break;
            };
            starts.extend(self.start_of(found));
            cursor = found + 1;
        }

        starts.sort_unstable();
        Ok(starts)
    }
}
