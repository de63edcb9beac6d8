//! Fixed-size windows of ticks.

use super::tick::Tick;
use crate::error::{QuoteError, Result};
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use serde::{Deserialize, Serialize};

/// Ticks per array.
pub const TICK_ARRAY_SIZE: usize = 60;

/// Number of tick indices spanned by one array.
#[must_use]
pub fn tick_count(tick_spacing: u16) -> i32 {
    TICK_ARRAY_SIZE as i32 * i32::from(tick_spacing)
}

/// Start index of the array containing `tick`.
#[must_use]
pub fn tick_array_start_index(tick: i32, tick_spacing: u16) -> i32 {
    let count = tick_count(tick_spacing);
    tick.div_euclid(count) * count
}

/// Checks that `start_index` is an array boundary within the tick bound.
///
/// # Errors
/// Returns [`QuoteError::InvalidTickArrayStartIndex`] otherwise.
pub fn check_start_index(start_index: i32, tick_spacing: u16) -> Result<()> {
    let invalid = || QuoteError::InvalidTickArrayStartIndex {
        start_index,
        tick_spacing,
    };
    if tick_spacing == 0 {
        return Err(invalid());
    }
    if start_index.rem_euclid(tick_count(tick_spacing)) != 0 {
        return Err(invalid());
    }
    let lowest = tick_array_start_index(MIN_TICK, tick_spacing);
    let highest = tick_array_start_index(MAX_TICK, tick_spacing);
    if !(lowest..=highest).contains(&start_index) {
        return Err(invalid());
    }
    Ok(())
}

/// Sixty consecutive (spacing-aligned) ticks starting at `start_tick_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickArray {
    /// First tick index covered.
    pub start_tick_index: i32,
    /// Exactly [`TICK_ARRAY_SIZE`] ticks in ascending order.
    ticks: Vec<Tick>,
}

impl TickArray {
    /// Builds an array from decoded ticks.
    ///
    /// # Errors
    /// Fails when the start index is misaligned or the tick count is wrong.
    pub fn new(start_tick_index: i32, tick_spacing: u16, ticks: Vec<Tick>) -> Result<Self> {
        check_start_index(start_tick_index, tick_spacing)?;
        if ticks.len() != TICK_ARRAY_SIZE {
            return Err(QuoteError::InconsistentState(format!(
                "tick array {start_tick_index} holds {} ticks",
                ticks.len()
            )));
        }
        Ok(Self {
            start_tick_index,
            ticks,
        })
    }

    /// An array with no initialised ticks.
    ///
    /// # Errors
    /// Fails when the start index is misaligned.
    pub fn empty(start_tick_index: i32, tick_spacing: u16) -> Result<Self> {
        let spacing = i32::from(tick_spacing);
        let ticks = (0..TICK_ARRAY_SIZE as i32)
            .map(|offset| Tick {
                tick: start_tick_index + offset * spacing,
                ..Tick::default()
            })
            .collect();
        Self::new(start_tick_index, tick_spacing, ticks)
    }

    /// Replaces the tick at `tick.tick`.
    ///
    /// # Errors
    /// Fails when the tick is outside this array or not spacing-aligned.
    pub fn with_tick(mut self, tick: Tick, tick_spacing: u16) -> Result<Self> {
        let offset = self.offset_of(tick.tick, tick_spacing).ok_or_else(|| {
            QuoteError::InconsistentState(format!(
                "tick {} does not belong to array {}",
                tick.tick, self.start_tick_index
            ))
        })?;
        self.ticks[offset] = tick;
        Ok(self)
    }

    /// All ticks in ascending order.
    #[must_use]
    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Number of initialised ticks.
    #[must_use]
    pub fn initialized_tick_count(&self) -> usize {
        self.ticks.iter().filter(|t| t.is_initialized()).count()
    }

    fn offset_of(&self, tick: i32, tick_spacing: u16) -> Option<usize> {
        let spacing = i32::from(tick_spacing);
        let delta = tick - self.start_tick_index;
        if delta < 0 || delta % spacing != 0 {
            return None;
        }
        let offset = (delta / spacing) as usize;
        (offset < TICK_ARRAY_SIZE).then_some(offset)
    }

    /// Nearest initialised tick from `current_tick` in the swap direction.
    ///
    /// Moving down includes the tick at the current offset, moving up starts
    /// one slot above it. Returns `None` when `current_tick` is not inside this
    /// array or no initialised tick remains in that direction.
    #[must_use]
    pub fn next_initialized_tick(
        &self,
        current_tick: i32,
        tick_spacing: u16,
        zero_for_one: bool,
    ) -> Option<&Tick> {
        if tick_array_start_index(current_tick, tick_spacing) != self.start_tick_index {
            return None;
        }
        let offset = ((current_tick - self.start_tick_index) / i32::from(tick_spacing)) as usize;
        if zero_for_one {
            self.ticks[..=offset].iter().rev().find(|t| t.is_initialized())
        } else {
            self.ticks[offset + 1..].iter().find(|t| t.is_initialized())
        }
    }

    /// Boundary-most initialised tick when entering this array: the highest
    /// for a downward swap, the lowest for an upward one.
    #[must_use]
    pub fn first_initialized_tick(&self, zero_for_one: bool) -> Option<&Tick> {
        if zero_for_one {
            self.ticks.iter().rev().find(|t| t.is_initialized())
        } else {
            self.ticks.iter().find(|t| t.is_initialized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_index() {
        assert_eq!(tick_array_start_index(0, 1), 0);
        assert_eq!(tick_array_start_index(59, 1), 0);
        assert_eq!(tick_array_start_index(60, 1), 60);
        assert_eq!(tick_array_start_index(-1, 1), -60);
        assert_eq!(tick_array_start_index(-60, 1), -60);
        assert_eq!(tick_array_start_index(-61, 10), -600);
    }

    #[test]
    fn test_check_start_index() {
        assert!(check_start_index(600, 10).is_ok());
        assert!(matches!(
            check_start_index(601, 10),
            Err(QuoteError::InvalidTickArrayStartIndex { .. })
        ));
        assert!(check_start_index(0, 0).is_err());
        assert!(check_start_index(tick_array_start_index(MIN_TICK, 1), 1).is_ok());
        assert!(check_start_index(tick_array_start_index(MAX_TICK, 1) + 60, 1).is_err());
    }

    #[test]
    fn test_next_initialized_tick() {
        let array = TickArray::empty(60, 1)
            .unwrap()
            .with_tick(Tick::new(70, 10, 10), 1)
            .unwrap()
            .with_tick(Tick::new(100, -10, 10), 1)
            .unwrap();

        assert_eq!(array.initialized_tick_count(), 2);
        assert_eq!(array.next_initialized_tick(60, 1, false).unwrap().tick, 70);
        // Upward search skips the current slot.
        assert_eq!(array.next_initialized_tick(70, 1, false).unwrap().tick, 100);
        // Downward search includes it.
        assert_eq!(array.next_initialized_tick(70, 1, true).unwrap().tick, 70);
        assert_eq!(array.next_initialized_tick(99, 1, true).unwrap().tick, 70);
        assert!(array.next_initialized_tick(69, 1, true).is_none());
        assert!(array.next_initialized_tick(100, 1, false).is_none());
        // Outside the array.
        assert!(array.next_initialized_tick(10, 1, false).is_none());
    }

    #[test]
    fn test_first_initialized_tick() {
        let array = TickArray::empty(-600, 10)
            .unwrap()
            .with_tick(Tick::new(-590, 1, 1), 10)
            .unwrap()
            .with_tick(Tick::new(-20, -1, 1), 10)
            .unwrap();
        assert_eq!(array.first_initialized_tick(true).unwrap().tick, -20);
        assert_eq!(array.first_initialized_tick(false).unwrap().tick, -590);
        assert!(TickArray::empty(0, 10).unwrap().first_initialized_tick(true).is_none());
    }

    #[test]
    fn test_with_tick_rejects_foreign_tick() {
        let array = TickArray::empty(0, 10).unwrap();
        assert!(array.clone().with_tick(Tick::new(600, 1, 1), 10).is_err());
        assert!(array.with_tick(Tick::new(15, 1, 1), 10).is_err());
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(TickArray::new(0, 1, vec![Tick::default(); 10]).is_err());
    }
}
