//! Read-only lookup of decoded tick arrays by start index.

use clmm_quote_domain::entities::tick_array::TickArray;
use clmm_quote_domain::error::{QuoteError, Result};
use std::collections::HashMap;

/// Source of tick arrays for one snapshot.
pub trait TickArrayStore {
    /// The array starting at `start_index`, if it was fetched.
    fn get(&self, start_index: i32) -> Option<&TickArray>;

    /// Like [`TickArrayStore::get`], but a missing array is an error.
    ///
    /// # Errors
    /// Returns [`QuoteError::InconsistentState`] when the array is absent.
    fn require(&self, start_index: i32) -> Result<&TickArray> {
        self.get(start_index).ok_or_else(|| {
            QuoteError::InconsistentState(format!(
                "tick array {start_index} is marked initialised but was not loaded"
            ))
        })
    }
}

/// `HashMap`-backed store filled by the account loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTickArrayStore {
    arrays: HashMap<i32, TickArray>,
}

impl InMemoryTickArrayStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an array.
    pub fn insert(&mut self, array: TickArray) {
        self.arrays.insert(array.start_tick_index, array);
    }

    /// Builder form of [`InMemoryTickArrayStore::insert`].
    #[must_use]
    pub fn with_array(mut self, array: TickArray) -> Self {
        self.insert(array);
        self
    }

    /// Loaded start indices, ascending.
    #[must_use]
    pub fn start_indices(&self) -> Vec<i32> {
        let mut starts: Vec<i32> = self.arrays.keys().copied().collect();
        starts.sort_unstable();
        starts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

impl FromIterator<TickArray> for InMemoryTickArrayStore {
    fn from_iter<I: IntoIterator<Item = TickArray>>(iter: I) -> Self {
        let mut store = Self::new();
        for array in iter {
            store.insert(array);
        }
        store
    }
}

impl TickArrayStore for InMemoryTickArrayStore {
    fn get(&self, start_index: i32) -> Option<&TickArray> {
        self.arrays.get(&start_index)
    }
}
