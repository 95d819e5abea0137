use serde::{Deserialize, Serialize};
use util_lens_common::{Result, UtilLensError};

/// Borrowed view over the three parallel location arrays.
///
/// A validated series is never empty and its `index` is strictly increasing.
#[derive(Debug, Clone, Copy)]
pub struct LocationSeries<'a> {
    index: &'a [i64],
    counter: &'a [i64],
    util: &'a [f64],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationEntry {
    pub index: i64,
    pub counter: i64,
    pub util: f64,
}

impl<'a> LocationSeries<'a> {
    pub fn new(index: &'a [i64], counter: &'a [i64], util: &'a [f64]) -> Result<Self> {
        if index.is_empty() {
            return Err(UtilLensError::invalid("location series is empty"));
        }
        if counter.len() != index.len() || util.len() != index.len() {
            return Err(UtilLensError::invalid(format!(
                "location arrays differ in length: index {}, counter {}, util {}",
                index.len(),
                counter.len(),
                util.len()
            )));
        }
        if let Some(i) = index.windows(2).position(|w| w[1] <= w[0]) {
            return Err(UtilLensError::invalid(format!(
                "location index not strictly increasing at {}: {} then {}",
                i + 1,
                index[i],
                index[i + 1]
            )));
        }
        Ok(Self { index, counter, util })
    }

    /// Skips the sortedness scan. Callers guarantee a strictly increasing
    /// `index`; emptiness and length mismatches are rejected at build time.
    pub fn new_unchecked(index: &'a [i64], counter: &'a [i64], util: &'a [f64]) -> Self {
        Self { index, counter, util }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &'a [i64] {
        self.index
    }

    pub fn counter(&self) -> &'a [i64] {
        self.counter
    }

    pub fn util(&self) -> &'a [f64] {
        self.util
    }

    pub fn first_index(&self) -> Option<i64> {
        self.index.first().copied()
    }

    pub fn last_index(&self) -> Option<i64> {
        self.index.last().copied()
    }

    pub fn entry(&self, i: usize) -> Option<LocationEntry> {
        Some(LocationEntry {
            index: *self.index.get(i)?,
            counter: *self.counter.get(i)?,
            util: *self.util.get(i)?,
        })
    }
}

/// Owning form of a location series, as read from a trace file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedLocationSeries {
    pub index: Vec<i64>,
    pub counter: Vec<i64>,
    pub util: Vec<f64>,
}

impl OwnedLocationSeries {
    pub fn as_series(&self) -> Result<LocationSeries<'_>> {
        LocationSeries::new(&self.index, &self.counter, &self.util)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
