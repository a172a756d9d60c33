// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Circular sequence with a movable root.
//!
//! A `Ring` holds a fixed list of elements (semitones, scale intervals, ad-hoc
//! note pools) and a root index that can be moved freely. Every lookup is an
//! offset from the root; the element wraps around the list and the number of
//! wraps is reported as an octave.

use std::fmt;

use crate::error::{Error, Result};

/// Octave number relative to a ring's root
pub type Octave = i32;

/// Fixed circular sequence with a movable root index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring<T> {
    elems: Vec<T>,
    /// Unreduced root; lookups reduce it modulo the length
    root: i64,
    /// Wraps taken by `advance` since the root was last set
    laps: Octave,
}

impl<T: Clone> Ring<T> {
    /// Create a ring over the given elements, rooted at index 0
    pub fn new(elems: impl IntoIterator<Item = T>) -> Self {
        Self {
            elems: elems.into_iter().collect(),
            root: 0,
            laps: 0,
        }
    }

    /// Number of elements in the ring
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Check if the ring has no elements
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Current root index, `None` for an empty ring
    pub fn root_idx(&self) -> Option<i64> {
        if self.is_empty() {
            None
        } else {
            Some(self.root)
        }
    }

    /// Move the root to any index. Values outside the ring are allowed and
    /// show up as octave offsets on lookup.
    pub fn set_root_idx(&mut self, idx: i64) {
        self.root = idx;
        self.laps = 0;
    }

    /// Element under the root
    pub fn root(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        Some(&self.elems[self.start()])
    }

    /// Element at `offset` from the root, paired with how many full laps the
    /// offset crosses.
    ///
    /// Fails with `OutOfBounds` when the ring is empty or when the position
    /// or its octave does not fit the integer types.
    pub fn at(&self, offset: i64) -> Result<(T, Octave)> {
        if self.is_empty() {
            return Err(Error::OutOfBounds);
        }
        let (idx, octave) = self.reduce(offset).ok_or(Error::OutOfBounds)?;
        Ok((self.elems[idx].clone(), octave))
    }

    /// Look up several offsets at once, preserving their order
    pub fn at_many(&self, offsets: &[i64]) -> Result<Vec<(T, Octave)>> {
        offsets.iter().map(|&offset| self.at(offset)).collect()
    }

    /// Step the root forward by one element.
    ///
    /// Returns the new root element and the number of wraps accumulated since
    /// the root index was last set.
    pub fn advance(&mut self) -> Result<(T, Octave)> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        let len = self.elems.len() as i64;
        let mut next = self.root.rem_euclid(len) + 1;
        if next == len {
            next = 0;
            self.laps = self.laps.saturating_add(1);
        }
        self.root = next;
        Ok((self.elems[next as usize].clone(), self.laps))
    }

    /// Elements starting at the root, wrapping once around
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = if self.is_empty() { 0 } else { self.start() };
        self.elems[start..].iter().chain(self.elems[..start].iter())
    }

    /// Index of the root element; the ring must not be empty
    fn start(&self) -> usize {
        self.root.rem_euclid(self.elems.len() as i64) as usize
    }

    fn reduce(&self, offset: i64) -> Option<(usize, Octave)> {
        let len = self.elems.len() as i64;
        let pos = self.root.checked_add(offset)?;
        let octave = Octave::try_from(pos.div_euclid(len)).ok()?;
        Some((pos.rem_euclid(len) as usize, octave))
    }
}

impl<T: Clone> FromIterator<T> for Ring<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Ring::new(iter)
    }
}

impl<T: Clone> From<Vec<T>> for Ring<T> {
    fn from(elems: Vec<T>) -> Self {
        Ring::new(elems)
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for Ring<T> {
    fn from(elems: [T; N]) -> Self {
        Ring::new(elems)
    }
}

impl<T: Clone + fmt::Debug> fmt::Display for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
