//! One round of a single-elimination bracket.
//!
//! A tier is a data holder: `next_pair` is a pure query and the cursor only
//! moves when the session says so.
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::PAIR_STRIDE;
use crate::types::{Item, NextPair};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tier {
    inputs: Vec<Item>,
    outputs: Vec<Item>,
    /// Offset of the next undecided pair. Always a multiple of the pair
    /// stride; past the end once an odd tier has consumed its bye.
    cursor: usize,
}

impl Tier {
    /// A normal round: duplicates removed, then shuffled once.
    pub fn new(items: &[Item], rng: &mut impl Rng) -> Self {
        let mut seen = HashSet::with_capacity(items.len());
        let mut inputs: Vec<Item> = items
            .iter()
            .filter(|item| seen.insert(item.as_str()))
            .cloned()
            .collect();
        inputs.shuffle(rng);

        Tier { inputs, outputs: Vec::new(), cursor: 0 }
    }

    /// A replacement round. Inputs are taken as given: adjacent items form a
    /// pair, and one item may appear against many partners.
    pub fn replacement(inputs: Vec<Item>) -> Self {
        Tier { inputs, outputs: Vec::new(), cursor: 0 }
    }

    pub fn next_pair(&self) -> NextPair {
        match self.inputs.get(self.cursor..) {
            Some([first, second, ..]) => NextPair::Two(first.clone(), second.clone()),
            Some([only]) => NextPair::Bye(only.clone()),
            _ => NextPair::Empty,
        }
    }

    pub fn record_output(&mut self, item: Item) {
        self.outputs.push(item);
    }

    pub fn inputs(&self) -> &[Item] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Item] {
        &self.outputs
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn number_of_choices(&self) -> usize {
        self.inputs.len() / PAIR_STRIDE
    }

    /// Pairs already consumed.
    pub fn completed_choices(&self) -> usize {
        (self.cursor / PAIR_STRIDE).min(self.number_of_choices())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.inputs.len()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.inputs.iter().chain(&self.outputs).any(|i| i == item)
    }

    pub(crate) fn advance_cursor(&mut self) {
        self.cursor += PAIR_STRIDE;
    }

    pub(crate) fn restore(&mut self, cursor: usize, outputs: Vec<Item>) {
        debug_assert!(cursor % PAIR_STRIDE == 0, "cursor {cursor} is not pair-aligned");
        self.cursor = cursor;
        self.outputs = outputs;
    }

    #[cfg(test)]
    pub(crate) fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        for item in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            if item == old {
                *item = new.to_string();
            }
        }
    }
}
