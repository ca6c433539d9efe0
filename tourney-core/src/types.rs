//! Value types shared across the engine.
//!
//! Items are caller-provided strings compared by value: two items with the
//! same text are the same item, and comparison is case-sensitive.
use std::fmt;

/// An opaque, user-provided identifier.
pub type Item = String;

/// Two items presented together, in display order.
pub type Pair = (Item, Item);

/// What a tier offers at its cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPair {
    /// Cursor is at or past the end of the inputs.
    Empty,
    /// Exactly one input remains: an odd-count bye.
    Bye(Item),
    /// Two inputs remain to be compared.
    Two(Item, Item),
}

impl NextPair {
    /// Number of items offered (0, 1 or 2).
    pub fn len(&self) -> usize {
        match self {
            NextPair::Empty => 0,
            NextPair::Bye(_) => 1,
            NextPair::Two(_, _) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, NextPair::Empty)
    }
}

/// Step counters for the active elimination run and for the whole session.
///
/// `*_done` never exceeds its matching `*_total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressCounters {
    pub current_done: usize,
    pub current_total: usize,
    pub overall_done: usize,
    pub overall_total: usize,
}

impl ProgressCounters {
    pub(crate) fn bump_current(&mut self) {
        self.current_done = (self.current_done + 1).min(self.current_total);
    }

    pub(crate) fn bump_overall(&mut self) {
        self.overall_done = (self.overall_done + 1).min(self.overall_total);
    }

    /// Fraction of the active elimination run completed. `None` when there is nothing to do.
    pub fn current_ratio(&self) -> Option<f64> {
        ratio(self.current_done, self.current_total)
    }

    /// Fraction of the whole ranking completed. `None` when there is nothing to do.
    pub fn overall_ratio(&self) -> Option<f64> {
        ratio(self.overall_done, self.overall_total)
    }
}

fn ratio(done: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(done as f64 / total as f64)
    }
}

/// How many unordered pairs of the unranked pool already have a memoized decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentMatched {
    pub matched: usize,
    pub total: usize,
}

impl PercentMatched {
    pub fn ratio(&self) -> f64 {
        self.matched as f64 / self.total as f64
    }

    /// Pairs that would still need a human decision.
    pub fn remaining(&self) -> usize {
        self.total - self.matched
    }
}

impl fmt::Display for PercentMatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}% of possible choices matched - {} left",
            self.ratio() * 100.0,
            self.remaining()
        )
    }
}

/// Progress of an active replacement round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementStatus {
    pub target: Item,
    pub completed: usize,
    pub total: usize,
}

impl fmt::Display for ReplacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.completed, self.total)
    }
}

/// Outcome of deleting every memoized choice for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    NothingToDelete,
    /// Number of unordered pairs removed.
    Deleted(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_clamp_to_totals() {
        let mut counters = ProgressCounters {
            current_total: 1,
            overall_total: 2,
            ..Default::default()
        };
        counters.bump_current();
        counters.bump_current();
        counters.bump_overall();
        counters.bump_overall();
        counters.bump_overall();
        assert_eq!(counters.current_done, 1);
        assert_eq!(counters.overall_done, 2);
    }

    #[test]
    fn test_ratios_none_without_work() {
        let counters = ProgressCounters::default();
        assert_eq!(counters.current_ratio(), None);
        assert_eq!(counters.overall_ratio(), None);
    }

    #[test]
    fn test_percent_matched_display() {
        let p = PercentMatched { matched: 1, total: 4 };
        assert_eq!(p.remaining(), 3);
        assert_eq!(p.to_string(), "25.00% of possible choices matched - 3 left");
    }

    #[test]
    fn test_replacement_status_display() {
        let status = ReplacementStatus { target: "X".into(), completed: 1, total: 3 };
        assert_eq!(status.to_string(), "1 / 3");
    }
}
