//! Single-step reversal of recorded choices.
//!
//! Every applied choice pushes a deep copy of the state it is about to
//! change. Snapshots own their collections, so later mutation of the live
//! session never reaches back into the log.
use crate::constants::PAIR_STRIDE;
use crate::error::{Result, SessionError};
use crate::replacement::Mode;
use crate::session::RankingSession;
use crate::tier::Tier;
use crate::types::{Item, Pair, ProgressCounters};

/// State captured immediately before a choice was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub(crate) tier_index: usize,
    /// Cursor of the normal tier at `tier_index`; `None` when no tier existed.
    pub(crate) cursor: Option<usize>,
    pub(crate) outputs: Vec<Item>,
    pub(crate) pair: Pair,
    pub(crate) winner: Item,
    pub(crate) counters: ProgressCounters,
    pub(crate) unranked: Vec<Item>,
    pub(crate) ranked: Vec<Item>,
    pub(crate) mode: Mode,
}

impl UndoEntry {
    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub fn winner(&self) -> &Item {
        &self.winner
    }

    /// The snapshot can only be restored onto the tier it was taken from.
    /// A normal-mode snapshot also needs its pair to still sit at the cursor.
    fn fits(&self, tiers: &[Tier]) -> bool {
        match self.cursor {
            None => tiers.is_empty(),
            Some(cursor) => {
                let needed = if self.mode.is_replacing() { cursor } else { cursor + PAIR_STRIDE };
                tiers
                    .get(self.tier_index)
                    .is_some_and(|tier| tier.inputs().len() >= needed)
            }
        }
    }

    fn rename(&mut self, old: &str, new: &str) {
        let swap = |item: &mut Item| {
            if item == old {
                *item = new.to_string();
            }
        };
        self.outputs.iter_mut().for_each(swap);
        self.unranked.iter_mut().for_each(swap);
        self.ranked.iter_mut().for_each(swap);
        swap(&mut self.pair.0);
        swap(&mut self.pair.1);
        swap(&mut self.winner);
        self.unranked.sort();
        self.mode.rename(old, new);
    }
}

#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        for entry in &mut self.entries {
            entry.rename(old, new);
        }
    }
}

impl RankingSession {
    pub(crate) fn snapshot(&self, pair: Pair, winner: Item) -> UndoEntry {
        let tier = self.tiers.get(self.tier_index);
        UndoEntry {
            tier_index: self.tier_index,
            cursor: tier.map(Tier::cursor),
            outputs: tier.map(|t| t.outputs().to_vec()).unwrap_or_default(),
            pair,
            winner,
            counters: self.counters,
            unranked: self.unranked.clone(),
            ranked: self.ranked.clone(),
            mode: self.mode.clone(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_log.is_empty()
    }

    /// Revert the most recent choice and offer its pair again.
    ///
    /// `Ok(None)` when there is nothing to undo. If the snapshot no longer
    /// matches the tier structure the whole log is discarded and
    /// `UndoDesync` is returned; the session itself is left as it was.
    pub fn undo(&mut self) -> Result<Option<Pair>> {
        let Some(entry) = self.undo_log.pop() else {
            return Ok(None);
        };

        if !entry.fits(&self.tiers) {
            tracing::warn!(
                tier_index = entry.tier_index,
                cursor = ?entry.cursor,
                tiers = self.tiers.len(),
                "undo state no longer matches tier structure"
            );
            self.undo_log.clear();
            return Err(SessionError::UndoDesync {
                tier_index: entry.tier_index,
                cursor: entry.cursor.unwrap_or(0),
            });
        }

        let UndoEntry { tier_index, cursor, outputs, pair, counters, unranked, ranked, mode, .. } = entry;

        self.tier_index = tier_index;
        if let (Some(cursor), Some(tier)) = (cursor, self.tiers.get_mut(tier_index)) {
            tier.restore(cursor, outputs);
        }
        self.tiers.truncate(tier_index + 1);

        self.counters = counters;
        self.unranked = unranked;
        self.ranked = ranked;
        self.mode = mode;

        self.memo_mut().remove(&pair.0, &pair.1);
        self.pending = Some(pair.clone());

        tracing::debug!(first = %pair.0, second = %pair.1, "choice undone");
        Ok(Some(pair))
    }
}
