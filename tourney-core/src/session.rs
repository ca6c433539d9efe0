//! The ranking state machine.
//!
//! A session reduces the unranked pool to one winner through successive
//! single-elimination tiers, finalizes that winner as the next rank, and
//! starts over on what is left until the pool is empty. Decisions are
//! memoized per unordered pair, so any pair that comes up again is answered
//! without asking.
//!
//! All commands take `&mut self`: the engine is not reentrant, and the
//! exclusive borrow is the only locking it needs.
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, SessionError};
use crate::intake::prepare_items;
use crate::memo::PairMemo;
use crate::progress::{elimination_steps, full_ranking_steps};
use crate::replacement::Mode;
use crate::stats::{optimized_order, MatchQuery};
use crate::tier::Tier;
use crate::types::{Deletion, Item, NextPair, Pair, PercentMatched, ProgressCounters};
use crate::undo::UndoLog;

pub struct RankingSession {
    /// Every tier of every elimination run so far. Only truncated.
    pub(crate) tiers: Vec<Tier>,
    pub(crate) tier_index: usize,
    pub(crate) mode: Mode,
    /// Shared with in-flight percent-matched scans; written copy-on-write.
    pub(crate) memo: Arc<PairMemo>,
    pub(crate) undo_log: UndoLog,
    pub(crate) unranked: Vec<Item>,
    /// Finalized items, best first.
    pub(crate) ranked: Vec<Item>,
    pub(crate) counters: ProgressCounters,
    pub(crate) pending: Option<Pair>,
    pub(crate) rng: StdRng,
}

impl Default for RankingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RankingSession {
    /// An idle session with an OS-seeded shuffler.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// An idle session whose shuffles are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        RankingSession {
            tiers: Vec::new(),
            tier_index: 0,
            mode: Mode::Normal,
            memo: Arc::new(PairMemo::new()),
            undo_log: UndoLog::default(),
            unranked: Vec::new(),
            ranked: Vec::new(),
            counters: ProgressCounters::default(),
            pending: None,
            rng,
        }
    }

    /// Start ranking a fresh set of items.
    ///
    /// Items are trimmed, deduplicated and sorted. Ranked output, tiers, undo
    /// history and any replacement round are discarded; the memo is kept, so
    /// earlier decisions still answer for themselves.
    pub fn start_run<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.unranked = prepare_items(items);
        self.ranked.clear();
        self.tiers.clear();
        self.tier_index = 0;
        self.undo_log.clear();
        self.mode = Mode::Normal;
        self.pending = None;
        self.counters = ProgressCounters::default();

        tracing::debug!(items = self.unranked.len(), "run started");
        if self.unranked.is_empty() {
            return;
        }
        self.start_elimination();
        self.advance();
    }

    /// Record `winner` for the pending pair and move on to the next pair
    /// that needs a human.
    pub fn apply_choice(&mut self, winner: &str) -> Result<()> {
        let Some((first, second)) = self.pending.clone() else {
            return Err(SessionError::NoPendingChoice);
        };
        if winner != first && winner != second {
            return Err(SessionError::NotAPendingItem { item: winner.to_string() });
        }
        let winner = winner.to_string();

        let entry = self.snapshot((first.clone(), second.clone()), winner.clone());
        self.undo_log.push(entry);

        match &mut self.mode {
            Mode::Replacing { tier, .. } => tier.advance_cursor(),
            Mode::Normal => {
                if let Some(tier) = self.tiers.get_mut(self.tier_index) {
                    tier.record_output(winner.clone());
                    tier.advance_cursor();
                }
                self.counters.bump_current();
                self.counters.bump_overall();
            }
        }

        self.memo_mut().record(&first, &second, &winner);
        self.tiers.truncate(self.tier_index + 1);
        self.advance();
        Ok(())
    }

    pub fn choose_first(&mut self) -> Result<()> {
        let (first, _) = self.pending.clone().ok_or(SessionError::NoPendingChoice)?;
        self.apply_choice(&first)
    }

    pub fn choose_second(&mut self) -> Result<()> {
        let (_, second) = self.pending.clone().ok_or(SessionError::NoPendingChoice)?;
        self.apply_choice(&second)
    }

    /// Walk the current tier until a pair needs a human decision.
    ///
    /// Memoized pairs are applied on the spot, byes promote their item,
    /// finished tiers roll into the next round or finalize a winner, and an
    /// exhausted replacement round hands control back to the normal tier.
    pub(crate) fn advance(&mut self) {
        self.pending = None;
        loop {
            let replacing = self.mode.is_replacing();
            let tier = match &mut self.mode {
                Mode::Replacing { tier, .. } => tier,
                Mode::Normal => {
                    if self.unranked.is_empty() {
                        return;
                    }
                    match self.tiers.get_mut(self.tier_index) {
                        Some(tier) => tier,
                        None => return,
                    }
                }
            };

            match tier.next_pair() {
                NextPair::Two(first, second) => {
                    let Some(winner) = self.memo.lookup(&first, &second) else {
                        self.pending = Some((first, second));
                        return;
                    };
                    if !replacing {
                        tier.record_output(winner.clone());
                        self.counters.bump_current();
                        self.counters.bump_overall();
                    }
                    tier.advance_cursor();
                }
                NextPair::Bye(item) if !replacing => {
                    tier.record_output(item);
                    self.counters.bump_overall();
                    tier.advance_cursor();
                    if !self.complete_round() {
                        return;
                    }
                }
                NextPair::Empty if !replacing => {
                    if !self.complete_round() {
                        return;
                    }
                }
                _ => self.finish_replacement(),
            }
        }
    }

    /// Roll a finished tier forward. Returns whether there is a new tier to walk.
    fn complete_round(&mut self) -> bool {
        let Some(tier) = self.tiers.get(self.tier_index) else {
            return false;
        };
        match tier.outputs() {
            [] => false,
            [champion] => {
                let champion = champion.clone();
                self.finalize(champion)
            }
            outputs => {
                let next = Tier::new(outputs, &mut self.rng);
                tracing::debug!(round_size = next.inputs().len(), "next round");
                self.tiers.truncate(self.tier_index + 1);
                self.tiers.push(next);
                self.tier_index = self.tiers.len() - 1;
                true
            }
        }
    }

    fn finalize(&mut self, champion: Item) -> bool {
        let Some(position) = self.unranked.iter().position(|item| *item == champion) else {
            return false;
        };
        self.unranked.remove(position);
        self.ranked.push(champion);
        tracing::debug!(
            rank = self.ranked.len(),
            item = %self.ranked[self.ranked.len() - 1],
            remaining = self.unranked.len(),
            "item finalized"
        );

        if self.unranked.is_empty() {
            return false;
        }
        self.start_elimination();
        true
    }

    /// Begin a new elimination run over everything still unranked.
    pub(crate) fn start_elimination(&mut self) {
        let tier = Tier::new(&self.unranked, &mut self.rng);
        self.tiers.push(tier);
        self.tier_index = self.tiers.len() - 1;

        let pool = self.unranked.len();
        self.counters.current_total = elimination_steps(pool);
        self.counters.current_done = 0;
        if self.ranked.is_empty() {
            self.counters.overall_total = full_ranking_steps(pool);
            self.counters.overall_done = 0;
        }
    }

    /// Forget every decision involving `item`.
    pub fn delete_all_choices_for(&mut self, item: &str) -> Deletion {
        match self.memo_mut().remove_all_for(item) {
            0 => Deletion::NothingToDelete,
            removed => {
                tracing::debug!(item, removed, "choices deleted");
                Deletion::Deleted(removed)
            }
        }
    }

    /// Rename an item everywhere it occurs: memo, tiers, replacement round,
    /// pending pair, pool, ranking and undo history.
    pub fn rename_item(&mut self, old: &str, new: &str) -> Result<()> {
        let new = new.trim();
        if new.is_empty() {
            return Err(SessionError::EmptyName);
        }
        if old == new {
            return Ok(());
        }
        if !self.knows(old) {
            return Err(SessionError::UnknownItem { item: old.to_string() });
        }
        if self.knows(new) {
            return Err(SessionError::NameCollision { item: new.to_string() });
        }

        self.memo_mut().rename(old, new);
        for tier in &mut self.tiers {
            tier.rename(old, new);
        }
        self.mode.rename(old, new);

        let pending = self.pending.iter_mut().flat_map(|(a, b)| [a, b]);
        for item in pending.chain(&mut self.unranked).chain(&mut self.ranked) {
            if item == old {
                *item = new.to_string();
            }
        }
        self.unranked.sort();
        self.undo_log.rename(old, new);

        tracing::debug!(old, new, "item renamed");
        Ok(())
    }

    fn knows(&self, item: &str) -> bool {
        self.unranked.iter().chain(&self.ranked).any(|i| i == item)
            || self.memo.contains_item(item)
            || self.tiers.iter().any(|tier| tier.contains(item))
            || self.mode.target().is_some_and(|target| target == item)
    }

    /// Re-sort the finished ranking by win rate among finalized items.
    ///
    /// Only offered once every item is ranked; mid-run the ranking is still
    /// being appended to and is left alone.
    pub fn reoptimize_final_order(&mut self) -> Result<&[Item]> {
        if !self.is_finished() {
            return Err(SessionError::RankingInProgress { remaining: self.unranked.len() });
        }
        self.ranked = optimized_order(&self.ranked, &self.memo);
        Ok(&self.ranked)
    }

    /// Snapshot for computing percent matched off the interactive path.
    pub fn match_query(&self) -> MatchQuery {
        MatchQuery::new(self.unranked.clone(), Arc::clone(&self.memo))
    }

    pub fn percent_matched(&self) -> Option<PercentMatched> {
        self.match_query().run_to_completion()
    }

    /// The pair awaiting a decision, if any.
    pub fn current_pair(&self) -> Option<(&Item, &Item)> {
        self.pending.as_ref().map(|(a, b)| (a, b))
    }

    pub fn unranked(&self) -> &[Item] {
        &self.unranked
    }

    pub fn ranked(&self) -> &[Item] {
        &self.ranked
    }

    /// Unranked and ranked items together, sorted.
    pub fn all_items(&self) -> Vec<Item> {
        let mut all: Vec<Item> = self.unranked.iter().chain(&self.ranked).cloned().collect();
        all.sort();
        all
    }

    pub fn memo(&self) -> &PairMemo {
        &self.memo
    }

    /// Clones the memo first only if a scan still holds the previous snapshot.
    pub(crate) fn memo_mut(&mut self) -> &mut PairMemo {
        Arc::make_mut(&mut self.memo)
    }

    pub fn stored_choices(&self) -> usize {
        self.memo.len()
    }

    pub fn counters(&self) -> ProgressCounters {
        self.counters
    }

    /// The tier at the active index of the normal stack.
    pub fn active_tier(&self) -> Option<&Tier> {
        self.tiers.get(self.tier_index)
    }

    /// The tier pairs are currently drawn from: the replacement round when
    /// one is active, otherwise the active tier.
    pub fn current_tier(&self) -> Option<&Tier> {
        match &self.mode {
            Mode::Replacing { tier, .. } => Some(tier),
            Mode::Normal => self.active_tier(),
        }
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn active_tier_index(&self) -> usize {
        self.tier_index
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Every item is ranked and no replacement round is running.
    pub fn is_finished(&self) -> bool {
        self.unranked.is_empty() && !self.ranked.is_empty() && !self.mode.is_replacing()
    }
}
