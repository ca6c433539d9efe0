//! Session state as a plain record graph.
//!
//! Only the active tier is kept: earlier tiers are not resumable across a
//! save/load boundary, and neither is undo history.
use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::PAIR_STRIDE;
use crate::error::{Result, SessionError};
use crate::memo::PairMemo;
use crate::replacement::Mode;
use crate::session::RankingSession;
use crate::tier::Tier;
use crate::types::{Item, ProgressCounters};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct SavedSession {
    pub unranked: Vec<Item>,
    /// Best first; rank `n` is at index `n - 1`.
    pub ranked: Vec<Item>,
    pub memo: PairMemo,
    pub tier: Option<Tier>,
    pub counters: ProgressCounters,
    pub mode: Mode,
}

impl RankingSession {
    pub fn to_saved(&self) -> SavedSession {
        SavedSession {
            unranked: self.unranked.clone(),
            ranked: self.ranked.clone(),
            memo: (*self.memo).clone(),
            tier: self.active_tier().cloned(),
            counters: self.counters,
            mode: self.mode.clone(),
        }
    }

    /// Replace this session's state with `saved`.
    ///
    /// The tier stack ends up holding just the saved tier at index 0, the
    /// undo log is emptied, and the pending pair is re-derived from the
    /// current tier's cursor. A save without a tier but with items left to
    /// rank starts a fresh elimination over them. An inconsistent save is
    /// rejected and leaves the session untouched.
    pub fn load(&mut self, saved: SavedSession) -> Result<()> {
        saved.validate()?;

        let SavedSession { unranked, ranked, memo, tier, counters, mode } = saved;
        self.unranked = unranked;
        self.ranked = ranked;
        self.memo = Arc::new(memo);
        self.tiers = tier.into_iter().collect();
        self.tier_index = 0;
        self.counters = counters;
        self.mode = mode;
        self.undo_log.clear();
        self.pending = None;

        tracing::debug!(
            unranked = self.unranked.len(),
            ranked = self.ranked.len(),
            choices = self.memo.len(),
            replacing = self.mode.is_replacing(),
            "session loaded"
        );
        if self.tiers.is_empty() && !self.unranked.is_empty() {
            self.start_elimination();
        }
        self.advance();
        Ok(())
    }

    pub fn from_saved(saved: SavedSession) -> Result<Self> {
        let mut session = RankingSession::new();
        session.load(saved)?;
        Ok(session)
    }
}

impl SavedSession {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(SessionError::InvalidSession { reason });

        let unranked: HashSet<&str> = self.unranked.iter().map(String::as_str).collect();
        if let Some(item) = self.ranked.iter().find(|item| unranked.contains(item.as_str())) {
            return invalid(format!("'{item}' is both ranked and unranked"));
        }

        if let Some(tier) = &self.tier {
            let (cursor, len) = (tier.cursor(), tier.inputs().len());
            if cursor % PAIR_STRIDE != 0 || cursor > len + 1 {
                return invalid(format!("tier cursor {cursor} does not fit a tier of {len} items"));
            }
        }

        // Once the pool is empty the saved tier is the one that produced the
        // last champion, so its items are ranked by then.
        if let Some(tier) = self.tier.as_ref().filter(|_| !self.unranked.is_empty()) {
            let stray = tier.inputs().iter().chain(tier.outputs()).find(|item| !unranked.contains(item.as_str()));
            if let Some(item) = stray {
                return invalid(format!("tier names '{item}', which is not waiting to be ranked"));
            }
        }
        Ok(())
    }
}
