//! Reporting side-queries: percent matched and post-hoc reordering.
//!
//! Neither query feeds back into the live ranking.
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::constants::MIN_POOL_FOR_MATCHING;
use crate::memo::PairMemo;
use crate::types::{Item, PercentMatched};

/// A newer percent-matched request was issued while this one was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("percent-matched request superseded")]
pub struct Superseded;

/// Issues tickets for percent-matched requests. Only the newest ticket is current.
#[derive(Debug, Clone, Default)]
pub struct MatchTracker {
    generation: Arc<AtomicU64>,
}

impl MatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, obsoleting every earlier ticket.
    pub fn issue(&self) -> MatchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        MatchTicket { generation, latest: Arc::clone(&self.generation) }
    }

    /// Generation of the newest ticket issued (0 before the first).
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct MatchTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl MatchTicket {
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Snapshot of the unranked pool plus a shared handle on the memo, so the O(n²) scan can run
/// off the interactive path.
#[derive(Debug, Clone)]
pub struct MatchQuery {
    pool: Vec<Item>,
    pub(crate) memo: Arc<PairMemo>,
}

impl MatchQuery {
    pub fn new(pool: Vec<Item>, memo: impl Into<Arc<PairMemo>>) -> Self {
        MatchQuery { pool, memo: memo.into() }
    }

    /// Scan all unordered pairs, giving up as soon as `ticket` goes stale.
    /// `Ok(None)` when the pool has fewer than two items.
    pub fn run(&self, ticket: &MatchTicket) -> Result<Option<PercentMatched>, Superseded> {
        self.scan(|| ticket.is_current())
    }

    pub fn run_to_completion(&self) -> Option<PercentMatched> {
        self.scan(|| true).unwrap_or(None)
    }

    fn scan(&self, still_wanted: impl Fn() -> bool) -> Result<Option<PercentMatched>, Superseded> {
        if self.pool.len() < MIN_POOL_FOR_MATCHING {
            return Ok(None);
        }

        let mut total = 0;
        let mut matched = 0;
        for (i, first) in self.pool.iter().enumerate() {
            if !still_wanted() {
                return Err(Superseded);
            }
            for second in &self.pool[i + 1..] {
                if first == second {
                    continue;
                }
                total += 1;
                if self.memo.lookup(first, second).is_some() {
                    matched += 1;
                }
            }
        }

        if total == 0 {
            return Ok(None);
        }
        Ok(Some(PercentMatched { matched, total }))
    }
}

/// Re-sort finalized items by win rate against the other finalized items,
/// descending, ties broken by prior rank. Items without any such
/// decision have a win rate of 0.
pub fn optimized_order(ranked: &[Item], memo: &PairMemo) -> Vec<Item> {
    let finalized: HashSet<&str> = ranked.iter().map(String::as_str).collect();

    let mut scored: Vec<(usize, f64, &Item)> = ranked
        .iter()
        .enumerate()
        .map(|(rank, item)| {
            let (wins, games) = memo
                .decisions_for(item)
                .iter()
                .filter(|(partner, _)| finalized.contains(partner.as_str()))
                .fold((0usize, 0usize), |(wins, games), (_, winner)| {
                    (wins + usize::from(winner == item), games + 1)
                });
            let win_rate = if games == 0 { 0.0 } else { wins as f64 / games as f64 };
            (rank, win_rate, item)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(_, _, item)| item.clone()).collect()
}
