//! Re-asking every remembered decision involving one item.
//!
//! While a replacement round is active it stands in for the normal tier:
//! choices go into the memo but never into tier outputs or progress counters.
//! The normal tier's cursor is left alone, so when the round ends the
//! interrupted comparison is offered again.
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, SessionError};
use crate::session::RankingSession;
use crate::tier::Tier;
use crate::types::{Item, ReplacementStatus};

/// Which tier the session is currently drawing pairs from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Pairs come from the tier stack at the active index.
    #[default]
    Normal,
    /// Pairs come from a side tier that re-asks `target`'s decisions.
    Replacing { target: Item, tier: Tier },
}

impl Mode {
    pub fn is_replacing(&self) -> bool {
        matches!(self, Mode::Replacing { .. })
    }

    pub fn target(&self) -> Option<&Item> {
        match self {
            Mode::Normal => None,
            Mode::Replacing { target, .. } => Some(target),
        }
    }

    pub fn status(&self) -> Option<ReplacementStatus> {
        match self {
            Mode::Normal => None,
            Mode::Replacing { target, tier } => Some(ReplacementStatus {
                target: target.clone(),
                completed: tier.completed_choices(),
                total: tier.number_of_choices(),
            }),
        }
    }

    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        if let Mode::Replacing { target, tier } = self {
            if target == old {
                *target = new.to_string();
            }
            tier.rename(old, new);
        }
    }
}

/// Lay out one pair per partner, partners in random order and `target`'s
/// side of each pair chosen by coin flip.
pub fn build_replacement_tier(target: &str, mut partners: Vec<Item>, rng: &mut impl Rng) -> Tier {
    partners.shuffle(rng);

    let mut inputs = Vec::with_capacity(partners.len() * 2);
    for partner in partners {
        if rng.random::<f64>() < 0.5 {
            inputs.push(partner);
            inputs.push(target.to_string());
        } else {
            inputs.push(target.to_string());
            inputs.push(partner);
        }
    }
    Tier::replacement(inputs)
}

impl RankingSession {
    /// Begin re-asking every memoized decision involving `target`.
    ///
    /// The old decisions are deleted up front so they cannot answer for
    /// themselves. Returns the number of pairs that will be asked.
    pub fn start_replacement(&mut self, target: &str) -> Result<usize> {
        if let Some(current) = self.mode.target() {
            return Err(SessionError::ReplacementInProgress { item: current.clone() });
        }

        let partners = self.memo.matching_pairs(target);
        if partners.is_empty() {
            return Err(SessionError::NothingToReplace { item: target.to_string() });
        }

        let tier = build_replacement_tier(target, partners, &mut self.rng);
        let pairs = tier.number_of_choices();
        self.memo_mut().remove_all_for(target);

        tracing::debug!(target_item = target, pairs, "replacement started");
        self.mode = Mode::Replacing { target: target.to_string(), tier };
        self.advance();
        Ok(pairs)
    }

    pub fn is_replacing(&self) -> bool {
        self.mode.is_replacing()
    }

    /// Target and "m / n" progress of the active replacement round.
    pub fn replacement_status(&self) -> Option<ReplacementStatus> {
        self.mode.status()
    }

    pub(crate) fn finish_replacement(&mut self) {
        if let Mode::Replacing { target, .. } = std::mem::take(&mut self.mode) {
            tracing::debug!(target_item = %target, "replacement finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn items(names: &[&str]) -> Vec<Item> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_replacement_tier_pairs_target_with_each_partner() {
        let mut rng = StdRng::seed_from_u64(11);
        let tier = build_replacement_tier("x", items(&["a", "b", "c"]), &mut rng);
        assert_eq!(tier.number_of_choices(), 3);

        let mut partners = Vec::new();
        for pair in tier.inputs().chunks(2) {
            assert_eq!(pair.iter().filter(|i| *i == "x").count(), 1);
            partners.extend(pair.iter().filter(|i| *i != "x").cloned());
        }
        partners.sort();
        assert_eq!(partners, items(&["a", "b", "c"]));
    }

    #[test]
    fn test_replacement_without_memo_is_rejected() {
        let mut session = RankingSession::with_seed(1);
        session.start_run(["a", "b"]);
        assert_eq!(
            session.start_replacement("a"),
            Err(SessionError::NothingToReplace { item: "a".into() })
        );
        assert!(!session.is_replacing());
    }

    #[test]
    fn test_replacement_round_trip() {
        let mut session = RankingSession::with_seed(5);
        for partner in ["a", "b", "c"] {
            session.memo_mut().record("x", partner, "x");
        }
        let partners = session.memo().matching_pairs("x");
        assert_eq!(partners, items(&["a", "b", "c"]));

        session.start_run(["p", "q"]);
        let cursor_before = session.active_tier().unwrap().cursor();
        let pending_before = session.current_pair().map(|(a, b)| (a.clone(), b.clone()));

        assert_eq!(session.start_replacement("x"), Ok(3));
        assert!(session.is_replacing());
        assert_eq!(session.replacement_status().unwrap().to_string(), "0 / 3");

        let mut asked = 0;
        while session.is_replacing() {
            let (first, second) = session.current_pair().map(|(a, b)| (a.clone(), b.clone())).unwrap();
            assert!(first == "x" || second == "x");
            // Flip every decision so x now loses.
            let winner = if first == "x" { second } else { first };
            session.apply_choice(&winner).unwrap();
            asked += 1;
        }
        assert_eq!(asked, 3);

        assert_eq!(session.memo().matching_pairs("x"), partners);
        for (_, winner) in session.memo().decisions_for("x") {
            assert_ne!(winner, "x");
        }
        assert_eq!(session.active_tier().unwrap().cursor(), cursor_before);
        assert_eq!(session.current_pair().map(|(a, b)| (a.clone(), b.clone())), pending_before);
    }

    #[test]
    fn test_replacement_does_not_touch_outputs_or_progress() {
        let mut session = RankingSession::with_seed(9);
        session.start_run(["a", "b", "c", "d"]);
        let (first, _) = session.current_pair().map(|(a, b)| (a.clone(), b.clone())).unwrap();
        session.apply_choice(&first).unwrap();

        let counters = session.counters();
        let outputs = session.active_tier().unwrap().outputs().to_vec();

        session.start_replacement(&first).unwrap();
        let (r1, _) = session.current_pair().map(|(a, b)| (a.clone(), b.clone())).unwrap();
        session.apply_choice(&r1).unwrap();

        assert!(!session.is_replacing());
        assert_eq!(session.counters(), counters);
        assert_eq!(session.active_tier().unwrap().outputs(), outputs.as_slice());
    }

    #[test]
    fn test_second_replacement_while_active_is_rejected() {
        let mut session = RankingSession::with_seed(2);
        session.start_run(["a", "b", "c", "d"]);
        let (first, second) = session.current_pair().map(|(a, b)| (a.clone(), b.clone())).unwrap();
        session.apply_choice(&first).unwrap();
        session.start_replacement(&first).unwrap();
        assert_eq!(
            session.start_replacement(&second),
            Err(SessionError::ReplacementInProgress { item: first.clone() })
        );
    }
}
