//! Symmetric cache of human decisions.
//!
//! Each unordered pair is stored once under a canonical (lexicographically
//! ordered) key, so `lookup(a, b)` and `lookup(b, a)` always agree.
use std::collections::HashMap;

use crate::types::Item;

/// Memo of previously chosen winners, keyed by unordered item pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "Vec<MemoEntry>", try_from = "Vec<MemoEntry>")
)]
pub struct PairMemo {
    decisions: HashMap<(Item, Item), Item>,
}

/// One memoized decision in flat record form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoEntry {
    pub first: Item,
    pub second: Item,
    pub winner: Item,
}

fn key(a: &str, b: &str) -> (Item, Item) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl PairMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously chosen winner for `a` vs `b`, in either order.
    pub fn lookup(&self, a: &str, b: &str) -> Option<&Item> {
        self.decisions.get(&key(a, b))
    }

    /// Store `winner` for the pair, replacing any earlier decision.
    pub fn record(&mut self, a: &str, b: &str, winner: &str) {
        assert!(a != b, "Cannot record a choice of '{a}' against itself");
        assert!(
            winner == a || winner == b,
            "Winner '{winner}' is not part of the pair ('{a}', '{b}')"
        );
        self.decisions.insert(key(a, b), winner.to_string());
    }

    /// Forget the decision for the pair. Returns the winner that was stored.
    pub fn remove(&mut self, a: &str, b: &str) -> Option<Item> {
        self.decisions.remove(&key(a, b))
    }

    /// Every partner `item` has a recorded decision against, sorted.
    pub fn matching_pairs(&self, item: &str) -> Vec<Item> {
        let mut partners: Vec<Item> = self
            .decisions
            .keys()
            .filter_map(|(a, b)| partner_of(item, a, b))
            .cloned()
            .collect();
        partners.sort();
        partners
    }

    /// `(partner, winner)` for every decision involving `item`, sorted by partner.
    pub fn decisions_for(&self, item: &str) -> Vec<(Item, Item)> {
        let mut decisions: Vec<(Item, Item)> = self
            .decisions
            .iter()
            .filter_map(|((a, b), winner)| {
                partner_of(item, a, b).map(|partner| (partner.clone(), winner.clone()))
            })
            .collect();
        decisions.sort();
        decisions
    }

    /// Delete every decision involving `item`. Returns the number of pairs removed.
    pub fn remove_all_for(&mut self, item: &str) -> usize {
        let before = self.decisions.len();
        self.decisions.retain(|(a, b), _| a != item && b != item);
        before - self.decisions.len()
    }

    pub fn contains_item(&self, item: &str) -> bool {
        self.decisions.keys().any(|(a, b)| a == item || b == item)
    }

    /// Rewrite every key and winner equal to `old` as `new`.
    ///
    /// `new` must not already appear in the memo.
    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        let affected: Vec<((Item, Item), Item)> = self
            .decisions
            .iter()
            .filter(|((a, b), _)| a == old || b == old)
            .map(|(k, w)| (k.clone(), w.clone()))
            .collect();

        for ((a, b), winner) in affected {
            self.decisions.remove(&(a.clone(), b.clone()));
            let rename = |s: Item| if s == old { new.to_string() } else { s };
            let (a, b, winner) = (rename(a), rename(b), rename(winner));
            self.decisions.insert(key(&a, &b), winner);
        }
    }

    /// Number of memoized unordered pairs.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// All decisions as flat records, sorted by pair.
    pub fn entries(&self) -> Vec<MemoEntry> {
        let mut entries: Vec<MemoEntry> = self
            .decisions
            .iter()
            .map(|((a, b), winner)| MemoEntry {
                first: a.clone(),
                second: b.clone(),
                winner: winner.clone(),
            })
            .collect();
        entries.sort_by(|x, y| (&x.first, &x.second).cmp(&(&y.first, &y.second)));
        entries
    }
}

fn partner_of<'a>(item: &str, a: &'a Item, b: &'a Item) -> Option<&'a Item> {
    if a == item {
        Some(b)
    } else if b == item {
        Some(a)
    } else {
        None
    }
}

impl From<PairMemo> for Vec<MemoEntry> {
    fn from(memo: PairMemo) -> Self {
        memo.entries()
    }
}

impl TryFrom<Vec<MemoEntry>> for PairMemo {
    type Error = String;

    fn try_from(entries: Vec<MemoEntry>) -> Result<Self, Self::Error> {
        let mut memo = PairMemo::new();
        for e in entries {
            if e.first == e.second {
                return Err(format!("choice of '{}' against itself", e.first));
            }
            if e.winner != e.first && e.winner != e.second {
                return Err(format!(
                    "winner '{}' is not part of the pair ('{}', '{}')",
                    e.winner, e.first, e.second
                ));
            }
            memo.record(&e.first, &e.second, &e.winner);
        }
        Ok(memo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lookup_is_order_independent() {
        let mut memo = PairMemo::new();
        memo.record("Pizza", "Sushi", "Sushi");
        assert_eq!(memo.lookup("Pizza", "Sushi").map(String::as_str), Some("Sushi"));
        assert_eq!(memo.lookup("Sushi", "Pizza").map(String::as_str), Some("Sushi"));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_record_overwrites_previous_decision() {
        let mut memo = PairMemo::new();
        memo.record("a", "b", "a");
        memo.record("b", "a", "b");
        assert_eq!(memo.lookup("a", "b").map(String::as_str), Some("b"));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_remove_deletes_both_directions() {
        let mut memo = PairMemo::new();
        memo.record("a", "b", "a");
        assert_eq!(memo.remove("b", "a"), Some("a".to_string()));
        assert!(memo.lookup("a", "b").is_none());
        assert!(memo.is_empty());
    }

    #[test]
    fn test_matching_pairs_and_remove_all() {
        let mut memo = PairMemo::new();
        memo.record("x", "a", "x");
        memo.record("b", "x", "b");
        memo.record("a", "b", "a");
        assert_eq!(memo.matching_pairs("x"), vec!["a", "b"]);
        assert_eq!(memo.decisions_for("x"), vec![
            ("a".to_string(), "x".to_string()),
            ("b".to_string(), "b".to_string()),
        ]);
        assert_eq!(memo.remove_all_for("x"), 2);
        assert!(memo.matching_pairs("x").is_empty());
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_rename_rewrites_keys_and_winners() {
        let mut memo = PairMemo::new();
        memo.record("old", "a", "old");
        memo.record("b", "old", "b");
        memo.rename("old", "zzz");
        assert!(!memo.contains_item("old"));
        assert_eq!(memo.lookup("a", "zzz").map(String::as_str), Some("zzz"));
        assert_eq!(memo.lookup("zzz", "b").map(String::as_str), Some("b"));
    }

    #[test]
    #[should_panic(expected = "not part of the pair")]
    fn test_record_rejects_foreign_winner() {
        let mut memo = PairMemo::new();
        memo.record("a", "b", "c");
    }

    #[test]
    fn test_try_from_rejects_foreign_winner() {
        let entries = vec![MemoEntry { first: "a".into(), second: "b".into(), winner: "c".into() }];
        assert!(PairMemo::try_from(entries).is_err());
    }

    proptest! {
        #[test]
        fn prop_record_is_symmetric(a in "[a-e]{1,3}", b in "[a-e]{1,3}", pick_first in any::<bool>()) {
            prop_assume!(a != b);
            let winner = if pick_first { a.clone() } else { b.clone() };
            let mut memo = PairMemo::new();
            memo.record(&a, &b, &winner);
            prop_assert_eq!(memo.lookup(&a, &b), Some(&winner));
            prop_assert_eq!(memo.lookup(&b, &a), Some(&winner));
            prop_assert_eq!(memo.matching_pairs(&a), vec![b.clone()]);
            prop_assert_eq!(memo.matching_pairs(&b), vec![a.clone()]);
        }
    }
}
