//! Closed-form step counts for repeated single elimination.

/// Comparisons (including byes) needed to reduce a pool of `pool_size` items
/// to one winner: `ceil(k/2) + ceil(k/4) + ...` until one item remains.
pub fn elimination_steps(pool_size: usize) -> usize {
    let mut total = 0;
    let mut remaining = pool_size;
    while remaining > 1 {
        remaining = remaining.div_ceil(2);
        total += remaining;
    }
    total
}

/// Steps needed to fully rank `pool_size` items by running one elimination
/// per rank: the sum of `elimination_steps(k)` for `k = pool_size..=1`.
pub fn full_ranking_steps(pool_size: usize) -> usize {
    (1..=pool_size).map(elimination_steps).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_elimination_steps_small_pools() {
        assert_eq!(elimination_steps(0), 0);
        assert_eq!(elimination_steps(1), 0);
        assert_eq!(elimination_steps(2), 1);
        assert_eq!(elimination_steps(3), 3);
        assert_eq!(elimination_steps(5), 6);
        assert_eq!(elimination_steps(8), 7);
    }

    #[test]
    fn test_full_ranking_steps() {
        assert_eq!(full_ranking_steps(1), 0);
        assert_eq!(full_ranking_steps(3), 3 + 1);
        assert_eq!(full_ranking_steps(5), 6 + 3 + 3 + 1);
    }

    proptest! {
        #[test]
        fn prop_elimination_steps_match_halving_sum(k in 0usize..5000) {
            let mut expected = 0;
            let mut denominator = 2;
            while k > 1 {
                let term = k.div_ceil(denominator);
                expected += term;
                if term <= 1 {
                    break;
                }
                denominator *= 2;
            }
            prop_assert_eq!(elimination_steps(k), expected);
        }
    }
}
