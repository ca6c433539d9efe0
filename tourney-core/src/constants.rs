/// Cursor stride through a tier's inputs: one decision consumes one adjacent pair.
/// Byes advance by the same stride even though they consume a single item.
pub const PAIR_STRIDE: usize = 2;

/// Smallest pool for which the percent-matched statistic is defined.
pub const MIN_POOL_FOR_MATCHING: usize = 2;
