//! Background percent-matched reporting.
//!
//! Every state change requests a fresh scan. Scans run on the blocking pool;
//! older scans notice they were superseded and stop early, and a finished
//! scan only publishes if no newer request exists.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tourney_core::{MatchQuery, MatchTracker, PercentMatched, Superseded};

/// Generation of the request a result answers, and the result itself.
type Published = Option<(u64, Option<PercentMatched>)>;

pub struct MatchReporter {
    tracker: MatchTracker,
    publish: Arc<watch::Sender<Published>>,
    latest: watch::Receiver<Published>,
}

impl Default for MatchReporter {
    fn default() -> Self {
        let (publish, latest) = watch::channel(None);
        MatchReporter { tracker: MatchTracker::new(), publish: Arc::new(publish), latest }
    }
}

impl MatchReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start computing stats for `query`, superseding any scan in flight.
    pub fn request(&self, query: MatchQuery) {
        let ticket = self.tracker.issue();
        let publish = Arc::clone(&self.publish);

        tokio::task::spawn_blocking(move || match query.run(&ticket) {
            // The ticket is checked under the channel's lock, so a newer
            // result can never be overwritten by an older one.
            Ok(result) => {
                publish.send_if_modified(|slot| {
                    if !ticket.is_current() {
                        return false;
                    }
                    *slot = Some((ticket.generation(), result));
                    true
                });
            }
            Err(Superseded) => {
                tracing::debug!(generation = ticket.generation(), "percent-matched scan superseded");
            }
        });
    }

    /// Result for the newest request, or `None` while it is still running.
    pub fn current(&self) -> Option<Option<PercentMatched>> {
        answers(&self.latest.borrow(), self.tracker.latest_generation())
    }

    /// Wait up to `budget` for the newest request to finish.
    pub async fn settle(&self, budget: Duration) -> Option<Option<PercentMatched>> {
        let wanted = self.tracker.latest_generation();
        let mut latest = self.latest.clone();
        let ready = latest.wait_for(|published| answers(published, wanted).is_some());

        let settled = match tokio::time::timeout(budget, ready).await {
            Ok(Ok(published)) => answers(&published, wanted),
            _ => None,
        };
        settled
    }
}

fn answers(published: &Published, wanted: u64) -> Option<Option<PercentMatched>> {
    match *published {
        Some((generation, result)) if generation == wanted => Some(result),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_core::PairMemo;

    fn query(pool: &[&str], decided: &[(&str, &str)]) -> MatchQuery {
        let mut memo = PairMemo::new();
        for (a, b) in decided {
            memo.record(a, b, a);
        }
        MatchQuery::new(pool.iter().map(|s| s.to_string()).collect(), memo)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reports_newest_request() {
        let reporter = MatchReporter::new();
        assert_eq!(reporter.current(), None);

        reporter.request(query(&["a", "b", "c"], &[]));
        reporter.request(query(&["a", "b", "c"], &[("a", "b")]));

        let result = reporter.settle(Duration::from_secs(5)).await;
        assert_eq!(result, Some(Some(PercentMatched { matched: 1, total: 3 })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_settle_times_out_before_first_request() {
        let reporter = MatchReporter::new();
        // Nothing was requested, so nothing answers generation 0.
        assert_eq!(reporter.settle(Duration::from_millis(10)).await, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_small_pool_reports_nothing_to_match() {
        let reporter = MatchReporter::new();
        reporter.request(query(&["a"], &[]));
        assert_eq!(reporter.settle(Duration::from_secs(5)).await, Some(None));
    }
}
