//! tourney-core: pairwise-tournament ranking engine.
//!
//! Binary "which do you prefer" answers in, a total order out. The engine
//! picks every pair to ask, remembers each answer so it is never asked twice,
//! and can redo all answers about one item or undo the last one.
//! The engine performs no IO; the caller shows pairs and feeds back choices.
//!
//! # Quick start
//!
//! ```rust
//! use tourney_core::RankingSession;
//!
//! let mut session = RankingSession::with_seed(7);
//! session.start_run(["Tea", "Coffee", "Cocoa"]);
//!
//! // Always prefer whatever is shown first.
//! while session.current_pair().is_some() {
//!     session.choose_first().unwrap();
//! }
//!
//! assert_eq!(session.ranked().len(), 3);
//! assert!(session.is_finished());
//! ```

pub mod constants;
pub mod error;
pub mod intake;
pub mod memo;
pub mod persist;
pub mod progress;
pub mod replacement;
pub mod session;
pub mod stats;
pub mod tier;
pub mod types;
pub mod undo;

// Re-export primary public API at crate root.
pub use error::{Result, SessionError};
pub use intake::{parse_lines, prepare_items};
pub use memo::{MemoEntry, PairMemo};
pub use persist::SavedSession;
pub use progress::{elimination_steps, full_ranking_steps};
pub use replacement::Mode;
pub use session::RankingSession;
pub use stats::{optimized_order, MatchQuery, MatchTicket, MatchTracker, Superseded};
pub use tier::Tier;
pub use types::{
    Deletion, Item, NextPair, Pair, PercentMatched, ProgressCounters, ReplacementStatus,
};
pub use undo::{UndoEntry, UndoLog};
