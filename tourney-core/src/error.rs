//! Rejections surfaced by session commands.
//!
//! A command that returns an error has left the session unchanged, except for
//! `UndoDesync`, which also clears the undo log.
use thiserror::Error;

use crate::types::Item;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no choice is pending")]
    NoPendingChoice,

    #[error("'{item}' is not one of the two pending items")]
    NotAPendingItem { item: Item },

    #[error("undo state is invalid (tier {tier_index}, cursor {cursor}); undo history cleared")]
    UndoDesync { tier_index: usize, cursor: usize },

    #[error("no remembered choices involve '{item}'")]
    NothingToReplace { item: Item },

    #[error("already replacing choices for '{item}'")]
    ReplacementInProgress { item: Item },

    #[error("unknown item '{item}'")]
    UnknownItem { item: Item },

    #[error("an item named '{item}' already exists")]
    NameCollision { item: Item },

    #[error("item name must not be empty")]
    EmptyName,

    #[error("the ranking is not finished yet ({remaining} items left)")]
    RankingInProgress { remaining: usize },

    #[error("saved session is inconsistent: {reason}")]
    InvalidSession { reason: String },
}
