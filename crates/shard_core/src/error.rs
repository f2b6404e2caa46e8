//! Validation errors for user-triggered operations.
//!
//! A `ValidationError` always means the operation was rejected before any
//! state changed. Persistence failures never show up here; the store logs and
//! absorbs them.

use crate::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a non-negative number of {unit}.")]
    InvalidAmount { unit: &'static str },

    #[error("That would push {counter} past the largest number the tracker can hold.")]
    AmountTooLarge { counter: &'static str },

    #[error("Invalid shard value for {sinner}. Please use a non-negative number.")]
    InvalidShardValue { sinner: String },

    #[error("Unknown Sinner '{0}'.")]
    UnknownSinner(String),

    #[error("No ID or EGO '{item}' for {sinner}.")]
    UnknownItem { sinner: String, item: ItemId },

    #[error("'{item}' is not currently a goal for {sinner}.")]
    NotAGoal { sinner: String, item: ItemId },

    #[error("Type part of an ID or EGO name to search.")]
    EmptySearch,

    #[error("No ID or EGO found with that name.")]
    NoSearchMatch,
}
