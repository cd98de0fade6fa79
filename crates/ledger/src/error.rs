//! Ledger rejections.
//!
//! Every variant is a deterministic rejection of the inputs and carries the
//! offending member or amount so callers can build a user-facing message.

use thiserror::Error;

use tabsplit_core::{GroupId, MemberId, Money};

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("split requires at least one participant")]
    EmptyParticipantSet,

    #[error("member {member} is not a participant")]
    NotAParticipant { member: MemberId },

    #[error("split amounts sum to {actual}, expected exactly {expected}")]
    SplitSumMismatch { expected: Money, actual: Money },

    #[error("percentages sum to {sum}, expected 100")]
    PercentageSumInvalid { sum: f64 },

    #[error("no outstanding debt from {from} to {to}")]
    NoOutstandingDebt { from: MemberId, to: MemberId },

    #[error("settlement of {requested} exceeds outstanding {outstanding}")]
    SettlementExceedsOutstanding { requested: Money, outstanding: Money },

    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Money, reason: &'static str },

    #[error("negative share for member {member}")]
    NegativeShare { member: MemberId },

    #[error("member {member} cannot settle with themselves")]
    SelfSettlement { member: MemberId },

    #[error("member {member} does not belong to the group")]
    NotAGroupMember { member: MemberId },

    #[error("command targets group {found}, ledger belongs to {expected}")]
    GroupMismatch { expected: GroupId, found: GroupId },

    #[error("amount overflow while summing shares")]
    AmountOverflow,
}
