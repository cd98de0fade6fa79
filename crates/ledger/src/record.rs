//! Recorded ledger entries: expenses and settlements.
//!
//! Both are immutable once constructed; the constructors enforce every
//! invariant, so a value of either type is always consistent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tabsplit_core::{Entity, ExpenseId, GroupId, MemberId, Money, SettlementId};

use crate::error::{LedgerError, LedgerResult};
use crate::split::Shares;

/// Input for [`Expense::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub paid_by: MemberId,
    pub total: Money,
    pub participants: Vec<MemberId>,
    pub shares: Shares,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// One member paid `total`; `shares` says who owes what of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    group_id: GroupId,
    paid_by: MemberId,
    total: Money,
    participants: Vec<MemberId>,
    shares: Shares,
    description: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(draft: ExpenseDraft) -> LedgerResult<Self> {
        if !draft.total.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount: draft.total,
                reason: "expense total must be positive",
            });
        }

        let mut participants = Vec::with_capacity(draft.participants.len());
        for member in draft.participants {
            if !participants.contains(&member) {
                participants.push(member);
            }
        }
        if participants.is_empty() {
            return Err(LedgerError::EmptyParticipantSet);
        }

        let mut sum = Money::ZERO;
        for (member, share) in &draft.shares {
            if !participants.contains(member) {
                return Err(LedgerError::NotAParticipant { member: *member });
            }
            if share.is_negative() {
                return Err(LedgerError::NegativeShare { member: *member });
            }
            sum = sum.checked_add(*share).ok_or(LedgerError::AmountOverflow)?;
        }
        if sum != draft.total {
            return Err(LedgerError::SplitSumMismatch {
                expected: draft.total,
                actual: sum,
            });
        }

        Ok(Self {
            id: draft.id,
            group_id: draft.group_id,
            paid_by: draft.paid_by,
            total: draft.total,
            participants,
            shares: draft.shares,
            description: draft.description,
            occurred_at: draft.occurred_at,
        })
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn paid_by(&self) -> MemberId {
        self.paid_by
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn participants(&self) -> &[MemberId] {
        &self.participants
    }

    pub fn shares(&self) -> &Shares {
        &self.shares
    }

    /// A participant without an explicit share owes nothing.
    pub fn share_of(&self, member: MemberId) -> Money {
        self.shares.get(&member).copied().unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Cash moved from a debtor (`from`) to a creditor (`to`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    id: SettlementId,
    group_id: GroupId,
    from: MemberId,
    to: MemberId,
    amount: Money,
    occurred_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        id: SettlementId,
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "settlement amount must be positive",
            });
        }
        if from == to {
            return Err(LedgerError::SelfSettlement { member: from });
        }

        Ok(Self {
            id,
            group_id,
            from,
            to,
            amount,
            occurred_at,
        })
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn from_member(&self) -> MemberId {
        self.from
    }

    pub fn to_member(&self) -> MemberId {
        self.to
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl Entity for Settlement {
    type Id = SettlementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
