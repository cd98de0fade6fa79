//! Settlement validation against the current simplified debt graph.

use serde::{Deserialize, Serialize};

use tabsplit_core::{MemberId, Money};

use crate::error::{LedgerError, LedgerResult};
use crate::simplify::SimplifiedTransfer;

/// A settlement somebody wants to record: `from` pays `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedSettlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// An accepted settlement and what it leaves on its edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementApproval {
    pub amount: Money,
    pub outstanding: Money,
    pub remaining: Money,
}

/// Accept `proposed` only if the simplified graph has an edge in exactly the
/// same direction and the amount does not exceed it.
///
/// `transfers` must be a fresh simplification of the group's current balances.
pub fn validate_settlement(
    proposed: &ProposedSettlement,
    transfers: &[SimplifiedTransfer],
) -> LedgerResult<SettlementApproval> {
    if !proposed.amount.is_positive() {
        return Err(LedgerError::InvalidAmount {
            amount: proposed.amount,
            reason: "settlement amount must be positive",
        });
    }
    if proposed.from == proposed.to {
        return Err(LedgerError::SelfSettlement {
            member: proposed.from,
        });
    }

    let edge = transfers
        .iter()
        .find(|t| t.from == proposed.from && t.to == proposed.to)
        .ok_or(LedgerError::NoOutstandingDebt {
            from: proposed.from,
            to: proposed.to,
        })?;

    if proposed.amount > edge.amount {
        return Err(LedgerError::SettlementExceedsOutstanding {
            requested: proposed.amount,
            outstanding: edge.amount,
        });
    }

    Ok(SettlementApproval {
        amount: proposed.amount,
        outstanding: edge.amount,
        remaining: edge.amount - proposed.amount,
    })
}
