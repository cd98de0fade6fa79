//! Debt simplification: net balances → debtor→creditor transfers.
//!
//! Greedy two-pointer sweep over debtors and creditors sorted by member id.
//! Not the minimum number of transfers in general, but deterministic: the
//! same balances always produce the same list, in the same order.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tabsplit_core::{MemberId, Money, ValueObject};

/// `from` pays `amount` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedTransfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

impl ValueObject for SimplifiedTransfer {}

/// Reduce net balances to a list of transfers that zeroes all of them.
///
/// Accepts any `(member, balance)` iterator; repeated members are summed and
/// zero balances are dropped.
pub fn simplify<I, M, B>(balances: I) -> Vec<SimplifiedTransfer>
where
    I: IntoIterator<Item = (M, B)>,
    M: Borrow<MemberId>,
    B: Borrow<Money>,
{
    let mut merged: BTreeMap<MemberId, Money> = BTreeMap::new();
    for (member, balance) in balances {
        *merged.entry(*member.borrow()).or_default() += *balance.borrow();
    }

    // BTreeMap iteration is ascending by member id.
    let mut debtors: Vec<(MemberId, Money)> = Vec::new();
    let mut creditors: Vec<(MemberId, Money)> = Vec::new();
    for (member, balance) in merged {
        if balance.is_negative() {
            debtors.push((member, -balance));
        } else if balance.is_positive() {
            creditors.push((member, balance));
        }
    }

    let mut transfers = Vec::with_capacity(debtors.len() + creditors.len());
    let (mut d, mut c) = (0, 0);
    while d < debtors.len() && c < creditors.len() {
        let (debtor, owed) = debtors[d];
        let (creditor, due) = creditors[c];

        let amount = owed.min(due);
        if amount.is_positive() {
            transfers.push(SimplifiedTransfer {
                from: debtor,
                to: creditor,
                amount,
            });
        }

        debtors[d].1 -= amount;
        creditors[c].1 -= amount;
        if debtors[d].1.is_zero() {
            d += 1;
        }
        if creditors[c].1.is_zero() {
            c += 1;
        }
    }

    transfers
}
