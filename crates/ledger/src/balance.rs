//! Net balance aggregation.
//!
//! Sign convention: a positive balance means the group owes the member
//! (creditor), a negative one means the member owes the group (debtor).

use std::collections::BTreeMap;

use tabsplit_core::{MemberId, Money};

use crate::error::{LedgerError, LedgerResult};
use crate::record::{Expense, Settlement};

/// Signed balance per member, ordered by member id.
pub type NetBalances = BTreeMap<MemberId, Money>;

/// Incrementally folds expenses and settlements into net balances.
///
/// Pure summation: the order in which records are applied never changes the
/// result, and the balances always sum to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceAccumulator {
    balances: NetBalances,
}

impl BalanceAccumulator {
    /// Start every given member at zero so inactive members still show up.
    pub fn new(members: impl IntoIterator<Item = MemberId>) -> Self {
        Self {
            balances: members.into_iter().map(|m| (m, Money::ZERO)).collect(),
        }
    }

    pub fn add_member(&mut self, member: MemberId) {
        self.balances.entry(member).or_default();
    }

    pub fn apply_expense(&mut self, expense: &Expense) {
        *self.balances.entry(expense.paid_by()).or_default() += expense.total();
        for &member in expense.participants() {
            *self.balances.entry(member).or_default() -= expense.share_of(member);
        }
    }

    /// The debtor moves up towards zero, the creditor down.
    pub fn apply_settlement(&mut self, settlement: &Settlement) {
        *self.balances.entry(settlement.from_member()).or_default() += settlement.amount();
        *self.balances.entry(settlement.to_member()).or_default() -= settlement.amount();
    }

    /// Like [`apply_expense`](Self::apply_expense), but leaves the balances
    /// untouched and fails with `AmountOverflow` if any member's balance would
    /// leave the `i64` range.
    pub fn try_apply_expense(&mut self, expense: &Expense) -> LedgerResult<()> {
        let mut staged = NetBalances::new();
        let total = expense.total();
        self.stage(&mut staged, expense.paid_by(), |b| b.checked_add(total))?;
        for &member in expense.participants() {
            let share = expense.share_of(member);
            self.stage(&mut staged, member, |b| b.checked_sub(share))?;
        }
        self.balances.extend(staged);
        Ok(())
    }

    /// Checked counterpart of [`apply_settlement`](Self::apply_settlement).
    pub fn try_apply_settlement(&mut self, settlement: &Settlement) -> LedgerResult<()> {
        let mut staged = NetBalances::new();
        let amount = settlement.amount();
        self.stage(&mut staged, settlement.from_member(), |b| b.checked_add(amount))?;
        self.stage(&mut staged, settlement.to_member(), |b| b.checked_sub(amount))?;
        self.balances.extend(staged);
        Ok(())
    }

    fn stage(
        &self,
        staged: &mut NetBalances,
        member: MemberId,
        op: impl FnOnce(Money) -> Option<Money>,
    ) -> LedgerResult<()> {
        let current = staged
            .get(&member)
            .or_else(|| self.balances.get(&member))
            .copied()
            .unwrap_or_default();
        let next = op(current).ok_or(LedgerError::AmountOverflow)?;
        staged.insert(member, next);
        Ok(())
    }

    pub fn balances(&self) -> &NetBalances {
        &self.balances
    }

    pub fn into_balances(self) -> NetBalances {
        self.balances
    }

    /// Sum over all members; zero unless the conservation invariant is broken.
    pub fn total(&self) -> Money {
        self.balances.values().sum()
    }
}

/// Fold a group's whole history into net balances.
///
/// Members referenced by a record but missing from `members` are included too.
pub fn net_balances<'a>(
    members: impl IntoIterator<Item = MemberId>,
    expenses: impl IntoIterator<Item = &'a Expense>,
    settlements: impl IntoIterator<Item = &'a Settlement>,
) -> NetBalances {
    let mut accumulator = BalanceAccumulator::new(members);
    for expense in expenses {
        accumulator.apply_expense(expense);
    }
    for settlement in settlements {
        accumulator.apply_settlement(settlement);
    }
    accumulator.into_balances()
}
