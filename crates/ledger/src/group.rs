use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tabsplit_core::{
    Aggregate, AggregateRoot, ExpenseId, GroupId, MemberId, Money, SettlementId,
};
use tabsplit_events::Event;

use crate::balance::{BalanceAccumulator, NetBalances};
use crate::error::{LedgerError, LedgerResult};
use crate::record::{Expense, ExpenseDraft, Settlement};
use crate::settle::{validate_settlement, ProposedSettlement, SettlementApproval};
use crate::simplify::{simplify, SimplifiedTransfer};
use crate::split::{split, SplitPolicy};

/// Aggregate root: the shared ledger of one group.
///
/// State is rebuilt from the group's event stream. Balances are folded
/// incrementally while replaying, so every decision sees the live state.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLedger {
    id: GroupId,
    members: Vec<MemberId>,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
    balances: BalanceAccumulator,
    version: u64,
}

impl GroupLedger {
    /// Empty aggregate for rehydration.
    pub fn empty(id: GroupId) -> Self {
        Self {
            id,
            members: Vec::new(),
            expenses: Vec::new(),
            settlements: Vec::new(),
            balances: BalanceAccumulator::default(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> GroupId {
        self.id
    }

    /// Members in the order they joined.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn is_member(&self, member: MemberId) -> bool {
        self.members.contains(&member)
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn net_balances(&self) -> &NetBalances {
        self.balances.balances()
    }

    pub fn simplified_transfers(&self) -> Vec<SimplifiedTransfer> {
        simplify(self.balances.balances())
    }

    pub fn validate_settlement(
        &self,
        proposed: &ProposedSettlement,
    ) -> LedgerResult<SettlementApproval> {
        validate_settlement(proposed, &self.simplified_transfers())
    }
}

impl AggregateRoot for GroupLedger {
    type Id = GroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddMember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMember {
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordExpense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordExpense {
    pub group_id: GroupId,
    pub expense_id: ExpenseId,
    pub paid_by: MemberId,
    /// Total in minor units.
    pub total: Money,
    /// Order decides who absorbs leftover cents of an equal split.
    pub participants: Vec<MemberId>,
    pub policy: SplitPolicy,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordSettlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSettlement {
    pub group_id: GroupId,
    pub settlement_id: SettlementId,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupCommand {
    AddMember(AddMember),
    RecordExpense(RecordExpense),
    RecordSettlement(RecordSettlement),
}

/// Event: MemberAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAdded {
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ExpenseRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub expense: Expense,
}

/// Event: SettlementRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecorded {
    pub settlement: Settlement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupEvent {
    MemberAdded(MemberAdded),
    ExpenseRecorded(ExpenseRecorded),
    SettlementRecorded(SettlementRecorded),
}

impl Event for GroupEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GroupEvent::MemberAdded(_) => "ledger.group.member_added",
            GroupEvent::ExpenseRecorded(_) => "ledger.group.expense_recorded",
            GroupEvent::SettlementRecorded(_) => "ledger.group.settlement_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GroupEvent::MemberAdded(e) => e.occurred_at,
            GroupEvent::ExpenseRecorded(e) => e.expense.occurred_at(),
            GroupEvent::SettlementRecorded(e) => e.settlement.occurred_at(),
        }
    }
}

impl Aggregate for GroupLedger {
    type Command = GroupCommand;
    type Event = GroupEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            GroupEvent::MemberAdded(e) => {
                self.id = e.group_id;
                if !self.members.contains(&e.member_id) {
                    self.members.push(e.member_id);
                }
                self.balances.add_member(e.member_id);
            }
            GroupEvent::ExpenseRecorded(e) => {
                self.balances.apply_expense(&e.expense);
                self.expenses.push(e.expense.clone());
            }
            GroupEvent::SettlementRecorded(e) => {
                self.balances.apply_settlement(&e.settlement);
                self.settlements.push(e.settlement.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            GroupCommand::AddMember(cmd) => self.handle_add_member(cmd),
            GroupCommand::RecordExpense(cmd) => self.handle_record_expense(cmd),
            GroupCommand::RecordSettlement(cmd) => self.handle_record_settlement(cmd),
        }
    }
}

impl GroupLedger {
    fn ensure_group(&self, group_id: GroupId) -> LedgerResult<()> {
        if group_id != self.id {
            return Err(LedgerError::GroupMismatch {
                expected: self.id,
                found: group_id,
            });
        }
        Ok(())
    }

    fn ensure_member(&self, member: MemberId) -> LedgerResult<()> {
        if !self.is_member(member) {
            return Err(LedgerError::NotAGroupMember { member });
        }
        Ok(())
    }

    fn handle_add_member(&self, cmd: &AddMember) -> LedgerResult<Vec<GroupEvent>> {
        self.ensure_group(cmd.group_id)?;

        if self.is_member(cmd.member_id) {
            return Ok(vec![]);
        }

        Ok(vec![GroupEvent::MemberAdded(MemberAdded {
            group_id: cmd.group_id,
            member_id: cmd.member_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_expense(&self, cmd: &RecordExpense) -> LedgerResult<Vec<GroupEvent>> {
        self.ensure_group(cmd.group_id)?;
        self.ensure_member(cmd.paid_by)?;

        if cmd.participants.is_empty() {
            return Err(LedgerError::EmptyParticipantSet);
        }
        for &participant in &cmd.participants {
            self.ensure_member(participant)?;
        }

        let shares = split(&cmd.policy, cmd.total, &cmd.participants)?;
        let expense = Expense::new(ExpenseDraft {
            id: cmd.expense_id,
            group_id: cmd.group_id,
            paid_by: cmd.paid_by,
            total: cmd.total,
            participants: cmd.participants.clone(),
            shares,
            description: cmd.description.clone(),
            occurred_at: cmd.occurred_at,
        })?;
        self.balances.clone().try_apply_expense(&expense)?;

        Ok(vec![GroupEvent::ExpenseRecorded(ExpenseRecorded { expense })])
    }

    fn handle_record_settlement(&self, cmd: &RecordSettlement) -> LedgerResult<Vec<GroupEvent>> {
        self.ensure_group(cmd.group_id)?;
        self.ensure_member(cmd.from)?;
        self.ensure_member(cmd.to)?;

        let approval = self.validate_settlement(&ProposedSettlement {
            from: cmd.from,
            to: cmd.to,
            amount: cmd.amount,
        })?;

        let settlement = Settlement::new(
            cmd.settlement_id,
            cmd.group_id,
            cmd.from,
            cmd.to,
            approval.amount,
            cmd.occurred_at,
        )?;
        self.balances.clone().try_apply_settlement(&settlement)?;

        Ok(vec![GroupEvent::SettlementRecorded(SettlementRecorded {
            settlement,
        })])
    }
}
