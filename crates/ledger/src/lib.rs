//! Shared-expense ledger (splits, balances, debt simplification).
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod balance;
pub mod error;
pub mod group;
pub mod record;
pub mod settle;
pub mod simplify;
pub mod split;

pub use balance::{net_balances, BalanceAccumulator, NetBalances};
pub use error::{LedgerError, LedgerResult};
pub use group::{
    AddMember, ExpenseRecorded, GroupCommand, GroupEvent, GroupLedger, MemberAdded,
    RecordExpense, RecordSettlement, SettlementRecorded,
};
pub use record::{Expense, ExpenseDraft, Settlement};
pub use settle::{validate_settlement, ProposedSettlement, SettlementApproval};
pub use simplify::{simplify, SimplifiedTransfer};
pub use split::{split, ExactShare, PercentageShare, Shares, SplitPolicy, PERCENTAGE_TOLERANCE};
