//! Read side: current group state rebuilt from the event store.

use tabsplit_core::GroupId;
use tabsplit_events::EventEnvelope;
use tabsplit_ledger::{
    GroupEvent, GroupLedger, LedgerResult, NetBalances, ProposedSettlement, SettlementApproval,
    SimplifiedTransfer,
};

use crate::command_dispatcher::{decode_stream, rehydrate, DispatchError};
use crate::event_store::EventStore;

/// Queries over group streams. Every call reads the stream afresh, so
/// answers reflect all committed events at the time of the call.
#[derive(Debug)]
pub struct LedgerView<S> {
    store: S,
}

impl<S> LedgerView<S>
where
    S: EventStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The rehydrated group ledger.
    pub fn group(&self, group_id: GroupId) -> Result<GroupLedger, DispatchError> {
        let history = self.store.load_stream(group_id).map_err(DispatchError::Store)?;
        rehydrate(group_id, &history)
    }

    /// Net balance per member; positive means the member is owed money.
    pub fn net_balances(&self, group_id: GroupId) -> Result<NetBalances, DispatchError> {
        Ok(self.group(group_id)?.net_balances().clone())
    }

    pub fn simplified_transfers(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<SimplifiedTransfer>, DispatchError> {
        Ok(self.group(group_id)?.simplified_transfers())
    }

    /// Check a settlement without recording it.
    ///
    /// The outer error is a read failure; the inner one is the ledger's verdict.
    pub fn validate_settlement(
        &self,
        group_id: GroupId,
        proposed: &ProposedSettlement,
    ) -> Result<LedgerResult<SettlementApproval>, DispatchError> {
        Ok(self.group(group_id)?.validate_settlement(proposed))
    }

    /// Every event of the group, typed and in sequence order.
    pub fn history(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<EventEnvelope<GroupEvent>>, DispatchError> {
        let stored = self.store.load_stream(group_id).map_err(DispatchError::Store)?;
        let events = decode_stream(group_id, &stored)?;

        Ok(stored
            .iter()
            .zip(events)
            .map(|(s, event)| EventEnvelope::new(s.event_id, s.group_id, s.sequence_number, event))
            .collect())
    }
}
