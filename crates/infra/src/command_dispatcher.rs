//! Command execution pipeline for group ledgers.
//!
//! ```text
//! GroupCommand
//!   ↓
//! 1. Load the group's stream
//!   ↓
//! 2. Rehydrate GroupLedger (replay every stored event)
//!   ↓
//! 3. Handle the command (pure decision, produces events)
//!   ↓
//! 4. Append with ExpectedVersion::Exact(loaded version)
//!   ↓
//! 5. On a version conflict, start over from 1 (bounded by config)
//! ```
//!
//! Two writers racing on one group both decide against the same version; the
//! store accepts the first append and rejects the second, which then re-runs
//! against the fresh stream. A settlement is therefore always validated
//! against the balances it will actually be applied to.

use thiserror::Error;
use uuid::Uuid;

use tabsplit_core::{Aggregate, ExpectedVersion, GroupId};
use tabsplit_ledger::{GroupCommand, GroupEvent, GroupLedger, LedgerError};

use crate::config::InfraConfig;
use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The ledger refused the command. Deterministic; retrying won't help.
    #[error("command rejected: {0}")]
    Rejected(#[from] LedgerError),

    /// Still losing the optimistic concurrency race after all retries.
    #[error("concurrent modification of group {group_id} after {attempts} attempts")]
    Concurrency { group_id: GroupId, attempts: u32 },

    /// A stored payload could not be decoded into a `GroupEvent`.
    #[error("failed to decode stored event {sequence_number}: {message}")]
    Deserialize { sequence_number: u64, message: String },

    #[error("event store failure: {0}")]
    Store(EventStoreError),
}

impl DispatchError {
    /// The ledger error behind a rejection, if that is what this is.
    pub fn as_rejection(&self) -> Option<&LedgerError> {
        match self {
            DispatchError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs group commands against an [`EventStore`].
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
    config: InfraConfig,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, InfraConfig::default())
    }

    pub fn with_config(store: S, config: InfraConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> CommandDispatcher<S>
where
    S: EventStore,
{
    /// Execute `command` against `group_id` and return the committed events.
    ///
    /// A command the ledger treats as a no-op (adding an existing member)
    /// returns an empty vector and appends nothing.
    pub fn dispatch(
        &self,
        group_id: GroupId,
        command: GroupCommand,
    ) -> Result<Vec<StoredEvent>, DispatchError> {
        let attempts = self.config.conflict_retries.saturating_add(1);

        for attempt in 1..=attempts {
            match self.try_dispatch(group_id, &command) {
                Err(DispatchError::Store(EventStoreError::Concurrency(msg))) => {
                    tracing::warn!(
                        group_id = %group_id,
                        attempt,
                        max_attempts = attempts,
                        reason = %msg,
                        "group stream moved underneath command; retrying"
                    );
                }
                Err(DispatchError::Rejected(err)) => {
                    tracing::info!(group_id = %group_id, error = %err, "command rejected");
                    return Err(DispatchError::Rejected(err));
                }
                other => return other,
            }
        }

        Err(DispatchError::Concurrency { group_id, attempts })
    }

    fn try_dispatch(
        &self,
        group_id: GroupId,
        command: &GroupCommand,
    ) -> Result<Vec<StoredEvent>, DispatchError> {
        let history = self.store.load_stream(group_id).map_err(DispatchError::Store)?;
        let expected = ExpectedVersion::Exact(stream_version(&history));
        let ledger = rehydrate(group_id, &history)?;

        let decided = ledger.handle(command)?;
        if decided.is_empty() {
            tracing::debug!(group_id = %group_id, "command produced no events");
            return Ok(vec![]);
        }

        let uncommitted = decided
            .iter()
            .map(|ev| UncommittedEvent::from_typed(group_id, Uuid::now_v7(), ev))
            .collect::<Result<Vec<_>, _>>()
            .map_err(DispatchError::Store)?;

        let committed = self
            .store
            .append(uncommitted, expected)
            .map_err(DispatchError::Store)?;

        for stored in &committed {
            tracing::info!(
                group_id = %group_id,
                sequence_number = stored.sequence_number,
                event_type = %stored.event_type,
                "event committed"
            );
        }

        Ok(committed)
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

/// Rebuild a `GroupLedger` from its stored stream.
///
/// Rejects streams that belong to another group or whose sequence numbers
/// are not strictly increasing from 1.
pub(crate) fn rehydrate(
    group_id: GroupId,
    history: &[StoredEvent],
) -> Result<GroupLedger, DispatchError> {
    let mut ledger = GroupLedger::empty(group_id);
    for event in decode_stream(group_id, history)? {
        ledger.apply(&event);
    }
    Ok(ledger)
}

/// Decode a stored stream into typed events, in sequence order.
pub(crate) fn decode_stream(
    group_id: GroupId,
    history: &[StoredEvent],
) -> Result<Vec<GroupEvent>, DispatchError> {
    let mut last = 0u64;
    let mut events = Vec::with_capacity(history.len());

    for (idx, stored) in history.iter().enumerate() {
        if stored.group_id != group_id {
            return Err(DispatchError::Store(EventStoreError::StreamIsolation(format!(
                "loaded stream contains wrong group_id at index {idx}"
            ))));
        }
        if stored.sequence_number <= last {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                stored.sequence_number
            ))));
        }
        last = stored.sequence_number;

        let event: GroupEvent = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DispatchError::Deserialize {
                sequence_number: stored.sequence_number,
                message: e.to_string(),
            }
        })?;
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::InMemoryEventStore;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tabsplit_core::{MemberId, Money, SettlementId};
    use tabsplit_ledger::{AddMember, RecordSettlement};

    fn add_member(group_id: GroupId, member_id: MemberId) -> GroupCommand {
        GroupCommand::AddMember(AddMember {
            group_id,
            member_id,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn adding_a_member_commits_one_event() {
        let dispatcher = CommandDispatcher::new(InMemoryEventStore::new());
        let group = GroupId::new();

        let committed = dispatcher.dispatch(group, add_member(group, MemberId::new())).unwrap();

        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].sequence_number, 1);
        assert_eq!(committed[0].event_type, "ledger.group.member_added");
    }

    #[test]
    fn idempotent_command_appends_nothing() {
        let dispatcher = CommandDispatcher::new(InMemoryEventStore::new());
        let group = GroupId::new();
        let alice = MemberId::new();

        dispatcher.dispatch(group, add_member(group, alice)).unwrap();
        let second = dispatcher.dispatch(group, add_member(group, alice)).unwrap();

        assert!(second.is_empty());
        assert_eq!(dispatcher.store().load_stream(group).unwrap().len(), 1);
    }

    #[test]
    fn rejection_is_not_retried() {
        let dispatcher = CommandDispatcher::new(InMemoryEventStore::new());
        let group = GroupId::new();
        let (alice, bob) = (MemberId::new(), MemberId::new());
        dispatcher.dispatch(group, add_member(group, alice)).unwrap();
        dispatcher.dispatch(group, add_member(group, bob)).unwrap();

        let err = dispatcher
            .dispatch(
                group,
                GroupCommand::RecordSettlement(RecordSettlement {
                    group_id: group,
                    settlement_id: SettlementId::new(),
                    from: bob,
                    to: alice,
                    amount: Money::from_cents(100),
                    occurred_at: Utc::now(),
                }),
            )
            .unwrap_err();

        assert_eq!(
            err.as_rejection(),
            Some(&LedgerError::NoOutstandingDebt { from: bob, to: alice })
        );
    }

    /// Appends one foreign event right before the first real append, so the
    /// dispatcher's first attempt loses the race.
    struct RacingStore {
        inner: InMemoryEventStore,
        intruder: MemberId,
        raced: AtomicBool,
    }

    impl EventStore for RacingStore {
        fn append(
            &self,
            events: Vec<UncommittedEvent>,
            expected_version: ExpectedVersion,
        ) -> Result<Vec<StoredEvent>, EventStoreError> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                let group_id = events[0].group_id;
                let intruding = GroupEvent::MemberAdded(tabsplit_ledger::MemberAdded {
                    group_id,
                    member_id: self.intruder,
                    occurred_at: Utc::now(),
                });
                let ev = UncommittedEvent::from_typed(group_id, Uuid::now_v7(), &intruding)?;
                self.inner.append(vec![ev], ExpectedVersion::Any)?;
            }
            self.inner.append(events, expected_version)
        }

        fn load_stream(&self, group_id: GroupId) -> Result<Vec<StoredEvent>, EventStoreError> {
            self.inner.load_stream(group_id)
        }
    }

    fn racing_store() -> RacingStore {
        RacingStore {
            inner: InMemoryEventStore::new(),
            intruder: MemberId::new(),
            raced: AtomicBool::new(false),
        }
    }

    #[test]
    fn lost_race_is_retried_against_fresh_stream() {
        let dispatcher = CommandDispatcher::new(racing_store());
        let group = GroupId::new();

        let committed = dispatcher.dispatch(group, add_member(group, MemberId::new())).unwrap();

        assert_eq!(committed[0].sequence_number, 2);
        assert_eq!(dispatcher.store().load_stream(group).unwrap().len(), 2);
    }

    #[test]
    fn zero_retries_surfaces_the_conflict() {
        let dispatcher = CommandDispatcher::with_config(
            racing_store(),
            InfraConfig { conflict_retries: 0 },
        );
        let group = GroupId::new();

        let err = dispatcher
            .dispatch(group, add_member(group, MemberId::new()))
            .unwrap_err();

        assert!(matches!(err, DispatchError::Concurrency { attempts: 1, .. }));
    }

    #[test]
    fn corrupt_payload_is_reported_with_its_position() {
        let store = InMemoryEventStore::new();
        let group = GroupId::new();
        store
            .append(
                vec![UncommittedEvent {
                    event_id: Uuid::now_v7(),
                    group_id: group,
                    event_type: "ledger.group.member_added".to_string(),
                    event_version: 1,
                    occurred_at: Utc::now(),
                    payload: serde_json::json!({ "unexpected": true }),
                }],
                ExpectedVersion::Exact(0),
            )
            .unwrap();

        let err = rehydrate(group, &store.load_stream(group).unwrap()).unwrap_err();
        assert!(matches!(err, DispatchError::Deserialize { sequence_number: 1, .. }));
    }
}
