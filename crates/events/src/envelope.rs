use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tabsplit_core::GroupId;

/// A committed event together with its stream metadata.
///
/// `sequence_number` is the 1-based position within the group's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    group_id: GroupId,

    /// Monotonically increasing position in the group stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(event_id: Uuid, group_id: GroupId, sequence_number: u64, payload: E) -> Self {
        Self {
            event_id,
            group_id,
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
