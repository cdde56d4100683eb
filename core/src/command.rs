use crate::{
    error::SchedResult,
    model::TimeSlot,
    store::{SlotChanges, SlotStore, SlotUpsert},
    types::SlotId,
};
use serde::{Deserialize, Serialize};

/// Every mutation the scheduling core can issue against a slot.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SlotCommand {
    CreateSlot {
        slot: TimeSlot,
    },
    UpdateSlot {
        id:      SlotId,
        changes: SlotChanges,
    },
    CancelSlot {
        id: SlotId,
    },
}

impl SlotCommand {
    /// Issue the command against `store`, returning the record as the
    /// store reports it after the write.
    pub async fn apply<S: SlotStore + ?Sized>(&self, store: &S) -> SchedResult<TimeSlot> {
        match self {
            Self::CreateSlot { slot } => {
                store.upsert_time_slot(&SlotUpsert::Create(slot.clone())).await
            }
            Self::UpdateSlot { id, changes } => {
                store
                    .upsert_time_slot(&SlotUpsert::Update {
                        id:      id.clone(),
                        changes: changes.clone(),
                    })
                    .await
            }
            Self::CancelSlot { id } => store.cancel_time_slot(id).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateSlot { .. } => "create_slot",
            Self::UpdateSlot { .. } => "update_slot",
            Self::CancelSlot { .. } => "cancel_slot",
        }
    }
}
