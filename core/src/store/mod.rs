//! Time-slot store accessor.
//!
//! RULE: only the store backends talk to the outside world.
//! Everything else in the crate goes through SlotStore and
//! EnrollmentDirectory and never builds a request or a query itself.
//!
//! Backends:
//!   - HttpSlotStore:   the remote scheduling API (production)
//!   - SqliteSlotStore: a local database (tests, offline runs)

mod http;
mod sqlite;

pub use http::HttpSlotStore;
pub use sqlite::SqliteSlotStore;

use crate::{
    error::SchedResult,
    model::{EnrollmentRecord, SlotStatus, TimeSlot},
    types::{GigId, RepId, SlotHour, SlotId},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filter for a slot fetch. An absent `rep_id` with a present `gig_id`
/// is the company-wide fetch across every representative on that gig.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotQuery {
    pub rep_id: Option<RepId>,
    pub gig_id: Option<GigId>,
    pub date:   Option<NaiveDate>,
}

impl SlotQuery {
    pub fn for_rep(rep_id: &str) -> Self {
        Self { rep_id: Some(rep_id.to_string()), ..Self::default() }
    }

    pub fn for_gig(gig_id: &str) -> Self {
        Self { gig_id: Some(gig_id.to_string()), ..Self::default() }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn is_global(&self) -> bool {
        self.rep_id.is_none() && self.gig_id.is_some()
    }
}

/// Field-level changes to an existing slot. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<SlotHour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<SlotHour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SlotStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gig_id: Option<GigId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_notes: Option<String>,
}

impl SlotChanges {
    pub fn attendance(attended: bool, notes: Option<String>) -> Self {
        Self { attended: Some(attended), attendance_notes: notes, ..Self::default() }
    }

    /// Overlay these changes onto `slot`.
    pub fn apply_to(&self, slot: &mut TimeSlot) {
        if let Some(v) = self.start_time { slot.start_time = v; }
        if let Some(v) = self.end_time { slot.end_time = v; }
        if let Some(v) = self.duration { slot.duration = v; }
        if let Some(v) = self.status { slot.status = v; }
        if let Some(v) = &self.gig_id { slot.gig_id = Some(v.clone()); }
        if let Some(v) = &self.notes { slot.notes = Some(v.clone()); }
        if let Some(v) = self.attended { slot.attended = Some(v); }
        if let Some(v) = &self.attendance_notes { slot.attendance_notes = Some(v.clone()); }
    }
}

/// Create-or-update payload. Create carries a complete slot (with a
/// client-generated id the backend has never seen); Update names a
/// persisted id and the fields to change.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotUpsert {
    Create(TimeSlot),
    Update { id: SlotId, changes: SlotChanges },
}

impl SlotUpsert {
    pub fn id(&self) -> &str {
        match self {
            Self::Create(slot) => &slot.id,
            Self::Update { id, .. } => id,
        }
    }
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn get_time_slots(&self, query: &SlotQuery) -> SchedResult<Vec<TimeSlot>>;

    async fn upsert_time_slot(&self, upsert: &SlotUpsert) -> SchedResult<TimeSlot>;

    /// Soft state transition to cancelled. The record stays retrievable.
    async fn cancel_time_slot(&self, id: &str) -> SchedResult<TimeSlot>;

    /// Hard delete. Administrative cleanup only.
    async fn delete_time_slot(&self, id: &str) -> SchedResult<()>;
}

#[async_trait]
pub trait EnrollmentDirectory: Send + Sync {
    /// Every enrollment record for one agent, any status.
    async fn agent_enrollments(&self, rep_id: &str) -> SchedResult<Vec<EnrollmentRecord>>;

    /// Agents currently enrolled in `gig_id`.
    async fn gig_roster(&self, gig_id: &str) -> SchedResult<Vec<EnrollmentRecord>>;
}
