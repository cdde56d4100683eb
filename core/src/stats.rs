//! Weekly statistics projection.
//!
//! A pure function of (slots, role, selected rep, drafts). Nothing is
//! cached; callers recompute whenever an input changes.

use crate::{
    model::{DraftSlot, SlotStatus, TimeSlot},
    types::{GigId, Role},
    views::scope_slots,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total_hours: u32,
    /// Hours per gig over non-cancelled slots that name a gig.
    pub hours_by_gig: BTreeMap<GigId, u32>,
    pub available_slots: usize,
    pub reserved_slots: usize,
    /// Hours staged as drafts, not yet committed.
    pub pending_hours: u32,
}

pub fn weekly_stats(
    slots: &[TimeSlot],
    role: Role,
    selected_rep: Option<&str>,
    drafts: &[DraftSlot],
) -> WeeklyStats {
    let mut stats = WeeklyStats::default();

    for slot in scope_slots(slots, role, selected_rep) {
        match slot.status {
            SlotStatus::Cancelled => continue,
            SlotStatus::Available => stats.available_slots += 1,
            SlotStatus::Reserved => stats.reserved_slots += 1,
        }
        stats.total_hours += slot.duration;
        if let Some(gig_id) = &slot.gig_id {
            *stats.hours_by_gig.entry(gig_id.clone()).or_insert(0) += slot.duration;
        }
    }

    stats.pending_hours = drafts.iter().map(|d| d.duration).sum();
    stats
}
