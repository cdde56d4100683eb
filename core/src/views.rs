//! Role lenses over one slot collection.
//!
//! The rep lens sees only the selected representative's slots; the
//! company and admin lenses see the whole fetched collection, which is
//! itself scoped by what each role fetches.

use crate::{
    model::TimeSlot,
    session::SchedSession,
    store::SlotQuery,
    types::{RepId, Role},
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Slots visible under `role`.
pub fn scope_slots<'a>(
    slots: &'a [TimeSlot],
    role: Role,
    selected_rep: Option<&str>,
) -> Vec<&'a TimeSlot> {
    match role {
        Role::Rep => slots
            .iter()
            .filter(|s| selected_rep == Some(s.rep_id.as_str()))
            .collect(),
        Role::Company | Role::Admin => slots.iter().collect(),
    }
}

/// The fetches that populate a session's collection.
/// Rep: its own slots. Company: one global fetch per owned gig.
/// Admin: everything.
pub fn fetch_plan(session: &SchedSession) -> Vec<SlotQuery> {
    match session.role {
        Role::Rep => session
            .rep_id
            .as_deref()
            .map(SlotQuery::for_rep)
            .into_iter()
            .collect(),
        Role::Company => session.company_gigs.iter().map(|g| SlotQuery::for_gig(g)).collect(),
        Role::Admin => vec![SlotQuery::default()],
    }
}

/// Merge per-query results, keeping the first copy of each slot id.
pub fn merge_fetched(batches: Vec<Vec<TimeSlot>>) -> Vec<TimeSlot> {
    let mut seen = std::collections::HashSet::new();
    let mut merged: Vec<TimeSlot> = batches
        .into_iter()
        .flatten()
        .filter(|s| seen.insert(s.id.clone()))
        .collect();
    merged.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
    merged
}

/// Booked hours per representative, cancelled slots excluded.
pub fn hours_by_rep(slots: &[TimeSlot]) -> BTreeMap<RepId, u32> {
    let mut hours = BTreeMap::new();
    for slot in slots.iter().filter(|s| !s.is_cancelled()) {
        *hours.entry(slot.rep_id.clone()).or_insert(0) += slot.duration;
    }
    hours
}

/// One day's slots, earliest first.
pub fn slots_on(slots: &[TimeSlot], date: NaiveDate) -> Vec<&TimeSlot> {
    let mut day: Vec<&TimeSlot> = slots.iter().filter(|s| s.date == date).collect();
    day.sort_by_key(|s| s.start_time);
    day
}
