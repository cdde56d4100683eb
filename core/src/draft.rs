//! Draft slot multi-select controller.
//!
//! Lets a user stage a set of one-hour candidate slots for a single date
//! and representative by clicking start/end hours, before committing them
//! as one reserved block. Nothing here touches the store; commit lives in
//! the planner.
//!
//! State: an optional open range (its anchor hour), the staged drafts, and
//! the displayed `quick_start`/`quick_end` bounds. After every mutation the
//! bounds equal the min start / max end of the drafts, or are cleared.

use crate::{
    model::DraftSlot,
    types::{RepId, SlotHour},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a click on the hour grid did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ClickEffect {
    /// A fresh range was anchored at the clicked hour (one draft staged).
    RangeOpened,
    /// The open range was completed; `added` new hours were staged.
    RangeCompleted { added: usize },
    /// The clicked hour was already staged and has been removed.
    ToggledOff,
    /// Hour 24 and beyond cannot start a slot.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSelection {
    rep_id: RepId,
    date: NaiveDate,
    anchor: Option<SlotHour>,
    quick_start: Option<SlotHour>,
    quick_end: Option<SlotHour>,
    drafts: Vec<DraftSlot>,
}

impl DraftSelection {
    pub fn new(rep_id: &str, date: NaiveDate) -> Self {
        Self {
            rep_id: rep_id.to_string(),
            date,
            anchor: None,
            quick_start: None,
            quick_end: None,
            drafts: Vec::new(),
        }
    }

    pub fn rep_id(&self) -> &str { &self.rep_id }
    pub fn date(&self) -> NaiveDate { self.date }
    pub fn drafts(&self) -> &[DraftSlot] { &self.drafts }
    pub fn quick_start(&self) -> Option<SlotHour> { self.quick_start }
    pub fn quick_end(&self) -> Option<SlotHour> { self.quick_end }
    pub fn is_empty(&self) -> bool { self.drafts.is_empty() }
    pub fn is_range_open(&self) -> bool { self.anchor.is_some() }

    pub fn pending_hours(&self) -> u32 {
        self.drafts.iter().map(|d| d.duration).sum()
    }

    /// Move the selection to another date or rep. Drafts never span scopes,
    /// so a change of scope discards them.
    pub fn rescope(&mut self, rep_id: &str, date: NaiveDate) {
        if self.rep_id != rep_id || self.date != date {
            self.rep_id = rep_id.to_string();
            self.date = date;
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
        self.anchor = None;
        self.sync_bounds();
    }

    /// Range-selection click on `hour`.
    pub fn click_hour(&mut self, hour: SlotHour) -> ClickEffect {
        if hour.value() >= SlotHour::MAX {
            return ClickEffect::Ignored;
        }

        let effect = match self.anchor {
            Some(anchor) if hour >= anchor => {
                let mut added = 0;
                let mut h = anchor;
                loop {
                    if !self.is_staged(h) {
                        self.drafts.push(DraftSlot::one_hour(&self.rep_id, self.date, h));
                        added += 1;
                    }
                    if h >= hour {
                        break;
                    }
                    h = h.next();
                }
                self.anchor = None;
                ClickEffect::RangeCompleted { added }
            }
            // No open range, or a click before the anchor: start over at `hour`.
            _ => {
                if self.toggle(hour) {
                    self.anchor = Some(hour);
                    ClickEffect::RangeOpened
                } else {
                    self.anchor = None;
                    ClickEffect::ToggledOff
                }
            }
        };

        self.sync_bounds();
        effect
    }

    /// Direct add/remove of a single hour from the grid.
    /// Returns true when the hour was added.
    pub fn toggle_hour(&mut self, hour: SlotHour) -> bool {
        if hour.value() >= SlotHour::MAX {
            return false;
        }
        let added = self.toggle(hour);
        if !added && self.anchor == Some(hour) {
            self.anchor = None;
        }
        self.sync_bounds();
        added
    }

    /// Drop the pending entry starting at `start_time`.
    /// Returns false when no such draft is staged.
    pub fn remove_draft(&mut self, start_time: SlotHour) -> bool {
        let before = self.drafts.len();
        self.drafts.retain(|d| d.start_time != start_time);
        let removed = self.drafts.len() != before;
        if removed && self.anchor == Some(start_time) {
            self.anchor = None;
        }
        self.sync_bounds();
        removed
    }

    fn is_staged(&self, hour: SlotHour) -> bool {
        self.drafts.iter().any(|d| d.occupies(self.date, hour))
    }

    /// Add a one-hour draft at `hour`, or remove it if already staged.
    fn toggle(&mut self, hour: SlotHour) -> bool {
        if self.is_staged(hour) {
            let date = self.date;
            self.drafts.retain(|d| !d.occupies(date, hour));
            false
        } else {
            self.drafts.push(DraftSlot::one_hour(&self.rep_id, self.date, hour));
            true
        }
    }

    fn sync_bounds(&mut self) {
        self.drafts.sort_by_key(|d| d.start_time);
        self.quick_start = self.drafts.first().map(|d| d.start_time);
        self.quick_end = self.drafts.iter().map(|d| d.end_time).max();
    }
}
