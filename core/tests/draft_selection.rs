//! Range selection over the hour grid.

use chrono::NaiveDate;
use gigsched_core::{
    draft::{ClickEffect, DraftSelection},
    types::SlotHour,
};

fn h(hour: u8) -> SlotHour {
    SlotHour::new(hour).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
}

fn starts(sel: &DraftSelection) -> Vec<u8> {
    sel.drafts().iter().map(|d| d.start_time.value()).collect()
}

#[test]
fn two_clicks_stage_the_inclusive_range() {
    let mut sel = DraftSelection::new("rep-1", date());

    assert_eq!(sel.click_hour(h(9)), ClickEffect::RangeOpened);
    assert_eq!(sel.quick_start(), Some(h(9)));
    assert_eq!(sel.quick_end(), Some(h(10)));

    assert_eq!(sel.click_hour(h(11)), ClickEffect::RangeCompleted { added: 2 });
    assert_eq!(starts(&sel), vec![9, 10, 11]);
    assert_eq!(sel.quick_start(), Some(h(9)));
    assert_eq!(sel.quick_end(), Some(h(12)));
    assert!(!sel.is_range_open());
    assert_eq!(sel.pending_hours(), 3);
}

#[test]
fn clicking_a_staged_hour_toggles_it() {
    let mut sel = DraftSelection::new("rep-1", date());
    sel.click_hour(h(9));
    sel.click_hour(h(11));

    assert_eq!(sel.click_hour(h(10)), ClickEffect::ToggledOff);
    assert_eq!(starts(&sel), vec![9, 11]);
    assert_eq!(sel.quick_start(), Some(h(9)));
    assert_eq!(sel.quick_end(), Some(h(12)));

    assert_eq!(sel.click_hour(h(10)), ClickEffect::RangeOpened);
    assert_eq!(starts(&sel), vec![9, 10, 11]);
}

#[test]
fn overlapping_ranges_never_duplicate_hours() {
    let mut sel = DraftSelection::new("rep-1", date());
    sel.click_hour(h(9));
    sel.click_hour(h(11));

    // 12 is new and opens a range; closing at 14 adds 13 and 14.
    sel.click_hour(h(12));
    assert_eq!(sel.click_hour(h(14)), ClickEffect::RangeCompleted { added: 2 });
    assert_eq!(starts(&sel), vec![9, 10, 11, 12, 13, 14]);

    // A range across already staged hours only adds the gaps.
    sel.click_hour(h(7));
    assert_eq!(sel.click_hour(h(12)), ClickEffect::RangeCompleted { added: 1 });
    assert_eq!(starts(&sel), vec![7, 8, 9, 10, 11, 12, 13, 14]);
    assert_eq!(sel.quick_start(), Some(h(7)));
    assert_eq!(sel.quick_end(), Some(h(15)));
}

#[test]
fn direct_toggle_keeps_bounds_in_sync() {
    let mut sel = DraftSelection::new("rep-1", date());
    assert!(sel.toggle_hour(h(15)));
    assert!(sel.toggle_hour(h(13)));
    assert_eq!(sel.quick_start(), Some(h(13)));
    assert_eq!(sel.quick_end(), Some(h(16)));

    assert!(!sel.toggle_hour(h(15)));
    assert_eq!(sel.quick_end(), Some(h(14)));

    assert!(!sel.toggle_hour(h(13)));
    assert!(sel.is_empty());
    assert_eq!(sel.quick_start(), None);
    assert_eq!(sel.quick_end(), None);
}

#[test]
fn remove_draft_filters_by_start_time() {
    let mut sel = DraftSelection::new("rep-1", date());
    sel.click_hour(h(9));
    sel.click_hour(h(11));

    assert!(sel.remove_draft(h(9)));
    assert_eq!(starts(&sel), vec![10, 11]);
    assert_eq!(sel.quick_start(), Some(h(10)));
    assert!(!sel.remove_draft(h(9)));
}

#[test]
fn drafts_belong_to_one_rep_and_date() {
    let mut sel = DraftSelection::new("rep-1", date());
    sel.click_hour(h(9));
    sel.click_hour(h(10));
    assert!(sel.drafts().iter().all(|d| d.rep_id == "rep-1" && d.date == date()));

    sel.rescope("rep-1", date());
    assert_eq!(sel.drafts().len(), 2);

    sel.rescope("rep-1", date().succ_opt().unwrap());
    assert!(sel.is_empty());
    assert!(!sel.is_range_open());

    sel.click_hour(h(9));
    sel.rescope("rep-2", sel.date());
    assert!(sel.is_empty());
    assert_eq!(sel.rep_id(), "rep-2");
}
