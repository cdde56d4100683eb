//! Planner flows against the in-memory store: block reservation, single
//! slot commands, attendance marking, enrollment lookups, failure notices.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use gigsched_core::{
    clock::SchedClock,
    config::SchedConfig,
    error::{SchedError, SchedResult},
    event::{NoticeKind, PlannerEvent},
    model::{EnrollmentRecord, EnrollmentStatus, SlotStatus, TimeSlot},
    planner::{PlannerOutcome, SessionPlanner},
    session::SchedSession,
    store::{EnrollmentDirectory, SlotQuery, SlotStore, SlotUpsert, SqliteSlotStore},
    types::SlotHour,
};

/// Wraps the SQLite store, counting upserts and failing on demand.
struct CountingStore {
    inner: SqliteSlotStore,
    upserts: AtomicUsize,
    fail_upserts: AtomicBool,
    fail_reads: AtomicBool,
}

impl CountingStore {
    fn new() -> Self {
        let inner = SqliteSlotStore::in_memory().unwrap();
        inner.migrate().unwrap();
        Self {
            inner,
            upserts: AtomicUsize::new(0),
            fail_upserts: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    fn refused() -> SchedError {
        SchedError::Api { status: 503, message: "unavailable".to_string() }
    }
}

#[async_trait]
impl SlotStore for CountingStore {
    async fn get_time_slots(&self, query: &SlotQuery) -> SchedResult<Vec<TimeSlot>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        self.inner.get_time_slots(query).await
    }

    async fn upsert_time_slot(&self, upsert: &SlotUpsert) -> SchedResult<TimeSlot> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        self.inner.upsert_time_slot(upsert).await
    }

    async fn cancel_time_slot(&self, id: &str) -> SchedResult<TimeSlot> {
        self.inner.cancel_time_slot(id).await
    }

    async fn delete_time_slot(&self, id: &str) -> SchedResult<()> {
        self.inner.delete_time_slot(id).await
    }
}

#[async_trait]
impl EnrollmentDirectory for CountingStore {
    async fn agent_enrollments(&self, rep_id: &str) -> SchedResult<Vec<EnrollmentRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::refused());
        }
        self.inner.agent_enrollments(rep_id).await
    }

    async fn gig_roster(&self, gig_id: &str) -> SchedResult<Vec<EnrollmentRecord>> {
        self.inner.gig_roster(gig_id).await
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn h(hour: u8) -> SlotHour {
    SlotHour::new(hour).unwrap()
}

fn planner(session: SchedSession) -> SessionPlanner<CountingStore> {
    SessionPlanner::new(
        CountingStore::new(),
        session,
        SchedConfig::default_test(),
        SchedClock::Fixed(today()),
    )
    .with_seed(7)
}

fn rep_planner() -> SessionPlanner<CountingStore> {
    planner(SchedSession::rep("rep-1"))
}

async fn seed(store: &CountingStore, rep: &str, date: NaiveDate, start: u8, status: SlotStatus, gig: Option<&str>) -> TimeSlot {
    let mut slot = TimeSlot::new_available(rep, date, h(start), h(start).next());
    slot.status = status;
    slot.gig_id = gig.map(str::to_string);
    store.inner.upsert_time_slot(&SlotUpsert::Create(slot)).await.unwrap()
}

#[tokio::test]
async fn reserving_a_block_writes_every_draft() {
    let mut planner = rep_planner();
    planner.select_gig(Some("G1"));
    planner.click_hour(h(9));
    planner.click_hour(h(11));

    let outcome = planner.reserve_block().await;

    assert_eq!(outcome, PlannerOutcome::Applied { count: 3 });
    assert_eq!(planner.store().upserts.load(Ordering::SeqCst), 3);
    assert!(planner.selection().is_empty());
    assert_eq!(planner.selection().quick_start(), None);

    assert_eq!(planner.slots().len(), 3);
    assert!(planner.slots().iter().all(|s| {
        s.status == SlotStatus::Reserved
            && s.gig_id.as_deref() == Some("G1")
            && s.notes.as_deref() == Some("Reserved via time block")
            && s.date == today()
    }));

    let notices = planner.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert_eq!(notices[0].message, "Successfully reserved 3 time slots");
    assert!(planner
        .events()
        .iter()
        .any(|e| matches!(e, PlannerEvent::BlockReserved { count: 3, .. })));
}

#[tokio::test]
async fn single_slot_notice_is_singular() {
    let mut planner = rep_planner();
    planner.select_gig(Some("G1"));
    planner.toggle_hour(h(14));

    assert_eq!(planner.reserve_block().await, PlannerOutcome::Applied { count: 1 });
    assert_eq!(planner.take_notices()[0].message, "Successfully reserved 1 time slot");
}

#[tokio::test]
async fn reserve_needs_a_gig_and_drafts() {
    let mut planner = rep_planner();
    planner.click_hour(h(9));
    assert_eq!(planner.reserve_block().await, PlannerOutcome::Skipped);

    planner.remove_draft(h(9));
    planner.select_gig(Some("G1"));
    assert_eq!(planner.reserve_block().await, PlannerOutcome::Skipped);

    assert_eq!(planner.store().upserts.load(Ordering::SeqCst), 0);
    assert!(planner.take_notices().is_empty());
}

#[tokio::test]
async fn reserve_without_a_rep_writes_nothing() {
    let mut planner = planner(SchedSession::admin());
    planner.select_gig(Some("G1"));
    planner.click_hour(h(9));

    assert_eq!(planner.reserve_block().await, PlannerOutcome::Skipped);

    assert_eq!(planner.store().upserts.load(Ordering::SeqCst), 0);
    assert_eq!(planner.store().inner.slot_count().unwrap(), 0);

    planner.select_rep("rep-1");
    planner.click_hour(h(9));
    assert_eq!(planner.reserve_block().await, PlannerOutcome::Applied { count: 1 });
    assert!(planner.slots().iter().all(|s| s.rep_id == "rep-1"));
}

#[tokio::test]
async fn rejected_upsert_keeps_drafts() {
    let mut planner = rep_planner();
    planner.select_gig(Some("G1"));
    planner.click_hour(h(9));
    planner.click_hour(h(11));
    planner.store().fail_upserts.store(true, Ordering::SeqCst);

    assert_eq!(planner.reserve_block().await, PlannerOutcome::Failed);

    assert_eq!(planner.selection().drafts().len(), 3);
    assert_eq!(planner.selection().quick_end(), Some(h(12)));
    let notices = planner.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(notices[0].message, "Failed to reserve time block");
    assert_eq!(notices[0].ttl.as_secs(), 3);
}

#[tokio::test]
async fn cancelled_slot_stays_in_the_collection() {
    let mut planner = rep_planner();
    planner.select_date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());

    assert_eq!(planner.quick_add(h(10)).await, PlannerOutcome::Applied { count: 1 });
    let slot = planner.slots()[0].clone();
    assert_eq!(slot.status, SlotStatus::Available);
    assert_eq!(slot.start_time, h(10));
    assert_eq!(slot.end_time, h(11));
    assert_eq!(planner.take_notices()[0].message, "Added 10:00 slot");

    assert_eq!(planner.cancel_slot(&slot.id).await, PlannerOutcome::Applied { count: 1 });
    assert_eq!(planner.slots().len(), 1);
    assert_eq!(planner.slots()[0].status, SlotStatus::Cancelled);
    assert_eq!(planner.store().inner.slot_count().unwrap(), 1);
    assert_eq!(planner.take_notices()[0].message, "Time slot cancelled");
    assert_eq!(planner.weekly_stats().total_hours, 0);
}

#[tokio::test]
async fn cancelling_an_unknown_slot_fails_quietly() {
    let mut planner = rep_planner();
    assert_eq!(planner.cancel_slot("missing").await, PlannerOutcome::Failed);
    let notices = planner.take_notices();
    assert_eq!(notices[0].message, "Failed to update time slot");
}

#[tokio::test]
async fn attendance_is_marked_on_past_reserved_slots_only() {
    let mut planner = rep_planner();
    let past = seed(planner.store(), "rep-1", NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(), 9, SlotStatus::Reserved, Some("G1")).await;
    let future = seed(planner.store(), "rep-1", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 9, SlotStatus::Reserved, Some("G1")).await;
    let open = seed(planner.store(), "rep-1", NaiveDate::from_ymd_opt(2026, 10, 13).unwrap(), 9, SlotStatus::Available, None).await;
    planner.refresh().await;

    assert_eq!(planner.mark_attendance(&future.id, true, None).await, PlannerOutcome::Skipped);
    assert_eq!(planner.mark_attendance(&open.id, true, None).await, PlannerOutcome::Skipped);

    let outcome = planner
        .mark_attendance(&past.id, false, Some("no show".to_string()))
        .await;
    assert_eq!(outcome, PlannerOutcome::Applied { count: 1 });
    let notices = planner.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert_eq!(notices[0].message, "Marked absent");

    let marked = planner.slots().iter().find(|s| s.id == past.id).unwrap();
    assert_eq!(marked.attended, Some(false));
    assert_eq!(marked.attendance_notes.as_deref(), Some("no show"));
    assert_eq!(marked.status, SlotStatus::Reserved);

    let summary = planner.attendance("rep-1", gigsched_core::attendance::AttendanceWindow::All);
    assert_eq!(summary.tracked, 1);
    assert_eq!(summary.score, 0);
}

#[tokio::test]
async fn failed_refresh_leaves_slots_untouched() {
    let mut planner = rep_planner();
    seed(planner.store(), "rep-1", today(), 9, SlotStatus::Available, None).await;
    assert_eq!(planner.refresh().await, PlannerOutcome::Applied { count: 1 });

    planner.store().fail_reads.store(true, Ordering::SeqCst);
    assert_eq!(planner.refresh().await, PlannerOutcome::Failed);

    assert_eq!(planner.slots().len(), 1);
    let notices = planner.take_notices();
    assert_eq!(notices[0].message, "Failed to load time slots");
    assert!(planner
        .events()
        .iter()
        .any(|e| matches!(e, PlannerEvent::StoreCallFailed { operation, .. } if operation == "refresh")));
}

#[tokio::test]
async fn company_lens_merges_one_fetch_per_gig() {
    let mut planner = planner(SchedSession::company("acme", vec!["G1".into(), "G2".into()]));
    let store = planner.store();
    seed(store, "rep-1", today(), 9, SlotStatus::Reserved, Some("G1")).await;
    seed(store, "rep-2", today(), 10, SlotStatus::Reserved, Some("G1")).await;
    seed(store, "rep-3", today(), 11, SlotStatus::Reserved, Some("G2")).await;
    seed(store, "rep-4", today(), 12, SlotStatus::Reserved, Some("G3")).await;

    assert_eq!(planner.refresh().await, PlannerOutcome::Applied { count: 3 });

    let stats = planner.weekly_stats();
    assert_eq!(stats.reserved_slots, 3);
    assert_eq!(stats.hours_by_gig["G1"], 2);
    assert!(!stats.hours_by_gig.contains_key("G3"));
}

#[tokio::test]
async fn enrollment_lookups_filter_by_status() {
    let mut planner = rep_planner();
    for (gig, agent, status) in [
        ("G1", "rep-1", EnrollmentStatus::Enrolled),
        ("G2", "rep-1", EnrollmentStatus::Pending),
        ("G1", "rep-2", EnrollmentStatus::Removed),
        ("G1", "rep-3", EnrollmentStatus::Enrolled),
    ] {
        planner
            .store()
            .inner
            .insert_enrollment(&EnrollmentRecord {
                gig_id: gig.to_string(),
                agent_id: agent.to_string(),
                status,
            })
            .unwrap();
    }

    assert_eq!(planner.enrolled_gigs().await, vec!["G1".to_string()]);
    assert_eq!(
        planner.gig_roster("G1").await,
        vec!["rep-1".to_string(), "rep-3".to_string()]
    );

    planner.store().fail_reads.store(true, Ordering::SeqCst);
    assert!(planner.enrolled_gigs().await.is_empty());
    assert_eq!(planner.take_notices()[0].kind, NoticeKind::Error);
}

#[tokio::test]
async fn changing_date_discards_drafts() {
    let mut planner = rep_planner();
    planner.select_gig(Some("G1"));
    planner.click_hour(h(9));
    planner.click_hour(h(10));

    planner.select_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());

    assert!(planner.selection().is_empty());
    assert_eq!(planner.reserve_block().await, PlannerOutcome::Skipped);
}
