//! The session planner, the orchestration layer behind the scheduling view.
//!
//! Owns the fetched slot collection, the draft selection and the user's
//! current choices (date, rep, gig), and is the single place where store
//! failures are caught and turned into notices.
//!
//! RULES:
//!   - Every write is awaited before the follow-up fetch.
//!   - A failed store call leaves in-memory state exactly as it was.
//!   - No retries, no backoff: failures are terminal here.
//!   - `&mut self` on every mutating call means a second submission can
//!     never start while one is in flight.

use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;

use crate::{
    attendance::{self, AttendanceSummary, AttendanceWindow, CohortRow, CohortSort},
    clock::SchedClock,
    command::SlotCommand,
    config::SchedConfig,
    draft::{ClickEffect, DraftSelection},
    error::{SchedError, SchedResult},
    event::{Notice, PlannerEvent},
    model::{EnrollmentStatus, Gig, Rep, TimeSlot},
    rng::{RngStream, ScoringRng},
    scoring::{self, GigRecommendation, HourScore, PerformanceMetric, WorkloadPrediction},
    session::SchedSession,
    stats::{weekly_stats, WeeklyStats},
    store::{EnrollmentDirectory, SlotChanges, SlotStore, SlotUpsert},
    types::{GigId, RepId, SlotHour},
    views,
};

/// Result of a planner action as the view sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerOutcome {
    /// The action went through; `count` records were written or loaded.
    Applied { count: usize },
    /// A precondition did not hold; nothing was attempted.
    Skipped,
    /// A store call failed; an error notice was queued.
    Failed,
}

pub struct SessionPlanner<S> {
    store:        S,
    session:      SchedSession,
    config:       SchedConfig,
    clock:        SchedClock,
    perf_rng:     ScoringRng,
    workload_rng: ScoringRng,
    slots:        Vec<TimeSlot>,
    selection:    DraftSelection,
    selected_gig: Option<GigId>,
    notices:      Vec<Notice>,
    events:       Vec<PlannerEvent>,
}

impl<S: SlotStore + EnrollmentDirectory> SessionPlanner<S> {
    pub fn new(store: S, session: SchedSession, config: SchedConfig, clock: SchedClock) -> Self {
        let rep_id = session.rep_id.clone().unwrap_or_default();
        let selection = DraftSelection::new(&rep_id, clock.today());
        Self {
            store,
            session,
            config,
            clock,
            perf_rng:     ScoringRng::from_entropy(RngStream::Performance),
            workload_rng: ScoringRng::from_entropy(RngStream::Workload),
            slots:        Vec::new(),
            selection,
            selected_gig: None,
            notices:      Vec::new(),
            events:       Vec::new(),
        }
    }

    /// Pin every random draw to `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.perf_rng = ScoringRng::seeded(seed, RngStream::Performance);
        self.workload_rng = ScoringRng::seeded(seed, RngStream::Workload);
        self
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn store(&self) -> &S { &self.store }
    pub fn session(&self) -> &SchedSession { &self.session }
    pub fn slots(&self) -> &[TimeSlot] { &self.slots }
    pub fn selection(&self) -> &DraftSelection { &self.selection }
    pub fn selected_gig(&self) -> Option<&str> { self.selected_gig.as_deref() }
    pub fn events(&self) -> &[PlannerEvent] { &self.events }
    pub fn today(&self) -> NaiveDate { self.clock.today() }

    pub fn selected_rep(&self) -> Option<&str> {
        Some(self.selection.rep_id()).filter(|r| !r.is_empty())
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.config.planner.notice_ttl_secs)
    }

    fn succeed(&mut self, message: String) {
        let ttl = self.notice_ttl();
        self.notices.push(Notice::success(message, ttl));
    }

    fn fail(&mut self, operation: &str, message: &str, err: SchedError) {
        log::warn!("{operation} failed: {err}");
        self.events.push(PlannerEvent::StoreCallFailed {
            operation: operation.to_string(),
            error:     err.to_string(),
        });
        let ttl = self.notice_ttl();
        self.notices.push(Notice::error(message, ttl));
    }

    // ── Loading ────────────────────────────────────────────────────────

    async fn fetch_collection(&self) -> SchedResult<Vec<TimeSlot>> {
        let mut batches = Vec::new();
        for query in views::fetch_plan(&self.session) {
            batches.push(self.store.get_time_slots(&query).await?);
        }
        Ok(views::merge_fetched(batches))
    }

    /// Re-fetch the session's slot collection.
    pub async fn refresh(&mut self) -> PlannerOutcome {
        match self.fetch_collection().await {
            Ok(slots) => {
                let count = slots.len();
                self.slots = slots;
                self.events.push(PlannerEvent::SlotsLoaded { count });
                log::debug!("loaded {count} slots for {:?} lens", self.session.role);
                PlannerOutcome::Applied { count }
            }
            Err(err) => {
                self.fail("refresh", "Failed to load time slots", err);
                PlannerOutcome::Failed
            }
        }
    }

    // ── Selection ──────────────────────────────────────────────────────

    pub fn select_date(&mut self, date: NaiveDate) {
        let rep_id = self.selection.rep_id().to_string();
        self.rescope(&rep_id, date);
    }

    pub fn select_rep(&mut self, rep_id: &str) {
        let date = self.selection.date();
        self.rescope(rep_id, date);
    }

    fn rescope(&mut self, rep_id: &str, date: NaiveDate) {
        self.selection.rescope(rep_id, date);
        self.events.push(PlannerEvent::ScopeChanged { rep_id: rep_id.to_string(), date });
    }

    pub fn select_gig(&mut self, gig_id: Option<&str>) {
        self.selected_gig = gig_id.map(str::to_string);
    }

    fn drafts_changed(&mut self) {
        self.events.push(PlannerEvent::DraftsChanged {
            pending: self.selection.drafts().len(),
            start:   self.selection.quick_start(),
            end:     self.selection.quick_end(),
        });
    }

    pub fn click_hour(&mut self, hour: SlotHour) -> ClickEffect {
        let effect = self.selection.click_hour(hour);
        if effect != ClickEffect::Ignored {
            self.drafts_changed();
        }
        effect
    }

    pub fn toggle_hour(&mut self, hour: SlotHour) -> bool {
        let added = self.selection.toggle_hour(hour);
        self.drafts_changed();
        added
    }

    pub fn remove_draft(&mut self, start_time: SlotHour) -> bool {
        let removed = self.selection.remove_draft(start_time);
        if removed {
            self.drafts_changed();
        }
        removed
    }

    // ── Writes ─────────────────────────────────────────────────────────

    /// Commit every staged draft as a reserved slot on the selected gig.
    ///
    /// All upserts are issued concurrently and independently; if any of
    /// them fails the whole block is reported as failed and the drafts are
    /// kept, even though some writes may have landed.
    pub async fn reserve_block(&mut self) -> PlannerOutcome {
        let Some(gig_id) = self.selected_gig.clone() else {
            return PlannerOutcome::Skipped;
        };
        if self.selected_rep().is_none() || self.selection.is_empty() {
            return PlannerOutcome::Skipped;
        }

        let note = self.config.planner.reservation_note.clone();
        let upserts: Vec<SlotUpsert> = self
            .selection
            .drafts()
            .iter()
            .cloned()
            .map(|draft| SlotUpsert::Create(draft.into_reserved(&gig_id, &note)))
            .collect();
        let count = upserts.len();

        let results = join_all(upserts.iter().map(|u| self.store.upsert_time_slot(u))).await;
        let mut first_err = None;
        for (upsert, result) in upserts.iter().zip(results) {
            if let Err(err) = result {
                log::debug!("upsert of slot {} rejected: {err}", upsert.id());
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        if let Some(err) = first_err {
            self.fail("reserve_block", "Failed to reserve time block", err);
            return PlannerOutcome::Failed;
        }

        let slots = match self.fetch_collection().await {
            Ok(slots) => slots,
            Err(err) => {
                self.fail("reserve_block", "Failed to reserve time block", err);
                return PlannerOutcome::Failed;
            }
        };

        self.slots = slots;
        self.selection.clear();
        self.events.push(PlannerEvent::BlockReserved { count, gig_id: gig_id.clone() });
        self.drafts_changed();
        log::info!("reserved {count} slot(s) on gig {gig_id}");
        self.succeed(format!(
            "Successfully reserved {count} time slot{}",
            if count == 1 { "" } else { "s" }
        ));
        PlannerOutcome::Applied { count }
    }

    /// Apply one slot command, then re-fetch.
    pub async fn execute(&mut self, command: SlotCommand) -> PlannerOutcome {
        let written = match command.apply(&self.store).await {
            Ok(slot) => slot,
            Err(err) => {
                self.fail(command.name(), "Failed to update time slot", err);
                return PlannerOutcome::Failed;
            }
        };

        let event = match &command {
            SlotCommand::CreateSlot { .. } => PlannerEvent::SlotAdded { slot_id: written.id.clone() },
            SlotCommand::CancelSlot { .. } => PlannerEvent::SlotCancelled { slot_id: written.id.clone() },
            SlotCommand::UpdateSlot { changes, .. } => match changes.attended {
                Some(attended) => PlannerEvent::AttendanceMarked { slot_id: written.id.clone(), attended },
                None => PlannerEvent::SlotAdded { slot_id: written.id.clone() },
            },
        };
        self.events.push(event);

        match self.refresh().await {
            PlannerOutcome::Failed => PlannerOutcome::Failed,
            _ => PlannerOutcome::Applied { count: 1 },
        }
    }

    /// Add a single available hour for the selected rep on the selected date.
    pub async fn quick_add(&mut self, hour: SlotHour) -> PlannerOutcome {
        let Some(rep_id) = self.selected_rep().map(str::to_string) else {
            return PlannerOutcome::Skipped;
        };
        if hour.value() >= SlotHour::MAX {
            return PlannerOutcome::Skipped;
        }
        let slot = TimeSlot::new_available(&rep_id, self.selection.date(), hour, hour.next());
        let outcome = self.execute(SlotCommand::CreateSlot { slot }).await;
        if matches!(outcome, PlannerOutcome::Applied { .. }) {
            self.succeed(format!("Added {hour} slot"));
        }
        outcome
    }

    pub async fn cancel_slot(&mut self, slot_id: &str) -> PlannerOutcome {
        let outcome = self.execute(SlotCommand::CancelSlot { id: slot_id.to_string() }).await;
        if matches!(outcome, PlannerOutcome::Applied { .. }) {
            self.succeed("Time slot cancelled".to_string());
        }
        outcome
    }

    /// Record whether the rep showed up. Only reserved slots whose date
    /// has passed can be marked; anything else is ignored.
    pub async fn mark_attendance(
        &mut self,
        slot_id: &str,
        attended: bool,
        notes: Option<String>,
    ) -> PlannerOutcome {
        let today = self.today();
        let eligible = self
            .slots
            .iter()
            .any(|s| s.id == slot_id && s.is_reserved() && s.date < today);
        if !eligible {
            return PlannerOutcome::Skipped;
        }
        let outcome = self
            .execute(SlotCommand::UpdateSlot {
                id:      slot_id.to_string(),
                changes: SlotChanges::attendance(attended, notes),
            })
            .await;
        if matches!(outcome, PlannerOutcome::Applied { .. }) {
            self.succeed(format!(
                "Marked {}",
                if attended { "present" } else { "absent" }
            ));
        }
        outcome
    }

    // ── Enrollment ─────────────────────────────────────────────────────

    /// Gigs the selected rep is enrolled in.
    pub async fn enrolled_gigs(&mut self) -> Vec<GigId> {
        let Some(rep_id) = self.selected_rep().map(str::to_string) else {
            return Vec::new();
        };
        match self.store.agent_enrollments(&rep_id).await {
            Ok(records) => records
                .into_iter()
                .filter(|r| r.status == EnrollmentStatus::Enrolled)
                .map(|r| r.gig_id)
                .collect(),
            Err(err) => {
                self.fail("enrolled_gigs", "Failed to load enrolled gigs", err);
                Vec::new()
            }
        }
    }

    /// Representatives enrolled in `gig_id`.
    pub async fn gig_roster(&mut self, gig_id: &str) -> Vec<RepId> {
        match self.store.gig_roster(gig_id).await {
            Ok(records) => records.into_iter().map(|r| r.agent_id).collect(),
            Err(err) => {
                self.fail("gig_roster", "Failed to load gig roster", err);
                Vec::new()
            }
        }
    }

    // ── Derived views ──────────────────────────────────────────────────

    pub fn weekly_stats(&self) -> WeeklyStats {
        weekly_stats(
            &self.slots,
            self.session.role,
            self.selected_rep(),
            self.selection.drafts(),
        )
    }

    pub fn recommendations(&self, rep: &Rep, gigs: &[Gig]) -> Vec<GigRecommendation> {
        scoring::recommend_gigs(rep, gigs, &self.slots, &self.config.scoring)
    }

    pub fn optimal_times(&self, rep: &Rep) -> Vec<HourScore> {
        scoring::predict_optimal_times(rep, &self.slots, &self.config.scoring)
    }

    pub fn performance(&mut self, rep: &Rep) -> Vec<PerformanceMetric> {
        scoring::performance_metrics(rep, &self.slots, &mut self.perf_rng)
    }

    pub fn workload_forecast(&mut self) -> Vec<WorkloadPrediction> {
        let today = self.today();
        scoring::forecast_workload(
            &self.slots,
            today,
            self.config.scoring.forecast_days,
            &self.config.scoring,
            &mut self.workload_rng,
        )
    }

    pub fn attendance(&self, rep_id: &str, window: AttendanceWindow) -> AttendanceSummary {
        attendance::rep_attendance(rep_id, &self.slots, window, self.today())
    }

    pub fn cohort(&self, reps: &[Rep], window: AttendanceWindow, sort: CohortSort) -> Vec<CohortRow> {
        attendance::cohort_report(reps, &self.slots, window, self.today(), sort)
    }

    /// `rep` with its attendance score and history filled in from the
    /// loaded collection.
    pub fn with_attendance(&self, rep: &Rep) -> Rep {
        let summary = self.attendance(&rep.id, AttendanceWindow::All);
        let mut rep = rep.clone();
        rep.attendance_score = Some(summary.score as f64);
        rep.attendance_history = attendance::attendance_history(&rep.id, &self.slots, self.today());
        rep
    }
}
