//! Attendance aggregation: compliance percentages and reliability tiers.
//!
//! A slot counts toward attendance only when it is reserved and carries an
//! attended flag. Window filtering happens before scoring.

use crate::{
    clock::week_start_of,
    error::SchedResult,
    model::{AttendanceRecord, Rep, TimeSlot},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Below this many tracked slots a rep is still "initializing".
pub const MIN_TRACKED_FOR_TIER: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceWindow {
    All,
    Month,
    Week,
}

impl AttendanceWindow {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Month => date.year() == today.year() && date.month() == today.month(),
            Self::Week => {
                let start = week_start_of(today);
                date >= start && date < start + Duration::days(7)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityTier {
    Elite,
    Professional,
    Stable,
    UnderReview,
    Initializing,
}

impl ReliabilityTier {
    pub fn classify(score: u8, tracked: usize) -> Self {
        if tracked < MIN_TRACKED_FOR_TIER {
            return Self::Initializing;
        }
        match score {
            95..=u8::MAX => Self::Elite,
            85..=94 => Self::Professional,
            75..=84 => Self::Stable,
            _ => Self::UnderReview,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Elite => "ELITE",
            Self::Professional => "PROFESSIONAL",
            Self::Stable => "STABLE",
            Self::UnderReview => "UNDER REVIEW",
            Self::Initializing => "INITIALIZING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// 0–100.
    pub score: u8,
    pub attended: usize,
    pub tracked: usize,
    pub tier: ReliabilityTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortSort {
    Name,
    Score,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    pub rep_id: String,
    pub name: String,
    pub email: String,
    pub specialties: Vec<String>,
    pub summary: AttendanceSummary,
}

pub fn filter_window<'a>(
    slots: &'a [TimeSlot],
    window: AttendanceWindow,
    today: NaiveDate,
) -> impl Iterator<Item = &'a TimeSlot> {
    slots.iter().filter(move |s| window.contains(s.date, today))
}

pub fn rep_attendance(
    rep_id: &str,
    slots: &[TimeSlot],
    window: AttendanceWindow,
    today: NaiveDate,
) -> AttendanceSummary {
    let (attended, tracked) = filter_window(slots, window, today)
        .filter(|s| s.rep_id == rep_id && s.is_attendance_tracked())
        .fold((0usize, 0usize), |(attended, tracked), s| {
            (attended + usize::from(s.attended == Some(true)), tracked + 1)
        });

    let score = if tracked == 0 {
        0
    } else {
        (100.0 * attended as f64 / tracked as f64).round() as u8
    };

    AttendanceSummary {
        score,
        attended,
        tracked,
        tier: ReliabilityTier::classify(score, tracked),
    }
}

/// Tracked attendance for past slots, oldest first.
pub fn attendance_history(rep_id: &str, slots: &[TimeSlot], today: NaiveDate) -> Vec<AttendanceRecord> {
    let mut history: Vec<AttendanceRecord> = slots
        .iter()
        .filter(|s| s.rep_id == rep_id && s.date < today)
        .filter_map(|s| match (s.is_reserved(), s.attended) {
            (true, Some(attended)) => Some(AttendanceRecord { date: s.date, attended }),
            _ => None,
        })
        .collect();
    history.sort_by_key(|r| r.date);
    history
}

pub fn cohort_report(
    reps: &[Rep],
    slots: &[TimeSlot],
    window: AttendanceWindow,
    today: NaiveDate,
    sort: CohortSort,
) -> Vec<CohortRow> {
    let mut rows: Vec<CohortRow> = reps
        .iter()
        .map(|rep| CohortRow {
            rep_id: rep.id.clone(),
            name: rep.name.clone(),
            email: rep.email.clone(),
            specialties: rep.specialties.clone(),
            summary: rep_attendance(&rep.id, slots, window, today),
        })
        .collect();

    match sort {
        CohortSort::Name => rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        CohortSort::Score => rows.sort_by(|a, b| b.summary.score.cmp(&a.summary.score)),
    }
    rows
}

pub fn write_cohort_csv<W: Write>(rows: &[CohortRow], writer: W) -> SchedResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["name", "email", "score", "attended", "total", "specialties"])?;
    for row in rows {
        csv.write_record([
            row.name.clone(),
            row.email.clone(),
            row.summary.score.to_string(),
            row.summary.attended.to_string(),
            row.summary.tracked.to_string(),
            row.specialties.join("; "),
        ])?;
    }
    csv.flush()?;
    Ok(())
}
