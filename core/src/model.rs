//! Scheduling data model: time slots, representatives, gigs, drafts.

use crate::types::{GigId, RepId, SlotHour, SlotId};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// ── Time slots ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Reserved,
    Cancelled,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "available" => Some(Self::Available),
            "reserved" => Some(Self::Reserved),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// The central entity. `duration` is advisory metadata supplied by whoever
/// created the slot; it is never recomputed from start/end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(alias = "_id")]
    pub id: SlotId,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    pub start_time: SlotHour,
    pub end_time: SlotHour,
    pub duration: u32,
    pub status: SlotStatus,
    #[serde(alias = "agentId")]
    pub rep_id: RepId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gig_id: Option<GigId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `None` means attendance was never recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_notes: Option<String>,
}

impl TimeSlot {
    /// A fresh available slot with a client-generated id.
    pub fn new_available(rep_id: &str, date: NaiveDate, start: SlotHour, end: SlotHour) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            start_time: start,
            end_time: end,
            duration: end.value().saturating_sub(start.value()) as u32,
            status: SlotStatus::Available,
            rep_id: rep_id.to_string(),
            gig_id: None,
            notes: None,
            attended: None,
            attendance_notes: None,
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.status == SlotStatus::Reserved
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SlotStatus::Cancelled
    }

    /// Reserved and carrying an attendance flag, either way.
    pub fn is_attendance_tracked(&self) -> bool {
        self.is_reserved() && self.attended.is_some()
    }

    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// Dates arrive either as `YYYY-MM-DD` or as a full ISO timestamp.
/// Only the calendar day is kept.
mod wire_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        let day = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| de::Error::custom(format!("invalid slot date '{raw}': {e}")))
    }
}

// ── Representatives ───────────────────────────────────────────────────────────

/// Half-open `[start, end)` window of hours the rep prefers to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredHours {
    pub start: u8,
    pub end: u8,
}

impl PreferredHours {
    pub fn contains(&self, hour: u8) -> bool {
        hour >= self.start && hour < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub attended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rep {
    #[serde(alias = "_id")]
    pub id: RepId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub performance_score: Option<f64>,
    #[serde(default)]
    pub preferred_hours: Option<PreferredHours>,
    #[serde(default)]
    pub attendance_score: Option<f64>,
    #[serde(default)]
    pub attendance_history: Vec<AttendanceRecord>,
}

impl Rep {
    pub fn new(id: &str, name: &str, email: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: None,
            specialties: Vec::new(),
            performance_score: None,
            preferred_hours: None,
            attendance_score: None,
            attendance_history: Vec::new(),
        }
    }

    pub fn with_specialties<I, S>(mut self, specialties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specialties = specialties.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferred_hours(mut self, start: u8, end: u8) -> Self {
        self.preferred_hours = Some(PreferredHours { start, end });
        self
    }
}

// ── Gigs ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub day: Weekday,
    pub start: u8,
    pub end: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    #[serde(alias = "_id")]
    pub id: GigId,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub priority: GigPriority,
    #[serde(default)]
    pub availability: Option<Vec<AvailabilityWindow>>,
}

impl Gig {
    pub fn new(id: &str, name: &str, priority: GigPriority) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            company: String::new(),
            color: String::new(),
            skills: Vec::new(),
            priority,
            availability: None,
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

// ── Drafts ────────────────────────────────────────────────────────────────────

/// An unpersisted candidate slot staged during range selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSlot {
    pub id: SlotId,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    pub start_time: SlotHour,
    pub end_time: SlotHour,
    pub duration: u32,
    pub rep_id: RepId,
}

impl DraftSlot {
    /// A one-hour draft starting at `start`.
    pub fn one_hour(rep_id: &str, date: NaiveDate, start: SlotHour) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            start_time: start,
            end_time: start.next(),
            duration: 1,
            rep_id: rep_id.to_string(),
        }
    }

    /// Same calendar day and start hour.
    pub fn occupies(&self, date: NaiveDate, start: SlotHour) -> bool {
        self.date == date && self.start_time == start
    }

    /// Promote to a reserved slot for `gig_id`.
    pub fn into_reserved(self, gig_id: &str, note: &str) -> TimeSlot {
        TimeSlot {
            id: self.id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
            status: SlotStatus::Reserved,
            rep_id: self.rep_id,
            gig_id: Some(gig_id.to_string()),
            notes: Some(note.to_string()),
            attended: None,
            attendance_notes: None,
        }
    }
}

// ── Enrollment ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Enrolled,
    Pending,
    Rejected,
    Removed,
    #[serde(other)]
    Other,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Removed => "removed",
            Self::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "enrolled" => Self::Enrolled,
            "pending" => Self::Pending,
            "rejected" => Self::Rejected,
            "removed" => Self::Removed,
            _ => Self::Other,
        }
    }
}

/// One agent's enrollment in one gig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub gig_id: GigId,
    #[serde(alias = "repId")]
    pub agent_id: RepId,
    pub status: EnrollmentStatus,
}
