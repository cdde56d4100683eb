//! SQLite-backed slot store.
//!
//! Mirrors the remote API's contract closely enough to stand in for it
//! in tests and offline runs: upsert by id, soft cancel, hard delete.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::{EnrollmentDirectory, SlotQuery, SlotStore, SlotUpsert};
use crate::{
    error::{SchedError, SchedResult},
    model::{EnrollmentRecord, EnrollmentStatus, SlotStatus, TimeSlot},
    types::SlotHour,
};

const SLOT_COLUMNS: &str = "id, rep_id, gig_id, date, start_hour, end_hour, duration,
                            status, notes, attended, attendance_notes";

pub struct SqliteSlotStore {
    conn: Mutex<Connection>,
}

/// A time_slot row before domain validation.
struct SlotRow {
    id: String,
    rep_id: String,
    gig_id: Option<String>,
    date: String,
    start_hour: i64,
    end_hour: i64,
    duration: i64,
    status: String,
    notes: Option<String>,
    attended: Option<bool>,
    attendance_notes: Option<String>,
}

impl SlotRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            rep_id: row.get(1)?,
            gig_id: row.get(2)?,
            date: row.get(3)?,
            start_hour: row.get(4)?,
            end_hour: row.get(5)?,
            duration: row.get(6)?,
            status: row.get(7)?,
            notes: row.get(8)?,
            attended: row.get(9)?,
            attendance_notes: row.get(10)?,
        })
    }

    fn into_slot(self) -> SchedResult<TimeSlot> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("slot {}: bad date '{}': {e}", self.id, self.date))?;
        let status = SlotStatus::parse(&self.status)
            .ok_or_else(|| anyhow::anyhow!("slot {}: bad status '{}'", self.id, self.status))?;
        Ok(TimeSlot {
            date,
            start_time: hour(self.start_hour)?,
            end_time: hour(self.end_hour)?,
            duration: self.duration.max(0) as u32,
            status,
            rep_id: self.rep_id,
            gig_id: self.gig_id,
            notes: self.notes,
            attended: self.attended,
            attendance_notes: self.attendance_notes,
            id: self.id,
        })
    }
}

fn hour(raw: i64) -> SchedResult<SlotHour> {
    u8::try_from(raw)
        .ok()
        .and_then(SlotHour::new)
        .ok_or_else(|| SchedError::InvalidHour(raw.to_string()))
}

impl SqliteSlotStore {
    /// Open (or create) the store database at `path`.
    pub fn open(path: &str) -> SchedResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SchedResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SchedResult<()> {
        self.conn()?
            .execute_batch(include_str!("../../../migrations/001_time_slots.sql"))?;
        Ok(())
    }

    fn conn(&self) -> SchedResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SchedError::Other(anyhow::anyhow!("slot store connection poisoned")))
    }

    // ── Slots ─────────────────────────────────────────────────────────

    fn find_slot(conn: &Connection, id: &str) -> SchedResult<Option<TimeSlot>> {
        let row = conn
            .query_row(
                &format!("SELECT {SLOT_COLUMNS} FROM time_slot WHERE id = ?1"),
                params![id],
                SlotRow::from_row,
            )
            .optional()?;
        row.map(SlotRow::into_slot).transpose()
    }

    fn write_slot(conn: &Connection, slot: &TimeSlot) -> SchedResult<()> {
        conn.execute(
            "INSERT INTO time_slot (
                id, rep_id, gig_id, date, start_hour, end_hour, duration,
                status, notes, attended, attendance_notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                rep_id = excluded.rep_id,
                gig_id = excluded.gig_id,
                date = excluded.date,
                start_hour = excluded.start_hour,
                end_hour = excluded.end_hour,
                duration = excluded.duration,
                status = excluded.status,
                notes = excluded.notes,
                attended = excluded.attended,
                attendance_notes = excluded.attendance_notes",
            params![
                &slot.id,
                &slot.rep_id,
                &slot.gig_id,
                slot.date.format("%Y-%m-%d").to_string(),
                slot.start_time.value() as i64,
                slot.end_time.value() as i64,
                slot.duration as i64,
                slot.status.as_str(),
                &slot.notes,
                slot.attended,
                &slot.attendance_notes,
            ],
        )?;
        Ok(())
    }

    /// Total rows, cancelled included (for tests).
    pub fn slot_count(&self) -> SchedResult<i64> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM time_slot", [], |row| row.get(0))?;
        Ok(count)
    }

    // ── Enrollment ────────────────────────────────────────────────────

    pub fn insert_enrollment(&self, record: &EnrollmentRecord) -> SchedResult<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO gig_agent (gig_id, agent_id, status) VALUES (?1, ?2, ?3)",
            params![&record.gig_id, &record.agent_id, record.status.as_str()],
        )?;
        Ok(())
    }

    fn enrollments_where(
        &self,
        clause: &str,
        args: &[&str],
    ) -> SchedResult<Vec<EnrollmentRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT gig_id, agent_id, status FROM gig_agent WHERE {clause}
             ORDER BY gig_id, agent_id"
        ))?;
        let records = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(EnrollmentRecord {
                    gig_id: row.get(0)?,
                    agent_id: row.get(1)?,
                    status: EnrollmentStatus::parse(&row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[async_trait]
impl SlotStore for SqliteSlotStore {
    async fn get_time_slots(&self, query: &SlotQuery) -> SchedResult<Vec<TimeSlot>> {
        let mut clauses = Vec::new();
        let mut args: Vec<String> = Vec::new();
        if let Some(rep_id) = &query.rep_id {
            args.push(rep_id.clone());
            clauses.push(format!("rep_id = ?{}", args.len()));
        }
        if let Some(gig_id) = &query.gig_id {
            args.push(gig_id.clone());
            clauses.push(format!("gig_id = ?{}", args.len()));
        }
        if let Some(date) = query.date {
            args.push(date.format("%Y-%m-%d").to_string());
            clauses.push(format!("date = ?{}", args.len()));
        }
        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SLOT_COLUMNS} FROM time_slot {filter} ORDER BY date, start_hour, id"
        ))?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), SlotRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(SlotRow::into_slot).collect()
    }

    async fn upsert_time_slot(&self, upsert: &SlotUpsert) -> SchedResult<TimeSlot> {
        let conn = self.conn()?;
        let slot = match upsert {
            SlotUpsert::Create(slot) => slot.clone(),
            SlotUpsert::Update { id, changes } => {
                let mut slot = Self::find_slot(&conn, id)?
                    .ok_or_else(|| SchedError::SlotNotFound { id: id.clone() })?;
                changes.apply_to(&mut slot);
                slot
            }
        };
        Self::write_slot(&conn, &slot)?;
        log::debug!("upserted slot {} ({})", slot.id, slot.status.as_str());
        Ok(slot)
    }

    async fn cancel_time_slot(&self, id: &str) -> SchedResult<TimeSlot> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE time_slot SET status = ?1 WHERE id = ?2",
            params![SlotStatus::Cancelled.as_str(), id],
        )?;
        if updated == 0 {
            return Err(SchedError::SlotNotFound { id: id.to_string() });
        }
        Self::find_slot(&conn, id)?.ok_or_else(|| SchedError::SlotNotFound { id: id.to_string() })
    }

    async fn delete_time_slot(&self, id: &str) -> SchedResult<()> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM time_slot WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(SchedError::SlotNotFound { id: id.to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentDirectory for SqliteSlotStore {
    async fn agent_enrollments(&self, rep_id: &str) -> SchedResult<Vec<EnrollmentRecord>> {
        self.enrollments_where("agent_id = ?1", &[rep_id])
    }

    async fn gig_roster(&self, gig_id: &str) -> SchedResult<Vec<EnrollmentRecord>> {
        self.enrollments_where(
            "gig_id = ?1 AND status = ?2",
            &[gig_id, EnrollmentStatus::Enrolled.as_str()],
        )
    }
}
