//! Planner events and user-facing notices.
//!
//! Every state change the planner makes is recorded as a PlannerEvent.
//! Notices are the transient messages a view shows and auto-dismisses.

use crate::types::{SlotHour, SlotId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannerEvent {
    SlotsLoaded {
        count: usize,
    },
    ScopeChanged {
        rep_id: String,
        date:   NaiveDate,
    },
    DraftsChanged {
        pending: usize,
        start:   Option<SlotHour>,
        end:     Option<SlotHour>,
    },
    BlockReserved {
        count: usize,
        gig_id: String,
    },
    SlotAdded {
        slot_id: SlotId,
    },
    SlotCancelled {
        slot_id: SlotId,
    },
    AttendanceMarked {
        slot_id:  SlotId,
        attended: bool,
    },
    StoreCallFailed {
        operation: String,
        error:     String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message. The view dismisses it after `ttl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind:    NoticeKind,
    pub message: String,
    pub ttl:     Duration,
}

impl Notice {
    pub fn success(message: impl Into<String>, ttl: Duration) -> Self {
        Self { kind: NoticeKind::Success, message: message.into(), ttl }
    }

    pub fn error(message: impl Into<String>, ttl: Duration) -> Self {
        Self { kind: NoticeKind::Error, message: message.into(), ttl }
    }
}
