//! Shared primitive types used across the scheduling core.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a persisted (or client-generated) time slot.
pub type SlotId = String;

/// Identifier of a representative (an "agent" on the wire).
pub type RepId = String;

/// Identifier of a gig.
pub type GigId = String;

/// An hour-granularity time of day, rendered on the wire as `"HH:00"`.
///
/// Valid values are 0..=24; 24 only ever appears as an end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotHour(u8);

impl SlotHour {
    pub const MAX: u8 = 24;

    pub fn new(hour: u8) -> Option<Self> {
        (hour <= Self::MAX).then_some(Self(hour))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The following hour, saturating at 24.
    pub fn next(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    /// Parse `"H"`, `"HH:MM"` or `"H:MM"`, keeping only the hour component.
    pub fn parse(raw: &str) -> Option<Self> {
        let hour_part = raw.trim().split(':').next()?;
        let hour: u8 = hour_part.parse().ok()?;
        Self::new(hour)
    }
}

impl fmt::Display for SlotHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl Serialize for SlotHour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotHour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SlotHour::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid slot hour '{raw}'")))
    }
}

/// Which lens the schedule is presented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Rep,
    Company,
    Admin,
}
