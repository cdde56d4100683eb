//! Heuristic scoring engine.
//!
//! Four deterministic-given-the-RNG scorers over an in-memory slot history:
//!   1. Gig recommendations (skill overlap + booking history + priority)
//!   2. Optimal working hours (booking density + preferred window)
//!   3. Performance metrics (satisfaction, efficiency, quality)
//!   4. Workload forecast (weekday averaging over the lookback)
//!
//! No hidden state, nothing persisted. Quality and the forecast factor are
//! random and draw from the caller's ScoringRng only.

use crate::{
    config::ScoringConfig,
    model::{Gig, GigPriority, Rep, TimeSlot},
    rng::ScoringRng,
    types::GigId,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const HOURS_PER_DAY: usize = 24;

/// The ÷4 in the forecast: matching slots per weekday are spread over
/// roughly four weeks of lookback.
const LOOKBACK_WEEKS: f64 = 4.0;

const FORECAST_JITTER: (f64, f64) = (0.9, 1.1);
const QUALITY_RANGE: (f64, f64) = (70.0, 100.0);

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GigRecommendation {
    pub gig_id: GigId,
    pub gig_name: String,
    pub confidence: f64,
    pub skill_match: f64,
    pub historical_preference: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourScore {
    pub hour: u8,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Satisfaction,
    Efficiency,
    Quality,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub kind: MetricKind,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadPrediction {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub predicted_hours: u32,
    /// Historical reserved slots that fell on this weekday.
    pub sample_size: usize,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn reserved_for<'a>(rep_id: &'a str, history: &'a [TimeSlot]) -> impl Iterator<Item = &'a TimeSlot> {
    history.iter().filter(move |s| s.rep_id == rep_id && s.is_reserved())
}

/// Case-insensitive containment either way round.
fn skill_matches(skill: &str, specialties: &[String]) -> bool {
    let skill = skill.to_lowercase();
    specialties.iter().any(|s| {
        let s = s.to_lowercase();
        s.contains(&skill) || skill.contains(&s)
    })
}

fn priority_boost(priority: GigPriority, config: &ScoringConfig) -> f64 {
    match priority {
        GigPriority::High => config.high_priority_boost,
        GigPriority::Medium => config.medium_priority_boost,
        GigPriority::Low => 0.0,
    }
}

fn reason_for(skill_match: f64, historical_preference: f64) -> &'static str {
    if skill_match > 0.7 {
        "Strong skill match with your expertise"
    } else if historical_preference > 0.3 {
        "Based on your previous gig history"
    } else {
        "New opportunity that might match your skills"
    }
}

// ── Scorers ──────────────────────────────────────────────────────────────────

/// Rank `gigs` for `rep`, most confident first. Ties keep input order.
pub fn recommend_gigs(
    rep: &Rep,
    gigs: &[Gig],
    history: &[TimeSlot],
    config: &ScoringConfig,
) -> Vec<GigRecommendation> {
    let with_gig: Vec<&TimeSlot> = reserved_for(&rep.id, history)
        .filter(|s| s.gig_id.is_some())
        .collect();

    let mut recommendations: Vec<GigRecommendation> = gigs
        .iter()
        .map(|gig| {
            let matched = gig
                .skills
                .iter()
                .filter(|skill| skill_matches(skill, &rep.specialties))
                .count();
            let skill_match = matched as f64 / gig.skills.len().max(1) as f64;

            let historical_preference = if with_gig.is_empty() {
                0.0
            } else {
                let on_gig = with_gig
                    .iter()
                    .filter(|s| s.gig_id.as_deref() == Some(gig.id.as_str()))
                    .count();
                on_gig as f64 / with_gig.len() as f64
            };

            let confidence = (config.skill_weight * skill_match
                + config.history_weight * historical_preference
                + priority_boost(gig.priority, config))
            .clamp(0.0, 1.0);

            GigRecommendation {
                gig_id: gig.id.clone(),
                gig_name: gig.name.clone(),
                confidence,
                skill_match,
                historical_preference,
                reason: reason_for(skill_match, historical_preference).to_string(),
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    recommendations
}

/// Score every hour of the day by how often `rep` has booked it.
/// Always returns 24 entries, hour 0 first.
pub fn predict_optimal_times(
    rep: &Rep,
    history: &[TimeSlot],
    config: &ScoringConfig,
) -> Vec<HourScore> {
    let mut buckets = [0usize; HOURS_PER_DAY];
    let mut total = 0usize;
    for slot in reserved_for(&rep.id, history) {
        let hour = slot.start_time.value() as usize;
        if hour < HOURS_PER_DAY {
            buckets[hour] += 1;
            total += 1;
        }
    }

    (0..HOURS_PER_DAY as u8)
        .map(|hour| {
            let density = if total == 0 {
                0.0
            } else {
                buckets[hour as usize] as f64 / total as f64
            };
            let boost = match rep.preferred_hours {
                Some(window) if window.contains(hour) => config.preferred_hours_boost,
                _ => 0.0,
            };
            HourScore { hour, score: (density + boost).min(1.0) }
        })
        .collect()
}

/// Satisfaction, efficiency and quality, in that order.
///
/// Quality is a uniform draw from [70, 100): callers must not expect a
/// stable value across RNG seeds.
pub fn performance_metrics(
    rep: &Rep,
    history: &[TimeSlot],
    rng: &mut ScoringRng,
) -> Vec<PerformanceMetric> {
    let reserved: Vec<&TimeSlot> = reserved_for(&rep.id, history).collect();

    let (satisfaction, efficiency, quality) = if reserved.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let unique_gigs: HashSet<&str> =
            reserved.iter().filter_map(|s| s.gig_id.as_deref()).collect();
        let with_notes = reserved.iter().filter(|s| s.has_notes()).count();
        (
            (unique_gigs.len() as f64 * 20.0).min(100.0),
            ((reserved.len() + with_notes) as f64 * 5.0).min(100.0),
            rng.uniform(QUALITY_RANGE.0, QUALITY_RANGE.1),
        )
    };

    vec![
        PerformanceMetric { kind: MetricKind::Satisfaction, value: satisfaction },
        PerformanceMetric { kind: MetricKind::Efficiency, value: efficiency },
        PerformanceMetric { kind: MetricKind::Quality, value: quality },
    ]
}

/// Predict hours for each of the `days` days starting at `today`.
pub fn forecast_workload(
    history: &[TimeSlot],
    today: NaiveDate,
    days: u32,
    config: &ScoringConfig,
    rng: &mut ScoringRng,
) -> Vec<WorkloadPrediction> {
    (0..days)
        .map(|offset| {
            let date = today + Duration::days(offset as i64);
            let weekday = date.weekday();

            let matching: Vec<&TimeSlot> = history
                .iter()
                .filter(|s| s.is_reserved() && s.date.weekday() == weekday)
                .collect();

            let avg_hours = if matching.is_empty() {
                config.default_forecast_hours
            } else {
                let total: u32 = matching.iter().map(|s| s.duration).sum();
                total as f64 / (matching.len() as f64 / LOOKBACK_WEEKS).max(1.0)
            };

            let factor = rng.uniform(FORECAST_JITTER.0, FORECAST_JITTER.1);
            WorkloadPrediction {
                date,
                weekday,
                predicted_hours: (avg_hours * factor).round().max(0.0) as u32,
                sample_size: matching.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_match_is_case_insensitive_both_ways() {
        let specialties = vec!["Technical Support".to_string(), "sales".to_string()];
        assert!(skill_matches("technical support", &specialties));
        assert!(skill_matches("Support", &specialties));
        assert!(skill_matches("Outbound Sales", &specialties));
        assert!(!skill_matches("Billing", &specialties));
    }

    #[test]
    fn reasons_follow_first_matching_rule() {
        assert_eq!(reason_for(0.8, 0.9), "Strong skill match with your expertise");
        assert_eq!(reason_for(0.7, 0.31), "Based on your previous gig history");
        assert_eq!(reason_for(0.5, 0.3), "New opportunity that might match your skills");
    }
}
