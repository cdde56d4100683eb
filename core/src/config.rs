use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the scheduling API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout at the HTTP client boundary.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token sent with every request, when present.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_timeout_secs() -> u64 { 30 }

/// Weights and boosts for the heuristic scorers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the skill match in gig confidence.
    pub skill_weight: f64,
    /// Weight of the historical preference in gig confidence.
    pub history_weight: f64,
    pub high_priority_boost: f64,
    pub medium_priority_boost: f64,
    /// Added to an hour's score when it falls in the rep's preferred window.
    pub preferred_hours_boost: f64,
    /// Days covered by the workload forecast.
    pub forecast_days: u32,
    /// Forecast hours for a weekday with no reserved history.
    pub default_forecast_hours: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            skill_weight:           0.7,
            history_weight:         0.3,
            high_priority_boost:    0.2,
            medium_priority_boost:  0.1,
            preferred_hours_boost:  0.2,
            forecast_days:          7,
            default_forecast_hours: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// How long a user-facing notice stays up before auto-dismissal.
    pub notice_ttl_secs: u64,
    /// Note attached to every slot committed from a time block.
    pub reservation_note: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            notice_ttl_secs:  3,
            reservation_note: "Reserved via time block".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl SchedConfig {
    /// Load from a JSON file.
    /// In tests, use SchedConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SchedConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.scoring.forecast_days == 0 {
            anyhow::bail!("{path}: scoring.forecast_days must be at least 1");
        }
        Ok(config)
    }

    /// Configuration pointing at a local API, default weights.
    pub fn default_test() -> Self {
        Self {
            api: ApiConfig {
                base_url:     "http://localhost:5000/api".to_string(),
                timeout_secs: default_timeout_secs(),
                auth_token:   None,
            },
            scoring: ScoringConfig::default(),
            planner: PlannerConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let json = r#"{ "api": { "base_url": "https://sched.example.com/api" },
                        "scoring": { "high_priority_boost": 0.25 } }"#;
        let config: SchedConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.scoring.high_priority_boost, 0.25);
        assert_eq!(config.scoring.skill_weight, 0.7);
        assert_eq!(config.planner.notice_ttl_secs, 3);
    }
}
