//! Run and playback settings
//!
//! Tunables for the execution budgets and the animation cadence. Persisted
//! as JSON by hosts that want them configurable; every field has a default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::consts::{INSTRUCTION_BUDGET, STEP_BUDGET};
use crate::sim::RunOutcome;

/// Settings for executing and replaying a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Commands a program may issue before the run times out
    pub step_budget: u32,
    /// Interpreter instructions a program may execute before the run
    /// times out
    pub instruction_budget: u64,
    /// Frame delay during playback of a successful run, in milliseconds
    pub success_frame_ms: u64,
    /// Frame delay during playback of any other run
    pub failure_frame_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_budget: STEP_BUDGET,
            instruction_budget: INSTRUCTION_BUDGET,
            success_frame_ms: 50,
            failure_frame_ms: 75,
        }
    }
}

impl Settings {
    /// Playback delay between events for a run that ended in `outcome`
    pub fn frame_delay(&self, outcome: RunOutcome) -> Duration {
        let ms = if outcome == RunOutcome::Success {
            self.success_frame_ms
        } else {
            self.failure_frame_ms
        };
        Duration::from_millis(ms)
    }

    /// Parse settings from their JSON form. Missing fields take defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_plays_back_faster() {
        let settings = Settings::default();
        assert!(
            settings.frame_delay(RunOutcome::Success)
                < settings.frame_delay(RunOutcome::Error)
        );
        assert_eq!(
            settings.frame_delay(RunOutcome::Timeout),
            settings.frame_delay(RunOutcome::Failure)
        );
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings = Settings::from_json(r#"{"step_budget": 500}"#).unwrap();
        assert_eq!(settings.step_budget, 500);
        assert_eq!(settings.success_frame_ms, 50);
    }
}
