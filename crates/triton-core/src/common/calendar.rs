//! Scenario-dependent start dates typed into the simulator.

use super::constants::{FALLBACK_START_DATE, SCENARIO_START_DATES};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCalendar {
    entries: Vec<(String, String)>,
    fallback: String,
}

impl ScenarioCalendar {
    pub fn new(entries: Vec<(String, String)>, fallback: impl Into<String>) -> Self {
        Self {
            entries,
            fallback: fallback.into(),
        }
    }

    pub fn start_date(&self, scenario: &str) -> &str {
        let normalized = scenario.trim().to_lowercase();
        match self
            .entries
            .iter()
            .find(|(candidate, _)| candidate.to_lowercase() == normalized)
        {
            Some((_, date)) => date,
            None => {
                warn!(
                    "Unknown scenario '{}', using fallback start date {}",
                    scenario, self.fallback
                );
                &self.fallback
            }
        }
    }
}

impl Default for ScenarioCalendar {
    fn default() -> Self {
        Self::new(
            SCENARIO_START_DATES
                .iter()
                .map(|(scenario, date)| (scenario.to_string(), date.to_string()))
                .collect(),
            FALLBACK_START_DATE,
        )
    }
}
