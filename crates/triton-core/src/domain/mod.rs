pub mod errors;

pub use errors::{ParserResult, TritonError, TritonErrorCategory, TritonResult};

use crate::common::constants::{
    LOSS_COEFFICIENT_MAX, LOSS_COEFFICIENT_MIN, RAINWATER_REPLACEMENT_PERCENT_MAX,
    RAINWATER_REPLACEMENT_PERCENT_MIN,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Saturates `value` into `[lower, upper]`, inclusive.
pub fn saturate<T: PartialOrd>(value: T, lower: T, upper: T) -> T {
    if value < lower {
        lower
    } else if value > upper {
        upper
    } else {
        value
    }
}

/// Parameters typed into the simulator during a fresh configuration.
///
/// The rainwater replacement percentage and the loss coefficient are
/// saturated to the ranges the simulator accepts; out-of-range values are
/// corrected, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParametersFile")]
pub struct SimulationParameters {
    initial_runoff_disposal: f64,
    catchment_area: f64,
    daily_water_demand: f64,
    residents: u32,
    rainwater_replacement_percentage: u32,
    loss_coefficient: f64,
    lower_tank_capacity: f64,
}

impl SimulationParameters {
    pub fn new(
        initial_runoff_disposal: f64,
        catchment_area: f64,
        daily_water_demand: f64,
        residents: u32,
        rainwater_replacement_percentage: u32,
        loss_coefficient: f64,
        lower_tank_capacity: f64,
    ) -> Self {
        Self {
            initial_runoff_disposal,
            catchment_area,
            daily_water_demand,
            residents,
            rainwater_replacement_percentage: saturate(
                rainwater_replacement_percentage,
                RAINWATER_REPLACEMENT_PERCENT_MIN,
                RAINWATER_REPLACEMENT_PERCENT_MAX,
            ),
            loss_coefficient: saturate(
                loss_coefficient,
                LOSS_COEFFICIENT_MIN,
                LOSS_COEFFICIENT_MAX,
            ),
            lower_tank_capacity,
        }
    }

    pub fn initial_runoff_disposal(&self) -> f64 {
        self.initial_runoff_disposal
    }

    pub fn catchment_area(&self) -> f64 {
        self.catchment_area
    }

    pub fn daily_water_demand(&self) -> f64 {
        self.daily_water_demand
    }

    pub fn residents(&self) -> u32 {
        self.residents
    }

    pub fn rainwater_replacement_percentage(&self) -> u32 {
        self.rainwater_replacement_percentage
    }

    pub fn loss_coefficient(&self) -> f64 {
        self.loss_coefficient
    }

    pub fn lower_tank_capacity(&self) -> f64 {
        self.lower_tank_capacity
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        ParametersFile::default().into()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ParametersFile {
    initial_runoff_disposal: f64,
    catchment_area: f64,
    daily_water_demand: f64,
    residents: u32,
    rainwater_replacement_percentage: u32,
    loss_coefficient: f64,
    lower_tank_capacity: f64,
}

impl Default for ParametersFile {
    fn default() -> Self {
        Self {
            initial_runoff_disposal: 2.0,
            catchment_area: 50.0,
            daily_water_demand: 603.0,
            residents: 1,
            rainwater_replacement_percentage: 40,
            loss_coefficient: 0.8,
            lower_tank_capacity: 150.0,
        }
    }
}

impl From<ParametersFile> for SimulationParameters {
    fn from(file: ParametersFile) -> Self {
        Self::new(
            file.initial_runoff_disposal,
            file.catchment_area,
            file.daily_water_demand,
            file.residents,
            file.rainwater_replacement_percentage,
            file.loss_coefficient,
            file.lower_tank_capacity,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    PotentialSavings,
    AverageRainwaterConsumption,
    AverageDrinkingWaterConsumption,
    AverageRainwaterOverflow,
    PeriodWhenDemandIsFullyMet,
    PeriodWhenDemandIsPartiallyMet,
    PeriodWhenDemandIsNotMet,
}

impl Metric {
    /// Order in which the simulator exports its results.
    pub const ALL: [Metric; 7] = [
        Self::PotentialSavings,
        Self::AverageRainwaterConsumption,
        Self::AverageDrinkingWaterConsumption,
        Self::AverageRainwaterOverflow,
        Self::PeriodWhenDemandIsFullyMet,
        Self::PeriodWhenDemandIsPartiallyMet,
        Self::PeriodWhenDemandIsNotMet,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::PotentialSavings => "potential_savings",
            Self::AverageRainwaterConsumption => "average_rainwater_consumption",
            Self::AverageDrinkingWaterConsumption => "average_drinking_water_consumption",
            Self::AverageRainwaterOverflow => "average_rainwater_overflow",
            Self::PeriodWhenDemandIsFullyMet => "period_when_demand_is_fully_met",
            Self::PeriodWhenDemandIsPartiallyMet => "period_when_demand_is_partially_met",
            Self::PeriodWhenDemandIsNotMet => "period_when_demand_is_not_met",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::PotentialSavings
            | Self::PeriodWhenDemandIsPartiallyMet
            | Self::PeriodWhenDemandIsNotMet => "%",
            Self::AverageRainwaterConsumption
            | Self::AverageDrinkingWaterConsumption
            | Self::AverageRainwaterOverflow => "liters/day",
            Self::PeriodWhenDemandIsFullyMet => "days",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub label: String,
    pub unit: String,
    pub value: f64,
}

impl Variable {
    pub fn new(label: impl Into<String>, unit: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
            value,
        }
    }
}

/// The seven results of one simulation, bound to [`Metric::ALL`] by position.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResultSet {
    pub potential_savings: Variable,
    pub average_rainwater_consumption: Variable,
    pub average_drinking_water_consumption: Variable,
    pub average_rainwater_overflow: Variable,
    pub period_when_demand_is_fully_met: Variable,
    pub period_when_demand_is_partially_met: Variable,
    pub period_when_demand_is_not_met: Variable,
}

impl SimulationResultSet {
    pub fn from_ordered(rows: [(String, f64); 7]) -> Self {
        let [
            potential_savings,
            average_rainwater_consumption,
            average_drinking_water_consumption,
            average_rainwater_overflow,
            period_when_demand_is_fully_met,
            period_when_demand_is_partially_met,
            period_when_demand_is_not_met,
        ] = rows;
        let bind = |metric: Metric, (label, value): (String, f64)| {
            Variable::new(label, metric.unit(), value)
        };

        Self {
            potential_savings: bind(Metric::PotentialSavings, potential_savings),
            average_rainwater_consumption: bind(
                Metric::AverageRainwaterConsumption,
                average_rainwater_consumption,
            ),
            average_drinking_water_consumption: bind(
                Metric::AverageDrinkingWaterConsumption,
                average_drinking_water_consumption,
            ),
            average_rainwater_overflow: bind(
                Metric::AverageRainwaterOverflow,
                average_rainwater_overflow,
            ),
            period_when_demand_is_fully_met: bind(
                Metric::PeriodWhenDemandIsFullyMet,
                period_when_demand_is_fully_met,
            ),
            period_when_demand_is_partially_met: bind(
                Metric::PeriodWhenDemandIsPartiallyMet,
                period_when_demand_is_partially_met,
            ),
            period_when_demand_is_not_met: bind(
                Metric::PeriodWhenDemandIsNotMet,
                period_when_demand_is_not_met,
            ),
        }
    }

    pub fn get(&self, metric: Metric) -> &Variable {
        match metric {
            Metric::PotentialSavings => &self.potential_savings,
            Metric::AverageRainwaterConsumption => &self.average_rainwater_consumption,
            Metric::AverageDrinkingWaterConsumption => &self.average_drinking_water_consumption,
            Metric::AverageRainwaterOverflow => &self.average_rainwater_overflow,
            Metric::PeriodWhenDemandIsFullyMet => &self.period_when_demand_is_fully_met,
            Metric::PeriodWhenDemandIsPartiallyMet => &self.period_when_demand_is_partially_met,
            Metric::PeriodWhenDemandIsNotMet => &self.period_when_demand_is_not_met,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &Variable)> + '_ {
        Metric::ALL.into_iter().map(|metric| (metric, self.get(metric)))
    }

    pub fn to_rows(&self, metadata: &InputFileMetadata) -> Vec<ResultRow> {
        self.iter()
            .map(|(metric, variable)| ResultRow {
                location: metadata.location.clone(),
                model: metadata.model.clone(),
                scenario: metadata.scenario.clone(),
                metric_key: metric.key().to_string(),
                label: variable.label.clone(),
                value: variable.value,
                unit: variable.unit.clone(),
            })
            .collect()
    }
}

/// Identifiers encoded in a precipitation file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFileMetadata {
    pub location: String,
    pub model: String,
    pub scenario: String,
}

impl InputFileMetadata {
    pub fn new(
        location: impl Into<String>,
        model: impl Into<String>,
        scenario: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            model: model.into(),
            scenario: scenario.into(),
        }
    }
}

impl Display for InputFileMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.location, self.model, self.scenario)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub location: String,
    pub model: String,
    pub scenario: String,
    pub metric_key: String,
    pub label: String,
    pub value: f64,
    pub unit: String,
}

/// One simulator run requested from a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationRun {
    pub input_path: PathBuf,
    pub start_date: String,
}

impl SimulationRun {
    pub fn new(input_path: impl Into<PathBuf>, start_date: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            start_date: start_date.into(),
        }
    }
}

/// Whether the simulator holds a usable configuration for the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverMode {
    /// Freshly (re)launched; every field must be typed in again.
    #[default]
    Fresh,
    /// Configured by a previous run; only the input file and date change.
    Warm,
}

impl DriverMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Warm => "warm",
        }
    }
}

impl Display for DriverMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InputFileMetadata, Metric, SimulationParameters, SimulationResultSet, saturate,
    };

    #[test]
    fn saturate_returns_nearest_bound_outside_range() {
        assert_eq!(saturate(0.05, 0.1, 1.0), 0.1);
        assert_eq!(saturate(1.7, 0.1, 1.0), 1.0);
        assert_eq!(saturate(0.5, 0.1, 1.0), 0.5);
        assert_eq!(saturate(0.1, 0.1, 1.0), 0.1);
        assert_eq!(saturate(1.0, 0.1, 1.0), 1.0);
        assert_eq!(saturate(5_u32, 10, 100), 10);
        assert_eq!(saturate(250_u32, 10, 100), 100);
        assert_eq!(saturate(40_u32, 10, 100), 40);
    }

    #[test]
    fn parameters_clamp_bounded_fields_on_construction() {
        let parameters = SimulationParameters::new(2.0, 50.0, 603.0, 1, 5, 1.4, 150.0);
        assert_eq!(parameters.rainwater_replacement_percentage(), 10);
        assert_eq!(parameters.loss_coefficient(), 1.0);

        let parameters = SimulationParameters::new(2.0, 50.0, 603.0, 1, 120, 0.0, 150.0);
        assert_eq!(parameters.rainwater_replacement_percentage(), 100);
        assert_eq!(parameters.loss_coefficient(), 0.1);
    }

    #[test]
    fn parameters_deserialize_with_defaults_and_clamping() {
        let parameters: SimulationParameters =
            serde_json::from_str(r#"{ "catchment_area": 80.5, "loss_coefficient": 3.0 }"#)
                .expect("partial parameters should deserialize");
        assert_eq!(parameters.catchment_area(), 80.5);
        assert_eq!(parameters.loss_coefficient(), 1.0);
        assert_eq!(parameters.daily_water_demand(), 603.0);
        assert_eq!(parameters.rainwater_replacement_percentage(), 40);
    }

    #[test]
    fn parameters_reject_unknown_fields() {
        let result = serde_json::from_str::<SimulationParameters>(r#"{ "catchment": 1.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn result_set_flattens_in_metric_order() {
        let rows = Metric::ALL.map(|metric| (format!("label {}", metric.key()), 1.5));
        let results = SimulationResultSet::from_ordered(rows);
        let metadata = InputFileMetadata::new("Curitiba", "ACCESS-CM2", "SSP245");

        let flattened = results.to_rows(&metadata);
        assert_eq!(flattened.len(), 7);
        for (row, metric) in flattened.iter().zip(Metric::ALL) {
            assert_eq!(row.metric_key, metric.key());
            assert_eq!(row.unit, metric.unit());
            assert_eq!(row.location, "Curitiba");
            assert_eq!(row.scenario, "SSP245");
        }
        assert_eq!(flattened[4].unit, "days");
        assert_eq!(flattened[1].unit, "liters/day");
    }
}
