//! Array Configuration Optimizer
//!
//! Brute-force search over series × parallel wiring combinations for the
//! configuration with the fewest panels that meets a target power while
//! staying within the inverter's string limits and the available roof area.
//!
//! The series limit is set by the cold open-circuit voltage (Voc rises as
//! cells cool) and the parallel limit by the hot short-circuit current, so
//! both limits come from the temperature-adjusted electrical model rather
//! than the STC datasheet values.

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::error::CalcError;
use crate::panel::{temperature_adjusted, InverterSpec, PanelSpec, TemperatureData, ThermalEnvelope};

// ===================== TYPES =====================

/// A string wiring layout: panels per string × parallel strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArrayConfiguration {
    /// Panels wired in series per string
    pub series_per_string: u32,
    /// Number of parallel strings
    pub parallel_strings: u32,
}

impl ArrayConfiguration {
    pub fn total_panels(&self) -> u32 {
        self.series_per_string * self.parallel_strings
    }
}

/// Result of a successful configuration search.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArrayDesign {
    /// The winning wiring layout
    pub configuration: ArrayConfiguration,
    /// Series limit imposed by the inverter's max string voltage
    pub max_panels_in_series: u32,
    /// Parallel limit imposed by the inverter's max string current
    pub max_parallel_strings: u32,
    /// Panel count the search had to reach
    pub target_panel_count: u32,
    /// Temperature-adjusted electrical values the limits were derived from
    pub temperature: TemperatureData,
    /// Number of candidate layouts examined
    pub evaluations: usize,
}

/// Why no admissible configuration exists.
///
/// Replaces the zero-panel sentinel of naive implementations: callers get
/// the constraint that failed and the numbers that triggered it.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum Infeasibility {
    #[error(
        "cold open-circuit voltage ({voltage_at_min_temp:.1} V) exceeds the \
         inverter string limit ({max_string_voltage:.1} V); no panel fits in series"
    )]
    ColdVoltageExceedsStringLimit { voltage_at_min_temp: f64, max_string_voltage: f64 },

    #[error(
        "hot short-circuit current ({current_at_max_temp:.2} A) exceeds the \
         inverter string limit ({max_string_current:.2} A); no string fits"
    )]
    HotCurrentExceedsStringLimit { current_at_max_temp: f64, max_string_current: f64 },

    #[error("roof area {roof_area_m2:.1} m² cannot hold a single {panel_area_m2:.2} m² panel")]
    RoofAreaTooSmall { roof_area_m2: f64, panel_area_m2: f64 },

    #[error(
        "no layout reaches {target_panels} panels within the limits \
         ({max_series} in series × {max_parallel} strings, {max_by_area} panels by area)"
    )]
    NoAdmissibleConfiguration {
        target_panels: u32,
        max_series: u32,
        max_parallel: u32,
        max_by_area: u32,
    },
}

// ===================== SEARCH =====================

/// Find the admissible configuration with the fewest total panels.
///
/// Exhaustive search over `series ∈ [1, max_series]` × `parallel ∈
/// [1, max_parallel]`. A candidate is admissible when its panel count
/// reaches the target count and fits the roof. Ties on total panel count
/// are broken by iteration order (series ascending, then parallel), so the
/// search is fully deterministic.
pub fn optimize_array(
    panel: &PanelSpec,
    inverter: &InverterSpec,
    roof_area_m2: f64,
    target_power_kw: f64,
    envelope: &ThermalEnvelope,
) -> Result<ArrayDesign, Infeasibility> {
    let temperature = temperature_adjusted(panel, envelope);

    let max_series = if temperature.voltage_at_min_temp > 0.0 {
        (inverter.max_string_voltage / temperature.voltage_at_min_temp).floor() as u32
    } else {
        0
    };
    if max_series == 0 {
        return Err(Infeasibility::ColdVoltageExceedsStringLimit {
            voltage_at_min_temp: temperature.voltage_at_min_temp,
            max_string_voltage: inverter.max_string_voltage,
        });
    }

    let max_parallel = if temperature.current_at_max_temp > 0.0 {
        (inverter.max_string_current / temperature.current_at_max_temp).floor() as u32
    } else {
        0
    };
    if max_parallel == 0 {
        return Err(Infeasibility::HotCurrentExceedsStringLimit {
            current_at_max_temp: temperature.current_at_max_temp,
            max_string_current: inverter.max_string_current,
        });
    }

    let max_by_area = max_panels_by_area(panel, roof_area_m2);
    if max_by_area == 0 {
        return Err(Infeasibility::RoofAreaTooSmall {
            roof_area_m2,
            panel_area_m2: panel.area_m2(),
        });
    }

    let target_panels = (target_power_kw / panel.power_kw()).ceil() as u32;

    let mut best: Option<ArrayConfiguration> = None;
    let mut evaluations = 0usize;

    for series in 1..=max_series {
        for parallel in 1..=max_parallel {
            evaluations += 1;
            let candidate = ArrayConfiguration { series_per_string: series, parallel_strings: parallel };
            let total = candidate.total_panels();

            if total < target_panels || total > max_by_area {
                continue;
            }
            // Strict comparison keeps the first layout found on ties
            match best {
                Some(b) if total >= b.total_panels() => {}
                _ => best = Some(candidate),
            }
        }
    }

    debug!(
        "array search: {} candidates, limits {}s x {}p, {} panels by area",
        evaluations, max_series, max_parallel, max_by_area
    );

    match best {
        Some(configuration) => Ok(ArrayDesign {
            configuration,
            max_panels_in_series: max_series,
            max_parallel_strings: max_parallel,
            target_panel_count: target_panels,
            temperature,
            evaluations,
        }),
        None => Err(Infeasibility::NoAdmissibleConfiguration {
            target_panels,
            max_series,
            max_parallel,
            max_by_area,
        }),
    }
}

/// Panels that physically fit the roof.
pub fn max_panels_by_area(panel: &PanelSpec, roof_area_m2: f64) -> u32 {
    let area = panel.area_m2();
    if area <= 0.0 || roof_area_m2 <= 0.0 {
        return 0;
    }
    (roof_area_m2 / area).floor() as u32
}

/// The series limit for a given panel/inverter pair at the cold extreme.
///
/// Zero means the cold Voc of a single panel already exceeds the limit.
pub fn max_panels_in_series(
    panel: &PanelSpec,
    inverter: &InverterSpec,
    envelope: &ThermalEnvelope,
) -> Result<u32, CalcError> {
    let temps = temperature_adjusted(panel, envelope);
    if temps.voltage_at_min_temp <= 0.0 {
        return Err(CalcError::DivisionByZero { quantity: "cold open-circuit voltage" });
    }
    Ok((inverter.max_string_voltage / temps.voltage_at_min_temp).floor() as u32)
}

// ===================== TESTS =====================
