//! System Sizing Estimator
//!
//! Derives panel count, inverter size, annual energy and CO2 savings from a
//! target power, a panel spec and the site's annual irradiance. When the
//! roof cannot hold the requested system the target is clamped to what the
//! area supports; the clamp is reported in the result and logged.

use log::warn;
use serde::Serialize;

use crate::error::CalcError;
use crate::panel::{PanelSpec, SiteLocation, CO2_FACTOR_KG_PER_KWH};

// ===================== CONSTANTS =====================

/// Inverter oversizing headroom applied to the DC system size
pub const INVERTER_OVERSIZING: f64 = 1.1;

/// CO2 uptake of one mature tree (kg per year)
const CO2_KG_PER_TREE: f64 = 22.0;

/// CO2 emissions of one average car (kg per year)
const CO2_KG_PER_CAR: f64 = 4600.0;

// ===================== TYPES =====================

/// Sizing figures for a target system at a given site.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SystemSizing {
    /// Panels needed for the (possibly clamped) system size
    pub required_panels: u32,
    /// Recommended inverter AC rating (kW), 10% above the DC size
    pub required_inverter_kw: f64,
    /// Roof area the panels occupy (m²)
    pub roof_area_needed_m2: f64,
    /// Final DC system size (kW); smaller than the requested target when
    /// the roof area forced a clamp
    pub system_size_kw: f64,
    /// Estimated annual production (kWh/year)
    pub annual_production_kwh: f64,
    /// Avoided emissions (metric tons CO2 per year)
    pub co2_savings_tons: f64,
    /// True when the roof area reduced the requested target power
    pub clamped_by_area: bool,
}

// ===================== ESTIMATOR =====================

/// Size a system for `target_power_kw` at the given site.
///
/// `performance_ratio` covers inverter, wiring, soiling and mismatch losses
/// (default convention 0.86, see [`crate::panel::DEFAULT_PERFORMANCE_RATIO`]).
pub fn estimate_system_sizing(
    target_power_kw: f64,
    panel: &PanelSpec,
    site: &SiteLocation,
    roof_area_m2: f64,
    performance_ratio: f64,
) -> Result<SystemSizing, CalcError> {
    let panel_kw = panel.power_kw();
    if panel_kw <= 0.0 {
        return Err(CalcError::DivisionByZero { quantity: "panel power" });
    }
    let panel_area = panel.area_m2();
    if panel_area <= 0.0 {
        return Err(CalcError::DivisionByZero { quantity: "panel area" });
    }

    let required_panels = (target_power_kw / panel_kw).ceil() as u32;
    let roof_area_needed = required_panels as f64 * panel_area;

    // Clamp the target to what the roof supports
    let (system_size_kw, required_panels, roof_area_needed, clamped) =
        if roof_area_needed > roof_area_m2 {
            let max_panels = (roof_area_m2 / panel_area).floor() as u32;
            let clamped_kw = max_panels as f64 * panel_kw;
            warn!(
                "target {:.1} kW needs {:.1} m² but only {:.1} m² is available; \
                 clamping to {:.1} kW",
                target_power_kw, roof_area_needed, roof_area_m2, clamped_kw
            );
            (clamped_kw, max_panels, max_panels as f64 * panel_area, true)
        } else {
            (target_power_kw, required_panels, roof_area_needed, false)
        };

    let annual_production = system_size_kw * site.annual_irradiance * performance_ratio;
    let co2_savings_tons = annual_production * CO2_FACTOR_KG_PER_KWH / 1000.0;

    Ok(SystemSizing {
        required_panels,
        required_inverter_kw: system_size_kw * INVERTER_OVERSIZING,
        roof_area_needed_m2: roof_area_needed,
        system_size_kw,
        annual_production_kwh: annual_production,
        co2_savings_tons,
        clamped_by_area: clamped,
    })
}

// ===================== CO2 EQUIVALENCES =====================

/// Mature trees with the same annual CO2 uptake.
pub fn equivalent_trees(co2_savings_kg: f64) -> f64 {
    co2_savings_kg / CO2_KG_PER_TREE
}

/// Average cars with the same annual CO2 emissions.
pub fn equivalent_cars(co2_savings_kg: f64) -> f64 {
    co2_savings_kg / CO2_KG_PER_CAR
}

// ===================== TESTS =====================
