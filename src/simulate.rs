//! Hourly Performance Simulator
//!
//! A simplified 8760-hour production loop: cosine-based plane-of-array
//! irradiance (not a true solar-position model), a sinusoidal yearly
//! ambient temperature, NOCT cell temperature and a temperature-derated
//! efficiency. Good enough for yield estimates and loss breakdowns; use a
//! transposition model when bankable numbers are needed.

use std::f64::consts::PI;

use serde::Serialize;

use crate::error::CalcError;
use crate::panel::{PanelSpec, SiteLocation};

// ===================== CONSTANTS =====================

const HOURS_PER_YEAR: usize = 8760;

/// NOCT irradiance reference (W/m²)
const NOCT_IRRADIANCE: f64 = 800.0;

/// Cell temperature rise above ambient at NOCT irradiance (°C)
const NOCT_TEMP_RISE: f64 = 25.0;

/// Share of total system losses attributed to temperature (heuristic)
const TEMPERATURE_LOSS_SHARE: f64 = 0.15;

// ===================== TYPES =====================

/// Mounting geometry and shading of the installation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InstallationDetails {
    /// Tilt from horizontal (degrees, 0 = flat)
    pub tilt_deg: f64,
    /// Azimuth (degrees, 180 = south)
    pub azimuth_deg: f64,
    /// Shading losses (0 - 100 %)
    pub shading_percent: f64,
}

impl Default for InstallationDetails {
    fn default() -> Self {
        Self { tilt_deg: 35.0, azimuth_deg: 180.0, shading_percent: 0.0 }
    }
}

impl InstallationDetails {
    pub fn new(tilt_deg: f64, azimuth_deg: f64) -> Self {
        Self { tilt_deg, azimuth_deg, ..Self::default() }
    }

    pub fn with_shading(mut self, shading_percent: f64) -> Self {
        self.shading_percent = shading_percent;
        self
    }
}

/// Simulated yearly performance.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSimulation {
    /// Production per hour of the year (kWh), length 8760
    pub hourly_production: Vec<f64>,
    /// Production per 30-day bucket (kWh). Bucketing is day_of_year / 30,
    /// not calendar months; days beyond the 12x30-day grid only count
    /// toward the annual total.
    pub monthly_production: [f64; 12],
    /// Total annual production (kWh); exactly the sum of the hourly vector
    pub annual_production_kwh: f64,
    /// Actual over ideal production (fraction)
    pub performance_ratio: f64,
    /// kWh per kWp of installed capacity
    pub specific_yield: f64,
    /// Losses attributed to cell temperature (kWh)
    pub temperature_losses_kwh: f64,
    /// All losses against the ideal production (kWh)
    pub system_losses_kwh: f64,
}

// ===================== SIMULATION =====================

/// Simulate one year of hourly production for a system of
/// `system_size_kw` at the given site and mounting.
///
/// The temperature coefficient comes from the site override when present,
/// otherwise from the panel. `performance_ratio` is the fixed non-thermal
/// loss factor (default convention 0.86).
pub fn simulate_performance(
    system_size_kw: f64,
    panel: &PanelSpec,
    site: &SiteLocation,
    install: &InstallationDetails,
    performance_ratio: f64,
) -> Result<PerformanceSimulation, CalcError> {
    if system_size_kw <= 0.0 {
        return Err(CalcError::DivisionByZero { quantity: "system size" });
    }
    if site.annual_irradiance <= 0.0 {
        return Err(CalcError::DivisionByZero { quantity: "annual irradiance" });
    }

    let temp_coefficient = site.temperature_coefficient.unwrap_or_else(|| panel.voltage_coeff());
    let shading_factor = 1.0 - install.shading_percent / 100.0;

    let mut hourly_production = Vec::with_capacity(HOURS_PER_YEAR);
    let mut monthly_production = [0.0f64; 12];

    for hour in 0..HOURS_PER_YEAR {
        let day_of_year = hour / 24;
        let hour_of_day = hour % 24;

        let irradiance_kw = hourly_irradiance(
            site.latitude,
            day_of_year as u32,
            hour_of_day as u32,
            install.tilt_deg,
            install.azimuth_deg,
        );

        // Sinusoidal yearly ambient model, warmest around day 171
        let ambient_temp =
            25.0 + 10.0 * ((day_of_year as f64 - 80.0) * 2.0 * PI / 365.0).sin();
        // NOCT approximation: +25°C above ambient at 800 W/m²
        let cell_temp = ambient_temp + (irradiance_kw * 1000.0 / NOCT_IRRADIANCE) * NOCT_TEMP_RISE;

        let temp_factor = 1.0 + temp_coefficient * (cell_temp - 25.0);
        let efficiency_factor = performance_ratio * temp_factor;

        let output = system_size_kw * irradiance_kw * efficiency_factor * shading_factor;
        hourly_production.push(output);

        let month = day_of_year / 30;
        if month < 12 {
            monthly_production[month] += output;
        }
    }

    let annual_production_kwh: f64 = hourly_production.iter().sum();
    let ideal_production = system_size_kw * site.annual_irradiance;
    let system_losses = ideal_production - annual_production_kwh;

    Ok(PerformanceSimulation {
        performance_ratio: annual_production_kwh / ideal_production,
        specific_yield: annual_production_kwh / system_size_kw,
        temperature_losses_kwh: system_losses * TEMPERATURE_LOSS_SHARE,
        system_losses_kwh: system_losses,
        hourly_production,
        monthly_production,
        annual_production_kwh,
    })
}

/// Simplified plane-of-array irradiance in kW/m².
///
/// Cosine day shape peaking at solar noon, scaled by the noon sun height
/// from the Cooper declination formula and by tilt/azimuth projection
/// factors. All factors are clamped at zero so a panel facing away from
/// the sun produces nothing rather than a negative number.
pub fn hourly_irradiance(
    latitude: f64,
    day_of_year: u32,
    hour_of_day: u32,
    tilt_deg: f64,
    azimuth_deg: f64,
) -> f64 {
    // Cooper (1969) solar declination
    let declination =
        23.45 * ((360.0 * (284.0 + day_of_year as f64) / 365.0).to_radians()).sin();

    // Noon sun height factor for the season
    let noon_factor = (latitude - declination).to_radians().cos().clamp(0.0, 1.0);

    // Cosine day shape: zero before 06:00 and after 18:00
    let hour_shape = ((hour_of_day as f64 - 12.0) * PI / 12.0).cos().max(0.0);

    let tilt_factor = tilt_deg.to_radians().cos().max(0.0);
    let azimuth_factor = (azimuth_deg - 180.0).to_radians().cos().max(0.0);

    // 1000 W/m² clear-sky peak, returned in kW/m²
    hour_shape * noon_factor * tilt_factor * azimuth_factor
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_400w() -> PanelSpec {
        PanelSpec::new(400.0, 37.2, 13.6)
    }

    fn site() -> SiteLocation {
        SiteLocation::new(37.2, -3.6, 1800.0)
    }

    fn simulate_default() -> PerformanceSimulation {
        simulate_performance(4.0, &panel_400w(), &site(), &InstallationDetails::default(), 0.86)
            .unwrap()
    }

    #[test]
    fn test_hourly_sum_equals_annual_exactly() {
        let sim = simulate_default();
        assert_eq!(sim.hourly_production.len(), 8760);

        let sum: f64 = sim.hourly_production.iter().sum();
        assert_eq!(
            sum, sim.annual_production_kwh,
            "annual total must be exactly the sum of the hourly vector"
        );
    }

    #[test]
    fn test_monthly_buckets_cover_360_days() {
        // Days 360 - 364 fall outside the 12x30-day grid, so the monthly
        // total is at most the annual total and misses only that tail
        let sim = simulate_default();
        let monthly_sum: f64 = sim.monthly_production.iter().sum();

        assert!(monthly_sum <= sim.annual_production_kwh + 1e-9);
        let tail: f64 = sim.hourly_production[360 * 24..].iter().sum();
        assert!((sim.annual_production_kwh - monthly_sum - tail).abs() < 1e-9);
    }

    #[test]
    fn test_night_hours_produce_nothing() {
        let sim = simulate_default();
        // Midnight and 03:00 on day 0
        assert_eq!(sim.hourly_production[0], 0.0);
        assert_eq!(sim.hourly_production[3], 0.0);
        // Noon on a June day is the daily peak
        let june_noon = 170 * 24 + 12;
        assert!(sim.hourly_production[june_noon] > 0.0);
    }

    #[test]
    fn test_shading_scales_linearly() {
        let unshaded = simulate_default();
        let shaded = simulate_performance(
            4.0,
            &panel_400w(),
            &site(),
            &InstallationDetails::default().with_shading(50.0),
            0.86,
        )
        .unwrap();

        assert!(
            (shaded.annual_production_kwh - unshaded.annual_production_kwh * 0.5).abs() < 1e-6,
            "50% shading must halve production: {} vs {}",
            shaded.annual_production_kwh,
            unshaded.annual_production_kwh
        );
    }

    #[test]
    fn test_summer_outproduces_winter() {
        let sim = simulate_default();
        // Bucket 5 (days 150-179, June) vs bucket 0 (days 0-29, January)
        assert!(
            sim.monthly_production[5] > sim.monthly_production[0],
            "June bucket {:.1} kWh must exceed January bucket {:.1} kWh at 37°N",
            sim.monthly_production[5],
            sim.monthly_production[0]
        );
    }

    #[test]
    fn test_east_facing_panel_produces_nothing_in_this_model() {
        // The cosine azimuth projection zeroes out a due-east panel; the
        // simplification is deliberate (see module docs)
        let sim = simulate_performance(
            4.0,
            &panel_400w(),
            &site(),
            &InstallationDetails::new(35.0, 90.0),
            0.86,
        )
        .unwrap();
        assert!(sim.annual_production_kwh.abs() < 1e-9);
    }

    #[test]
    fn test_flat_beats_steep_tilt_in_this_model() {
        let flat = simulate_performance(
            4.0,
            &panel_400w(),
            &site(),
            &InstallationDetails::new(0.0, 180.0),
            0.86,
        )
        .unwrap();
        let steep = simulate_performance(
            4.0,
            &panel_400w(),
            &site(),
            &InstallationDetails::new(60.0, 180.0),
            0.86,
        )
        .unwrap();
        assert!(flat.annual_production_kwh > steep.annual_production_kwh);
    }

    #[test]
    fn test_specific_yield_and_performance_ratio() {
        let sim = simulate_default();
        assert_eq!(sim.specific_yield, sim.annual_production_kwh / 4.0);
        assert_eq!(sim.performance_ratio, sim.annual_production_kwh / (4.0 * 1800.0));
        assert!(sim.performance_ratio > 0.0 && sim.performance_ratio < 1.0);
    }

    #[test]
    fn test_loss_split() {
        let sim = simulate_default();
        let ideal = 4.0 * 1800.0;
        assert!((sim.system_losses_kwh - (ideal - sim.annual_production_kwh)).abs() < 1e-9);
        assert!(
            (sim.temperature_losses_kwh - sim.system_losses_kwh * 0.15).abs() < 1e-9,
            "temperature losses are the fixed 15% share of system losses"
        );
    }

    #[test]
    fn test_zero_system_size_is_an_error() {
        let result = simulate_performance(
            0.0,
            &panel_400w(),
            &site(),
            &InstallationDetails::default(),
            0.86,
        );
        assert!(matches!(result, Err(CalcError::DivisionByZero { quantity: "system size" })));
    }

    #[test]
    fn test_site_coefficient_override_changes_derating() {
        // A stronger negative coefficient loses more energy to heat
        let mild = simulate_default();
        let hot_site = site().with_temperature_coefficient(-0.006);
        let strong = simulate_performance(
            4.0,
            &panel_400w(),
            &hot_site,
            &InstallationDetails::default(),
            0.86,
        )
        .unwrap();
        assert!(strong.annual_production_kwh < mild.annual_production_kwh);
    }

    #[test]
    fn test_irradiance_bounds() {
        // Never negative, never above the 1 kW/m² clear-sky peak
        for day in [0u32, 80, 172, 264, 355] {
            for hour in 0..24 {
                let g = hourly_irradiance(37.2, day, hour, 35.0, 180.0);
                assert!((0.0..=1.0).contains(&g), "irradiance {} out of bounds", g);
            }
        }
        // Night is exactly zero
        assert_eq!(hourly_irradiance(37.2, 172, 0, 35.0, 180.0), 0.0);
    }
}
