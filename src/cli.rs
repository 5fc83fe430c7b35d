//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for the pvarray application.

use clap::Parser;

use crate::panel::{InverterSpec, PanelSpec, SiteLocation, ThermalEnvelope};
use crate::simulate::InstallationDetails;
use crate::sizing::INVERTER_OVERSIZING;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Target system size in kW DC
    #[arg(long, value_parser = parse_positive_f64, env = "PVARRAY_TARGET_POWER")]
    pub target_power: f64,
    /// Available roof area in square meters
    #[arg(long, value_parser = parse_positive_f64, env = "PVARRAY_ROOF_AREA")]
    pub roof_area: f64,

    // ===================== PANEL OPTIONS =====================
    /// Panel rated power at STC in watts
    #[arg(long, default_value_t = 400.0, value_parser = parse_positive_f64, env = "PVARRAY_PANEL_POWER")]
    pub panel_power: f64,
    /// Panel open-circuit voltage at STC in volts
    #[arg(long, default_value_t = 37.2, value_parser = parse_positive_f64, env = "PVARRAY_PANEL_VOC")]
    pub panel_voc: f64,
    /// Panel short-circuit current at STC in amps
    #[arg(long, default_value_t = 13.6, value_parser = parse_positive_f64, env = "PVARRAY_PANEL_ISC")]
    pub panel_isc: f64,
    /// Panel length in millimeters
    #[arg(long, default_value_t = 1722.0, value_parser = parse_positive_f64, env = "PVARRAY_PANEL_LENGTH")]
    pub panel_length: f64,
    /// Panel width in millimeters
    #[arg(long, default_value_t = 1134.0, value_parser = parse_positive_f64, env = "PVARRAY_PANEL_WIDTH")]
    pub panel_width: f64,
    /// Voc temperature coefficient per °C (typically around -0.003)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_temp_coefficient, env = "PVARRAY_TEMP_COEFF_VOLTAGE")]
    pub temp_coeff_voltage: Option<f64>,
    /// Isc temperature coefficient per °C (typically around +0.0004)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_temp_coefficient, env = "PVARRAY_TEMP_COEFF_CURRENT")]
    pub temp_coeff_current: Option<f64>,

    // ===================== INVERTER OPTIONS =====================
    /// Inverter maximum string voltage in volts
    #[arg(long, default_value_t = 600.0, value_parser = parse_positive_f64, env = "PVARRAY_INVERTER_MAX_VOLTAGE")]
    pub inverter_max_voltage: f64,
    /// Inverter maximum input current in amps
    #[arg(long, default_value_t = 45.0, value_parser = parse_positive_f64, env = "PVARRAY_INVERTER_MAX_CURRENT")]
    pub inverter_max_current: f64,
    /// Inverter nominal AC output in kW (defaults to 1.1x the target power)
    #[arg(long, value_parser = parse_positive_f64, env = "PVARRAY_INVERTER_POWER")]
    pub inverter_power: Option<f64>,
    /// MPPT window: "MIN-MAX" in volts (e.g., "90-550")
    #[arg(long, value_parser = parse_range, env = "PVARRAY_MPPT_RANGE")]
    pub mppt_range: Option<(f64, f64)>,

    // ===================== SITE OPTIONS =====================
    /// Site latitude in decimal degrees (-90 to 90)
    #[arg(long, default_value_t = 40.0, allow_hyphen_values = true, value_parser = parse_latitude, env = "PVARRAY_LATITUDE")]
    pub latitude: f64,
    /// Site longitude in decimal degrees (-180 to 180)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, value_parser = parse_longitude, env = "PVARRAY_LONGITUDE")]
    pub longitude: f64,
    /// Annual plane-of-array irradiance in kWh/m²
    #[arg(long, default_value_t = 1800.0, value_parser = parse_positive_f64, env = "PVARRAY_ANNUAL_IRRADIANCE")]
    pub annual_irradiance: f64,
    /// Site-level thermal derating coefficient per °C for the simulation;
    /// overrides the panel's voltage coefficient when given
    #[arg(long, allow_hyphen_values = true, value_parser = parse_temp_coefficient, env = "PVARRAY_SITE_TEMP_COEFF")]
    pub site_temp_coeff: Option<f64>,
    /// Coldest expected cell temperature in °C (string sizing)
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true, env = "PVARRAY_MIN_TEMP")]
    pub min_temp: f64,
    /// Hottest expected cell temperature in °C (string sizing)
    #[arg(long, default_value_t = 85.0, allow_hyphen_values = true, env = "PVARRAY_MAX_TEMP")]
    pub max_temp: f64,

    // ===================== INSTALLATION OPTIONS =====================
    /// Panel tilt angle in degrees (0 = flat/horizontal, 90 = vertical)
    #[arg(long, default_value_t = 35.0, value_parser = parse_tilt, env = "PVARRAY_TILT")]
    pub tilt: f64,
    /// Panel azimuth in degrees (180 = facing south in northern hemisphere)
    #[arg(long, default_value_t = 180.0, value_parser = parse_azimuth, env = "PVARRAY_AZIMUTH")]
    pub azimuth: f64,
    /// Shading losses in percent (0 - 100)
    #[arg(long, default_value_t = 0.0, value_parser = parse_percent, env = "PVARRAY_SHADING")]
    pub shading: f64,
    /// Performance ratio (fixed non-thermal loss factor, 0.0 - 1.0)
    #[arg(long, default_value_t = 0.86, value_parser = parse_fraction, env = "PVARRAY_PERFORMANCE_RATIO")]
    pub performance_ratio: f64,

    // ===================== ECONOMICS OPTIONS =====================
    /// Installed cost per watt DC in currency units
    #[arg(long, default_value_t = 1.0, value_parser = parse_positive_f64, env = "PVARRAY_COST_PER_WATT")]
    pub cost_per_watt: f64,
    /// Electricity rate in currency units per kWh
    #[arg(long, default_value_t = 0.15, value_parser = parse_positive_f64, env = "PVARRAY_ELECTRICITY_RATE")]
    pub electricity_rate: f64,
    /// Project lifespan in years
    #[arg(long, default_value_t = 25, value_parser = parse_lifespan, env = "PVARRAY_LIFESPAN")]
    pub lifespan: u32,
    /// Discount rate for NPV as a fraction (e.g., 0.05)
    #[arg(long, default_value_t = 0.05, value_parser = parse_fraction, env = "PVARRAY_DISCOUNT_RATE")]
    pub discount_rate: f64,
    /// Annual maintenance cost as a percentage of total cost (e.g., 1.0)
    #[arg(long, default_value_t = 0.0, value_parser = parse_percent, env = "PVARRAY_MAINTENANCE_RATE")]
    pub maintenance_rate: f64,
    /// Panel degradation per year as a fraction (e.g., 0.005)
    #[arg(long, default_value_t = 0.005, value_parser = parse_fraction, env = "PVARRAY_DEGRADATION_RATE")]
    pub degradation_rate: f64,
    /// Electricity rate escalation per year as a fraction (e.g., 0.02)
    #[arg(long, default_value_t = 0.02, value_parser = parse_fraction, env = "PVARRAY_RATE_ESCALATION")]
    pub rate_escalation: f64,

    /// Emit the full report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

// ===================== SPEC BUILDERS =====================

impl Args {
    /// Panel datasheet record from the flags. Each coefficient override is
    /// applied on its own, so giving only one of them never drops it.
    pub fn panel_spec(&self) -> PanelSpec {
        let mut panel = PanelSpec::new(self.panel_power, self.panel_voc, self.panel_isc)
            .with_dimensions(self.panel_length, self.panel_width);
        if let Some(voltage) = self.temp_coeff_voltage {
            panel = panel.with_voltage_coefficient(voltage);
        }
        if let Some(current) = self.temp_coeff_current {
            panel = panel.with_current_coefficient(current);
        }
        panel
    }

    /// Inverter record from the flags. Without an explicit rating, the
    /// inverter is sized to the target with the usual 10% headroom.
    pub fn inverter_spec(&self) -> InverterSpec {
        let rating =
            self.inverter_power.unwrap_or(self.target_power * INVERTER_OVERSIZING);
        let mut inverter =
            InverterSpec::new(self.inverter_max_voltage, self.inverter_max_current, rating);
        if let Some((min_v, max_v)) = self.mppt_range {
            inverter = inverter.with_mppt_range(min_v, max_v);
        }
        inverter
    }

    /// Site record from the flags. Only `--site-temp-coeff` sets the
    /// site-level override; the panel's own coefficients stay on the panel.
    pub fn site(&self) -> SiteLocation {
        let mut site = SiteLocation::new(self.latitude, self.longitude, self.annual_irradiance);
        if let Some(coefficient) = self.site_temp_coeff {
            site = site.with_temperature_coefficient(coefficient);
        }
        site
    }

    pub fn thermal_envelope(&self) -> ThermalEnvelope {
        ThermalEnvelope::new(self.min_temp, self.max_temp)
    }

    pub fn installation(&self) -> InstallationDetails {
        InstallationDetails::new(self.tilt, self.azimuth).with_shading(self.shading)
    }
}

// ===================== CLI VALUE PARSERS =====================

fn parse_latitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-90.0..=90.0).contains(&v) {
        return Err(format!("Latitude must be between -90 and 90, got {}", v));
    }
    Ok(v)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-180.0..=180.0).contains(&v) {
        return Err(format!("Longitude must be between -180 and 180, got {}", v));
    }
    Ok(v)
}

fn parse_positive_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if v <= 0.0 {
        return Err(format!("Value must be positive, got {}", v));
    }
    Ok(v)
}

fn parse_tilt(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..=90.0).contains(&v) {
        return Err(format!("Tilt must be between 0 and 90 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_azimuth(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..=360.0).contains(&v) {
        return Err(format!("Azimuth must be between 0 and 360 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_percent(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..=100.0).contains(&v) {
        return Err(format!("Percentage must be between 0 and 100, got {}", v));
    }
    Ok(v)
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("Value must be between 0.0 and 1.0, got {}", v));
    }
    Ok(v)
}

fn parse_temp_coefficient(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-0.1..=0.1).contains(&v) {
        return Err(format!(
            "Temperature coefficient must be a per-°C fraction between -0.1 and 0.1, got {}",
            v
        ));
    }
    Ok(v)
}

fn parse_lifespan(s: &str) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if !(1..=100).contains(&v) {
        return Err(format!("Lifespan must be between 1 and 100 years, got {}", v));
    }
    Ok(v)
}

fn parse_range(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 2 {
        return Err(format!("Range must be in format MIN-MAX (e.g., '90-550'), got '{}'", s));
    }
    let min: f64 = parts[0].parse().map_err(|_| format!("Invalid minimum value: {}", parts[0]))?;
    let max: f64 = parts[1].parse().map_err(|_| format!("Invalid maximum value: {}", parts[1]))?;
    if min > max {
        return Err(format!("Minimum ({}) cannot be greater than maximum ({})", min, max));
    }
    Ok((min, max))
}

// ===================== TESTS =====================
