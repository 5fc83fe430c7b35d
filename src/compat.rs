//! Compatibility Validator
//!
//! Advisory checks of a chosen array configuration against the inverter's
//! electrical limits. Every check runs unconditionally and appends to one
//! of three independent lists; nothing here mutates the configuration.

use serde::Serialize;

use crate::array::ArrayConfiguration;
use crate::panel::{temperature_adjusted, InverterSpec, PanelSpec, ThermalEnvelope};

// ===================== CONSTANTS =====================

/// DC/AC ratio above which the inverter is considered undersized
pub const DC_AC_RATIO_HIGH: f64 = 1.3;

/// DC/AC ratio below which the inverter is considered oversized
pub const DC_AC_RATIO_LOW: f64 = 0.9;

/// String voltage swing over the thermal envelope worth flagging (V)
pub const VOLTAGE_SWING_WARNING_V: f64 = 100.0;

// ===================== TYPES =====================

/// Result of validating a configuration against an inverter.
///
/// `errors` are hard electrical violations, `warnings` are operating
/// conditions worth a second look, `recommendations` are sizing advice.
/// The configuration is compatible iff `errors` is empty.
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    /// String open-circuit voltage at STC (V)
    pub string_voltage_stc: f64,
    /// String open-circuit voltage at the coldest cell temperature (V)
    pub string_voltage_cold: f64,
    /// Combined array current at the hottest cell temperature (A)
    pub array_current_hot: f64,
    /// Total panel power over inverter rated power
    pub dc_ac_ratio: f64,
}

impl CompatibilityReport {
    pub fn is_compatible(&self) -> bool {
        self.errors.is_empty()
    }
}

// ===================== VALIDATION =====================

/// Validate `config` against the inverter limits over the thermal envelope.
///
/// Purely advisory: the report is meant for display, and an incompatible
/// configuration is still returned in full.
///
/// The current check uses the hot-adjusted short-circuit current, not the
/// STC value, matching the parallel limit the optimizer derives. That is
/// slightly stricter than checking at STC: a layout sized right at the
/// inverter's current limit can pass at 25°C yet fail here.
pub fn validate_compatibility(
    panel: &PanelSpec,
    inverter: &InverterSpec,
    config: &ArrayConfiguration,
    envelope: &ThermalEnvelope,
) -> CompatibilityReport {
    let temps = temperature_adjusted(panel, envelope);
    let series = config.series_per_string as f64;
    let parallel = config.parallel_strings as f64;

    let string_voltage_stc = series * temps.voltage_at_stc;
    let string_voltage_cold = series * temps.voltage_at_min_temp;
    let array_current_hot = parallel * temps.current_at_max_temp;
    let dc_ac_ratio =
        config.total_panels() as f64 * panel.power_w / (inverter.nominal_output_kw * 1000.0);

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    // MPPT operating window at STC
    if string_voltage_stc > inverter.max_input_voltage {
        errors.push(format!(
            "String voltage at STC ({:.1} V) exceeds the MPPT upper limit ({:.1} V)",
            string_voltage_stc, inverter.max_input_voltage
        ));
    }
    if string_voltage_stc < inverter.min_input_voltage {
        errors.push(format!(
            "String voltage at STC ({:.1} V) is below the MPPT lower limit ({:.1} V)",
            string_voltage_stc, inverter.min_input_voltage
        ));
    }

    // Absolute voltage limit at the coldest cell temperature
    if string_voltage_cold > inverter.max_string_voltage {
        errors.push(format!(
            "String voltage at {:.0}°C ({:.1} V) exceeds the inverter maximum ({:.1} V)",
            envelope.min_temp_c, string_voltage_cold, inverter.max_string_voltage
        ));
    }

    // Current limit at the hottest cell temperature
    if array_current_hot > inverter.max_string_current {
        errors.push(format!(
            "Array current at {:.0}°C ({:.1} A) exceeds the inverter maximum ({:.1} A)",
            envelope.max_temp_c, array_current_hot, inverter.max_string_current
        ));
    }

    // DC/AC sizing
    if dc_ac_ratio > DC_AC_RATIO_HIGH {
        warnings.push(format!(
            "DC/AC ratio {:.2} is high; the inverter will clip at peak production",
            dc_ac_ratio
        ));
    } else if dc_ac_ratio < DC_AC_RATIO_LOW {
        recommendations.push(format!(
            "DC/AC ratio {:.2} is low; a smaller inverter or more panels would use it better",
            dc_ac_ratio
        ));
    }

    // Voltage swing over the thermal envelope
    let voltage_swing = string_voltage_cold - string_voltage_stc;
    if voltage_swing > VOLTAGE_SWING_WARNING_V {
        warnings.push(format!(
            "String voltage swings {:.1} V between {:.0}°C and STC; verify MPPT tracking range",
            voltage_swing, envelope.min_temp_c
        ));
    }

    CompatibilityReport {
        errors,
        warnings,
        recommendations,
        string_voltage_stc,
        string_voltage_cold,
        array_current_hot,
        dc_ac_ratio,
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_400w() -> PanelSpec {
        PanelSpec::new(400.0, 37.2, 13.6)
    }

    fn inverter_5kw() -> InverterSpec {
        InverterSpec::new(600.0, 45.0, 5.0).with_mppt_range(90.0, 550.0)
    }

    fn config(series: u32, parallel: u32) -> ArrayConfiguration {
        ArrayConfiguration { series_per_string: series, parallel_strings: parallel }
    }

    #[test]
    fn test_well_matched_system_is_clean() {
        // 7S2P of 400 W panels: 260.4 V strings, 27.9 A hot, DC/AC 1.12
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(7, 2),
            &ThermalEnvelope::default(),
        );
        assert!(report.is_compatible());
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_overvoltage_string_is_an_error() {
        // 16 panels in series: 595.2 V at STC, over the 550 V MPPT limit,
        // and 657.7 V at -10°C, over the 600 V absolute limit
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(16, 1),
            &ThermalEnvelope::default(),
        );
        assert!(!report.is_compatible());
        assert!(report.errors.len() >= 2, "expected MPPT and absolute voltage errors");
    }

    #[test]
    fn test_string_below_mppt_window_is_an_error() {
        // 2 panels in series: 74.4 V, below the 90 V MPPT floor
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(2, 1),
            &ThermalEnvelope::default(),
        );
        assert!(!report.is_compatible());
        assert!(report.errors.iter().any(|e| e.contains("below the MPPT lower limit")));
    }

    #[test]
    fn test_overcurrent_array_is_an_error() {
        // 4 parallel strings: 55.7 A at 85°C, over the 45 A limit
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(7, 4),
            &ThermalEnvelope::default(),
        );
        assert!(!report.is_compatible());
        assert!(report.errors.iter().any(|e| e.contains("Array current")));
    }

    #[test]
    fn test_high_dc_ac_ratio_is_a_warning_not_an_error() {
        // 14S2P: 28 panels, DC/AC 2.24 — clipping, but electrically legal
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(14, 2),
            &ThermalEnvelope::default(),
        );
        assert!(report.is_compatible());
        assert!((report.dc_ac_ratio - 2.24).abs() < 1e-9);
        assert!(report.warnings.iter().any(|w| w.contains("DC/AC ratio")));
    }

    #[test]
    fn test_low_dc_ac_ratio_is_a_recommendation() {
        // 5S2P: 10 panels, DC/AC 0.8
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(5, 2),
            &ThermalEnvelope::default(),
        );
        assert!(report.is_compatible());
        assert!(report.recommendations.iter().any(|r| r.contains("DC/AC ratio")));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_large_voltage_swing_is_a_warning() {
        // 20 of a 49.5 V panel swing 103.9 V across the envelope but stay
        // under a 1500 V inverter's limits
        let panel = PanelSpec::new(550.0, 49.5, 13.9);
        let inverter = InverterSpec::new(1500.0, 30.0, 25.0).with_mppt_range(200.0, 1450.0);
        let report = validate_compatibility(
            &panel,
            &inverter,
            &config(20, 2),
            &ThermalEnvelope::default(),
        );
        assert!(report.is_compatible());
        assert!(
            report.warnings.iter().any(|w| w.contains("swings")),
            "swing of {:.1} V should warn",
            report.string_voltage_cold - report.string_voltage_stc
        );
    }

    #[test]
    fn test_current_check_uses_hot_adjusted_value() {
        // 2 strings of 13.6 A STC panels: 27.2 A at STC but 27.85 A at
        // +85°C; the report carries the hot value, and an inverter rated
        // between the two fails the check
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(7, 2),
            &ThermalEnvelope::default(),
        );
        assert!((report.array_current_hot - 27.8528).abs() < 1e-6);

        let marginal = InverterSpec::new(600.0, 27.5, 5.0).with_mppt_range(90.0, 550.0);
        let report = validate_compatibility(
            &panel_400w(),
            &marginal,
            &config(7, 2),
            &ThermalEnvelope::default(),
        );
        assert!(!report.is_compatible());
        assert!(report.errors.iter().any(|e| e.contains("Array current")));
    }

    #[test]
    fn test_all_checks_run_independently() {
        // A hopeless setup collects multiple findings at once
        let report = validate_compatibility(
            &panel_400w(),
            &inverter_5kw(),
            &config(16, 4),
            &ThermalEnvelope::default(),
        );
        assert!(!report.is_compatible());
        assert!(report.errors.len() >= 3);
        // Still a complete report with the computed figures
        assert!(report.string_voltage_stc > 0.0);
        assert!(report.array_current_hot > 0.0);
    }
}
