//! Equipment and Site Specifications
//!
//! Value records for PV panels, string inverters and installation sites,
//! plus the temperature-adjusted electrical model used to derive string
//! limits at the cell temperature extremes.
//!
//! Crystalline-silicon open-circuit voltage rises as the cell cools and
//! short-circuit current rises as it heats, so string sizing must be done
//! at the cold extreme for voltage and the hot extreme for current.

use serde::Serialize;

use crate::error::CalcError;

// ===================== CONSTANTS =====================

/// Default open-circuit voltage temperature coefficient (fraction per °C)
/// Typical crystalline silicon: -0.25%..-0.35% per °C
pub const DEFAULT_TEMP_COEFF_VOLTAGE: f64 = -0.003;

/// Default short-circuit current temperature coefficient (fraction per °C)
pub const DEFAULT_TEMP_COEFF_CURRENT: f64 = 0.0004;

/// Grid CO2 emission factor in kg per kWh (mixed-grid average)
pub const CO2_FACTOR_KG_PER_KWH: f64 = 0.5;

/// Default system performance ratio (inverter, wiring, soiling, mismatch)
pub const DEFAULT_PERFORMANCE_RATIO: f64 = 0.86;

// ===================== PANEL =====================

/// PV panel datasheet values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PanelSpec {
    /// Rated power at STC (W)
    pub power_w: f64,
    /// Open-circuit voltage at STC (V)
    pub open_circuit_voltage: f64,
    /// Short-circuit current at STC (A)
    pub short_circuit_current: f64,
    /// Voltage temperature coefficient (fraction per °C, negative);
    /// falls back to [`DEFAULT_TEMP_COEFF_VOLTAGE`] when absent
    pub temp_coeff_voltage: Option<f64>,
    /// Current temperature coefficient (fraction per °C, positive);
    /// falls back to [`DEFAULT_TEMP_COEFF_CURRENT`] when absent
    pub temp_coeff_current: Option<f64>,
    /// Physical length (mm)
    pub length_mm: f64,
    /// Physical width (mm)
    pub width_mm: f64,
    /// Module efficiency (0.0 - 1.0)
    pub efficiency: f64,
    /// Unit price ($), if known
    pub price: Option<f64>,
}

impl PanelSpec {
    pub fn new(power_w: f64, open_circuit_voltage: f64, short_circuit_current: f64) -> Self {
        Self {
            power_w,
            open_circuit_voltage,
            short_circuit_current,
            temp_coeff_voltage: None,
            temp_coeff_current: None,
            length_mm: 1722.0,
            width_mm: 1134.0,
            efficiency: 0.20,
            price: None,
        }
    }

    pub fn with_dimensions(mut self, length_mm: f64, width_mm: f64) -> Self {
        self.length_mm = length_mm;
        self.width_mm = width_mm;
        self
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    pub fn with_temp_coefficients(mut self, voltage: f64, current: f64) -> Self {
        self.temp_coeff_voltage = Some(voltage);
        self.temp_coeff_current = Some(current);
        self
    }

    pub fn with_voltage_coefficient(mut self, voltage: f64) -> Self {
        self.temp_coeff_voltage = Some(voltage);
        self
    }

    pub fn with_current_coefficient(mut self, current: f64) -> Self {
        self.temp_coeff_current = Some(current);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Rated power in kW
    pub fn power_kw(&self) -> f64 {
        self.power_w / 1000.0
    }

    /// Footprint in m² (datasheet dimensions are in mm)
    pub fn area_m2(&self) -> f64 {
        (self.length_mm * self.width_mm) / 1_000_000.0
    }

    /// Voltage coefficient with the documented default applied
    pub fn voltage_coeff(&self) -> f64 {
        self.temp_coeff_voltage.unwrap_or(DEFAULT_TEMP_COEFF_VOLTAGE)
    }

    /// Current coefficient with the documented default applied
    pub fn current_coeff(&self) -> f64 {
        self.temp_coeff_current.unwrap_or(DEFAULT_TEMP_COEFF_CURRENT)
    }

    /// Check the record invariants: positive power and dimensions.
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.power_w <= 0.0 {
            return Err(CalcError::InvalidInput(format!(
                "panel power must be positive, got {} W",
                self.power_w
            )));
        }
        if self.length_mm <= 0.0 || self.width_mm <= 0.0 {
            return Err(CalcError::InvalidInput(format!(
                "panel dimensions must be positive, got {} x {} mm",
                self.length_mm, self.width_mm
            )));
        }
        Ok(())
    }
}

// ===================== INVERTER =====================

/// String inverter datasheet values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InverterSpec {
    /// Maximum DC string voltage (V)
    pub max_string_voltage: f64,
    /// Maximum DC string current (A)
    pub max_string_current: f64,
    /// MPPT minimum input voltage (V)
    pub min_input_voltage: f64,
    /// MPPT maximum input voltage (V)
    pub max_input_voltage: f64,
    /// Nominal AC output power (kW)
    pub nominal_output_kw: f64,
    /// Conversion efficiency (0.0 - 1.0)
    pub efficiency: f64,
}

impl InverterSpec {
    pub fn new(max_string_voltage: f64, max_string_current: f64, nominal_output_kw: f64) -> Self {
        Self {
            max_string_voltage,
            max_string_current,
            min_input_voltage: 90.0,
            max_input_voltage: max_string_voltage,
            nominal_output_kw,
            efficiency: 0.97,
        }
    }

    pub fn with_mppt_range(mut self, min_input_voltage: f64, max_input_voltage: f64) -> Self {
        self.min_input_voltage = min_input_voltage;
        self.max_input_voltage = max_input_voltage;
        self
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    /// Check the record invariant: MPPT window must be ordered.
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.max_input_voltage < self.min_input_voltage {
            return Err(CalcError::InvalidInput(format!(
                "inverter MPPT window is inverted: max {} V < min {} V",
                self.max_input_voltage, self.min_input_voltage
            )));
        }
        Ok(())
    }
}

// ===================== SITE =====================

/// Installation site parameters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SiteLocation {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
    /// Annual irradiance on the array plane (kWh/m²/year)
    pub annual_irradiance: f64,
    /// Site-specific temperature coefficient override (fraction per °C);
    /// the panel's own coefficient is used when absent
    pub temperature_coefficient: Option<f64>,
}

impl SiteLocation {
    pub fn new(latitude: f64, longitude: f64, annual_irradiance: f64) -> Self {
        Self { latitude, longitude, annual_irradiance, temperature_coefficient: None }
    }

    pub fn with_temperature_coefficient(mut self, coefficient: f64) -> Self {
        self.temperature_coefficient = Some(coefficient);
        self
    }
}

// ===================== TEMPERATURE MODEL =====================

/// Cell temperature boundaries used for string sizing.
///
/// The defaults are the industry sizing convention: -10 °C for the coldest
/// expected cell temperature, +85 °C for the hottest, 25 °C at STC.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ThermalEnvelope {
    /// Coldest expected cell temperature (°C)
    pub min_temp_c: f64,
    /// Hottest expected cell temperature (°C)
    pub max_temp_c: f64,
    /// Standard test condition temperature (°C)
    pub stc_temp_c: f64,
}

impl Default for ThermalEnvelope {
    fn default() -> Self {
        Self { min_temp_c: -10.0, max_temp_c: 85.0, stc_temp_c: 25.0 }
    }
}

impl ThermalEnvelope {
    pub fn new(min_temp_c: f64, max_temp_c: f64) -> Self {
        Self { min_temp_c, max_temp_c, ..Self::default() }
    }
}

/// Panel electrical values at the envelope's temperature extremes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemperatureData {
    /// Open-circuit voltage at the coldest cell temperature (V)
    pub voltage_at_min_temp: f64,
    /// Short-circuit current at the hottest cell temperature (A)
    pub current_at_max_temp: f64,
    /// Open-circuit voltage at STC (V)
    pub voltage_at_stc: f64,
    /// Short-circuit current at STC (A)
    pub current_at_stc: f64,
}

/// Linear temperature adjustment of the panel's Voc and Isc.
///
/// `V(T) = Voc_stc × (1 + coeffV × (T − T_stc))` and likewise for current.
/// Pure function; no error conditions.
pub fn temperature_adjusted(panel: &PanelSpec, envelope: &ThermalEnvelope) -> TemperatureData {
    let voltage_at_min_temp = panel.open_circuit_voltage
        * (1.0 + panel.voltage_coeff() * (envelope.min_temp_c - envelope.stc_temp_c));
    let current_at_max_temp = panel.short_circuit_current
        * (1.0 + panel.current_coeff() * (envelope.max_temp_c - envelope.stc_temp_c));

    TemperatureData {
        voltage_at_min_temp,
        current_at_max_temp,
        voltage_at_stc: panel.open_circuit_voltage,
        current_at_stc: panel.short_circuit_current,
    }
}

// ===================== TESTS =====================
