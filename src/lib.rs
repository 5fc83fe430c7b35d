//! Solar array sizing and performance calculator.
//!
//! Pure, synchronous transforms from explicit inputs to explicit outputs:
//! temperature-adjusted panel electrics, a brute-force string/parallel
//! layout optimizer, system sizing, financial metrics, an 8760-hour
//! production simulation, and an advisory compatibility validator.

pub mod array;
pub mod cli;
pub mod compat;
pub mod error;
pub mod financial;
pub mod output;
pub mod panel;
pub mod simulate;
pub mod sizing;

pub use array::{optimize_array, ArrayConfiguration, ArrayDesign, Infeasibility};
pub use compat::{validate_compatibility, CompatibilityReport};
pub use error::CalcError;
pub use financial::{calculate_financial_metrics, FinancialInputs, FinancialMetrics, IrrEstimate};
pub use panel::{
    temperature_adjusted, InverterSpec, PanelSpec, SiteLocation, TemperatureData, ThermalEnvelope,
};
pub use simulate::{simulate_performance, InstallationDetails, PerformanceSimulation};
pub use sizing::{estimate_system_sizing, SystemSizing};
