//! Output Formatting Module
//!
//! Terminal and JSON rendering of the calculator results.

use serde::Serialize;

use crate::array::{ArrayDesign, Infeasibility};
use crate::compat::CompatibilityReport;
use crate::financial::{FinancialMetrics, LifetimeMetrics};
use crate::panel::TemperatureData;
use crate::simulate::PerformanceSimulation;
use crate::sizing::{equivalent_cars, equivalent_trees, SystemSizing};

// ===================== FORMAT HELPERS =====================

/// Format power with an adaptive unit (W below 1 kW, kW otherwise).
pub fn format_power(watts: f64) -> String {
    if watts.abs() < 1000.0 {
        format!("{:.0} W", watts)
    } else {
        format!("{:.2} kW", watts / 1000.0)
    }
}

/// Format energy with an adaptive unit (kWh below 1 MWh, MWh otherwise).
pub fn format_energy(kwh: f64) -> String {
    if kwh.abs() < 1000.0 {
        format!("{:.1} kWh", kwh)
    } else {
        format!("{:.2} MWh", kwh / 1000.0)
    }
}

pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn format_years(years: f64) -> String {
    format!("{:.1} years", years)
}

// ===================== JSON REPORT =====================

/// Machine-readable form of the full report, for `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub temperature: &'a TemperatureData,
    pub sizing: &'a SystemSizing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array: Option<&'a ArrayDesign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infeasibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<&'a CompatibilityReport>,
    pub performance: &'a PerformanceSimulation,
    pub financial: &'a FinancialMetrics,
    pub lifetime: &'a LifetimeMetrics,
}

// ===================== TERMINAL OUTPUT =====================

/// Print the panel's electrical values at the envelope extremes.
pub fn print_temperature_data(temps: &TemperatureData) {
    println!("=== Temperature-Adjusted Electrical Data ===");
    println!("  Voc at STC    : {:8.2} V", temps.voltage_at_stc);
    println!("  Voc cold      : {:8.2} V", temps.voltage_at_min_temp);
    println!("  Isc at STC    : {:8.2} A", temps.current_at_stc);
    println!("  Isc hot       : {:8.2} A", temps.current_at_max_temp);
}

/// Print the optimizer outcome, feasible or not.
///
/// An infeasible design is advisory output, not a program failure.
pub fn print_array_design(design: &Result<ArrayDesign, Infeasibility>) {
    println!();
    println!("=== Array Configuration ===");
    match design {
        Ok(design) => {
            let config = design.configuration;
            println!(
                "  Layout        : {} in series x {} strings ({} panels)",
                config.series_per_string,
                config.parallel_strings,
                config.total_panels()
            );
            println!("  Series limit  : {} panels (cold-voltage bound)", design.max_panels_in_series);
            println!("  String limit  : {} strings (hot-current bound)", design.max_parallel_strings);
            println!("  Target        : {} panels", design.target_panel_count);
            println!("  (Search used {} evaluations)", design.evaluations);
        }
        Err(reason) => {
            println!("  No feasible configuration: {}", reason);
        }
    }
}

pub fn print_sizing(sizing: &SystemSizing) {
    println!();
    println!("=== System Sizing ===");
    println!("  System size   : {:.2} kW ({} panels)", sizing.system_size_kw, sizing.required_panels);
    if sizing.clamped_by_area {
        println!("  Note          : target was clamped to the available roof area");
    }
    println!("  Roof area     : {:.1} m\u{b2} needed", sizing.roof_area_needed_m2);
    println!("  Inverter      : {:.2} kW recommended", sizing.required_inverter_kw);
    println!("  Annual yield  : {}", format_energy(sizing.annual_production_kwh));
    println!(
        "  CO2 avoided   : {:.2} t/year (~{:.0} trees, ~{:.1} cars)",
        sizing.co2_savings_tons,
        equivalent_trees(sizing.co2_savings_tons * 1000.0),
        equivalent_cars(sizing.co2_savings_tons * 1000.0)
    );
}

/// Print validator findings grouped by severity.
pub fn print_compatibility(report: &CompatibilityReport) {
    println!();
    println!("=== Compatibility ===");
    println!("  String Voc    : {:.1} V at STC, {:.1} V cold", report.string_voltage_stc, report.string_voltage_cold);
    println!("  Array current : {:.1} A hot", report.array_current_hot);
    println!("  DC/AC ratio   : {:.2}", report.dc_ac_ratio);

    if report.is_compatible() {
        println!("  Status        : compatible");
    } else {
        println!("  Status        : NOT compatible");
    }
    for error in &report.errors {
        println!("  Error         : {}", error);
    }
    for warning in &report.warnings {
        println!("  Warning       : {}", warning);
    }
    for rec in &report.recommendations {
        println!("  Suggestion    : {}", rec);
    }
}

/// Print the simulated year: headline figures plus the 30-day-bucket table.
pub fn print_simulation(sim: &PerformanceSimulation) {
    println!();
    println!("=== Annual Performance (8760-hour simulation) ===");
    println!("  Production    : {}", format_energy(sim.annual_production_kwh));
    println!("  Perf. ratio   : {:.1}%", sim.performance_ratio * 100.0);
    println!("  Specific yield: {:.0} kWh/kWp", sim.specific_yield);
    println!(
        "  Losses        : {} total, {} thermal",
        format_energy(sim.system_losses_kwh),
        format_energy(sim.temperature_losses_kwh)
    );
    println!();

    println!("30-Day Production Buckets:");
    println!("{:-<40}", "");
    println!("{:<8} {:>14} {:>14}", "Bucket", "Days", "Energy");
    println!("{:-<40}", "");
    for (i, energy) in sim.monthly_production.iter().enumerate() {
        println!(
            "{:<8} {:>14} {:>14}",
            i + 1,
            format!("{} - {}", i * 30 + 1, (i + 1) * 30),
            format_energy(*energy)
        );
    }
    println!("{:-<40}", "");
}

pub fn print_financials(fin: &FinancialMetrics) {
    println!();
    println!("=== Financial Analysis ===");
    println!("  Equipment     : {}", format_currency(fin.system_cost));
    println!("  Installation  : {}", format_currency(fin.installation_cost));
    println!("  Total cost    : {}", format_currency(fin.total_cost));
    if fin.annual_maintenance > 0.0 {
        println!("  Maintenance   : {}/year", format_currency(fin.annual_maintenance));
    }
    println!("  Net savings   : {}/year", format_currency(fin.annual_savings));
    println!("  Payback       : {}", format_years(fin.payback_years));
    match fin.discounted_payback_years {
        Some(years) => println!("  Disc. payback : {}", format_years(years)),
        None => println!("  Disc. payback : not within 30 years"),
    }
    println!("  ROI           : {:.1}%", fin.roi_percent);
    println!("  NPV (5%)      : {}", format_currency(fin.npv));
    if fin.irr.converged {
        println!(
            "  IRR           : {:.2}% ({} iterations)",
            fin.irr.rate * 100.0,
            fin.irr.iterations
        );
    } else {
        println!(
            "  IRR           : {:.2}% (did NOT converge after {} iterations)",
            fin.irr.rate * 100.0,
            fin.irr.iterations
        );
    }
    println!("  LCOE          : {}/kWh", format_currency(fin.lcoe));
}

/// Print the lifetime projection with degradation and rate escalation.
pub fn print_lifetime(life: &LifetimeMetrics, lifespan: u32) {
    println!();
    println!("=== {}-Year Projection ===", lifespan);
    println!("  Production    : {}", format_energy(life.total_production_kwh));
    println!("  Savings       : {}", format_currency(life.total_savings));
    if let (Some(first), Some(last)) =
        (life.production_by_year.first(), life.production_by_year.last())
    {
        println!(
            "  Degradation   : {} (year 1) -> {} (year {})",
            format_energy(*first),
            format_energy(*last),
            lifespan
        );
    }
}

// ===================== TESTS =====================
