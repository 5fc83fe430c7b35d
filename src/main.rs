use clap::Parser;

use pvarray::cli::Args;
use pvarray::financial::{lifetime_metrics, FinancialInputs};
use pvarray::output::{self, JsonReport};
use pvarray::{
    calculate_financial_metrics, estimate_system_sizing, optimize_array, simulate_performance,
    temperature_adjusted, validate_compatibility,
};

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let panel = args.panel_spec();
    panel.validate()?;
    let inverter = args.inverter_spec();
    inverter.validate()?;
    let site = args.site();
    let envelope = args.thermal_envelope();
    let install = args.installation();

    // 1. Electrical values over the thermal envelope
    let temps = temperature_adjusted(&panel, &envelope);

    // 2. Size the system against the roof, clamping if it does not fit
    let sizing = estimate_system_sizing(
        args.target_power,
        &panel,
        &site,
        args.roof_area,
        args.performance_ratio,
    )?;

    // 3. Search for a string layout; infeasibility is reported, not fatal
    let design = optimize_array(&panel, &inverter, args.roof_area, sizing.system_size_kw, &envelope);

    // 4. Validate whatever layout was found against the inverter
    let compatibility = design
        .as_ref()
        .ok()
        .map(|d| validate_compatibility(&panel, &inverter, &d.configuration, &envelope));

    // 5. Simulate a year of production
    let performance = simulate_performance(
        sizing.system_size_kw,
        &panel,
        &site,
        &install,
        args.performance_ratio,
    )?;

    // 6. Economics from the simulated production
    let inputs = FinancialInputs::new(
        sizing.system_size_kw,
        args.cost_per_watt,
        args.electricity_rate,
        performance.annual_production_kwh,
    )
    .with_lifespan(args.lifespan)
    .with_discount_rate(args.discount_rate)
    .with_maintenance_rate(args.maintenance_rate);
    let financial = calculate_financial_metrics(&inputs)?;
    let lifetime = lifetime_metrics(
        performance.annual_production_kwh,
        args.electricity_rate,
        args.degradation_rate,
        args.rate_escalation,
        args.lifespan,
    );

    if args.json {
        let report = JsonReport {
            temperature: &temps,
            sizing: &sizing,
            array: design.as_ref().ok(),
            infeasibility: design.as_ref().err().map(|e| e.to_string()),
            compatibility: compatibility.as_ref(),
            performance: &performance,
            financial: &financial,
            lifetime: &lifetime,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::print_temperature_data(&temps);
    output::print_sizing(&sizing);
    output::print_array_design(&design);
    if let Some(report) = &compatibility {
        output::print_compatibility(report);
    }
    output::print_simulation(&performance);
    output::print_financials(&financial);
    output::print_lifetime(&lifetime, args.lifespan);

    Ok(())
}
