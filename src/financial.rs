//! Financial Metrics Calculator
//!
//! Payback period, ROI, NPV, IRR (Newton-Raphson) and LCOE for a solar PV
//! investment with constant annual savings. All functions are pure; zero
//! divisors come back as typed errors instead of `Infinity`.

use serde::Serialize;

use crate::error::CalcError;

// ===================== CONSTANTS =====================

/// Default discount rate for NPV and discounted payback (fraction)
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.05;

/// Default project lifespan (years)
pub const DEFAULT_PROJECT_LIFESPAN: u32 = 25;

/// Installation labor and balance-of-system markup on equipment cost
const INSTALLATION_MARKUP: f64 = 0.25;

/// Newton-Raphson iteration budget for IRR
const IRR_MAX_ITERATIONS: usize = 100;

/// Convergence tolerance on NPV for IRR
const IRR_TOLERANCE: f64 = 0.0001;

/// Initial IRR guess (10%)
const IRR_SEED: f64 = 0.1;

// ===================== TYPES =====================

/// Inputs for the financial analysis.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FinancialInputs {
    /// DC system size (kW)
    pub system_size_kw: f64,
    /// Installed equipment cost ($ per W)
    pub cost_per_watt: f64,
    /// Electricity rate ($ per kWh)
    pub electricity_rate: f64,
    /// First-year production (kWh/year)
    pub annual_production_kwh: f64,
    /// Project lifespan (years)
    pub project_lifespan: u32,
    /// Discount rate for NPV (fraction, e.g. 0.05)
    pub discount_rate: f64,
    /// Annual maintenance cost as a percentage of total cost (e.g. 1.0)
    pub maintenance_rate_percent: f64,
}

impl FinancialInputs {
    pub fn new(
        system_size_kw: f64,
        cost_per_watt: f64,
        electricity_rate: f64,
        annual_production_kwh: f64,
    ) -> Self {
        Self {
            system_size_kw,
            cost_per_watt,
            electricity_rate,
            annual_production_kwh,
            project_lifespan: DEFAULT_PROJECT_LIFESPAN,
            discount_rate: DEFAULT_DISCOUNT_RATE,
            maintenance_rate_percent: 0.0,
        }
    }

    pub fn with_lifespan(mut self, years: u32) -> Self {
        self.project_lifespan = years;
        self
    }

    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    /// Annual maintenance cost as a percentage of total cost per year.
    pub fn with_maintenance_rate(mut self, percent: f64) -> Self {
        self.maintenance_rate_percent = percent;
        self
    }
}

/// IRR estimate with its convergence status.
///
/// Newton-Raphson always yields a number; `converged` tells the caller
/// whether the NPV tolerance was actually met within the iteration budget.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IrrEstimate {
    /// Internal rate of return (fraction per year)
    pub rate: f64,
    /// Whether |NPV| fell below the tolerance
    pub converged: bool,
    /// Iterations actually used
    pub iterations: usize,
}

/// Complete financial analysis output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FinancialMetrics {
    /// Equipment cost ($)
    pub system_cost: f64,
    /// Installation cost ($), 25% of equipment
    pub installation_cost: f64,
    /// Total upfront cost ($)
    pub total_cost: f64,
    /// Annual maintenance cost ($/year)
    pub annual_maintenance: f64,
    /// Net annual savings: displaced grid electricity minus maintenance
    /// ($/year)
    pub annual_savings: f64,
    /// Simple payback period (years)
    pub payback_years: f64,
    /// Discounted payback period (years); None when the investment does
    /// not recover within 30 years
    pub discounted_payback_years: Option<f64>,
    /// Simple annual return on investment (%)
    pub roi_percent: f64,
    /// Net present value over the lifespan ($)
    pub npv: f64,
    /// Internal rate of return
    pub irr: IrrEstimate,
    /// Levelized cost of energy ($/kWh)
    pub lcoe: f64,
}

// ===================== METRICS =====================

/// Run the full financial analysis.
///
/// Maintenance is netted out of the annual savings, so every
/// cost-recovery metric (payback, ROI, NPV, IRR) works on the net annual
/// cash flow; lifetime maintenance also enters the LCOE cost side.
pub fn calculate_financial_metrics(
    inputs: &FinancialInputs,
) -> Result<FinancialMetrics, CalcError> {
    let system_cost = inputs.system_size_kw * 1000.0 * inputs.cost_per_watt;
    let installation_cost = system_cost * INSTALLATION_MARKUP;
    let total_cost = system_cost + installation_cost;

    let annual_maintenance = total_cost * (inputs.maintenance_rate_percent / 100.0);
    let annual_savings =
        inputs.annual_production_kwh * inputs.electricity_rate - annual_maintenance;
    let payback_years = payback_period(total_cost, annual_savings)?;

    let npv = net_present_value(
        annual_savings,
        inputs.discount_rate,
        inputs.project_lifespan,
        total_cost,
    );
    let irr = irr_newton_raphson(total_cost, annual_savings, inputs.project_lifespan);
    let lifetime_cost = total_cost + annual_maintenance * inputs.project_lifespan as f64;
    let lcoe = levelized_cost(lifetime_cost, inputs.annual_production_kwh, inputs.project_lifespan)?;
    let discounted_payback_years =
        discounted_payback_period(total_cost, annual_savings, inputs.discount_rate);

    Ok(FinancialMetrics {
        system_cost,
        installation_cost,
        total_cost,
        annual_maintenance,
        annual_savings,
        payback_years,
        discounted_payback_years,
        roi_percent: (annual_savings / total_cost) * 100.0,
        npv,
        irr,
        lcoe,
    })
}

/// Simple payback period in years.
pub fn payback_period(total_cost: f64, annual_savings: f64) -> Result<f64, CalcError> {
    if annual_savings <= 0.0 {
        return Err(CalcError::NonFinanciallyViable { total_cost, annual_savings });
    }
    Ok(total_cost / annual_savings)
}

/// NPV of constant annual savings against an upfront investment.
pub fn net_present_value(
    annual_cash_flow: f64,
    discount_rate: f64,
    years: u32,
    initial_investment: f64,
) -> f64 {
    let mut npv = -initial_investment;
    for year in 1..=years {
        npv += annual_cash_flow / (1.0 + discount_rate).powi(year as i32);
    }
    npv
}

/// IRR by Newton-Raphson on the NPV function.
///
/// Seeded at 10%, at most 100 iterations, tolerance 0.0001 on NPV. When the
/// budget runs out or the derivative vanishes, the last iterate is returned
/// with `converged == false`.
pub fn irr_newton_raphson(
    initial_investment: f64,
    annual_cash_flow: f64,
    years: u32,
) -> IrrEstimate {
    let mut rate = IRR_SEED;

    for iteration in 0..IRR_MAX_ITERATIONS {
        let mut npv = -initial_investment;
        let mut derivative = 0.0;
        for year in 1..=years {
            let y = year as f64;
            npv += annual_cash_flow / (1.0 + rate).powf(y);
            derivative -= y * annual_cash_flow / (1.0 + rate).powf(y + 1.0);
        }

        if npv.abs() < IRR_TOLERANCE {
            return IrrEstimate { rate, converged: true, iterations: iteration };
        }
        if derivative.abs() < f64::EPSILON {
            return IrrEstimate { rate, converged: false, iterations: iteration };
        }

        rate -= npv / derivative;
    }

    IrrEstimate { rate, converged: false, iterations: IRR_MAX_ITERATIONS }
}

/// Levelized cost of energy over the project lifespan.
pub fn levelized_cost(
    total_cost: f64,
    annual_production_kwh: f64,
    lifespan_years: u32,
) -> Result<f64, CalcError> {
    let lifetime_production = annual_production_kwh * lifespan_years as f64;
    if lifetime_production <= 0.0 {
        return Err(CalcError::DivisionByZero { quantity: "lifetime production" });
    }
    Ok(total_cost / lifetime_production)
}

/// Discounted payback period with linear interpolation inside the crossing
/// year. `None` when the investment never pays back within 30 years.
pub fn discounted_payback_period(
    total_cost: f64,
    annual_cash_flow: f64,
    discount_rate: f64,
) -> Option<f64> {
    if annual_cash_flow <= 0.0 {
        return None;
    }

    let mut cumulative = 0.0;
    for year in 1..=30u32 {
        let present_value = annual_cash_flow / (1.0 + discount_rate).powi(year as i32);
        cumulative += present_value;

        if cumulative >= total_cost {
            let before = cumulative - present_value;
            let fraction = (total_cost - before) / present_value;
            return Some((year - 1) as f64 + fraction);
        }
    }
    None
}

// ===================== LIFETIME PROJECTION =====================

/// Year-by-year production and savings over the project lifespan.
#[derive(Debug, Clone, Serialize)]
pub struct LifetimeMetrics {
    /// Total production over the lifespan (kWh)
    pub total_production_kwh: f64,
    /// Total savings over the lifespan ($)
    pub total_savings: f64,
    /// Production per year (kWh), degraded
    pub production_by_year: Vec<f64>,
    /// Savings per year ($), with escalated electricity rates
    pub savings_by_year: Vec<f64>,
}

/// Project production with panel degradation and savings with
/// electricity-rate escalation (both fractions per year, e.g. 0.005 and
/// 0.02).
pub fn lifetime_metrics(
    initial_annual_production_kwh: f64,
    electricity_rate: f64,
    degradation_rate: f64,
    rate_escalation: f64,
    lifespan_years: u32,
) -> LifetimeMetrics {
    let mut production_by_year = Vec::with_capacity(lifespan_years as usize);
    let mut savings_by_year = Vec::with_capacity(lifespan_years as usize);
    let mut total_production = 0.0;
    let mut total_savings = 0.0;

    for year in 1..=lifespan_years {
        let age = (year - 1) as i32;
        let production = initial_annual_production_kwh * (1.0 - degradation_rate).powi(age);
        let rate = electricity_rate * (1.0 + rate_escalation).powi(age);
        let savings = production * rate;

        total_production += production;
        total_savings += savings;
        production_by_year.push(production);
        savings_by_year.push(savings);
    }

    LifetimeMetrics {
        total_production_kwh: total_production,
        total_savings,
        production_by_year,
        savings_by_year,
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    /// Bisection reference for IRR: robust but slow, used only to verify
    /// the Newton-Raphson estimate.
    fn irr_bisection(initial_investment: f64, annual_cash_flow: f64, years: u32) -> f64 {
        let npv_at = |rate: f64| {
            net_present_value(annual_cash_flow, rate, years, initial_investment)
        };
        let mut lo = 1e-9;
        let mut hi = 1.0;
        assert!(npv_at(lo) > 0.0 && npv_at(hi) < 0.0, "IRR not bracketed in (0, 1)");

        for _ in 0..200 {
            let mid = (lo + hi) / 2.0;
            if npv_at(mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo + hi) / 2.0
    }

    #[test]
    fn test_payback_exactly_ten_years() {
        // $10,000 cost, $1,000/yr savings -> exactly 10.0 years
        assert_eq!(payback_period(10_000.0, 1_000.0).unwrap(), 10.0);
    }

    #[test]
    fn test_payback_zero_savings_is_not_viable() {
        let result = payback_period(10_000.0, 0.0);
        assert!(matches!(result, Err(CalcError::NonFinanciallyViable { .. })));
    }

    #[test]
    fn test_npv_sign_follows_viability() {
        // $1,500/yr over 25 years at 5% has PV ~ $21,141: strongly positive
        // against $10,000, negative against $30,000
        let good = net_present_value(1_500.0, 0.05, 25, 10_000.0);
        let bad = net_present_value(1_500.0, 0.05, 25, 30_000.0);
        assert!(good > 10_000.0, "NPV {} unexpectedly low", good);
        assert!(bad < 0.0, "NPV {} should be negative", bad);
    }

    #[test]
    fn test_npv_zero_discount_is_plain_sum() {
        let npv = net_present_value(1_000.0, 0.0, 10, 4_000.0);
        assert!((npv - 6_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_irr_matches_bisection_reference() {
        // Cash flow: -$10,000 then $1,500/yr for 10 years; true IRR ~ 8.1%
        let newton = irr_newton_raphson(10_000.0, 1_500.0, 10);
        let reference = irr_bisection(10_000.0, 1_500.0, 10);

        assert!(newton.converged, "Newton-Raphson failed to converge");
        assert!(
            (newton.rate - reference).abs() < 0.001,
            "Newton-Raphson IRR {:.5} deviates from bisection {:.5}",
            newton.rate,
            reference
        );
    }

    #[test]
    fn test_irr_at_break_even() {
        // $10,000 repaid as 10 x $1,000 has IRR 0; NPV'(0) is finite so
        // Newton-Raphson lands there quickly
        let irr = irr_newton_raphson(10_000.0, 1_000.0, 10);
        assert!(irr.converged);
        assert!(irr.rate.abs() < 0.001, "break-even IRR should be ~0, got {}", irr.rate);
    }

    #[test]
    fn test_irr_never_panics_on_hopeless_cash_flow() {
        // Savings far below cost recovery: NPV has no positive root, the
        // estimate must still come back (last iterate, converged = false
        // or a negative rate), never a panic
        let irr = irr_newton_raphson(100_000.0, 1.0, 5);
        assert!(irr.rate.is_finite() || !irr.converged);
    }

    #[test]
    fn test_lcoe() {
        // $12,500 over 25 years of 6,000 kWh/yr = 150,000 kWh -> $0.0833/kWh
        let lcoe = levelized_cost(12_500.0, 6_000.0, 25).unwrap();
        assert!((lcoe - 12_500.0 / 150_000.0).abs() < 1e-12);

        assert!(matches!(
            levelized_cost(12_500.0, 0.0, 25),
            Err(CalcError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_full_metrics_pipeline() {
        // 4 kW at $1/W -> $4,000 equipment + $1,000 install = $5,000 total.
        // 6,192 kWh/yr at $0.15 -> $928.80/yr savings.
        let inputs = FinancialInputs::new(4.0, 1.0, 0.15, 6_192.0);
        let metrics = calculate_financial_metrics(&inputs).unwrap();

        assert!((metrics.system_cost - 4_000.0).abs() < 1e-9);
        assert!((metrics.installation_cost - 1_000.0).abs() < 1e-9);
        assert!((metrics.total_cost - 5_000.0).abs() < 1e-9);
        assert!((metrics.annual_savings - 928.8).abs() < 1e-9);
        assert!((metrics.payback_years - 5_000.0 / 928.8).abs() < 1e-9);
        assert!((metrics.roi_percent - 928.8 / 5_000.0 * 100.0).abs() < 1e-9);
        assert!(metrics.npv > 0.0, "a 5.4-year payback must have positive NPV");
        assert!(metrics.irr.converged);
        assert!(metrics.irr.rate > 0.15, "IRR {} too low for this payback", metrics.irr.rate);
        assert_eq!(metrics.annual_maintenance, 0.0);
        let discounted = metrics.discounted_payback_years.unwrap();
        assert!(discounted > metrics.payback_years);
    }

    #[test]
    fn test_maintenance_nets_out_of_every_metric() {
        // 1% of the $5,000 total cost is $50/yr of maintenance, so the net
        // cash flow drops from $928.80 to $878.80 and every cost-recovery
        // metric worsens accordingly
        let base = FinancialInputs::new(4.0, 1.0, 0.15, 6_192.0);
        let with_upkeep = base.with_maintenance_rate(1.0);

        let clean = calculate_financial_metrics(&base).unwrap();
        let upkeep = calculate_financial_metrics(&with_upkeep).unwrap();

        assert!((upkeep.annual_maintenance - 50.0).abs() < 1e-9);
        assert!((upkeep.annual_savings - 878.8).abs() < 1e-9);
        assert!((upkeep.payback_years - 5_000.0 / 878.8).abs() < 1e-9);
        assert!(upkeep.payback_years > clean.payback_years);
        assert!(upkeep.npv < clean.npv);
        assert!(upkeep.irr.rate < clean.irr.rate);
        // Lifetime maintenance ($50 x 25 yr) raises the LCOE cost side
        let expected_lcoe = (5_000.0 + 50.0 * 25.0) / (6_192.0 * 25.0);
        assert!((upkeep.lcoe - expected_lcoe).abs() < 1e-12);
    }

    #[test]
    fn test_maintenance_swallowing_savings_is_not_viable() {
        // 20% of $5,000 is $1,000/yr, more than the $928.80 the system earns
        let inputs = FinancialInputs::new(4.0, 1.0, 0.15, 6_192.0).with_maintenance_rate(20.0);
        let result = calculate_financial_metrics(&inputs);
        assert!(matches!(result, Err(CalcError::NonFinanciallyViable { .. })));
    }

    #[test]
    fn test_discounted_payback_is_longer_than_simple() {
        let simple = payback_period(10_000.0, 1_500.0).unwrap();
        let discounted = discounted_payback_period(10_000.0, 1_500.0, 0.05).unwrap();
        assert!(
            discounted > simple,
            "discounted payback {:.2} must exceed simple {:.2}",
            discounted,
            simple
        );
    }

    #[test]
    fn test_discounted_payback_never_recovers() {
        assert_eq!(discounted_payback_period(1_000_000.0, 1_000.0, 0.05), None);
        assert_eq!(discounted_payback_period(1_000.0, 0.0, 0.05), None);
    }

    #[test]
    fn test_lifetime_degradation_and_escalation() {
        let life = lifetime_metrics(6_000.0, 0.15, 0.005, 0.02, 25);

        assert_eq!(life.production_by_year.len(), 25);
        // Year 1 is undegraded
        assert!((life.production_by_year[0] - 6_000.0).abs() < 1e-9);
        // Monotonic decline
        for w in life.production_by_year.windows(2) {
            assert!(w[1] < w[0]);
        }
        // Escalation outpaces degradation at these rates, so yearly savings grow
        assert!(life.savings_by_year[24] > life.savings_by_year[0]);
        assert!(life.total_production_kwh < 6_000.0 * 25.0);
    }
}
