use scoresheet_core::numeric::{safe_div, series_cagr};
use scoresheet_core::{DerivedMetrics, FinancialSnapshot};

/// Flat corporate tax rate applied to EBIT for ROIC
const TAX_RATE: f64 = 0.25;
/// Interest coverage is clamped so near-zero interest expense cannot blow
/// the value out past everything else in a batch
const COVERAGE_LIMIT: f64 = 100.0;

/// Derive the full ratio set from one snapshot. Every output is `None`
/// whenever an input is missing or a denominator is zero.
pub fn derive_metrics(snapshot: &FinancialSnapshot) -> DerivedMetrics {
    let enterprise_value = enterprise_value(snapshot);
    DerivedMetrics {
        pe: pe_ratio(snapshot.price, snapshot.eps_ttm),
        enterprise_value,
        ev_to_ebitda: ev_to_ebitda(enterprise_value, snapshot.ebitda),
        roic: roic(snapshot),
        ebit_margin: safe_div(snapshot.ebit, snapshot.revenue),
        net_margin: safe_div(snapshot.net_income, snapshot.revenue),
        roe: safe_div(snapshot.net_income, snapshot.total_equity),
        revenue_cagr: series_cagr(&snapshot.revenue_series),
        eps_cagr: series_cagr(&snapshot.eps_series),
        fcf_cagr: series_cagr(&snapshot.fcf_series),
        debt_to_equity: safe_div(snapshot.total_debt, snapshot.total_equity),
        interest_coverage: interest_coverage(snapshot),
        fcf_to_net_income: safe_div(snapshot.fcf_series.first().copied(), snapshot.net_income),
        altman_z: altman_z(snapshot),
    }
}

fn pe_ratio(price: Option<f64>, eps_ttm: Option<f64>) -> Option<f64> {
    match (price, eps_ttm) {
        (Some(p), Some(e)) if e > 0.0 => Some(p / e),
        _ => None,
    }
}

/// Market cap plus debt minus cash. All three must be present; a reported
/// zero is a real value, not a gap.
fn enterprise_value(snapshot: &FinancialSnapshot) -> Option<f64> {
    match (snapshot.market_cap, snapshot.total_debt, snapshot.cash) {
        (Some(market_cap), Some(debt), Some(cash)) => Some(market_cap + debt - cash),
        _ => None,
    }
}

fn ev_to_ebitda(enterprise_value: Option<f64>, ebitda: Option<f64>) -> Option<f64> {
    match (enterprise_value, ebitda) {
        (Some(ev), Some(e)) if e > 0.0 => Some(ev / e),
        _ => None,
    }
}

/// Operating view of capital: assets net of current liabilities and cash,
/// falling back to the financing view (debt + equity - cash).
fn invested_capital(snapshot: &FinancialSnapshot) -> Option<f64> {
    match (
        snapshot.total_assets,
        snapshot.current_liabilities,
        snapshot.cash,
    ) {
        (Some(assets), Some(current_liabilities), Some(cash)) => {
            Some(assets - current_liabilities - cash)
        }
        _ => match (snapshot.total_debt, snapshot.total_equity, snapshot.cash) {
            (Some(debt), Some(equity), Some(cash)) => Some(debt + equity - cash),
            _ => None,
        },
    }
}

fn roic(snapshot: &FinancialSnapshot) -> Option<f64> {
    let nopat = snapshot.ebit.map(|ebit| ebit * (1.0 - TAX_RATE));
    safe_div(nopat, invested_capital(snapshot))
}

fn interest_coverage(snapshot: &FinancialSnapshot) -> Option<f64> {
    safe_div(snapshot.ebit, snapshot.interest_expense)
        .map(|coverage| coverage.clamp(-COVERAGE_LIMIT, COVERAGE_LIMIT))
}

/// Classic five-term Z-score. All-or-nothing: a single missing input makes
/// the whole score missing rather than silently skewing it.
fn altman_z(snapshot: &FinancialSnapshot) -> Option<f64> {
    let (assets, liabilities) = match (snapshot.total_assets, snapshot.total_liabilities) {
        (Some(a), Some(l)) if a != 0.0 && l != 0.0 => (a, l),
        _ => return None,
    };
    let working_capital = match (snapshot.current_assets, snapshot.current_liabilities) {
        (Some(current_assets), Some(current_liabilities)) => current_assets - current_liabilities,
        _ => return None,
    };
    let retained_earnings = snapshot.retained_earnings?;
    let ebit = snapshot.ebit?;
    let market_cap = snapshot.market_cap?;
    let revenue = snapshot.revenue?;

    Some(
        1.2 * (working_capital / assets)
            + 1.4 * (retained_earnings / assets)
            + 3.3 * (ebit / assets)
            + 0.6 * (market_cap / liabilities)
            + 1.0 * (revenue / assets),
    )
}
