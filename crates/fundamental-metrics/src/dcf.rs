use scoresheet_core::numeric::series_cagr;
use scoresheet_core::FinancialSnapshot;
use serde::{Deserialize, Serialize};

/// Discount assumptions for the cash flow model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfParams {
    pub cost_of_capital: f64,
    pub terminal_growth: f64,
}

impl Default for DcfParams {
    fn default() -> Self {
        Self {
            cost_of_capital: 0.08,
            terminal_growth: 0.02,
        }
    }
}

const PROJECTION_YEARS: i32 = 5;
const GROWTH_FLOOR: f64 = -0.20;
const GROWTH_CEILING: f64 = 0.25;

/// Five-year discounted cash flow value per share.
///
/// The most recent FCF is the base; its historical growth rate (defaulted to
/// zero when the series cannot support one) is clamped before projecting.
/// Missing when the FCF series is empty, shares outstanding are absent or
/// zero, or the discount rate does not exceed terminal growth (the terminal
/// value would be unbounded or negative there).
pub fn value_per_share(snapshot: &FinancialSnapshot, params: &DcfParams) -> Option<f64> {
    let base_fcf = *snapshot.fcf_series.first()?;
    let shares = match snapshot.shares_outstanding {
        Some(s) if s > 0.0 => s,
        _ => return None,
    };
    if params.cost_of_capital <= params.terminal_growth {
        return None;
    }

    let growth = series_cagr(&snapshot.fcf_series)
        .unwrap_or(0.0)
        .clamp(GROWTH_FLOOR, GROWTH_CEILING);
    let rate = params.cost_of_capital;

    let projected: f64 = (1..=PROJECTION_YEARS)
        .map(|year| base_fcf * (1.0 + growth).powi(year) / (1.0 + rate).powi(year))
        .sum();

    let final_fcf = base_fcf * (1.0 + growth).powi(PROJECTION_YEARS);
    let terminal_value =
        final_fcf * (1.0 + params.terminal_growth) / (rate - params.terminal_growth);
    let terminal_pv = terminal_value / (1.0 + rate).powi(PROJECTION_YEARS);

    let value = (projected + terminal_pv) / shares;
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fcf_series: Vec<f64>, shares: Option<f64>) -> FinancialSnapshot {
        FinancialSnapshot {
            symbol: "TEST".to_string(),
            fcf_series,
            shares_outstanding: shares,
            ..Default::default()
        }
    }

    #[test]
    fn test_growing_fcf_values_above_naive_per_share() {
        let snap = snapshot(vec![120e6, 100e6, 80e6], Some(50e6));
        let value = value_per_share(&snap, &DcfParams::default()).unwrap();
        assert!(value.is_finite());
        assert!(value > 0.0);
        // Naive latest-FCF-per-share is 2.40; growth and terminal value must add to it
        assert!(value > 2.4);
    }

    #[test]
    fn test_missing_when_series_empty_or_shares_invalid() {
        let params = DcfParams::default();
        assert_eq!(value_per_share(&snapshot(vec![], Some(50e6)), &params), None);
        assert_eq!(value_per_share(&snapshot(vec![100.0], None), &params), None);
        assert_eq!(
            value_per_share(&snapshot(vec![100.0], Some(0.0)), &params),
            None
        );
    }

    #[test]
    fn test_missing_when_rate_not_above_terminal_growth() {
        let snap = snapshot(vec![120e6, 100e6], Some(50e6));
        let equal = DcfParams {
            cost_of_capital: 0.02,
            terminal_growth: 0.02,
        };
        assert_eq!(value_per_share(&snap, &equal), None);

        let inverted = DcfParams {
            cost_of_capital: 0.01,
            terminal_growth: 0.02,
        };
        assert_eq!(value_per_share(&snap, &inverted), None);
    }

    #[test]
    fn test_growth_clamped_on_the_way_down() {
        let params = DcfParams::default();
        // Both series collapse to the -20% floor, so same base ⇒ same value
        let steep = value_per_share(&snapshot(vec![10.0, 100.0], Some(10.0)), &params);
        let steeper = value_per_share(&snapshot(vec![10.0, 1000.0], Some(10.0)), &params);
        assert!((steep.unwrap() - steeper.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_growth_clamped_on_the_way_up() {
        let params = DcfParams::default();
        let fast = value_per_share(&snapshot(vec![100.0, 10.0], Some(10.0)), &params);
        let faster = value_per_share(&snapshot(vec![100.0, 1.0], Some(10.0)), &params);
        assert!((fast.unwrap() - faster.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_single_period_series_projects_flat() {
        // One data point cannot support a growth rate; the default is zero.
        // 8/share flat for 5 years at 8%, then 8*1.02/0.06 terminal, discounted.
        let snap = snapshot(vec![80.0], Some(10.0));
        let value = value_per_share(&snap, &DcfParams::default()).unwrap();
        assert!((value - 124.501).abs() < 1e-2);
    }

    #[test]
    fn test_missing_when_value_overflows() {
        // A base FCF at the float ceiling overflows the projection sum
        let snap = snapshot(vec![f64::MAX], Some(1.0));
        assert_eq!(value_per_share(&snap, &DcfParams::default()), None);
    }
}
