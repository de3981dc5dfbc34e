use scoresheet_core::numeric::safe_div;
use scoresheet_core::{CashFlowStatement, FinancialSnapshot, IncomeStatement, StockRecord};

/// Flatten a raw provider record into the snapshot the engines consume.
///
/// Total function: a sparse or malformed record degrades to missing fields,
/// never to an error. Series keep provider order (newest first) and only
/// carry periods whose value could actually be resolved.
pub fn build_snapshot(record: &StockRecord) -> FinancialSnapshot {
    let mut snap = FinancialSnapshot {
        symbol: record.symbol.clone(),
        ..Default::default()
    };

    if let Some(quote) = &record.quote {
        snap.price = quote.price;
        snap.market_cap = quote.market_cap;
        snap.beta = quote.beta;
        snap.shares_outstanding = quote.shares_outstanding;
        snap.eps_ttm = quote.eps_ttm;
        snap.analyst_rating = quote.analyst_rating.clone();
        snap.dividend_yield = quote.dividend_yield;
    }

    snap.revenue_series = record
        .income_history
        .iter()
        .filter_map(|period| period.revenue)
        .collect();
    snap.eps_series = record
        .income_history
        .iter()
        .filter_map(period_eps)
        .collect();
    snap.fcf_series = record
        .cash_flow_history
        .iter()
        .filter_map(period_fcf)
        .collect();

    if let Some(latest) = record.income_history.first() {
        snap.revenue = latest.revenue;
        snap.cogs = latest.cost_of_revenue;
        snap.ebit = latest.ebit;
        snap.ebitda = latest.ebitda;
        snap.net_income = latest.net_income;
        snap.interest_expense = latest.interest_expense;
    }

    if let Some(latest) = record.balance_history.first() {
        snap.total_assets = latest.total_assets;
        snap.current_assets = latest.current_assets;
        snap.current_liabilities = latest.current_liabilities;
        snap.total_equity = latest.total_equity;
        snap.total_liabilities = latest.total_liabilities;
        snap.retained_earnings = latest.retained_earnings;
        snap.total_debt = latest.total_debt;
        snap.cash = latest.cash_and_equivalents;
    }

    // Some providers only report debt and cash in the summary block
    if let Some(summary) = &record.summary {
        snap.total_debt = snap.total_debt.or(summary.total_debt);
        snap.cash = snap.cash.or(summary.total_cash);
    }

    if let Some(ownership) = &record.ownership {
        snap.short_interest_pct = ownership.short_interest_pct;
        snap.insider_net_buys = ownership.insider_net_buys;
        snap.institutional_pct = ownership.institutional_pct;
    }

    snap
}

fn period_eps(period: &IncomeStatement) -> Option<f64> {
    safe_div(period.net_income, period.shares_outstanding)
}

/// Reported FCF when present, otherwise operating cash flow plus capex
/// (capex arrives sign-negative, so the sum subtracts spending).
fn period_fcf(period: &CashFlowStatement) -> Option<f64> {
    period.free_cash_flow.or_else(|| {
        match (period.operating_cash_flow, period.capital_expenditure) {
            (Some(ocf), Some(capex)) => Some(ocf + capex),
            _ => None,
        }
    })
}
