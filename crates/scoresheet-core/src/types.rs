use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Single close-price observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Current quote-level data for a security
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteInfo {
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub eps_ttm: Option<f64>,
    pub analyst_rating: Option<String>,
    pub dividend_yield: Option<f64>,
}

/// One income statement period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: Option<f64>,
    pub cost_of_revenue: Option<f64>,
    pub ebit: Option<f64>,
    pub ebitda: Option<f64>,
    pub net_income: Option<f64>,
    pub interest_expense: Option<f64>,
    pub shares_outstanding: Option<f64>,
}

/// One cash flow statement period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub operating_cash_flow: Option<f64>,
    /// Negative when cash leaves the company
    pub capital_expenditure: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

/// One balance sheet period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub total_assets: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub total_equity: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub retained_earnings: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
}

/// Aggregated figures some providers report outside the balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,
}

/// Ownership and positioning data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnershipInfo {
    pub short_interest_pct: Option<f64>,
    pub insider_net_buys: Option<f64>,
    pub institutional_pct: Option<f64>,
}

/// Raw per-symbol record delivered by a market data provider.
/// Statement histories are newest-first, at most a few periods deep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub quote: Option<QuoteInfo>,
    #[serde(default)]
    pub income_history: Vec<IncomeStatement>,
    #[serde(default)]
    pub cash_flow_history: Vec<CashFlowStatement>,
    #[serde(default)]
    pub balance_history: Vec<BalanceSheet>,
    pub summary: Option<FinancialSummary>,
    pub ownership: Option<OwnershipInfo>,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
}

/// Flattened per-security fundamentals. Absent upstream data stays absent;
/// no field is ever zero-filled to mean "unknown".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub symbol: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub eps_ttm: Option<f64>,
    /// Newest-first, only resolved values
    pub revenue_series: Vec<f64>,
    pub eps_series: Vec<f64>,
    pub fcf_series: Vec<f64>,
    pub revenue: Option<f64>,
    pub cogs: Option<f64>,
    pub ebit: Option<f64>,
    pub ebitda: Option<f64>,
    pub net_income: Option<f64>,
    pub interest_expense: Option<f64>,
    pub total_assets: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub total_equity: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub retained_earnings: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash: Option<f64>,
    pub beta: Option<f64>,
    pub short_interest_pct: Option<f64>,
    pub insider_net_buys: Option<f64>,
    pub institutional_pct: Option<f64>,
    pub analyst_rating: Option<String>,
    pub dividend_yield: Option<f64>,
}

/// Ratios and growth rates derived from a snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub pe: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub ev_to_ebitda: Option<f64>,
    pub roic: Option<f64>,
    pub ebit_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub roe: Option<f64>,
    pub revenue_cagr: Option<f64>,
    pub eps_cagr: Option<f64>,
    pub fcf_cagr: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub fcf_to_net_income: Option<f64>,
    pub altman_z: Option<f64>,
}

/// The 16 values the cross-sectional scorer consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub pe: Option<f64>,
    pub ev_to_ebitda: Option<f64>,
    pub dcf_to_price: Option<f64>,
    pub roic: Option<f64>,
    pub ebit_margin: Option<f64>,
    pub roe: Option<f64>,
    pub revenue_cagr: Option<f64>,
    pub eps_cagr: Option<f64>,
    pub fcf_cagr: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub insider_net_buys: Option<f64>,
    pub institutional_pct: Option<f64>,
    pub short_interest_pct: Option<f64>,
    pub beta: Option<f64>,
    pub fcf_to_net_income: Option<f64>,
}

impl ScoreInputs {
    /// Fraction of the 16 inputs carrying a value (0.0 to 1.0)
    pub fn present_fraction(&self) -> f64 {
        let fields = [
            self.pe,
            self.ev_to_ebitda,
            self.dcf_to_price,
            self.roic,
            self.ebit_margin,
            self.roe,
            self.revenue_cagr,
            self.eps_cagr,
            self.fcf_cagr,
            self.debt_to_equity,
            self.interest_coverage,
            self.insider_net_buys,
            self.institutional_pct,
            self.short_interest_pct,
            self.beta,
            self.fcf_to_net_income,
        ];
        let present = fields.iter().filter(|f| f.is_some()).count();
        present as f64 / fields.len() as f64
    }
}

/// Scoring category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ScoreCategory {
    Valuation,
    Profitability,
    Growth,
    Health,
    Sentiment,
    EarningsQuality,
}

impl ScoreCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::Valuation => "valuation",
            ScoreCategory::Profitability => "profitability",
            ScoreCategory::Growth => "growth",
            ScoreCategory::Health => "health",
            ScoreCategory::Sentiment => "sentiment",
            ScoreCategory::EarningsQuality => "earningsQuality",
        }
    }
}

/// Batch-relative score: 0-100 composite plus one subscore per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub composite: u32,
    pub categories: BTreeMap<ScoreCategory, u32>,
}

/// Categorical momentum flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumTag {
    MostMomentum,
}

impl MomentumTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MomentumTag::MostMomentum => "Most Momentum",
        }
    }
}

/// Trailing price momentum for one security
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MomentumSnapshot {
    pub ret_1m: Option<f64>,
    pub ret_3m: Option<f64>,
    pub ret_6m: Option<f64>,
    pub pct_from_high: Option<f64>,
    pub pct_from_low: Option<f64>,
    pub tag: Option<MomentumTag>,
}

/// Six-month scenario band, as percentage returns off the current price
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardView {
    pub base_return_pct: Option<f64>,
    pub bull_return_pct: Option<f64>,
    pub bear_return_pct: Option<f64>,
    pub confidence: Option<f64>,
}

/// Overall verdict derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Verdict {
    pub fn from_composite(score: u32) -> Self {
        match score {
            s if s >= 75 => Verdict::StrongBuy,
            s if s >= 60 => Verdict::Buy,
            s if s >= 40 => Verdict::Hold,
            s if s >= 25 => Verdict::Sell,
            _ => Verdict::StrongSell,
        }
    }

    /// Human-readable label for the verdict
    pub fn to_label(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "Strong Buy",
            Verdict::Buy => "Buy",
            Verdict::Hold => "Hold",
            Verdict::Sell => "Sell",
            Verdict::StrongSell => "Strong Sell",
        }
    }
}

/// Full scoring output for one security
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockScorecard {
    pub symbol: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub analyst_rating: Option<String>,
    pub dividend_yield: Option<f64>,
    pub fair_value: Option<f64>,
    pub metrics: DerivedMetrics,
    pub momentum: MomentumSnapshot,
    pub scores: CompositeResult,
    pub forward: ForwardView,
    pub verdict: Verdict,
    /// Fraction of scoring inputs that were available for this security
    pub data_completeness: f64,
}

/// Result of scoring one batch of symbols
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresheetReport {
    pub generated_at: DateTime<Utc>,
    pub total_requested: usize,
    pub total_scored: usize,
    pub rows: Vec<StockScorecard>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_provider_record_deserializes() {
        // Providers may omit whole sections; absent stays absent
        let record: StockRecord = serde_json::from_value(json!({
            "symbol": "ACME",
            "quote": { "price": 42.0, "eps_ttm": 2.1 },
            "income_history": [
                { "revenue": 1.0e9, "net_income": 1.5e8 }
            ]
        }))
        .unwrap();

        assert_eq!(record.symbol, "ACME");
        let quote = record.quote.unwrap();
        assert_eq!(quote.price, Some(42.0));
        assert_eq!(quote.market_cap, None);
        assert_eq!(record.income_history.len(), 1);
        assert_eq!(record.income_history[0].ebit, None);
        assert!(record.cash_flow_history.is_empty());
        assert!(record.price_history.is_empty());
        assert!(record.summary.is_none());
        assert!(record.ownership.is_none());
    }

    #[test]
    fn test_category_keys_serialize_camel_case() {
        let mut categories = std::collections::BTreeMap::new();
        categories.insert(ScoreCategory::Valuation, 50);
        categories.insert(ScoreCategory::EarningsQuality, 80);
        let result = CompositeResult {
            composite: 55,
            categories,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["categories"]["valuation"], 50);
        assert_eq!(value["categories"]["earningsQuality"], 80);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let mut categories = std::collections::BTreeMap::new();
        categories.insert(ScoreCategory::Valuation, 68);
        categories.insert(ScoreCategory::Profitability, 74);
        categories.insert(ScoreCategory::Growth, 81);
        categories.insert(ScoreCategory::Health, 66);
        categories.insert(ScoreCategory::Sentiment, 59);
        categories.insert(ScoreCategory::EarningsQuality, 90);
        let report = ScoresheetReport {
            generated_at: Utc::now(),
            total_requested: 2,
            total_scored: 1,
            rows: vec![StockScorecard {
                symbol: "ACME".to_string(),
                price: Some(42.0),
                market_cap: Some(1.1e9),
                analyst_rating: Some("Buy".to_string()),
                dividend_yield: None,
                fair_value: Some(55.5),
                metrics: DerivedMetrics {
                    pe: Some(20.0),
                    ..Default::default()
                },
                momentum: MomentumSnapshot {
                    ret_1m: Some(0.08),
                    tag: Some(MomentumTag::MostMomentum),
                    ..Default::default()
                },
                scores: CompositeResult {
                    composite: 72,
                    categories,
                },
                forward: ForwardView {
                    base_return_pct: Some(4.2),
                    bull_return_pct: Some(19.8),
                    bear_return_pct: Some(-11.4),
                    confidence: Some(0.9),
                },
                verdict: Verdict::Buy,
                data_completeness: 0.75,
            }],
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: ScoresheetReport = serde_json::from_str(&json).unwrap();

        assert_eq!(back.generated_at, report.generated_at);
        assert_eq!(back.total_requested, 2);
        assert_eq!(back.total_scored, 1);
        let row = &back.rows[0];
        assert_eq!(row.symbol, "ACME");
        assert_eq!(row.price, Some(42.0));
        assert_eq!(row.dividend_yield, None);
        assert_eq!(row.fair_value, Some(55.5));
        assert_eq!(row.metrics.pe, Some(20.0));
        assert_eq!(row.metrics.altman_z, None);
        assert_eq!(row.momentum.tag, Some(MomentumTag::MostMomentum));
        assert_eq!(row.scores, report.rows[0].scores);
        assert_eq!(row.forward.base_return_pct, Some(4.2));
        assert_eq!(row.verdict, Verdict::Buy);
        assert!((row.data_completeness - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_composite(82), Verdict::StrongBuy);
        assert_eq!(Verdict::from_composite(75), Verdict::StrongBuy);
        assert_eq!(Verdict::from_composite(74), Verdict::Buy);
        assert_eq!(Verdict::from_composite(60), Verdict::Buy);
        assert_eq!(Verdict::from_composite(59), Verdict::Hold);
        assert_eq!(Verdict::from_composite(40), Verdict::Hold);
        assert_eq!(Verdict::from_composite(39), Verdict::Sell);
        assert_eq!(Verdict::from_composite(25), Verdict::Sell);
        assert_eq!(Verdict::from_composite(24), Verdict::StrongSell);
        assert_eq!(Verdict::from_composite(0), Verdict::StrongSell);
        assert_eq!(Verdict::from_composite(40).to_label(), "Hold");
    }

    #[test]
    fn test_present_fraction_counts_all_sixteen_inputs() {
        assert_eq!(ScoreInputs::default().present_fraction(), 0.0);

        let one = ScoreInputs {
            roe: Some(0.2),
            ..Default::default()
        };
        assert!((one.present_fraction() - 1.0 / 16.0).abs() < 1e-12);

        let full = ScoreInputs {
            pe: Some(1.0),
            ev_to_ebitda: Some(1.0),
            dcf_to_price: Some(1.0),
            roic: Some(1.0),
            ebit_margin: Some(1.0),
            roe: Some(1.0),
            revenue_cagr: Some(1.0),
            eps_cagr: Some(1.0),
            fcf_cagr: Some(1.0),
            debt_to_equity: Some(1.0),
            interest_coverage: Some(1.0),
            insider_net_buys: Some(1.0),
            institutional_pct: Some(1.0),
            short_interest_pct: Some(1.0),
            beta: Some(1.0),
            fcf_to_net_income: Some(1.0),
        };
        assert_eq!(full.present_fraction(), 1.0);
    }

    #[test]
    fn test_momentum_tag_label() {
        assert_eq!(MomentumTag::MostMomentum.as_str(), "Most Momentum");
    }
}
