use std::sync::Arc;

use chrono::Utc;
use composite_scoring::CompositeScorer;
use forward_view::{ForwardInputs, ForwardViewEngine};
use fundamental_metrics::{build_snapshot, derive_metrics, value_per_share, DcfParams};
use momentum_analysis::MomentumAnalysisEngine;
use scoresheet_core::{
    CompositeResult, DerivedMetrics, FinancialSnapshot, MarketDataProvider, MomentumSnapshot,
    ScoreInputs, ScoresheetReport, StockRecord, StockScorecard, Verdict,
};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics};
use tokio::task::JoinSet;

/// Rate and growth assumptions shared by every security in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub risk_free_rate: f64,
    pub equity_risk_premium: f64,
    pub min_cost_of_capital: f64,
    pub terminal_growth: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.045,
            equity_risk_premium: 0.055,
            min_cost_of_capital: 0.08,
            terminal_growth: 0.02,
        }
    }
}

impl PipelineConfig {
    /// Equity discount rate, floored so a depressed risk-free environment
    /// cannot inflate every valuation in the batch
    pub fn cost_of_capital(&self) -> f64 {
        (self.risk_free_rate + self.equity_risk_premium).max(self.min_cost_of_capital)
    }
}

/// Per-security results gathered before the batch-scoped stage runs
struct SecurityAnalysis {
    snapshot: FinancialSnapshot,
    metrics: DerivedMetrics,
    fair_value: Option<f64>,
    momentum: MomentumSnapshot,
    inputs: ScoreInputs,
}

pub struct ScoresheetPipeline {
    provider: Arc<dyn MarketDataProvider>,
    config: PipelineConfig,
    momentum: MomentumAnalysisEngine,
    forward: ForwardViewEngine,
    scorer: CompositeScorer,
}

impl ScoresheetPipeline {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_config(provider, PipelineConfig::default())
    }

    pub fn with_config(provider: Arc<dyn MarketDataProvider>, config: PipelineConfig) -> Self {
        Self {
            provider,
            config,
            momentum: MomentumAnalysisEngine::new(),
            forward: ForwardViewEngine::new(),
            scorer: CompositeScorer::new(),
        }
    }

    /// Fetch, analyze, and score one batch of symbols.
    ///
    /// Failed fetches are skipped and the survivors keep their request
    /// order. Normalization ranges and the peer P/E anchor come from exactly
    /// the securities in this batch, so the same security can score
    /// differently in different company.
    pub async fn run(&self, symbols: &[String]) -> Result<ScoresheetReport, anyhow::Error> {
        tracing::info!("📊 Scoring batch of {} symbols", symbols.len());

        let records = self.fetch_records(symbols).await;

        let dcf_params = DcfParams {
            cost_of_capital: self.config.cost_of_capital(),
            terminal_growth: self.config.terminal_growth,
        };
        let analyses: Vec<SecurityAnalysis> = records
            .into_iter()
            .map(|record| self.analyze_security(record, &dcf_params))
            .collect();

        // Batch-scoped stage: cross-sectional ranges and the peer anchor
        let peer_pe = median_pe(&analyses);
        let score_inputs: Vec<ScoreInputs> =
            analyses.iter().map(|analysis| analysis.inputs.clone()).collect();
        let scores = self.scorer.score_batch(&score_inputs);

        let generated_at = Utc::now();
        let rows: Vec<StockScorecard> = analyses
            .into_iter()
            .zip(scores)
            .map(|(analysis, score)| self.assemble_row(analysis, score, peer_pe))
            .collect();

        tracing::info!("✅ Scored {}/{} symbols", rows.len(), symbols.len());

        Ok(ScoresheetReport {
            generated_at,
            total_requested: symbols.len(),
            total_scored: rows.len(),
            rows,
        })
    }

    /// Fetch all records concurrently, reassembling them in request order.
    /// A symbol whose fetch fails is dropped from the batch, not fatal.
    async fn fetch_records(&self, symbols: &[String]) -> Vec<StockRecord> {
        let mut tasks = JoinSet::new();
        for (idx, symbol) in symbols.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let result = provider.fetch_record(&symbol).await;
                (idx, symbol, result)
            });
        }

        let mut slots: Vec<Option<StockRecord>> = vec![None; symbols.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, _symbol, Ok(record))) => {
                    slots[idx] = Some(record);
                }
                Ok((_, symbol, Err(e))) => {
                    tracing::warn!("Skipping {}: {}", symbol, e);
                }
                Err(e) => {
                    tracing::error!("Fetch task error: {}", e);
                }
            }
        }
        slots.into_iter().flatten().collect()
    }

    fn analyze_security(&self, record: StockRecord, dcf_params: &DcfParams) -> SecurityAnalysis {
        let momentum = self.momentum.analyze(&record.price_history);
        let snapshot = build_snapshot(&record);
        let metrics = derive_metrics(&snapshot);
        let fair_value = value_per_share(&snapshot, dcf_params);
        let inputs = score_inputs(&snapshot, &metrics, fair_value);
        tracing::debug!(
            "{}: {:.0}% of scoring inputs available",
            snapshot.symbol,
            inputs.present_fraction() * 100.0
        );
        SecurityAnalysis {
            snapshot,
            metrics,
            fair_value,
            momentum,
            inputs,
        }
    }

    fn assemble_row(
        &self,
        analysis: SecurityAnalysis,
        score: CompositeResult,
        peer_pe: Option<f64>,
    ) -> StockScorecard {
        let SecurityAnalysis {
            snapshot,
            metrics,
            fair_value,
            momentum,
            inputs,
        } = analysis;

        let forward = self.forward.project(&ForwardInputs {
            price: snapshot.price,
            pe: metrics.pe,
            eps_cagr: metrics.eps_cagr,
            peer_pe,
            beta: snapshot.beta,
            cost_of_capital: self.config.cost_of_capital(),
        });
        let verdict = Verdict::from_composite(score.composite);
        tracing::debug!(
            "{}: composite {} ({})",
            snapshot.symbol,
            score.composite,
            verdict.to_label()
        );

        StockScorecard {
            symbol: snapshot.symbol,
            price: snapshot.price,
            market_cap: snapshot.market_cap,
            analyst_rating: snapshot.analyst_rating,
            dividend_yield: snapshot.dividend_yield,
            fair_value,
            metrics,
            momentum,
            scores: score,
            forward,
            verdict,
            data_completeness: inputs.present_fraction(),
        }
    }
}

fn score_inputs(
    snapshot: &FinancialSnapshot,
    metrics: &DerivedMetrics,
    fair_value: Option<f64>,
) -> ScoreInputs {
    let dcf_to_price = match (fair_value, snapshot.price) {
        (Some(fv), Some(price)) if price > 0.0 => Some(fv / price),
        _ => None,
    };
    ScoreInputs {
        pe: metrics.pe,
        ev_to_ebitda: metrics.ev_to_ebitda,
        dcf_to_price,
        roic: metrics.roic,
        ebit_margin: metrics.ebit_margin,
        roe: metrics.roe,
        revenue_cagr: metrics.revenue_cagr,
        eps_cagr: metrics.eps_cagr,
        fcf_cagr: metrics.fcf_cagr,
        debt_to_equity: metrics.debt_to_equity,
        interest_coverage: metrics.interest_coverage,
        insider_net_buys: snapshot.insider_net_buys,
        institutional_pct: snapshot.institutional_pct,
        short_interest_pct: snapshot.short_interest_pct,
        beta: snapshot.beta,
        fcf_to_net_income: metrics.fcf_to_net_income,
    }
}

/// Median of the P/Es present in the batch, the anchor forward views revert
/// toward. None when no security has a meaningful P/E.
fn median_pe(analyses: &[SecurityAnalysis]) -> Option<f64> {
    let pes: Vec<f64> = analyses
        .iter()
        .filter_map(|analysis| analysis.metrics.pe)
        .collect();
    if pes.is_empty() {
        return None;
    }
    let mut data = Data::new(pes);
    Some(data.median())
}
