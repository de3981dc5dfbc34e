//! Cross-sectional scoring.
//!
//! Scores are batch-relative: each metric is normalized against the range of
//! values present in the current batch, weighted into six category subscores,
//! and blended into a 0-100 composite. The category layout lives in one
//! declarative table so the scoring loop itself stays a generic reducer.

use rayon::prelude::*;
use scoresheet_core::numeric::round_score;
use scoresheet_core::{CompositeResult, ScoreCategory, ScoreInputs};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Score for a missing value, a degenerate range, or an empty batch column
const NEUTRAL: f64 = 0.5;
/// Standard deviation of the earnings-quality bell around 1.0
const BELL_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Pe,
    EvToEbitda,
    DcfToPrice,
    Roic,
    EbitMargin,
    Roe,
    RevenueCagr,
    EpsCagr,
    FcfCagr,
    DebtToEquity,
    InterestCoverage,
    InsiderNetBuys,
    InstitutionalPct,
    ShortInterestPct,
    BetaStability,
    FcfToNetIncome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Normalization {
    /// Higher raw value scores higher
    MaxBetter,
    /// Lower raw value scores higher
    MinBetter,
    /// Gaussian bump peaking at 1.0, independent of the batch
    Bell,
}

struct Member {
    metric: Metric,
    mode: Normalization,
    weight: f64,
}

struct CategoryPlan {
    category: ScoreCategory,
    weight: f64,
    members: &'static [Member],
}

const PLAN: &[CategoryPlan] = &[
    CategoryPlan {
        category: ScoreCategory::Valuation,
        weight: 0.25,
        members: &[
            Member {
                metric: Metric::Pe,
                mode: Normalization::MinBetter,
                weight: 1.0,
            },
            Member {
                metric: Metric::EvToEbitda,
                mode: Normalization::MinBetter,
                weight: 1.0,
            },
            Member {
                metric: Metric::DcfToPrice,
                mode: Normalization::MaxBetter,
                weight: 1.0,
            },
        ],
    },
    CategoryPlan {
        category: ScoreCategory::Profitability,
        weight: 0.20,
        members: &[
            Member {
                metric: Metric::Roic,
                mode: Normalization::MaxBetter,
                weight: 0.5,
            },
            Member {
                metric: Metric::EbitMargin,
                mode: Normalization::MaxBetter,
                weight: 0.25,
            },
            Member {
                metric: Metric::Roe,
                mode: Normalization::MaxBetter,
                weight: 0.25,
            },
        ],
    },
    CategoryPlan {
        category: ScoreCategory::Growth,
        weight: 0.20,
        members: &[
            Member {
                metric: Metric::RevenueCagr,
                mode: Normalization::MaxBetter,
                weight: 0.4,
            },
            Member {
                metric: Metric::EpsCagr,
                mode: Normalization::MaxBetter,
                weight: 0.4,
            },
            Member {
                metric: Metric::FcfCagr,
                mode: Normalization::MaxBetter,
                weight: 0.2,
            },
        ],
    },
    CategoryPlan {
        category: ScoreCategory::Health,
        weight: 0.15,
        members: &[
            Member {
                metric: Metric::DebtToEquity,
                mode: Normalization::MinBetter,
                weight: 0.5,
            },
            Member {
                metric: Metric::InterestCoverage,
                mode: Normalization::MaxBetter,
                weight: 0.5,
            },
        ],
    },
    CategoryPlan {
        category: ScoreCategory::Sentiment,
        weight: 0.10,
        members: &[
            Member {
                metric: Metric::InsiderNetBuys,
                mode: Normalization::MaxBetter,
                weight: 0.4,
            },
            Member {
                metric: Metric::InstitutionalPct,
                mode: Normalization::MaxBetter,
                weight: 0.3,
            },
            Member {
                metric: Metric::ShortInterestPct,
                mode: Normalization::MinBetter,
                weight: 0.2,
            },
            Member {
                metric: Metric::BetaStability,
                mode: Normalization::MaxBetter,
                weight: 0.1,
            },
        ],
    },
    CategoryPlan {
        category: ScoreCategory::EarningsQuality,
        weight: 0.10,
        members: &[Member {
            metric: Metric::FcfToNetIncome,
            mode: Normalization::Bell,
            weight: 1.0,
        }],
    },
];

/// The value a metric contributes for one security. Beta is folded into a
/// stability measure (1 at beta 1.0, falling off both ways) before any
/// normalization sees it.
fn metric_value(inputs: &ScoreInputs, metric: Metric) -> Option<f64> {
    match metric {
        Metric::Pe => inputs.pe,
        Metric::EvToEbitda => inputs.ev_to_ebitda,
        Metric::DcfToPrice => inputs.dcf_to_price,
        Metric::Roic => inputs.roic,
        Metric::EbitMargin => inputs.ebit_margin,
        Metric::Roe => inputs.roe,
        Metric::RevenueCagr => inputs.revenue_cagr,
        Metric::EpsCagr => inputs.eps_cagr,
        Metric::FcfCagr => inputs.fcf_cagr,
        Metric::DebtToEquity => inputs.debt_to_equity,
        Metric::InterestCoverage => inputs.interest_coverage,
        Metric::InsiderNetBuys => inputs.insider_net_buys,
        Metric::InstitutionalPct => inputs.institutional_pct,
        Metric::ShortInterestPct => inputs.short_interest_pct,
        Metric::BetaStability => inputs.beta.map(|beta| 1.0 - (beta - 1.0).abs()),
        Metric::FcfToNetIncome => inputs.fcf_to_net_income,
    }
}

struct Range {
    min: f64,
    max: f64,
}

/// Per-metric value ranges across the batch, used by the min-max modes
fn metric_ranges(batch: &[ScoreInputs]) -> Vec<(Metric, Option<Range>)> {
    let mut ranges = Vec::new();
    for plan in PLAN {
        for member in plan.members {
            let values: Vec<f64> = batch
                .iter()
                .filter_map(|inputs| metric_value(inputs, member.metric))
                .collect();
            let range = if values.is_empty() {
                None
            } else {
                Some(Range {
                    min: values.as_slice().min(),
                    max: values.as_slice().max(),
                })
            };
            ranges.push((member.metric, range));
        }
    }
    ranges
}

fn normalize(value: Option<f64>, range: Option<&Range>, mode: Normalization) -> f64 {
    let value = match value {
        Some(v) => v,
        None => return NEUTRAL,
    };
    match mode {
        Normalization::Bell => (-(value - 1.0).powi(2) / (2.0 * BELL_WIDTH * BELL_WIDTH)).exp(),
        Normalization::MaxBetter | Normalization::MinBetter => {
            let range = match range {
                Some(r) => r,
                None => return NEUTRAL,
            };
            if range.max == range.min {
                return NEUTRAL;
            }
            let scaled = (value - range.min) / (range.max - range.min);
            if mode == Normalization::MinBetter {
                1.0 - scaled
            } else {
                scaled
            }
        }
    }
}

fn score_security(inputs: &ScoreInputs, ranges: &[(Metric, Option<Range>)]) -> CompositeResult {
    let mut categories = BTreeMap::new();
    let mut composite = 0.0;

    for plan in PLAN {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for member in plan.members {
            let range = ranges
                .iter()
                .find(|(metric, _)| *metric == member.metric)
                .and_then(|(_, range)| range.as_ref());
            let score = normalize(metric_value(inputs, member.metric), range, member.mode);
            weighted += member.weight * score;
            total_weight += member.weight;
        }
        let subscore = weighted / total_weight;
        composite += plan.weight * subscore;
        categories.insert(plan.category, round_score(subscore));
    }

    CompositeResult {
        composite: round_score(composite),
        categories,
    }
}

pub struct CompositeScorer;

impl CompositeScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a batch cross-sectionally. Output order matches input order;
    /// an empty batch scores to an empty vector.
    pub fn score_batch(&self, batch: &[ScoreInputs]) -> Vec<CompositeResult> {
        if batch.is_empty() {
            return Vec::new();
        }
        let ranges = metric_ranges(batch);
        batch
            .par_iter()
            .map(|inputs| score_security(inputs, &ranges))
            .collect()
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new()
    }
}
