use scoresheet_core::ForwardView;
use serde::{Deserialize, Serialize};

/// Per-security inputs to the six-month projection. The peer P/E anchor is
/// batch-level context; when absent, the security reverts toward itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardInputs {
    pub price: Option<f64>,
    pub pe: Option<f64>,
    pub eps_cagr: Option<f64>,
    pub peer_pe: Option<f64>,
    pub beta: Option<f64>,
    pub cost_of_capital: f64,
}

const DRIFT_FLOOR: f64 = -0.20;
const DRIFT_CEILING: f64 = 0.25;
const REVERSION_SPEED: f64 = 0.3;
/// Exit multiple may move at most 30% off the current one over the window
const EXIT_PE_BAND: f64 = 0.3;
const SCENARIO_SPREAD: f64 = 0.15;
const HIGH_BETA: f64 = 1.3;
const LOW_BETA: f64 = 0.7;

pub struct ForwardViewEngine;

impl ForwardViewEngine {
    pub fn new() -> Self {
        Self
    }

    /// Project a base/bull/bear six-month return band, in percent of the
    /// current price. A missing or non-positive price or P/E makes the whole
    /// view missing, confidence included.
    pub fn project(&self, inputs: &ForwardInputs) -> ForwardView {
        let price = match inputs.price {
            Some(p) if p > 0.0 => p,
            _ => return ForwardView::default(),
        };
        let pe = match inputs.pe {
            Some(p) if p > 0.0 => p,
            _ => return ForwardView::default(),
        };

        let drift = inputs
            .eps_cagr
            .unwrap_or(0.0)
            .clamp(DRIFT_FLOOR, DRIFT_CEILING);
        let beta = inputs.beta.unwrap_or(1.0);

        let anchor = inputs.peer_pe.unwrap_or(pe);
        let mean_reversion = REVERSION_SPEED * (anchor - pe);
        let macro_shock = if beta > HIGH_BETA {
            -1.0
        } else if beta < LOW_BETA {
            1.0
        } else {
            0.0
        };
        let exit_pe = (pe + mean_reversion + macro_shock)
            .clamp((1.0 - EXIT_PE_BAND) * pe, (1.0 + EXIT_PE_BAND) * pe);

        // Half the annual drift: the window is six months
        let forward_eps = (price / pe) * (1.0 + drift / 2.0);
        let base_price = forward_eps * exit_pe;

        let confidence = 1.0
            - (drift.abs() + (beta - 1.0).abs() + (0.10 - inputs.cost_of_capital).max(0.0))
                .min(1.0);

        ForwardView {
            base_return_pct: Some((base_price / price - 1.0) * 100.0),
            bull_return_pct: Some((base_price * (1.0 + SCENARIO_SPREAD) / price - 1.0) * 100.0),
            bear_return_pct: Some((base_price * (1.0 - SCENARIO_SPREAD) / price - 1.0) * 100.0),
            confidence: Some(confidence),
        }
    }
}

impl Default for ForwardViewEngine {
    fn default() -> Self {
        Self::new()
    }
}
