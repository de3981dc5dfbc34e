use chrono::Duration;
use scoresheet_core::numeric::safe_ratio;
use scoresheet_core::{MomentumSnapshot, MomentumTag, PricePoint};

/// Trailing-return horizons in calendar days
const HORIZON_1M: i64 = 30;
const HORIZON_3M: i64 = 90;
const HORIZON_6M: i64 = 180;

pub struct MomentumAnalysisEngine;

impl MomentumAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Trailing returns and positioning for one price history.
    ///
    /// Points may arrive in any order; they are sorted by timestamp here.
    /// An empty history yields the all-missing snapshot, and a horizon the
    /// history does not reach yields a missing return for that horizon only.
    pub fn analyze(&self, points: &[PricePoint]) -> MomentumSnapshot {
        if points.is_empty() {
            return MomentumSnapshot::default();
        }

        let mut sorted: Vec<PricePoint> = points.to_vec();
        sorted.sort_by_key(|point| point.timestamp);
        let latest = &sorted[sorted.len() - 1];

        let ret_1m = trailing_return(&sorted, latest, HORIZON_1M);
        let ret_3m = trailing_return(&sorted, latest, HORIZON_3M);
        let ret_6m = trailing_return(&sorted, latest, HORIZON_6M);

        let high = sorted.iter().map(|p| p.close).fold(f64::MIN, f64::max);
        let low = sorted.iter().map(|p| p.close).fold(f64::MAX, f64::min);

        MomentumSnapshot {
            ret_1m,
            ret_3m,
            ret_6m,
            pct_from_high: safe_ratio(latest.close, high).map(|r| r - 1.0),
            pct_from_low: safe_ratio(latest.close, low).map(|r| r - 1.0),
            tag: momentum_tag(ret_1m, ret_3m, ret_6m),
        }
    }
}

impl Default for MomentumAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Return over `days` against the latest point at or before the cutoff
fn trailing_return(sorted: &[PricePoint], latest: &PricePoint, days: i64) -> Option<f64> {
    let cutoff = latest.timestamp - Duration::days(days);
    let reference = sorted.iter().rev().find(|p| p.timestamp <= cutoff)?;
    safe_ratio(latest.close, reference.close).map(|r| r - 1.0)
}

/// Tagged when every window is positive and each shorter window has already
/// out-earned the longer one behind it: the latest month beat the whole
/// quarter, and the quarter beat the half-year.
fn momentum_tag(
    ret_1m: Option<f64>,
    ret_3m: Option<f64>,
    ret_6m: Option<f64>,
) -> Option<MomentumTag> {
    match (ret_1m, ret_3m, ret_6m) {
        (Some(r1), Some(r3), Some(r6))
            if r1 > 0.0 && r3 > 0.0 && r6 > 0.0 && r3 > r6 && r1 > r3 =>
        {
            Some(MomentumTag::MostMomentum)
        }
        _ => None,
    }
}
