//! Fallback policy for timelines that carry no recovery data.
//!
//! Many countries stopped reporting recoveries; the dashboard then shows an
//! estimate derived from cumulative cases. The policy is a plain value so
//! callers can swap or disable it without touching the normalizer.

use serde::Serialize;

/// Share of cumulative cases assumed recovered when no recovery data exists.
pub const DEFAULT_RECOVERY_RATIO: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "policy")]
pub enum RecoveryFallback {
    /// `recovered = round(cases * ratio)`.
    Estimate { ratio: f64 },
    /// Leave recoveries at zero.
    Zero,
}

impl Default for RecoveryFallback {
    fn default() -> Self {
        RecoveryFallback::Estimate {
            ratio: DEFAULT_RECOVERY_RATIO,
        }
    }
}

impl RecoveryFallback {
    /// Recovered count to report for `cases` when the source has none.
    pub fn recovered_for(self, cases: u64) -> u64 {
        match self {
            RecoveryFallback::Estimate { ratio } => estimate_recovered(cases, ratio),
            RecoveryFallback::Zero => 0,
        }
    }

    /// Whether applying this policy produces estimated (non-zero) values.
    pub fn is_estimate(self) -> bool {
        matches!(self, RecoveryFallback::Estimate { .. })
    }
}

/// `round(cases * ratio)`, clamped to `[0, cases]` for ratios outside `[0, 1]`.
pub fn estimate_recovered(cases: u64, ratio: f64) -> u64 {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 0;
    }
    let estimate = (cases as f64 * ratio).round();
    if estimate >= cases as f64 {
        cases
    } else {
        estimate as u64
    }
}
