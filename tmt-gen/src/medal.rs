//! Medal time calculation
//!
//! Pure function of the author time and the ranked times:
//!
//! - `Time_B = AT - f * (AT - WR)`, f = 0.5 (midpoint of author time and WR)
//! - `Time_A` = weighted mean of the fastest 20 times, weight of rank i is
//!   `c^(21 - i)` with c = 1.2. Faster ranks weigh more, but a lone outlier
//!   WR is still averaged against the rest of the top 20. Only defined with at
//!   least 20 times.
//! - medal = `min(Time_A, Time_B)` when `Time_A` exists, else `Time_B`
//!
//! Intermediate values stay in f64; rounding to whole milliseconds happens
//! once, at output, ties to even.
//!
//! The calculator never fails outward: an internal error yields a zero-filled
//! [`MedalComputation`] whose method carries the error text.

use crate::coerce;
use crate::types::{MedalComputation, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Blend factor between author time and WR
pub const BLEND_FACTOR: f64 = 0.5;
/// Rank weight decay constant
pub const DECAY: f64 = 1.2;
/// Number of ranked times needed for, and used by, `Time_A`
pub const TOP_N: usize = 20;

/// Largest magnitude that still rounds to an exact integer millisecond
const MAX_EXACT_MS: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Error)]
enum ComputeError {
    #[error("negative author time {0}")]
    NegativeAuthorTime(i64),

    #[error("negative ranked time {0}")]
    NegativeTime(i64),

    #[error("{field} is not finite")]
    NonFinite { field: &'static str },

    #[error("{field} out of range")]
    OutOfRange { field: &'static str },
}

/// Compute the medal time for a track
///
/// # Arguments
/// * `author_time_ms` - Author/target time; 0 means "unknown"
/// * `times_ms` - Ranked times in any order
pub fn compute(author_time_ms: i64, times_ms: &[i64]) -> MedalComputation {
    match try_compute(author_time_ms, times_ms) {
        Ok(computation) => computation,
        Err(e) => {
            warn!(error = %e, author_time_ms, records = times_ms.len(), "Medal computation failed");
            MedalComputation::failed(e.to_string())
        }
    }
}

/// Compute from raw JSON values
///
/// Non-numeric times are discarded; a non-numeric author time counts as 0.
pub fn compute_from_values(author_time: &Value, times: &[Value]) -> MedalComputation {
    let author_time_ms = coerce::as_i64(author_time).unwrap_or(0);
    let times_ms: Vec<i64> = times.iter().filter_map(coerce::as_i64).collect();
    compute(author_time_ms, &times_ms)
}

fn try_compute(author_time_ms: i64, times_ms: &[i64]) -> Result<MedalComputation, ComputeError> {
    if author_time_ms < 0 {
        return Err(ComputeError::NegativeAuthorTime(author_time_ms));
    }
    if let Some(&negative) = times_ms.iter().find(|t| **t < 0) {
        return Err(ComputeError::NegativeTime(negative));
    }

    let mut sorted = times_ms.to_vec();
    sorted.sort_unstable();
    let records_count = sorted.len();

    let wr_time_ms = sorted.first().copied().unwrap_or(author_time_ms);
    let time_b = time_b(author_time_ms, wr_time_ms, BLEND_FACTOR);
    let time_a = if records_count >= TOP_N {
        time_a(&sorted, DECAY, TOP_N)
    } else {
        None
    };

    let (medal, method) = match time_a {
        Some(a) => (a.min(time_b), Method::MinTimeATimeB),
        None => (time_b, Method::TimeB),
    };

    Ok(MedalComputation {
        author_time_ms,
        wr_time_ms,
        records_count,
        time_a_ms: time_a.map(|a| round_ms(a, "Time_A")).transpose()?,
        time_b_ms: round_ms(time_b, "Time_B")?,
        medal_time_ms: round_ms(medal, "medal time")?,
        method,
    })
}

/// Weighted mean of the fastest `n` of `sorted` (ascending)
///
/// Weight of rank i (1 = fastest) is `c^(n + 1 - i)`.
/// Returns `None` with fewer than `n` times or a zero weight sum.
pub fn time_a(sorted: &[i64], c: f64, n: usize) -> Option<f64> {
    if sorted.len() < n {
        return None;
    }

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, time) in sorted.iter().take(n).enumerate() {
        let rank = i + 1;
        let weight = c.powi((n + 1 - rank) as i32);
        num += weight * *time as f64;
        den += weight;
    }

    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Linear blend between author time and WR
pub fn time_b(author_time_ms: i64, wr_time_ms: i64, f: f64) -> f64 {
    let diff = (author_time_ms - wr_time_ms) as f64;
    author_time_ms as f64 - f * diff
}

fn round_ms(value: f64, field: &'static str) -> Result<i64, ComputeError> {
    if !value.is_finite() {
        return Err(ComputeError::NonFinite { field });
    }
    let rounded = value.round_ties_even();
    if rounded < 0.0 || rounded > MAX_EXACT_MS {
        return Err(ComputeError::OutOfRange { field });
    }
    Ok(rounded as i64)
}
