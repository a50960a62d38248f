//! Trailing-window kernels shared by the indicators.
//!
//! All kernels return a vector of the input's length. A position whose window
//! starts before index 0, or whose window contains a NaN, is NaN.

use std::collections::VecDeque;

/// First difference: `out[i] = values[i] - values[i - 1]`, NaN at 0.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = values[i] - values[i - 1];
    }
    out
}

/// Arithmetic mean over each trailing window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = slice.iter().sum::<f64>() / window as f64;
    }
    out
}

/// Sample standard deviation (divisor `window - 1`) over each trailing window.
///
/// A window of 1 has no sample deviation and yields NaN everywhere.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window < 2 || n < window {
        return out;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let sum_sq: f64 = slice
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum();
        out[i] = (sum_sq / (window - 1) as f64).sqrt();
    }
    out
}

/// Highest value over each trailing window.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, |kept, incoming| kept > incoming)
}

/// Lowest value over each trailing window.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, |kept, incoming| kept < incoming)
}

/// Monotonic deque of indices: the front is always the window's extreme.
///
/// `dominates(kept, incoming)` says whether an older value survives a newer one.
/// NaN values never enter the deque; a NaN inside the window masks the output.
fn rolling_extreme(values: &[f64], window: usize, dominates: fn(f64, f64) -> bool) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut last_nan: Option<usize> = None;

    for (i, &v) in values.iter().enumerate() {
        let start = (i + 1).saturating_sub(window);
        while deque.front().is_some_and(|&j| j < start) {
            deque.pop_front();
        }

        if v.is_nan() {
            last_nan = Some(i);
        } else {
            while deque.back().is_some_and(|&j| !dominates(values[j], v)) {
                deque.pop_back();
            }
            deque.push_back(i);
        }

        if i + 1 < window || last_nan.is_some_and(|j| j >= start) {
            continue;
        }
        if let Some(&j) = deque.front() {
            out[i] = values[j];
        }
    }
    out
}
