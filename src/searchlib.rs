//! Event search engine.
//!
//! Locates, inside a bounded window, the instants where a piecewise-constant
//! state function changes value ([`find_discrete`]) and the extrema of a
//! continuous function ([`find_maxima`], [`find_minima`]).
//!
//! The time axis is the UTC Modified Julian Date. State functions receive a
//! whole batch of instants and may fail; the first error aborts the search.
use itertools::Itertools;

use crate::{
    celestial_errors::CelestialError,
    constants::{MJD, SECONDS_PER_DAY},
};

/// Bracket width (days) at which a discrete transition is considered found.
pub const EPSILON_DISCRETE: f64 = 0.001 / SECONDS_PER_DAY;

/// Bracket width (days) at which an extremum is considered found.
pub const EPSILON_EXTREMA: f64 = 1.0 / SECONDS_PER_DAY;

/// Points per bracket on each refinement pass.
pub const DEFAULT_NUM: usize = 12;

fn check_window(start: MJD, end: MJD) -> Result<(), CelestialError> {
    if start < end && start.is_finite() && end.is_finite() {
        Ok(())
    } else {
        Err(CelestialError::InvalidSearchWindow { start, end })
    }
}

/// Find every change of a discrete state function in `[start, end]`.
///
/// The window is sampled every `step_days`, then each bracket where the state
/// differs is subdivided until narrower than [`EPSILON_DISCRETE`]. Returns the
/// instants (bracket ends) with the new state, in increasing order.
pub fn find_discrete<F>(
    start: MJD,
    end: MJD,
    step_days: f64,
    f: &mut F,
) -> Result<Vec<(MJD, i64)>, CelestialError>
where
    F: FnMut(&[MJD]) -> Result<Vec<i64>, CelestialError>,
{
    check_window(start, end)?;
    let step_days = if step_days > 0.0 { step_days } else { end - start };

    let sample_count = ((end - start) / step_days) as usize + 2;
    let mut mjd = linspace(start, end, sample_count);

    let end_mask = linspace(0.0, 1.0, DEFAULT_NUM);
    let start_mask: Vec<f64> = end_mask.iter().copied().rev().collect();

    loop {
        let y = f(&mjd)?;

        let transitions: Vec<usize> = y
            .iter()
            .tuple_windows()
            .positions(|(a, b)| a != b)
            .collect();

        if transitions.is_empty() {
            return Ok(Vec::new());
        }

        let starts: Vec<f64> = transitions.iter().map(|&i| mjd[i]).collect();
        let ends: Vec<f64> = transitions.iter().map(|&i| mjd[i + 1]).collect();

        let max_width = starts
            .iter()
            .zip(&ends)
            .map(|(s, e)| e - s)
            .fold(0.0_f64, f64::max);

        if max_width <= EPSILON_DISCRETE {
            let values = transitions.iter().map(|&i| y[i + 1]);
            return Ok(ends.into_iter().zip(values).collect());
        }

        mjd = outer_interp(&starts, &start_mask, &ends, &end_mask);
    }
}

/// Find the local maxima of `f` in `[start, end]` as `(instant, value)` pairs.
pub fn find_maxima<F>(
    start: MJD,
    end: MJD,
    step_days: f64,
    f: &mut F,
) -> Result<Vec<(MJD, f64)>, CelestialError>
where
    F: FnMut(&[MJD]) -> Result<Vec<f64>, CelestialError>,
{
    check_window(start, end)?;
    let step_days = if step_days > 0.0 { step_days } else { end - start };

    // pad one step on each side so maxima at the window edges are bracketed
    let steps = ((end - start) / step_days) as usize + 3;
    let real_step = (end - start) / steps as f64;
    let mut mjd = linspace(start - real_step, end + real_step, steps + 2);

    let end_alpha = linspace(0.0, 1.0, DEFAULT_NUM);
    let start_alpha: Vec<f64> = end_alpha.iter().copied().rev().collect();

    loop {
        let y = f(&mjd)?;

        if mjd.len() >= 2 && (mjd[1] - mjd[0]) <= EPSILON_EXTREMA {
            let mut maxima: Vec<(MJD, f64)> = identify_maxima(&mjd, &y)
                .into_iter()
                .filter(|(t, _)| *t >= start && *t <= end)
                .collect();
            maxima.dedup_by(|later, earlier| later.0 - earlier.0 <= EPSILON_EXTREMA);
            return Ok(maxima);
        }

        let (left, right) = choose_brackets(&y);
        if left.is_empty() {
            return Ok(Vec::new());
        }

        let starts: Vec<f64> = left.iter().map(|&i| mjd[i]).collect();
        let ends: Vec<f64> = right.iter().map(|&i| mjd[i]).collect();

        mjd = outer_interp(&starts, &start_alpha, &ends, &end_alpha);
        mjd.dedup();
    }
}

/// Find the local minima of `f` in `[start, end]`.
pub fn find_minima<F>(
    start: MJD,
    end: MJD,
    step_days: f64,
    f: &mut F,
) -> Result<Vec<(MJD, f64)>, CelestialError>
where
    F: FnMut(&[MJD]) -> Result<Vec<f64>, CelestialError>,
{
    let mut neg_f = |mjd: &[MJD]| -> Result<Vec<f64>, CelestialError> {
        Ok(f(mjd)?.into_iter().map(|v| -v).collect())
    };
    Ok(find_maxima(start, end, step_days, &mut neg_f)?
        .into_iter()
        .map(|(t, v)| (t, -v))
        .collect())
}

pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

fn outer_interp(starts: &[f64], start_mask: &[f64], ends: &[f64], end_mask: &[f64]) -> Vec<f64> {
    starts
        .iter()
        .zip(ends)
        .flat_map(|(s, e)| {
            start_mask
                .iter()
                .zip(end_mask)
                .map(move |(sm, em)| s * sm + e * em)
        })
        .collect()
}

/// Sign changes of the discrete second difference: -2 on a peak, -1 on a
/// plateau edge.
fn diff_sign_diff(y: &[f64]) -> Vec<i32> {
    let sign_diff: Vec<i32> = y
        .iter()
        .tuple_windows()
        .map(|(a, b)| {
            let d = b - a;
            if d > 0.0 {
                1
            } else if d < 0.0 {
                -1
            } else {
                0
            }
        })
        .collect();

    sign_diff.iter().tuple_windows().map(|(a, b)| b - a).collect()
}

fn choose_brackets(y: &[f64]) -> (Vec<usize>, Vec<usize>) {
    if y.len() < 3 {
        return (Vec::new(), Vec::new());
    }

    let mut left: Vec<usize> = diff_sign_diff(y)
        .iter()
        .positions(|&v| v < 0)
        .flat_map(|i| [i, i + 1])
        .collect();
    left.dedup();

    let right = left.iter().map(|&l| l + 1).collect();
    (left, right)
}

fn identify_maxima(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    if x.len() < 3 {
        return Vec::new();
    }

    let dsd = diff_sign_diff(y);

    let mut maxima: Vec<(f64, f64)> = dsd
        .iter()
        .positions(|&v| v == -2)
        .map(|i| (x[i + 1], y[i + 1]))
        .collect();

    // flat tops: a -1 followed by a -1 after a run of zeros
    let nonzero: Vec<(usize, i32)> = dsd
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| *v != 0)
        .collect();
    for ((left_idx, lv), (right_idx, rv)) in nonzero.iter().tuple_windows() {
        let right_idx = right_idx + 2;
        if *lv == -1 && *rv == -1 && right_idx < x.len() {
            maxima.push(((x[*left_idx] + x[right_idx]) / 2.0, y[left_idx + 1]));
        }
    }

    maxima.sort_by(|a, b| a.0.total_cmp(&b.0));
    maxima
}
