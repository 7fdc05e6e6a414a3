//! Two-feature ordinary least squares.
//!
//! Features and target are centered first, the centered 2-column system is
//! solved through an SVD, and the intercept is recovered from the means. The
//! centering makes the mean training residual zero by construction.

use meter_domain::domain::{FittedModel, TrainingSample};
use nalgebra::{DMatrix, DVector};

/// HC and HWC.
pub const FEATURE_COUNT: usize = 2;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("need at least {required} training rows, got {rows}")]
    TooFewRows { rows: usize, required: usize },
    #[error("training data contains non-finite values")]
    NonFinite,
    #[error("feature matrix is rank deficient (rank {rank} of {FEATURE_COUNT})")]
    RankDeficient { rank: usize },
    #[error("least-squares solve failed: {0}")]
    Solve(&'static str),
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

pub fn fit(samples: &[TrainingSample]) -> Result<FittedModel, FitError> {
    let n = samples.len();
    let required = FEATURE_COUNT + 1;
    if n < required {
        return Err(FitError::TooFewRows { rows: n, required });
    }

    if samples.iter().any(|s| {
        !(s.heating_circuit.is_finite() && s.hot_water_circuit.is_finite() && s.meter.is_finite())
    }) {
        return Err(FitError::NonFinite);
    }

    let mean_hc = mean(samples.iter().map(|s| s.heating_circuit), n);
    let mean_hwc = mean(samples.iter().map(|s| s.hot_water_circuit), n);
    let mean_meter = mean(samples.iter().map(|s| s.meter), n);

    let x = DMatrix::from_fn(n, FEATURE_COUNT, |i, j| match j {
        0 => samples[i].heating_circuit - mean_hc,
        _ => samples[i].hot_water_circuit - mean_hwc,
    });
    let y = DVector::from_iterator(n, samples.iter().map(|s| s.meter - mean_meter));

    let svd = x.svd(true, true);
    let max_singular = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    // Same cutoff numpy uses for matrix_rank.
    let tolerance = max_singular * n.max(FEATURE_COUNT) as f64 * f64::EPSILON;
    let rank = if max_singular > 0.0 { svd.rank(tolerance) } else { 0 };
    if rank < FEATURE_COUNT {
        return Err(FitError::RankDeficient { rank });
    }

    let beta = svd.solve(&y, tolerance).map_err(FitError::Solve)?;
    let coefficients = [beta[0], beta[1]];
    let intercept = mean_meter - coefficients[0] * mean_hc - coefficients[1] * mean_hwc;

    Ok(FittedModel {
        intercept,
        coefficients,
    })
}
