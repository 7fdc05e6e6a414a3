use std::fmt;

use meter_domain::domain::{FittedModel, TrainingSample};

use crate::pipeline::PipelineError;

/// Coefficient of determination, or `Undefined` when the subset's target has
/// no variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RSquared {
    Value(f64),
    Undefined,
}

impl fmt::Display for RSquared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:?}"),
            Self::Undefined => write!(f, "undefined (constant target)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub r2_train: RSquared,
    pub r2_test: RSquared,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
}

fn residuals<'a>(
    model: &'a FittedModel,
    samples: &'a [TrainingSample],
) -> impl Iterator<Item = f64> + 'a {
    samples
        .iter()
        .map(move |s| model.predict(s.heating_circuit, s.hot_water_circuit) - s.meter)
}

/// `1 - SS_res / SS_tot` over `samples`.
///
/// Constancy is decided on the target values themselves: the floating-point
/// mean of equal values need not equal them, which would leave a tiny
/// non-zero SS_tot.
pub fn r_squared(model: &FittedModel, samples: &[TrainingSample]) -> Result<f64, PipelineError> {
    let Some(first) = samples.first() else {
        return Err(PipelineError::DegenerateMetric(
            "R^2 of an empty subset".to_string(),
        ));
    };
    if samples.iter().all(|s| s.meter == first.meter) {
        return Err(PipelineError::DegenerateMetric(format!(
            "all {} target values equal {}, R^2 is undefined",
            samples.len(),
            first.meter
        )));
    }

    let mean = samples.iter().map(|s| s.meter).sum::<f64>() / samples.len() as f64;
    let ss_tot: f64 = samples.iter().map(|s| (s.meter - mean).powi(2)).sum();

    let ss_res: f64 = residuals(model, samples).map(|r| r * r).sum();
    Ok(1.0 - ss_res / ss_tot)
}

pub fn mean_absolute_error(model: &FittedModel, samples: &[TrainingSample]) -> f64 {
    residuals(model, samples).map(f64::abs).sum::<f64>() / samples.len() as f64
}

pub fn mean_squared_error(model: &FittedModel, samples: &[TrainingSample]) -> f64 {
    residuals(model, samples).map(|r| r * r).sum::<f64>() / samples.len() as f64
}

fn r_squared_or_undefined(model: &FittedModel, samples: &[TrainingSample], subset: &str) -> RSquared {
    match r_squared(model, samples) {
        Ok(v) => RSquared::Value(v),
        Err(e) => {
            tracing::warn!(error = %e, subset, "R^2 reported as undefined");
            RSquared::Undefined
        }
    }
}

/// R² on both subsets, plus MAE, MSE and RMSE on the test subset.
///
/// A degenerate R² does not fail the evaluation; only an empty test subset does.
pub fn evaluate(
    model: &FittedModel,
    train: &[TrainingSample],
    test: &[TrainingSample],
) -> Result<Evaluation, PipelineError> {
    if test.is_empty() {
        return Err(PipelineError::InsufficientData(
            "test subset is empty".to_string(),
        ));
    }

    let mse = mean_squared_error(model, test);
    Ok(Evaluation {
        r2_train: r_squared_or_undefined(model, train, "train"),
        r2_test: r_squared_or_undefined(model, test, "test"),
        mae: mean_absolute_error(model, test),
        mse,
        rmse: mse.sqrt(),
    })
}
