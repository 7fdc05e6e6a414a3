use meter_domain::domain::{MeterReading, TrainingSample};

use crate::pipeline::PipelineError;

/// Readings flagged valid, projected to the regression inputs.
///
/// Fails when no reading is valid; a fit over nothing is never attempted.
pub fn training_samples(readings: &[MeterReading]) -> Result<Vec<TrainingSample>, PipelineError> {
    let samples: Vec<TrainingSample> = readings
        .iter()
        .filter(|r| r.valid)
        .map(TrainingSample::from)
        .collect();

    if samples.is_empty() {
        return Err(PipelineError::InsufficientData(format!(
            "none of the {} readings is flagged valid",
            readings.len()
        )));
    }

    Ok(samples)
}
