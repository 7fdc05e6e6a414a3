use meter_domain::domain::{AuditRow, FittedModel, MeterReading};

use crate::{
    audit,
    config::SplitConfig,
    evaluate::{self, Evaluation},
    regression::{self, FitError},
    split::{self, SeededPermutation, TrainTestSplit},
    transform,
};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("load error: {0}")]
    Load(String),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("fit error: {0}")]
    Fit(#[from] FitError),
    /// Raised by `evaluate::r_squared`. `evaluate::evaluate` records it as
    /// `RSquared::Undefined`, so it never escapes `estimate`.
    #[error("degenerate metric: {0}")]
    DegenerateMetric(String),
    #[error("sink error: {0}")]
    Sink(String),
}

/// Supplies the full, ordered set of readings for one run.
pub trait Source {
    fn load(&self) -> Result<Vec<MeterReading>, PipelineError>;
}

/// Receives the finished report. Sinks never alter it.
pub trait Sink {
    fn write(&self, report: &Report) -> Result<(), PipelineError>;
}

/// Everything a single estimation run produces.
#[derive(Debug, Clone)]
pub struct Report {
    pub model: FittedModel,
    pub evaluation: Evaluation,
    pub train_rows: usize,
    pub test_rows: usize,
    /// One row per loaded reading, in source order.
    pub audit: Vec<AuditRow>,
}

pub struct Pipeline<S> {
    pub source: S,
    pub split: SplitConfig,
    pub sinks: Vec<Box<dyn Sink>>,
}

impl<S: Source> Pipeline<S> {
    pub fn run(&self) -> Result<Report, PipelineError> {
        let readings = self.source.load()?;
        tracing::info!(rows = readings.len(), "loaded meter readings");

        let report = estimate(&readings, &self.split)?;

        for sink in &self.sinks {
            sink.write(&report)?;
        }

        Ok(report)
    }
}

/// Filter, split, fit, evaluate and audit an already loaded table.
pub fn estimate(readings: &[MeterReading], split_cfg: &SplitConfig) -> Result<Report, PipelineError> {
    let samples = transform::training_samples(readings)?;
    tracing::info!(
        total = readings.len(),
        eligible = samples.len(),
        "filtered valid readings"
    );

    let permutation = SeededPermutation::new(split_cfg.seed);
    let TrainTestSplit { train, test } =
        split::train_test_split(&samples, split_cfg.test_size, &permutation)?;
    tracing::info!(
        train_rows = train.len(),
        test_rows = test.len(),
        seed = split_cfg.seed,
        test_size = split_cfg.test_size,
        "split eligible samples"
    );

    let model = regression::fit(&train)?;
    tracing::info!(
        intercept = model.intercept,
        coef_hc = model.coefficients[0],
        coef_hwc = model.coefficients[1],
        "fitted linear model"
    );

    let evaluation = evaluate::evaluate(&model, &train, &test)?;
    let audit = audit::audit(&model, readings);

    Ok(Report {
        model,
        evaluation,
        train_rows: train.len(),
        test_rows: test.len(),
        audit,
    })
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::evaluate::RSquared;

    fn reading(valid: bool, hc: f64, hwc: f64, meter: f64) -> MeterReading {
        MeterReading {
            valid,
            datetime: "2023-01-01 00:00".to_string(),
            heating_circuit: hc,
            hot_water_circuit: hwc,
            meter,
            comment: String::new(),
        }
    }

    fn plane_readings() -> Vec<MeterReading> {
        vec![
            reading(true, 1.0, 1.0, 3.0),
            reading(false, 9.0, 9.0, 0.0),
            reading(true, 2.0, 1.0, 4.0),
            reading(true, 1.0, 2.0, 4.0),
            reading(true, 3.0, 2.0, 6.0),
        ]
    }

    struct InMemorySource(Vec<MeterReading>);

    impl Source for InMemorySource {
        fn load(&self) -> Result<Vec<MeterReading>, PipelineError> {
            Ok(self.0.clone())
        }
    }

    struct RecordingSink(Rc<RefCell<Vec<usize>>>);

    impl Sink for RecordingSink {
        fn write(&self, report: &Report) -> Result<(), PipelineError> {
            self.0.borrow_mut().push(report.audit.len());
            Ok(())
        }
    }

    #[test]
    fn estimate_recovers_exact_plane_and_audits_every_row() {
        let readings = plane_readings();
        let report = estimate(&readings, &SplitConfig::default()).expect("estimate");

        assert!((report.model.intercept - 1.0).abs() < 1e-9);
        assert!((report.model.coefficients[0] - 1.0).abs() < 1e-9);
        assert!((report.model.coefficients[1] - 1.0).abs() < 1e-9);
        match report.evaluation.r2_train {
            RSquared::Value(r2) => assert!((r2 - 1.0).abs() < 1e-9),
            RSquared::Undefined => panic!("train R^2 should be defined"),
        }
        // A single test row has no variance.
        assert_eq!(report.evaluation.r2_test, RSquared::Undefined);

        assert_eq!((report.train_rows, report.test_rows), (3, 1));
        assert_eq!(report.audit.len(), readings.len());
        assert_eq!(report.audit[1].valid, 0);
        assert_eq!(report.audit[1].estimated, 19.0);
        assert_eq!(report.audit[1].error, "+19.000");
    }

    #[test]
    fn estimate_is_deterministic_for_fixed_seed() {
        let readings: Vec<MeterReading> = (0..12)
            .map(|i| {
                let hc = i as f64;
                let hwc = ((i * 5) % 7) as f64;
                let noise = if i % 2 == 0 { 0.3 } else { -0.3 };
                reading(true, hc, hwc, 2.0 + 0.5 * hc + 1.5 * hwc + noise)
            })
            .collect();

        let a = estimate(&readings, &SplitConfig::default()).expect("first run");
        let b = estimate(&readings, &SplitConfig::default()).expect("second run");
        assert_eq!(a.model, b.model);
        assert_eq!(a.audit, b.audit);
        assert_eq!((a.train_rows, a.test_rows), (9, 3));
    }

    #[test]
    fn estimate_rejects_table_without_valid_rows() {
        let readings = vec![reading(false, 1.0, 1.0, 3.0), reading(false, 2.0, 1.0, 5.0)];
        let res = estimate(&readings, &SplitConfig::default());
        assert!(matches!(res, Err(PipelineError::InsufficientData(_))));
    }

    #[test]
    fn estimate_fails_fit_when_training_subset_is_too_small() {
        // 3 valid rows leave 2 for training after the 25% test cut.
        let readings = vec![
            reading(true, 1.0, 1.0, 3.0),
            reading(true, 2.0, 1.0, 5.0),
            reading(true, 1.0, 2.0, 4.0),
        ];
        let res = estimate(&readings, &SplitConfig::default());
        assert!(matches!(
            res,
            Err(PipelineError::Fit(FitError::TooFewRows { rows: 2, .. }))
        ));
    }

    #[test]
    fn pipeline_run_hands_report_to_every_sink() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let pipeline = Pipeline {
            source: InMemorySource(plane_readings()),
            split: SplitConfig::default(),
            sinks: vec![
                Box::new(RecordingSink(seen.clone())) as Box<dyn Sink>,
                Box::new(RecordingSink(seen.clone())),
            ],
        };

        let report = pipeline.run().expect("run");
        assert_eq!(report.audit.len(), 5);
        assert_eq!(*seen.borrow(), vec![5, 5]);
    }
}
