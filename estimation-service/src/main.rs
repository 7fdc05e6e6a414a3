use anyhow::{Context, Result};
use estimation_service::{
    config::{AppConfig, InputFormat},
    observability,
    pipeline::{Pipeline, PipelineError, Sink, Source},
    sinks::{AuditCsvSink, ConsoleReportSink},
    sources::{MeterReadingCsvFileSource, MeterReadingNdjsonFileSource},
};
use meter_domain::domain::MeterReading;
use std::env;

enum ReadingSource {
    Csv(MeterReadingCsvFileSource),
    Ndjson(MeterReadingNdjsonFileSource),
}

impl Source for ReadingSource {
    fn load(&self) -> Result<Vec<MeterReading>, PipelineError> {
        match self {
            Self::Csv(s) => s.load(),
            Self::Ndjson(s) => s.load(),
        }
    }
}

/// Usage:
///   estimation-service [input_path]
///
/// The optional path overrides `input.path` from the config file.
fn main() -> Result<()> {
    observability::init_tracing();

    let mut cfg = AppConfig::load()?;
    if let Some(path) = env::args().nth(1) {
        cfg.input.path = path.into();
    }

    let input_path = cfg.input.path.clone();
    let source = match cfg.input.resolved_format() {
        InputFormat::Csv => ReadingSource::Csv(MeterReadingCsvFileSource::new(&input_path)),
        InputFormat::Ndjson => ReadingSource::Ndjson(MeterReadingNdjsonFileSource::new(&input_path)),
    };

    let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(ConsoleReportSink)];
    if let Some(path) = &cfg.report.audit_csv_path {
        sinks.push(Box::new(AuditCsvSink::new(path)));
    }

    let pipeline = Pipeline {
        source,
        split: cfg.split.clone(),
        sinks,
    };

    if let Err(e) = pipeline.run() {
        tracing::error!(error = %e, input = %input_path.display(), "estimation run failed");
        return Err(e).with_context(|| format!("estimating from {}", input_path.display()));
    }

    Ok(())
}
