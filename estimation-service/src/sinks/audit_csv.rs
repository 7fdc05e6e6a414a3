use std::{fs::File, io::Write, path::PathBuf};

use meter_domain::domain::AuditRow;

use crate::pipeline::{PipelineError, Report, Sink};

/// Writes the audit table as CSV, one row per source reading.
pub struct AuditCsvSink {
    path: PathBuf,
}

impl AuditCsvSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

pub fn write_audit_csv<W: Write>(rows: &[AuditRow], writer: W) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| PipelineError::Sink(format!("failed to write audit row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| PipelineError::Sink(format!("failed to flush audit CSV: {e}")))
}

impl Sink for AuditCsvSink {
    fn write(&self, report: &Report) -> Result<(), PipelineError> {
        let file = File::create(&self.path).map_err(|e| {
            PipelineError::Sink(format!(
                "failed to create audit CSV {}: {e}",
                self.path.display()
            ))
        })?;
        write_audit_csv(&report.audit, file)?;
        tracing::info!(
            rows = report.audit.len(),
            path = %self.path.display(),
            "wrote audit CSV"
        );
        Ok(())
    }
}
