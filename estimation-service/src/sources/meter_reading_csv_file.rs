use std::{fs::File, io::Read, path::PathBuf};

use csv::StringRecord;
use meter_domain::domain::MeterReading;

use super::{columns, flag_from_f64};
use crate::pipeline::{PipelineError, Source};

/// CSV source for `MeterReading`.
///
/// Expected header columns (by name, any order, extra columns ignored):
/// - FIELD_VALID (0 or 1)
/// - FIELD_DATETIME (kept verbatim)
/// - FIELD_HC
/// - FIELD_HWC
/// - FIELD_METER
/// - FIELD_COMMENT (kept verbatim, may be empty)
pub struct MeterReadingCsvFileSource {
    path: PathBuf,
}

impl MeterReadingCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

/// Header positions of the required columns.
struct ColumnIndex {
    valid: usize,
    datetime: usize,
    heating_circuit: usize,
    hot_water_circuit: usize,
    meter: usize,
    comment: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, PipelineError> {
        let missing: Vec<&str> = columns::ALL
            .iter()
            .copied()
            .filter(|name| !headers.iter().any(|h| h.trim() == *name))
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Load(format!(
                "missing column(s) {} in CSV header",
                missing.join(", ")
            )));
        }

        let position = |name: &str| -> usize {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .unwrap_or_default()
        };

        Ok(Self {
            valid: position(columns::VALID),
            datetime: position(columns::DATETIME),
            heating_circuit: position(columns::HEATING_CIRCUIT),
            hot_water_circuit: position(columns::HOT_WATER_CIRCUIT),
            meter: position(columns::METER),
            comment: position(columns::COMMENT),
        })
    }
}

fn parse_f64(value: &str, name: &str, line: u64) -> Result<f64, PipelineError> {
    value
        .trim()
        .parse()
        .map_err(|e| PipelineError::Load(format!("line {line}: invalid {name} '{value}': {e}")))
}

fn record_to_meter_reading(
    record: &StringRecord,
    index: &ColumnIndex,
) -> Result<MeterReading, PipelineError> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let get = |idx: usize, name: &str| -> Result<&str, PipelineError> {
        record
            .get(idx)
            .ok_or_else(|| PipelineError::Load(format!("line {line}: missing field '{name}'")))
    };

    let valid_str = get(index.valid, columns::VALID)?;
    let valid = flag_from_f64(parse_f64(valid_str, columns::VALID, line)?).ok_or_else(|| {
        PipelineError::Load(format!(
            "line {line}: {} must be 0 or 1, got '{valid_str}'",
            columns::VALID
        ))
    })?;

    Ok(MeterReading {
        valid,
        datetime: get(index.datetime, columns::DATETIME)?.to_string(),
        heating_circuit: parse_f64(
            get(index.heating_circuit, columns::HEATING_CIRCUIT)?,
            columns::HEATING_CIRCUIT,
            line,
        )?,
        hot_water_circuit: parse_f64(
            get(index.hot_water_circuit, columns::HOT_WATER_CIRCUIT)?,
            columns::HOT_WATER_CIRCUIT,
            line,
        )?,
        meter: parse_f64(get(index.meter, columns::METER)?, columns::METER, line)?,
        comment: get(index.comment, columns::COMMENT)?.to_string(),
    })
}

/// Parse every record of a CSV stream, keeping source order.
pub fn read_meter_readings<R: Read>(reader: R) -> Result<Vec<MeterReading>, PipelineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::Load(format!("failed to read CSV headers: {e}")))?
        .clone();
    let index = ColumnIndex::resolve(&headers)?;

    let mut readings = Vec::new();
    for result in rdr.records() {
        let record =
            result.map_err(|e| PipelineError::Load(format!("failed to read CSV record: {e}")))?;
        readings.push(record_to_meter_reading(&record, &index)?);
    }

    Ok(readings)
}

impl Source for MeterReadingCsvFileSource {
    fn load(&self) -> Result<Vec<MeterReading>, PipelineError> {
        let file = File::open(&self.path).map_err(|e| {
            PipelineError::Load(format!(
                "failed to open CSV file {}: {e}",
                self.path.display()
            ))
        })?;
        read_meter_readings(file)
    }
}
