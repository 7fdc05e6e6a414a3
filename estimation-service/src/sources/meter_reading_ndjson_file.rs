use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::PathBuf,
};

use meter_domain::domain::MeterReading;
use serde::{de, Deserialize, Deserializer};

use super::flag_from_f64;
use crate::pipeline::{PipelineError, Source};

/// NDJSON source for `MeterReading`.
///
/// Each non-blank line is one JSON object keyed by the same column names as
/// the CSV source. `FIELD_VALID` may be `0`/`1` or a boolean, and
/// `FIELD_COMMENT` may be null or absent.
pub struct MeterReadingNdjsonFileSource {
    path: PathBuf,
}

impl MeterReadingNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(f64),
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(b) => Ok(b),
        RawFlag::Number(n) => flag_from_f64(n)
            .ok_or_else(|| de::Error::custom(format!("FIELD_VALID must be 0 or 1, got {n}"))),
    }
}

#[derive(Deserialize)]
struct NdjsonMeterReading {
    #[serde(rename = "FIELD_VALID", deserialize_with = "deserialize_flag")]
    valid: bool,
    #[serde(rename = "FIELD_DATETIME")]
    datetime: String,
    #[serde(rename = "FIELD_HC")]
    heating_circuit: f64,
    #[serde(rename = "FIELD_HWC")]
    hot_water_circuit: f64,
    #[serde(rename = "FIELD_METER")]
    meter: f64,
    #[serde(rename = "FIELD_COMMENT", default)]
    comment: Option<String>,
}

impl From<NdjsonMeterReading> for MeterReading {
    fn from(i: NdjsonMeterReading) -> Self {
        MeterReading {
            valid: i.valid,
            datetime: i.datetime,
            heating_circuit: i.heating_circuit,
            hot_water_circuit: i.hot_water_circuit,
            meter: i.meter,
            comment: i.comment.unwrap_or_default(),
        }
    }
}

pub fn read_meter_readings<R: Read>(reader: R) -> Result<Vec<MeterReading>, PipelineError> {
    let mut readings = Vec::new();

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = idx + 1;
        let line = line
            .map_err(|e| PipelineError::Load(format!("failed to read line {line_no}: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: NdjsonMeterReading = serde_json::from_str(&line).map_err(|e| {
            PipelineError::Load(format!("failed to parse json line {line_no}: {e}"))
        })?;
        readings.push(parsed.into());
    }

    Ok(readings)
}

impl Source for MeterReadingNdjsonFileSource {
    fn load(&self) -> Result<Vec<MeterReading>, PipelineError> {
        let file = File::open(&self.path).map_err(|e| {
            PipelineError::Load(format!(
                "failed to open NDJSON file {}: {e}",
                self.path.display()
            ))
        })?;
        read_meter_readings(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_and_skips_blank_ones() {
        let data = r#"{"FIELD_VALID":1,"FIELD_DATETIME":"2023-01-02","FIELD_HC":1.5,"FIELD_HWC":2,"FIELD_METER":7.25,"FIELD_COMMENT":"ok"}

{"FIELD_VALID":false,"FIELD_DATETIME":"2023-01-03","FIELD_HC":2,"FIELD_HWC":3,"FIELD_METER":9,"FIELD_COMMENT":null}
{"FIELD_VALID":true,"FIELD_DATETIME":"2023-01-04","FIELD_HC":3,"FIELD_HWC":4,"FIELD_METER":11}
"#;

        let readings = read_meter_readings(data.as_bytes()).expect("read");
        assert_eq!(readings.len(), 3);
        assert!(readings[0].valid);
        assert_eq!(readings[0].hot_water_circuit, 2.0);
        assert_eq!(readings[0].comment, "ok");
        assert!(!readings[1].valid);
        assert_eq!(readings[1].comment, "");
        assert!(readings[2].valid);
        assert_eq!(readings[2].datetime, "2023-01-04");
    }

    #[test]
    fn missing_field_names_the_line() {
        let data = r#"{"FIELD_VALID":1,"FIELD_DATETIME":"t","FIELD_HC":1,"FIELD_HWC":2,"FIELD_METER":3}
{"FIELD_VALID":1,"FIELD_DATETIME":"t","FIELD_HC":1,"FIELD_METER":3}
"#;
        match read_meter_readings(data.as_bytes()) {
            Err(PipelineError::Load(msg)) => {
                assert!(msg.contains("line 2"), "{msg}");
                assert!(msg.contains("FIELD_HWC"), "{msg}");
            }
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn flag_outside_zero_one_is_rejected() {
        let data = r#"{"FIELD_VALID":3,"FIELD_DATETIME":"t","FIELD_HC":1,"FIELD_HWC":2,"FIELD_METER":3}"#;
        assert!(matches!(
            read_meter_readings(data.as_bytes()),
            Err(PipelineError::Load(_))
        ));
    }
}
