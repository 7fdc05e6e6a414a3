pub mod meter_reading_csv_file;
pub mod meter_reading_ndjson_file;

pub use meter_reading_csv_file::MeterReadingCsvFileSource;
pub use meter_reading_ndjson_file::MeterReadingNdjsonFileSource;

/// Source column names.
pub mod columns {
    pub const VALID: &str = "FIELD_VALID";
    pub const DATETIME: &str = "FIELD_DATETIME";
    pub const HEATING_CIRCUIT: &str = "FIELD_HC";
    pub const HOT_WATER_CIRCUIT: &str = "FIELD_HWC";
    pub const METER: &str = "FIELD_METER";
    pub const COMMENT: &str = "FIELD_COMMENT";

    pub const ALL: [&str; 6] = [VALID, DATETIME, HEATING_CIRCUIT, HOT_WATER_CIRCUIT, METER, COMMENT];
}

/// The validity flag is 0 or 1; anything else is a malformed row.
pub(crate) fn flag_from_f64(value: f64) -> Option<bool> {
    if value == 1.0 {
        Some(true)
    } else if value == 0.0 {
        Some(false)
    } else {
        None
    }
}
