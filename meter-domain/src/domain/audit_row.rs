/// Model output for a single source row, valid or not.
///
/// `estimated` is rounded to 3 decimals; `error` is `estimated - meter`
/// rendered with an explicit sign and 3 decimals (e.g. `+0.042`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuditRow {
    pub valid: u8,
    pub datetime: String,
    pub meter: f64,
    pub estimated: f64,
    pub error: String,
    pub comment: String,
}
