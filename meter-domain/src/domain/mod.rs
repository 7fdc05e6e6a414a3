mod audit_row;
mod fitted_model;
mod meter_reading;

pub use audit_row::AuditRow;
pub use fitted_model::FittedModel;
pub use meter_reading::{MeterReading, TrainingSample};
