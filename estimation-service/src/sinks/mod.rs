pub mod audit_csv;
pub mod console;

pub use audit_csv::AuditCsvSink;
pub use console::ConsoleReportSink;
