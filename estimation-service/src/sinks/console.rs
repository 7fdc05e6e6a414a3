use std::io::{self, Write};

use meter_domain::domain::AuditRow;

use crate::pipeline::{PipelineError, Report, Sink};

const AUDIT_HEADERS: [&str; 6] = ["valid", "datetime", "meter", "estimated", "error", "comment"];

/// Scientific notation with `digits` digits after the decimal point and a
/// signed exponent of at least two digits, e.g. `1.5000e-03`.
pub fn format_scientific(value: f64, digits: usize) -> String {
    let formatted = format!("{value:.digits$e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        // NaN and infinities carry no exponent.
        return formatted;
    };
    match exponent.parse::<i32>() {
        Ok(exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        Err(_) => formatted,
    }
}

fn audit_cells(index: usize, row: &AuditRow) -> [String; 7] {
    [
        index.to_string(),
        row.valid.to_string(),
        row.datetime.clone(),
        format!("{:?}", row.meter),
        format!("{:.3}", row.estimated),
        row.error.clone(),
        row.comment.clone(),
    ]
}

/// Right-aligned text table with a leading row index.
pub fn render_audit_table(rows: &[AuditRow]) -> String {
    let header: Vec<String> = std::iter::once(String::new())
        .chain(AUDIT_HEADERS.iter().map(|h| h.to_string()))
        .collect();
    let body: Vec<[String; 7]> = rows.iter().enumerate().map(|(i, r)| audit_cells(i, r)).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &w)| format!("{cell:>w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = render_line(&header);
    out.push('\n');
    for cells in &body {
        out.push_str(&render_line(cells));
        out.push('\n');
    }
    out
}

/// Full human-readable report: model, fit quality, then the audit table.
pub fn render_report(report: &Report) -> String {
    let model = &report.model;
    let eval = &report.evaluation;

    let mut out = String::new();
    out.push_str(&format!("Intercept: {:.16}\n", model.intercept));
    out.push_str(&format!(
        "Coefficients: {}, {}\n\n",
        format_scientific(model.coefficients[0], 16),
        format_scientific(model.coefficients[1], 16)
    ));
    out.push_str(&format!("R^2 (Training): {}\n", eval.r2_train));
    out.push_str(&format!("R^2 (Testing): {}\n\n", eval.r2_test));
    out.push_str(&format!("MAE: {:.6}\n", eval.mae));
    out.push_str(&format!("RMSE: {:.6}\n\n", eval.rmse));
    out.push_str(&render_audit_table(&report.audit));
    out
}

/// Prints the report to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReportSink;

impl Sink for ConsoleReportSink {
    fn write(&self, report: &Report) -> Result<(), PipelineError> {
        let rendered = render_report(report);
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(rendered.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| PipelineError::Sink(format!("failed to write report to stdout: {e}")))
    }
}
