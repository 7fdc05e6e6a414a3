use meter_domain::domain::{AuditRow, FittedModel, MeterReading};

/// Decimal places of the audited estimate and error.
pub const AUDIT_DECIMALS: usize = 3;

/// Round through the decimal formatter, i.e. on the exact binary value with
/// ties to even.
pub fn round_to_decimals(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

pub fn format_signed(value: f64, decimals: usize) -> String {
    format!("{value:+.decimals$}")
}

/// Audit a single reading. The error is the *rounded* estimate minus the
/// actual meter value.
pub fn audit_row(model: &FittedModel, reading: &MeterReading) -> AuditRow {
    let raw = model.predict(reading.heating_circuit, reading.hot_water_circuit);
    let estimated = round_to_decimals(raw, AUDIT_DECIMALS);

    AuditRow {
        valid: u8::from(reading.valid),
        datetime: reading.datetime.clone(),
        meter: reading.meter,
        estimated,
        error: format_signed(estimated - reading.meter, AUDIT_DECIMALS),
        comment: reading.comment.clone(),
    }
}

/// One audit row per reading, valid or not, in input order.
pub fn audit(model: &FittedModel, readings: &[MeterReading]) -> Vec<AuditRow> {
    readings.iter().map(|r| audit_row(model, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(valid: bool, hc: f64, hwc: f64, meter: f64, comment: &str) -> MeterReading {
        MeterReading {
            valid,
            datetime: "01.02.2023 07:30".to_string(),
            heating_circuit: hc,
            hot_water_circuit: hwc,
            meter,
            comment: comment.to_string(),
        }
    }

    #[test]
    fn audit_row_matches_hand_computed_values() {
        let model = FittedModel {
            intercept: 0.5,
            coefficients: [0.1234, 0.2],
        };

        // 0.5 + 1.234 + 1.0 = 2.734
        let row = audit_row(&model, &reading(true, 10.0, 5.0, 2.7, "ok"));
        assert_eq!(row.estimated, 2.734);
        assert_eq!(row.error, "+0.034");

        let row = audit_row(&model, &reading(true, 10.0, 5.0, 3.0, ""));
        assert_eq!(row.error, "-0.266");
    }

    #[test]
    fn estimate_is_rounded_before_error_is_taken() {
        let model = FittedModel {
            intercept: 0.0,
            coefficients: [1.0, 0.0],
        };

        let row = audit_row(&model, &reading(true, 1.23456, 0.0, 1.0, ""));
        assert_eq!(row.estimated, 1.235);
        assert_eq!(row.error, "+0.235");

        let row = audit_row(&model, &reading(true, 1.2344, 0.0, 1.2344, ""));
        assert_eq!(row.estimated, 1.234);
        assert_eq!(row.error, "-0.000");
    }

    #[test]
    fn audit_keeps_every_row_in_order_including_invalid() {
        let model = FittedModel {
            intercept: 1.0,
            coefficients: [1.0, 1.0],
        };
        let readings = vec![
            reading(true, 1.0, 1.0, 3.0, "first"),
            reading(false, 0.0, 0.0, 99.0, "meter swapped"),
            reading(true, 3.0, 2.0, 6.0, "last"),
        ];

        let rows = audit(&model, &readings);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().map(|r| r.comment.as_str()).collect::<Vec<_>>(),
            vec!["first", "meter swapped", "last"]
        );
        assert_eq!(rows[1].valid, 0);
        assert_eq!(rows[1].meter, 99.0);
        assert_eq!(rows[1].estimated, 1.0);
        assert_eq!(rows[1].error, "-98.000");
        assert_eq!(rows[0].datetime, "01.02.2023 07:30");
    }

    #[test]
    fn format_signed_always_shows_sign() {
        assert_eq!(format_signed(0.042, 3), "+0.042");
        assert_eq!(format_signed(-1.3, 3), "-1.300");
        assert_eq!(format_signed(0.0, 3), "+0.000");
    }
}
