/// Linear model `meter = intercept + coefficients[0] * HC + coefficients[1] * HWC`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedModel {
    pub intercept: f64,
    pub coefficients: [f64; 2],
}

impl FittedModel {
    pub fn predict(&self, heating_circuit: f64, hot_water_circuit: f64) -> f64 {
        self.intercept
            + heating_circuit * self.coefficients[0]
            + hot_water_circuit * self.coefficients[1]
    }
}
