/// One row of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterReading {
    pub valid: bool,
    pub datetime: String,
    pub heating_circuit: f64,
    pub hot_water_circuit: f64,
    pub meter: f64,
    pub comment: String,
}

/// The numeric projection of a valid reading used for training and testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSample {
    pub heating_circuit: f64,
    pub hot_water_circuit: f64,
    pub meter: f64,
}

impl From<&MeterReading> for TrainingSample {
    fn from(r: &MeterReading) -> Self {
        TrainingSample {
            heating_circuit: r.heating_circuit,
            hot_water_circuit: r.hot_water_circuit,
            meter: r.meter,
        }
    }
}
