use serde::Deserialize;

/// List representation of a device. The registry only ever exposes the
/// sensor count here, never the sensors themselves.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct DeviceSummary {
    pub id: String,
    pub approved: bool,
    pub sensor_count: usize,
}

/// Detail representation, including the full sensor set.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Device {
    pub id: String,
    pub approved: bool,
    pub sensors: Vec<Sensor>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Sensor {
    pub id: i64,
    pub name: String,
    pub r#type: String,
}
