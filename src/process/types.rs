// src/process/types.rs

/// One data row of the tabular section, as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub category_code: String,
    /// Fixed-width numeric string; leading zeros are significant.
    pub area_code: String,
    pub region_name: Option<String>,
    /// Raw cell text, may be the suppression sentinel.
    pub value: String,
    pub survey_year: i32,
}

/// A total-population row for one prefecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedObservation {
    pub category_code: String,
    pub area_code: String,
    pub region_name: Option<String>,
    pub value: u64,
    pub survey_year: i32,
}
