// src/process/mod.rs

pub mod assemble;
pub mod extract;
pub mod normalize;
pub mod types;

pub use assemble::{assemble, PopulationResult, RegionPopulation, RegionTable, UNKNOWN_REGION};
pub use extract::extract_rows;
pub use normalize::normalize;
pub use types::{NormalizedObservation, ObservationRow};
