// src/fetch/mod.rs

pub mod estat;
pub mod years;

pub use estat::{EstatClient, RawYearPayload, StatsSource};
pub use years::{candidate_years, Clock, FixedClock, SystemClock};
