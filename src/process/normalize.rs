// src/process/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::types::{NormalizedObservation, ObservationRow};
use crate::error::PipelineError;

/// Indicator code for total population.
pub const TOTAL_POPULATION: &str = "A1101";

/// Area code of the nationwide aggregate.
pub const NATIONWIDE_AREA: &str = "00000";

static PREFECTURE_AREA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}000$").expect("prefecture pattern should compile"));

/// Two digits followed by `000`, excluding the nationwide code.
pub fn is_prefecture(area_code: &str) -> bool {
    area_code != NATIONWIDE_AREA && PREFECTURE_AREA.is_match(area_code)
}

/// e-Stat writes a run of `*` where a figure is suppressed.
pub fn is_sentinel(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c == '*')
}

/// Sentinel becomes 0; anything else must be a finite non-negative number,
/// truncated toward zero.
pub fn coerce_value(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        return Some(0);
    }
    let n: f64 = trimmed.parse().ok()?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    Some(n.trunc() as u64)
}

/// Keep total-population prefecture rows and coerce their values.
pub fn normalize(rows: Vec<ObservationRow>) -> Result<Vec<NormalizedObservation>, PipelineError> {
    let total = rows.len();
    let mut out = Vec::new();

    for row in rows {
        if row.category_code != TOTAL_POPULATION || !is_prefecture(&row.area_code) {
            continue;
        }
        let value = coerce_value(&row.value).ok_or_else(|| PipelineError::InvalidValue {
            year: row.survey_year,
            area_code: row.area_code.clone(),
            value: row.value.clone(),
        })?;
        out.push(NormalizedObservation {
            category_code: row.category_code,
            area_code: row.area_code,
            region_name: row.region_name,
            value,
            survey_year: row.survey_year,
        });
    }

    debug!(input = total, kept = out.len(), "normalized rows");
    Ok(out)
}
