// src/pipeline.rs

use chrono::NaiveDate;
use futures::{stream, StreamExt};
use tracing::{info, instrument, warn};

use crate::error::{ExtractError, PipelineError};
use crate::fetch::{candidate_years, StatsSource};
use crate::process::{assemble, extract_rows, normalize, ObservationRow, PopulationResult};

/// Fetch every candidate year, then filter, normalize and assemble.
///
/// Years are merged in ascending order regardless of `concurrency`, so a
/// duplicate (year, region) resolves the same way either way. A year that
/// fails to fetch, has no header, or has an empty table is skipped; a
/// missing required column or an unparseable value ends the run.
#[instrument(level = "info", skip(source))]
pub async fn run(
    source: &dyn StatsSource,
    today: NaiveDate,
    concurrency: usize,
) -> Result<PopulationResult, PipelineError> {
    let years = candidate_years(today);
    info!(?years, "planned candidate years");

    let mut responses = stream::iter(years)
        .map(|year| async move { (year, source.fetch_year(year).await) })
        .buffered(concurrency.max(1));

    let mut rows: Vec<ObservationRow> = Vec::new();
    let mut fetched = Vec::new();
    let mut skipped = Vec::new();

    while let Some((year, response)) = responses.next().await {
        let payload = match response {
            Ok(p) => p,
            Err(e) => {
                warn!(year, reason = %e, "skipping year");
                skipped.push(year);
                continue;
            }
        };

        match extract_rows(&payload) {
            Ok(mut year_rows) => {
                info!(year, rows = year_rows.len(), "fetched year");
                rows.append(&mut year_rows);
                fetched.push(year);
            }
            Err(ExtractError::SchemaMismatch { missing }) => {
                return Err(PipelineError::SchemaMismatch { year, missing });
            }
            Err(e) => {
                warn!(year, reason = %e, "skipping year");
                skipped.push(year);
            }
        }
    }

    info!(?fetched, ?skipped, rows = rows.len(), "fetch complete");

    let result = assemble(normalize(rows)?)?;
    for (year, regions) in result.iter() {
        info!(year, regions = regions.len(), "assembled year");
    }
    Ok(result)
}
