// src/process/assemble.rs

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

use super::types::NormalizedObservation;
use crate::error::PipelineError;

/// Label used when a row carries no region name.
pub const UNKNOWN_REGION: &str = "unknown region";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionPopulation {
    pub total_population: u64,
}

/// Region name → population, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    entries: Vec<(String, RegionPopulation)>,
}

impl RegionTable {
    /// Insert or overwrite; an overwritten region keeps its original position.
    pub fn insert(&mut self, region: String, population: RegionPopulation) {
        match self.entries.iter_mut().find(|(name, _)| *name == region) {
            Some((_, slot)) => *slot = population,
            None => self.entries.push((region, population)),
        }
    }

    pub fn get(&self, region: &str) -> Option<&RegionPopulation> {
        self.entries
            .iter()
            .find(|(name, _)| name == region)
            .map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegionPopulation)> {
        self.entries.iter().map(|(name, p)| (name.as_str(), p))
    }
}

impl Serialize for RegionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, population) in &self.entries {
            map.serialize_entry(name, population)?;
        }
        map.end()
    }
}

/// Survey year → regions. Serializes with years as string keys, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PopulationResult {
    years: BTreeMap<i32, RegionTable>,
}

impl PopulationResult {
    pub fn year(&self, year: i32) -> Option<&RegionTable> {
        self.years.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &RegionTable)> {
        self.years.iter().map(|(y, t)| (*y, t))
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Group observations by year and region. Zero observations is `NoData`.
pub fn assemble(
    observations: Vec<NormalizedObservation>,
) -> Result<PopulationResult, PipelineError> {
    if observations.is_empty() {
        return Err(PipelineError::NoData);
    }

    let mut years: BTreeMap<i32, RegionTable> = BTreeMap::new();
    for obs in observations {
        let region = obs
            .region_name
            .unwrap_or_else(|| UNKNOWN_REGION.to_string());
        years.entry(obs.survey_year).or_default().insert(
            region,
            RegionPopulation {
                total_population: obs.value,
            },
        );
    }

    debug!(years = years.len(), "assembled population result");
    Ok(PopulationResult { years })
}
