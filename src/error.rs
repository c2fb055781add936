// src/error.rs

use thiserror::Error;

/// Why a single survey year produced no raw payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("non-success status {status}")]
    Status { status: u16 },

    #[error("empty body")]
    EmptyBody,
}

/// Failure to turn one raw payload into observation rows.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("header not found")]
    HeaderNotFound,

    #[error("empty table")]
    EmptyTable,

    #[error("malformed table: {0}")]
    Malformed(#[from] csv::Error),

    #[error("required columns missing: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{year}: required columns missing: {}", .missing.join(", "))]
    SchemaMismatch { year: i32, missing: Vec<String> },

    #[error("{year}: unparseable value {value:?} for area {area_code}")]
    InvalidValue {
        year: i32,
        area_code: String,
        value: String,
    },

    #[error("no population data for any candidate year")]
    NoData,
}

/// Startup configuration could not be resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("secret {secret} could not be read: {reason}")]
    Secret { secret: String, reason: String },
}
