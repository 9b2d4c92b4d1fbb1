//! Error types for the audit pipeline.
//!
//! Each collaborator gets its own `thiserror` enum; the binary wraps them in
//! `anyhow` at the top level.

use std::path::PathBuf;

/// Errors from the omegaUp API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("omegaUp rejected {endpoint}: {message}")]
    Api { endpoint: String, message: String },

    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A run's source could not be downloaded and its verdict does not excuse it.
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch source of run {run_id} (verdict {verdict}): {source}")]
pub struct FetchError {
    pub run_id: String,
    pub verdict: String,
    #[source]
    pub source: ApiError,
}

/// The Moss report does not have the expected anchor/status shape.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("anchor text '{text}' is not <dir>/<problem>/<author>/<file> (<percent>%)")]
    MalformedAnchor { text: String },

    #[error("invalid similarity status '{status}'")]
    InvalidStatus { status: String },

    #[error("results anchor '{text}' has no partner")]
    DanglingAnchor { text: String },

    #[error("match row at line {line} has no results anchor")]
    MissingAnchor { line: usize },
}

/// Invalid configuration or operator selection.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: String },

    #[error("invalid value '{value}' for {key}")]
    Invalid { key: String, value: String },

    #[error("no {what} was selected")]
    NoSelection { what: String },

    #[error("problem '{alias}' is not part of contest '{contest}'")]
    UnknownProblem { alias: String, contest: String },

    #[error("could not read credentials from {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Runs that cannot be placed on a timeline.
#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    #[error("run {run_id} has no submission time")]
    MissingTimestamp { run_id: String },

    #[error("run {run_id} has an invalid submission time {value}")]
    MalformedTimestamp { run_id: String, value: i64 },

    #[error("runs of {author} on {problem} are not in chronological order")]
    OutOfOrder { author: String, problem: String },
}

/// Errors while talking to the Moss server.
#[derive(Debug, thiserror::Error)]
pub enum MossError {
    #[error("Moss connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Moss does not accept language '{language}'")]
    LanguageRejected { language: String },

    #[error("Moss returned an unexpected response: '{response}'")]
    UnexpectedResponse { response: String },

    #[error("could not download Moss report {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors while rendering or persisting report files.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
