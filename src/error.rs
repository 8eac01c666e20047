// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types for the analysis pipeline

use thiserror::Error;

/// Errors that reject a whole analysis request.
///
/// Cell-level problems are never errors: undecodable or non-numeric values
/// are handled locally by the scanner and the detector.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input bytes could not be parsed as a delimited table
    #[error("input is not a valid table: {0}")]
    InputFormat(String),

    #[error("failed to compile pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write redacted table: {0}")]
    Output(String),
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::InputFormat(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_format_message() {
        let err = AnalysisError::InputFormat("no header row".to_string());
        assert_eq!(err.to_string(), "input is not a valid table: no header row");
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = AnalysisError::InvalidPattern {
            name: "ssn".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("failed to compile pattern 'ssn'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
