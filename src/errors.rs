/*!
 * Error types for the topicsort application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a classifier provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The provider did not answer in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors raised while segmenting a document
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SegmentationError {
    /// The document holds no title marker at all
    #[error("No segments found in the document")]
    NoSegments,
}

/// Pipeline-fatal conditions
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Extraction produced nothing to process
    #[error("Segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    /// The run was aborted before the document was complete
    #[error("Processing cancelled after {finalized} of {total} segments")]
    Cancelled {
        /// Segments fully decided before the abort
        finalized: usize,
        /// Segments found in the document
        total: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the sorting pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<SegmentationError> for AppError {
    fn from(error: SegmentationError) -> Self {
        Self::Pipeline(PipelineError::Segmentation(error))
    }
}
