//! Error types for the pixelpipe raster pipeline.
//!
//! Errors are organized by layer: buffer construction, operation apply,
//! image store I/O, configuration, and the executor's per-step failures.
//! [`PipelineError`] is the only one that crosses into a
//! [`PipelineResult`](crate::pipeline::PipelineResult); its `Display` text
//! becomes the user-visible message and [`PipelineError::status`] picks the
//! status kind.

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::PipelineStatus;

/// Configuration-specific errors, for both the app config and pipeline documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to parse a JSON pipeline document
    #[error("Failed to parse pipeline document: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Pipeline document has an extension we don't know how to read
    #[error("Unsupported pipeline document {path}: expected .json or .toml")]
    UnsupportedDocument { path: PathBuf },

    /// An inline `name:key=value` operation spec is malformed
    #[error("Invalid operation spec '{spec}': {message}")]
    InvalidSpec { spec: String, message: String },

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Raster buffer construction errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RasterError {
    /// Byte length does not match `width * height * channels`
    #[error("Pixel data is {actual} bytes, expected {expected} for {width}x{height}x{channels}")]
    SizeMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },

    /// Dimensions multiply past the addressable size
    #[error("Dimensions {width}x{height}x{channels} overflow addressable memory")]
    Overflow { width: u32, height: u32, channels: u8 },
}

/// Failures reported by an operation's apply step.
#[derive(Error, Debug)]
pub enum OperationError {
    /// The buffer is empty or inconsistent
    #[error("image buffer is empty or invalid")]
    InvalidBuffer,

    /// The operation needs more color channels than the image has
    #[error("requires at least {required} channels, image has {actual}")]
    TooFewChannels { required: u8, actual: u8 },

    /// Brightness factor is negative or not a finite number
    #[error("brightness factor must be a finite value >= 0, got {0}")]
    InvalidFactor(f64),

    /// Resize target has a zero dimension
    #[error("target dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// Destination buffer could not be allocated
    #[error("cannot allocate {width}x{height}x{channels} pixel buffer")]
    Allocation {
        width: u32,
        height: u32,
        channels: u8,
        #[source]
        source: Option<TryReserveError>,
    },
}

/// Image store (load/save collaborator) errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// File could not be opened or read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Decoded pixels did not form a valid raster
    #[error("Decoded image at {path} is not a valid raster: {source}")]
    Raster {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    /// Image encoding or writing failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The buffer's channel count has no matching color type
    #[error("Cannot save {channels}-channel image")]
    UnsupportedLayout { channels: u8 },
}

/// Pipeline failures, one variant per failure point of a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input image could not be loaded
    #[error("Failed to load input image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// Loaded image failed the validity check
    #[error("Loaded image is invalid: {reason}")]
    InvalidImage { reason: String },

    /// Operation name is not in the dispatch table
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// A required parameter is absent
    #[error("Missing '{parameter}' for {operation}")]
    MissingParameter {
        operation: String,
        parameter: String,
    },

    /// A parameter carries the wrong tag
    #[error("Invalid type for {operation} parameter '{parameter}': expected {expected}, got {found}")]
    ParameterType {
        operation: String,
        parameter: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A parameter has the right tag but an unusable value
    #[error("Invalid value for {operation} parameter '{parameter}': {message}")]
    ParameterValue {
        operation: String,
        parameter: String,
        message: String,
    },

    /// An operation's apply step failed
    #[error("Failed to apply operation {operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: OperationError,
    },

    /// Output path has no extension or one we cannot encode
    #[error("Unsupported output format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Output format cannot hold the image's channel layout
    #[error("Output format {format} cannot encode a {channels}-channel image ({path})")]
    FormatMismatch {
        path: PathBuf,
        format: String,
        channels: u8,
    },

    /// Writing the output failed
    #[error("Failed to save output image {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    /// The result status this failure maps to.
    pub fn status(&self) -> PipelineStatus {
        match self {
            Self::Load { .. } => PipelineStatus::FileNotFound,
            Self::InvalidImage { .. } | Self::Operation { .. } => PipelineStatus::ProcessingError,
            Self::UnknownOperation(_)
            | Self::MissingParameter { .. }
            | Self::ParameterType { .. }
            | Self::ParameterValue { .. }
            | Self::UnsupportedFormat { .. }
            | Self::FormatMismatch { .. } => PipelineStatus::ConfigError,
            Self::Save { .. } => PipelineStatus::SaveError,
        }
    }
}
