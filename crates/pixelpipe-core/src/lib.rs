//! Pixelpipe Core - Embeddable raster pipeline library.
//!
//! Pixelpipe loads one image, applies an ordered list of named operations to
//! it, and writes the result. Every run ends in a single [`PipelineResult`]
//! carrying one of five statuses; no failure escapes as a panic or an `Err`.
//!
//! # Architecture
//!
//! ```text
//! Load (ImageStore) → Validate → Operation* (grayscale | invert | brightness | resize)
//!                  → Output format check → Save (ImageStore) → PipelineResult
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pixelpipe_core::{Config, OperationSpec, PipelineExecutor};
//! use std::path::Path;
//!
//! let config = Config::load().unwrap_or_default();
//! let executor = PipelineExecutor::new(&config);
//!
//! let ops = vec![
//!     OperationSpec::new("grayscale"),
//!     OperationSpec::new("brightness").with_param("factor", 1.2),
//! ];
//! let result = executor.process_image(Path::new("in.png"), Path::new("out.png"), &ops);
//! println!("{}: {}", result.status, result.message);
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod ops;
pub mod params;
pub mod pipeline;
pub mod raster;
pub mod store;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, OperationError, PipelineError, RasterError, StoreError};
pub use ops::{ApplyOptions, Operation};
pub use params::{OperationSpec, ParamValue};
pub use pipeline::{ExecutorOptions, PipelineExecutor, PipelineResult, PipelineStatus};
pub use raster::RasterBuffer;
pub use store::{FsImageStore, ImageStore, OutputFormat};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
