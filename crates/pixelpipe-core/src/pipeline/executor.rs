//! Pipeline orchestration - wires the store, validator and operations together.
//!
//! A run moves through a fixed sequence of stages and stops at the first
//! failure:
//!
//! ```text
//! Init → Loaded → (Validating → Applying)* → Saving → Done
//! ```
//!
//! The buffer is owned by the run; on failure it is dropped in whatever state
//! it reached.

use std::path::Path;

use crate::config::{Config, LimitsConfig};
use crate::error::PipelineError;
use crate::ops::{ApplyOptions, Operation};
use crate::params::OperationSpec;
use crate::raster::RasterBuffer;
use crate::store::{FsImageStore, ImageStore, OutputFormat};

use super::validate::Validator;
use super::PipelineResult;

/// Options for controlling executor behavior.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Limits checked after load
    pub limits: LimitsConfig,
    /// Run per-pixel loops in parallel
    pub parallel: bool,
    /// Output extensions allowed in addition to being encodable; `None` allows all
    pub output_formats: Option<Vec<String>>,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            parallel: false,
            output_formats: None,
        }
    }
}

impl From<&Config> for ExecutorOptions {
    fn from(config: &Config) -> Self {
        Self {
            limits: config.limits.clone(),
            parallel: config.processing.parallel,
            output_formats: Some(config.output.formats.clone()),
        }
    }
}

/// Applies an ordered list of operations to one image per call.
///
/// Holds no per-run state, so one executor can serve many sequential runs.
pub struct PipelineExecutor<S = FsImageStore> {
    store: S,
    validator: Validator,
    options: ExecutorOptions,
}

impl PipelineExecutor<FsImageStore> {
    /// Create an executor backed by the filesystem store.
    pub fn new(config: &Config) -> Self {
        Self::with_store(FsImageStore::new(config.limits.clone()), config.into())
    }
}

impl<S: ImageStore> PipelineExecutor<S> {
    /// Create an executor with a custom store.
    pub fn with_store(store: S, options: ExecutorOptions) -> Self {
        Self {
            store,
            validator: Validator::new(options.limits.clone()),
            options,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the pipeline and fold the outcome into a [`PipelineResult`].
    pub fn process_image(
        &self,
        input: &Path,
        output: &Path,
        operations: &[OperationSpec],
    ) -> PipelineResult {
        let result: PipelineResult = self.run(input, output, operations).into();
        if result.is_success() {
            tracing::info!("Saved {:?}", output);
        } else {
            tracing::warn!("Pipeline failed ({}): {}", result.status, result.message);
        }
        result
    }

    /// Run the pipeline, returning the first error encountered.
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        operations: &[OperationSpec],
    ) -> Result<(), PipelineError> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", input);

        // Load
        let mut image = self
            .store
            .load(input)
            .map_err(|source| PipelineError::Load {
                path: input.to_path_buf(),
                source,
            })?;
        tracing::trace!("  Load: {:?}", start.elapsed());

        // Validate
        self.validator.validate(&image)?;
        tracing::debug!(
            "Loaded image: {}x{} ({} channels)",
            image.width(),
            image.height(),
            image.channels()
        );

        // Operations, strictly in order
        for spec in operations {
            self.apply_one(&mut image, spec)?;
        }

        // Format check
        let format = self.output_format(output, &image)?;

        // Save
        let save_start = std::time::Instant::now();
        self.store
            .save(output, &image, format)
            .map_err(|source| PipelineError::Save {
                path: output.to_path_buf(),
                source,
            })?;
        tracing::trace!("  Save: {:?}", save_start.elapsed());

        tracing::debug!(
            "Processed {:?} in {:?} ({} operation(s), {}x{})",
            input,
            start.elapsed(),
            operations.len(),
            image.width(),
            image.height()
        );
        Ok(())
    }

    /// Resolve, type-check and apply a single operation.
    fn apply_one(&self, image: &mut RasterBuffer, spec: &OperationSpec) -> Result<(), PipelineError> {
        let op = Operation::from_spec(spec)?;
        self.check_limits(&op)?;
        tracing::debug!("Applying operation: {}", spec);

        let op_start = std::time::Instant::now();
        op.apply(
            image,
            ApplyOptions {
                parallel: self.options.parallel,
            },
        )
        .map_err(|source| PipelineError::Operation {
            operation: op.name().to_string(),
            source,
        })?;
        tracing::trace!("  {}: {:?}", op.name(), op_start.elapsed());
        Ok(())
    }

    /// Resize targets obey the same dimension limit as loaded images.
    fn check_limits(&self, op: &Operation) -> Result<(), PipelineError> {
        let Operation::Resize { width, height } = *op else {
            return Ok(());
        };
        let max_dim = self.options.limits.max_image_dimension;
        for (parameter, value) in [("width", width), ("height", height)] {
            if value > max_dim {
                return Err(PipelineError::ParameterValue {
                    operation: op.name().to_string(),
                    parameter: parameter.to_string(),
                    message: format!("{value} exceeds the {max_dim} pixel dimension limit"),
                });
            }
        }
        Ok(())
    }

    /// Pick the output format from the path's extension and check that it can
    /// hold the image's channel layout.
    fn output_format(&self, output: &Path, image: &RasterBuffer) -> Result<OutputFormat, PipelineError> {
        let ext = output
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let unsupported = || PipelineError::UnsupportedFormat {
            path: output.to_path_buf(),
            format: if ext.is_empty() {
                "no file extension".to_string()
            } else {
                ext.to_string()
            },
        };

        let format = OutputFormat::from_extension(ext).ok_or_else(unsupported)?;
        if let Some(allowed) = &self.options.output_formats {
            if !allowed.iter().any(|f| f.eq_ignore_ascii_case(ext)) {
                return Err(unsupported());
            }
        }
        if !format.supports_channels(image.channels()) {
            return Err(PipelineError::FormatMismatch {
                path: output.to_path_buf(),
                format: format.to_string(),
                channels: image.channels(),
            });
        }
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::operation_names;
    use crate::pipeline::PipelineStatus;
    use crate::store::tests::MemoryStore;

    fn rgb_2x2() -> RasterBuffer {
        RasterBuffer::from_slice(
            2,
            2,
            3,
            &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120],
        )
        .unwrap()
    }

    fn executor(store: MemoryStore) -> PipelineExecutor<MemoryStore> {
        PipelineExecutor::with_store(store, ExecutorOptions::default())
    }

    fn run(
        exec: &PipelineExecutor<MemoryStore>,
        output: &str,
        ops: &[OperationSpec],
    ) -> PipelineResult {
        exec.process_image(Path::new("/in.png"), Path::new(output), ops)
    }

    #[test]
    fn test_grayscale_success() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        let result = run(&exec, "/out.png", &[OperationSpec::new("grayscale")]);

        assert_eq!(result.status, PipelineStatus::Success);
        let saved = exec.store().saved.borrow();
        assert_eq!(saved.len(), 1);
        let (path, buffer, format) = &saved[0];
        assert_eq!(path, Path::new("/out.png"));
        assert_eq!(*format, OutputFormat::Png);
        assert_eq!(
            buffer.pixels(),
            &[18, 18, 18, 48, 48, 48, 78, 78, 78, 108, 108, 108]
        );
    }

    #[test]
    fn test_empty_pipeline_saves_unchanged() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        let result = run(&exec, "/out.bmp", &[]);

        assert!(result.is_success());
        assert_eq!(exec.store().saved.borrow()[0].1, rgb_2x2());
    }

    #[test]
    fn test_missing_input_is_file_not_found() {
        let exec = executor(MemoryStore::default());
        let result = run(&exec, "/out.png", &[OperationSpec::new("grayscale")]);

        assert_eq!(result.status, PipelineStatus::FileNotFound);
        assert!(result.message.contains("/in.png"));
        assert!(exec.store().saved.borrow().is_empty());
    }

    #[test]
    fn test_empty_image_is_processing_error() {
        let exec = executor(MemoryStore::with_image("/in.png", RasterBuffer::default()));
        let result = run(&exec, "/out.png", &[]);

        assert_eq!(result.status, PipelineStatus::ProcessingError);
        assert!(exec.store().saved.borrow().is_empty());
    }

    #[test]
    fn test_unknown_operation_stops_pipeline() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        let result = run(
            &exec,
            "/out.png",
            &[OperationSpec::new("invert"), OperationSpec::new("sharpen")],
        );

        assert_eq!(result.status, PipelineStatus::ConfigError);
        assert_eq!(result.message, "Unknown operation: sharpen");
        assert!(exec.store().saved.borrow().is_empty());
    }

    #[test]
    fn test_missing_factor_is_config_error() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        let result = run(&exec, "/out.png", &[OperationSpec::new("brightness")]);

        assert_eq!(result.status, PipelineStatus::ConfigError);
        assert!(result.message.contains("factor"));
    }

    #[test]
    fn test_negative_factor_is_processing_error() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        let ops = [OperationSpec::new("brightness").with_param("factor", -0.5)];
        let result = run(&exec, "/out.png", &ops);

        assert_eq!(result.status, PipelineStatus::ProcessingError);
        assert!(result.message.contains("brightness"));
    }

    #[test]
    fn test_grayscale_on_gray_image_is_processing_error() {
        let gray = RasterBuffer::from_slice(2, 1, 1, &[5, 6]).unwrap();
        let exec = executor(MemoryStore::with_image("/in.png", gray));
        let result = run(&exec, "/out.png", &[OperationSpec::new("grayscale")]);

        assert_eq!(result.status, PipelineStatus::ProcessingError);
        assert!(result.message.contains("grayscale"));
    }

    #[test]
    fn test_operations_apply_in_order() {
        // grayscale then brightness differs from brightness then grayscale once clamping kicks in
        let exec = executor(MemoryStore::with_image(
            "/in.png",
            RasterBuffer::from_slice(1, 1, 3, &[250, 10, 10]).unwrap(),
        ));
        let ops = [
            OperationSpec::new("grayscale"),
            OperationSpec::new("brightness").with_param("factor", 2.0),
        ];
        assert!(run(&exec, "/out.png", &ops).is_success());

        let saved = exec.store().saved.borrow();
        // gray = round(74.75 + 5.87 + 1.14) = 82, doubled = 164
        assert_eq!(saved[0].1.pixels(), &[164, 164, 164]);
    }

    #[test]
    fn test_resize_then_save() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        let ops = [OperationSpec::new("resize")
            .with_param("width", 5i64)
            .with_param("height", 3i64)];
        assert!(run(&exec, "/out.tga", &ops).is_success());

        let saved = exec.store().saved.borrow();
        let buffer = &saved[0].1;
        assert_eq!((buffer.width(), buffer.height(), buffer.channels()), (5, 3, 3));
        assert_eq!(saved[0].2, OutputFormat::Tga);
    }

    #[test]
    fn test_unsupported_extension_is_config_error() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));

        for output in ["/out.webp", "/out"] {
            let result = run(&exec, output, &[OperationSpec::new("invert")]);
            assert_eq!(result.status, PipelineStatus::ConfigError, "{output}");
        }
        assert!(exec.store().saved.borrow().is_empty());
    }

    #[test]
    fn test_extension_outside_allowed_list() {
        let options = ExecutorOptions {
            output_formats: Some(vec!["png".into()]),
            ..ExecutorOptions::default()
        };
        let exec =
            PipelineExecutor::with_store(MemoryStore::with_image("/in.png", rgb_2x2()), options);

        let result = run(&exec, "/out.jpg", &[]);
        assert_eq!(result.status, PipelineStatus::ConfigError);
        assert!(run(&exec, "/out.PNG", &[]).is_success());
    }

    #[test]
    fn test_options_follow_config() {
        let mut config = Config::default();
        config.output.formats = vec!["bmp".into()];
        config.limits.max_image_dimension = 4;
        let exec = PipelineExecutor::with_store(
            MemoryStore::with_image("/in.png", rgb_2x2()),
            (&config).into(),
        );

        assert_eq!(run(&exec, "/out.png", &[]).status, PipelineStatus::ConfigError);
        assert!(run(&exec, "/out.BMP", &[]).is_success());
    }

    #[test]
    fn test_resize_beyond_dimension_limit() {
        let options = ExecutorOptions {
            limits: LimitsConfig {
                max_image_dimension: 8,
                ..LimitsConfig::default()
            },
            ..ExecutorOptions::default()
        };
        let exec =
            PipelineExecutor::with_store(MemoryStore::with_image("/in.png", rgb_2x2()), options);

        let too_wide = [OperationSpec::new("resize")
            .with_param("width", 5000i64)
            .with_param("height", 1i64)];
        let result = run(&exec, "/out.png", &too_wide);
        assert_eq!(result.status, PipelineStatus::ConfigError);
        assert!(result.message.contains("width"));
        assert!(exec.store().saved.borrow().is_empty());

        let at_limit = [OperationSpec::new("resize")
            .with_param("width", 8i64)
            .with_param("height", 8i64)];
        assert!(run(&exec, "/out.png", &at_limit).is_success());
    }

    #[test]
    fn test_alpha_to_jpeg_is_mismatch() {
        let rgba = RasterBuffer::new(2, 2, 4);
        let exec = executor(MemoryStore::with_image("/in.png", rgba));
        let result = run(&exec, "/out.jpg", &[]);

        assert_eq!(result.status, PipelineStatus::ConfigError);
        assert!(result.message.contains("4-channel"));
    }

    #[test]
    fn test_save_failure_is_save_error() {
        let mut store = MemoryStore::with_image("/in.png", rgb_2x2());
        store.fail_save = true;
        let exec = executor(store);
        let result = run(&exec, "/out.png", &[OperationSpec::new("invert")]);

        assert_eq!(result.status, PipelineStatus::SaveError);
        assert!(result.message.contains("/out.png"));
    }

    #[test]
    fn test_executor_is_reusable() {
        let exec = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        for name in operation_names().filter(|n| *n != "brightness" && *n != "resize") {
            assert!(run(&exec, "/out.png", &[OperationSpec::new(name)]).is_success());
        }
        // Each run starts from the stored input, not the previous output
        let saved = exec.store().saved.borrow();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].1.pixels()[0], 245);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let ops = [
            OperationSpec::new("brightness").with_param("factor", 1.7),
            OperationSpec::new("invert"),
            OperationSpec::new("resize")
                .with_param("width", 7i64)
                .with_param("height", 9i64),
            OperationSpec::new("grayscale"),
        ];

        let serial = executor(MemoryStore::with_image("/in.png", rgb_2x2()));
        let parallel = PipelineExecutor::with_store(
            MemoryStore::with_image("/in.png", rgb_2x2()),
            ExecutorOptions {
                parallel: true,
                ..ExecutorOptions::default()
            },
        );
        assert!(run(&serial, "/out.png", &ops).is_success());
        assert!(run(&parallel, "/out.png", &ops).is_success());
        assert_eq!(
            serial.store().saved.borrow()[0].1,
            parallel.store().saved.borrow()[0].1
        );
    }
}
