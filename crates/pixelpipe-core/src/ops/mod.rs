//! Operation library and name-based dispatch.
//!
//! Every transform is a pure function over a [`RasterBuffer`]:
//! - **grayscale**: luminosity (0.299 R + 0.587 G + 0.114 B) into R, G, B
//! - **invert**: `255 - v` on the color channels
//! - **brightness**: multiply color channels by a float factor
//! - **resize**: nearest-neighbor resample to a new width/height
//!
//! Alpha is never touched by the color transforms.
//!
//! [`Operation::from_spec`] looks the name up in a fixed table and type-checks
//! the parameters; only a fully parsed [`Operation`] can be applied, so a
//! config error never leaves a half-applied transform behind. Adding an
//! operation means one table entry, one variant, and one function.

mod brightness;
mod grayscale;
mod invert;
mod resize;

use crate::error::{OperationError, PipelineError};
use crate::params::{OperationSpec, ParamValue};
use crate::raster::RasterBuffer;

/// Execution knobs shared by all operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Spread per-pixel loops over rayon's pool
    pub parallel: bool,
}

/// A fully parsed, ready-to-apply operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Grayscale,
    Invert,
    /// Multiply color channels by `factor` (1.0 = unchanged)
    Brightness { factor: f64 },
    Resize { width: u32, height: u32 },
}

type ParseFn = fn(&OperationSpec) -> Result<Operation, PipelineError>;

/// Name → parameter parser. Lookup is exact and case-sensitive.
const REGISTRY: &[(&str, ParseFn)] = &[
    ("grayscale", parse_grayscale),
    ("invert", parse_invert),
    ("brightness", parse_brightness),
    ("resize", parse_resize),
];

/// Names of all known operations, in table order.
pub fn operation_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

impl Operation {
    /// Resolve a spec to an operation, checking its required parameters.
    pub fn from_spec(spec: &OperationSpec) -> Result<Self, PipelineError> {
        let (_, parse) = REGISTRY
            .iter()
            .find(|(name, _)| *name == spec.name)
            .ok_or_else(|| PipelineError::UnknownOperation(spec.name.clone()))?;
        parse(spec)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Invert => "invert",
            Self::Brightness { .. } => "brightness",
            Self::Resize { .. } => "resize",
        }
    }

    /// Apply the transform to `buffer`.
    pub fn apply(
        &self,
        buffer: &mut RasterBuffer,
        options: ApplyOptions,
    ) -> Result<(), OperationError> {
        if !buffer.is_valid() {
            return Err(OperationError::InvalidBuffer);
        }
        match *self {
            Self::Grayscale => grayscale::apply(buffer, options),
            Self::Invert => invert::apply(buffer, options),
            Self::Brightness { factor } => brightness::apply(buffer, factor, options),
            Self::Resize { width, height } => resize::apply(buffer, width, height, options),
        }
    }
}

fn parse_grayscale(_: &OperationSpec) -> Result<Operation, PipelineError> {
    Ok(Operation::Grayscale)
}

fn parse_invert(_: &OperationSpec) -> Result<Operation, PipelineError> {
    Ok(Operation::Invert)
}

/// `factor` is a float multiplier. Integer percentages are rejected rather
/// than guessed at.
fn parse_brightness(spec: &OperationSpec) -> Result<Operation, PipelineError> {
    let factor = required(spec, "factor", "float", ParamValue::as_float)?;
    Ok(Operation::Brightness { factor })
}

fn parse_resize(spec: &OperationSpec) -> Result<Operation, PipelineError> {
    let width = dimension(spec, "width")?;
    let height = dimension(spec, "height")?;
    Ok(Operation::Resize { width, height })
}

/// Fetch a parameter and check its tag.
fn required<T>(
    spec: &OperationSpec,
    key: &str,
    expected: &'static str,
    extract: impl Fn(&ParamValue) -> Option<T>,
) -> Result<T, PipelineError> {
    let value = spec.get(key).ok_or_else(|| PipelineError::MissingParameter {
        operation: spec.name.clone(),
        parameter: key.to_string(),
    })?;
    extract(value).ok_or_else(|| PipelineError::ParameterType {
        operation: spec.name.clone(),
        parameter: key.to_string(),
        expected,
        found: value.kind(),
    })
}

/// An integer dimension in `1..=u32::MAX`.
fn dimension(spec: &OperationSpec, key: &str) -> Result<u32, PipelineError> {
    let raw = required(spec, key, "integer", ParamValue::as_int)?;
    if raw <= 0 {
        return Err(PipelineError::ParameterValue {
            operation: spec.name.clone(),
            parameter: key.to_string(),
            message: format!("must be > 0, got {raw}"),
        });
    }
    u32::try_from(raw).map_err(|_| PipelineError::ParameterValue {
        operation: spec.name.clone(),
        parameter: key.to_string(),
        message: format!("{raw} exceeds {}", u32::MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineStatus;

    #[test]
    fn test_registry_names() {
        let names: Vec<_> = operation_names().collect();
        assert_eq!(names, ["grayscale", "invert", "brightness", "resize"]);
    }

    #[test]
    fn test_unknown_operation() {
        let err = Operation::from_spec(&OperationSpec::new("sharpen")).unwrap_err();
        assert!(matches!(&err, PipelineError::UnknownOperation(n) if n == "sharpen"));
        assert_eq!(err.status(), PipelineStatus::ConfigError);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(Operation::from_spec(&OperationSpec::new("Grayscale")).is_err());
    }

    #[test]
    fn test_brightness_requires_factor() {
        let err = Operation::from_spec(&OperationSpec::new("brightness")).unwrap_err();
        assert_eq!(err.status(), PipelineStatus::ConfigError);
        assert!(err.to_string().contains("factor"));
    }

    #[test]
    fn test_brightness_rejects_integer_factor() {
        let spec = OperationSpec::new("brightness").with_param("factor", 150i64);
        let err = Operation::from_spec(&spec).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ParameterType {
                expected: "float",
                found: "integer",
                ..
            }
        ));
    }

    #[test]
    fn test_brightness_negative_factor_parses() {
        // Range is checked at apply time, not parse time
        let spec = OperationSpec::new("brightness").with_param("factor", -1.0);
        assert_eq!(
            Operation::from_spec(&spec).unwrap(),
            Operation::Brightness { factor: -1.0 }
        );
    }

    #[test]
    fn test_resize_parameters() {
        let spec = OperationSpec::new("resize")
            .with_param("width", 150i64)
            .with_param("height", 75i64);
        assert_eq!(
            Operation::from_spec(&spec).unwrap(),
            Operation::Resize {
                width: 150,
                height: 75
            }
        );
    }

    #[test]
    fn test_resize_rejects_bad_dimensions() {
        let missing = OperationSpec::new("resize").with_param("width", 10i64);
        let err = Operation::from_spec(&missing).unwrap_err();
        assert!(err.to_string().contains("height"));

        let zero = OperationSpec::new("resize")
            .with_param("width", 0i64)
            .with_param("height", 10i64);
        let err = Operation::from_spec(&zero).unwrap_err();
        assert_eq!(err.status(), PipelineStatus::ConfigError);

        let float = OperationSpec::new("resize")
            .with_param("width", 10.0)
            .with_param("height", 10i64);
        let err = Operation::from_spec(&float).unwrap_err();
        assert!(matches!(err, PipelineError::ParameterType { found: "float", .. }));

        let huge = OperationSpec::new("resize")
            .with_param("width", i64::from(u32::MAX) + 1)
            .with_param("height", 10i64);
        assert!(Operation::from_spec(&huge).is_err());
    }

    #[test]
    fn test_apply_rejects_empty_buffer() {
        let mut empty = RasterBuffer::default();
        for op in [
            Operation::Grayscale,
            Operation::Invert,
            Operation::Brightness { factor: 1.0 },
            Operation::Resize {
                width: 2,
                height: 2,
            },
        ] {
            let err = op.apply(&mut empty, ApplyOptions::default()).unwrap_err();
            assert!(matches!(err, OperationError::InvalidBuffer));
        }
    }
}
