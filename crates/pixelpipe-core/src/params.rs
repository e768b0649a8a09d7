//! Operation parameter sets.
//!
//! An [`OperationSpec`] names one transform and carries its parameters as
//! tagged [`ParamValue`]s. Specs come from a pipeline document, from inline
//! `name:key=value` strings, or are built directly by callers; the executor
//! only ever reads them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A tagged parameter value. Exactly one tag is active.
///
/// Deserialization tries the tags in declaration order, so a JSON `2` becomes
/// [`ParamValue::Int`] and `2.0` becomes [`ParamValue::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Name of the active tag, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            // Keep a decimal point so the value reads back as a float
            Self::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            // Quote text that would otherwise read back as another tag
            Self::Str(v) if parse_inline_value(v) != *self => write!(f, "\"{v}\""),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

/// One named operation plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Operation identifier ("grayscale", "resize", ...)
    pub name: String,

    /// Named parameters; keys are unique
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl OperationSpec {
    /// An operation with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }
}

impl fmt::Display for OperationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            let sep = if i == 0 { ':' } else { ',' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Parses the inline form `name` or `name:key=value,key=value`.
///
/// Values are typed by shape: `true`/`false` → bool, integer literals → int,
/// other numeric literals → float, `"..."` or anything else → string. Values
/// cannot contain `,`.
impl FromStr for OperationSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ConfigError::InvalidSpec {
            spec: s.to_string(),
            message: message.to_string(),
        };

        let (name, rest) = match s.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(invalid("operation name is empty"));
        }

        let mut spec = OperationSpec::new(name);
        let Some(rest) = rest else {
            return Ok(spec);
        };

        for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, raw) = pair
                .split_once('=')
                .ok_or_else(|| invalid(&format!("expected key=value, got '{pair}'")))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(invalid("parameter name is empty"));
            }
            if spec.parameters.contains_key(key) {
                return Err(invalid(&format!("duplicate parameter '{key}'")));
            }
            spec.parameters
                .insert(key.to_string(), parse_inline_value(raw.trim()));
        }

        Ok(spec)
    }
}

fn parse_inline_value(raw: &str) -> ParamValue {
    if let Some(text) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return ParamValue::Str(text.to_string());
    }
    match raw {
        "true" => return ParamValue::Bool(true),
        "false" => return ParamValue::Bool(false),
        _ => {}
    }
    if let Ok(v) = raw.parse::<i64>() {
        return ParamValue::Int(v);
    }
    match raw.parse::<f64>() {
        // "inf"/"nan" parse as floats but are almost certainly meant as text
        Ok(v) if raw.bytes().any(|b| b.is_ascii_digit()) => ParamValue::Float(v),
        _ => ParamValue::Str(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name() {
        let spec: OperationSpec = "grayscale".parse().unwrap();
        assert_eq!(spec.name, "grayscale");
        assert!(spec.parameters.is_empty());
    }

    #[test]
    fn test_parse_typed_values() {
        let spec: OperationSpec = "resize:width=100, height=50".parse().unwrap();
        assert_eq!(spec.get("width"), Some(&ParamValue::Int(100)));
        assert_eq!(spec.get("height"), Some(&ParamValue::Int(50)));

        let spec: OperationSpec = "brightness:factor=1.5".parse().unwrap();
        assert_eq!(spec.get("factor"), Some(&ParamValue::Float(1.5)));

        let spec: OperationSpec = "x:flag=true,mode=fast,n=-3".parse().unwrap();
        assert_eq!(spec.get("flag"), Some(&ParamValue::Bool(true)));
        assert_eq!(spec.get("mode"), Some(&ParamValue::Str("fast".into())));
        assert_eq!(spec.get("n"), Some(&ParamValue::Int(-3)));
    }

    #[test]
    fn test_parse_nan_is_string() {
        let spec: OperationSpec = "x:v=nan".parse().unwrap();
        assert_eq!(spec.get("v"), Some(&ParamValue::Str("nan".into())));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(":factor=1.0".parse::<OperationSpec>().is_err());
        assert!("brightness:factor".parse::<OperationSpec>().is_err());
        assert!("brightness:=1.0".parse::<OperationSpec>().is_err());

        let err = "resize:width=1,width=2".parse::<OperationSpec>().unwrap_err();
        assert!(err.to_string().contains("duplicate parameter 'width'"));
    }

    #[test]
    fn test_display_reads_back() {
        let spec = OperationSpec::new("brightness").with_param("factor", 2.0);
        assert_eq!(spec.to_string(), "brightness:factor=2.0");
        let back: OperationSpec = spec.to_string().parse().unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_display_quotes_ambiguous_strings() {
        let spec = OperationSpec::new("label")
            .with_param("a", "1")
            .with_param("b", "true")
            .with_param("c", "2.5")
            .with_param("d", "plain");
        assert_eq!(spec.to_string(), r#"label:a="1",b="true",c="2.5",d=plain"#);

        let back: OperationSpec = spec.to_string().parse().unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_json_number_tags() {
        let spec: OperationSpec =
            serde_json::from_str(r#"{"name": "t", "parameters": {"a": 2, "b": 2.0, "c": "x", "d": false}}"#)
                .unwrap();
        assert_eq!(spec.get("a"), Some(&ParamValue::Int(2)));
        assert_eq!(spec.get("b"), Some(&ParamValue::Float(2.0)));
        assert_eq!(spec.get("c"), Some(&ParamValue::Str("x".into())));
        assert_eq!(spec.get("d"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn test_accessors_do_not_coerce() {
        assert_eq!(ParamValue::Int(3).as_float(), None);
        assert_eq!(ParamValue::Float(3.0).as_int(), None);
        assert_eq!(ParamValue::Str("1".into()).as_int(), None);
        assert_eq!(ParamValue::Bool(true).kind(), "bool");
    }
}
