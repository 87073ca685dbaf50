//! Typed instrument parameters and the parameter tree.
//!
//! A [`ParameterTree`] is the hierarchical configuration of the instrument:
//! named, typed values addressed by a dotted path such as
//! `camera1.exposure_time`. Paths without a dot belong to the "main" group;
//! the part before the first dot names a sub-section.
//!
//! Parameter kinds form a closed set carried as a tagged variant
//! ([`ParameterKind`]), each kind holding its own constraint payload (numeric
//! range, allowed-value list, custom editor name). The editor dispatches on
//! this enum rather than on dynamic types, with [`ParameterKind::Custom`] as
//! the explicit extension case.

use crate::error::{AppResult, ScopeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A parameter's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParameterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(f) => Some(*f),
            ParameterValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(b) => write!(f, "{}", b),
            ParameterValue::Int(i) => write!(f, "{}", i),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::Str(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::Str(v)
    }
}

/// The closed set of parameter kinds, each carrying its constraint payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Unbounded float; free text entry with numeric validation.
    Float,
    /// Unbounded integer; free text entry with numeric validation.
    Int,
    /// Float constrained to `[min, max]`; edited with a bounded widget.
    RangeFloat { min: f64, max: f64 },
    /// Integer constrained to `[min, max]`; edited with a bounded widget.
    RangeInt { min: i64, max: i64 },
    SetBool { allowed: Vec<bool> },
    SetFloat { allowed: Vec<f64> },
    SetInt { allowed: Vec<i64> },
    SetString { allowed: Vec<String> },
    /// Free-form string.
    Text,
    /// A directory path, chosen through a modal directory picker.
    Directory,
    /// A file path, chosen through a modal file picker.
    Filename,
    /// Extension hook: `editor` names a renderer registered by the host.
    Custom { editor: String },
}

impl ParameterKind {
    /// The expected value type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::Float | ParameterKind::RangeFloat { .. } => "float",
            ParameterKind::Int | ParameterKind::RangeInt { .. } => "integer",
            ParameterKind::SetBool { .. } => "boolean (from set)",
            ParameterKind::SetFloat { .. } => "float (from set)",
            ParameterKind::SetInt { .. } => "integer (from set)",
            ParameterKind::SetString { .. } => "string (from set)",
            ParameterKind::Text
            | ParameterKind::Directory
            | ParameterKind::Filename
            | ParameterKind::Custom { .. } => "string",
        }
    }

    /// Validate a candidate value against this kind's constraints.
    pub fn validate(&self, path: &str, value: &ParameterValue) -> AppResult<()> {
        let mismatch = || ScopeError::TypeMismatch {
            path: path.to_string(),
            expected: self.type_name(),
        };
        match self {
            ParameterKind::Float => value.as_f64().map(|_| ()).ok_or_else(mismatch),
            ParameterKind::Int => value.as_i64().map(|_| ()).ok_or_else(mismatch),
            ParameterKind::RangeFloat { min, max } => {
                let v = value.as_f64().ok_or_else(mismatch)?;
                if v < *min || v > *max {
                    Err(ScopeError::OutOfRange(path.to_string()))
                } else {
                    Ok(())
                }
            }
            ParameterKind::RangeInt { min, max } => {
                let v = value.as_i64().ok_or_else(mismatch)?;
                if v < *min || v > *max {
                    Err(ScopeError::OutOfRange(path.to_string()))
                } else {
                    Ok(())
                }
            }
            ParameterKind::SetBool { allowed } => {
                let v = value.as_bool().ok_or_else(mismatch)?;
                if allowed.contains(&v) {
                    Ok(())
                } else {
                    Err(ScopeError::NotInSet(path.to_string()))
                }
            }
            ParameterKind::SetFloat { allowed } => {
                let v = value.as_f64().ok_or_else(mismatch)?;
                if allowed.contains(&v) {
                    Ok(())
                } else {
                    Err(ScopeError::NotInSet(path.to_string()))
                }
            }
            ParameterKind::SetInt { allowed } => {
                let v = value.as_i64().ok_or_else(mismatch)?;
                if allowed.contains(&v) {
                    Ok(())
                } else {
                    Err(ScopeError::NotInSet(path.to_string()))
                }
            }
            ParameterKind::SetString { allowed } => {
                let v = value.as_str().ok_or_else(mismatch)?;
                if allowed.iter().any(|a| a == v) {
                    Ok(())
                } else {
                    Err(ScopeError::NotInSet(path.to_string()))
                }
            }
            ParameterKind::Text
            | ParameterKind::Directory
            | ParameterKind::Filename
            | ParameterKind::Custom { .. } => {
                value.as_str().map(|_| ()).ok_or_else(mismatch)
            }
        }
    }

    /// Align a value with this kind's storage type. TOML reads `5` as an
    /// integer even for float parameters; comparison is structural, so
    /// float kinds store floats unconditionally.
    pub fn normalize(&self, value: ParameterValue) -> ParameterValue {
        match (self, value) {
            (
                ParameterKind::Float
                | ParameterKind::RangeFloat { .. }
                | ParameterKind::SetFloat { .. },
                ParameterValue::Int(i),
            ) => ParameterValue::Float(i as f64),
            (_, value) => value,
        }
    }

    /// The allowed-value list for set-typed kinds, in declaration order.
    pub fn allowed_values(&self) -> Option<Vec<ParameterValue>> {
        match self {
            ParameterKind::SetBool { allowed } => {
                Some(allowed.iter().map(|&v| ParameterValue::Bool(v)).collect())
            }
            ParameterKind::SetFloat { allowed } => {
                Some(allowed.iter().map(|&v| ParameterValue::Float(v)).collect())
            }
            ParameterKind::SetInt { allowed } => {
                Some(allowed.iter().map(|&v| ParameterValue::Int(v)).collect())
            }
            ParameterKind::SetString { allowed } => Some(
                allowed
                    .iter()
                    .map(|v| ParameterValue::Str(v.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// A single named, typed parameter.
///
/// Deserialization routes through [`ParameterSource`] so values are
/// normalized against their kind as they come off disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParameterSource")]
pub struct Parameter {
    pub name: String,
    pub description: String,
    /// Display order within its section; ties break on name.
    pub order: i32,
    /// Immutable parameters never get an editor row.
    pub mutable: bool,
    pub kind: ParameterKind,
    pub value: ParameterValue,
}

#[derive(Deserialize)]
struct ParameterSource {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    order: i32,
    #[serde(default = "default_mutable")]
    mutable: bool,
    kind: ParameterKind,
    value: ParameterValue,
}

impl From<ParameterSource> for Parameter {
    fn from(source: ParameterSource) -> Self {
        let value = source.kind.normalize(source.value);
        Self {
            name: source.name,
            description: source.description,
            order: source.order,
            mutable: source.mutable,
            kind: source.kind,
            value,
        }
    }
}

fn default_mutable() -> bool {
    true
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind, value: ParameterValue) -> Self {
        let value = kind.normalize(value);
        Self {
            name: name.into(),
            description: String::new(),
            order: 1,
            mutable: true,
            kind,
            value,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }
}

/// A hierarchical collection of parameters addressed by dotted path.
///
/// Deep copy is `Clone`; the editor takes a snapshot that way and the commit
/// protocol swaps whole trees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterTree {
    /// Display name, by convention the stem of the file the tree came from.
    #[serde(skip)]
    name: String,
    params: BTreeMap<String, Parameter>,
}

impl ParameterTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn insert(&mut self, path: impl Into<String>, parameter: Parameter) {
        self.params.insert(path.into(), parameter);
    }

    pub fn get(&self, path: &str) -> Option<&Parameter> {
        self.params.get(path)
    }

    pub fn value(&self, path: &str) -> Option<&ParameterValue> {
        self.params.get(path).map(|p| &p.value)
    }

    /// Set a parameter's value, validating against its kind's constraints.
    pub fn set_value(&mut self, path: &str, value: ParameterValue) -> AppResult<()> {
        let param = self
            .params
            .get_mut(path)
            .ok_or_else(|| ScopeError::UnknownPath(path.to_string()))?;
        if !param.mutable {
            return Err(ScopeError::Immutable(path.to_string()));
        }
        param.kind.validate(path, &value)?;
        param.value = param.kind.normalize(value);
        Ok(())
    }

    /// Replace a parameter wholesale (value and kind). Used when external
    /// collaborators push corrections, which may also change allowed sets.
    pub fn replace(&mut self, path: &str, mut parameter: Parameter) -> AppResult<()> {
        parameter.value = parameter.kind.normalize(parameter.value);
        match self.params.get_mut(path) {
            Some(slot) => {
                *slot = parameter;
                Ok(())
            }
            None => Err(ScopeError::UnknownPath(path.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// The section part of a dotted path, if any.
    pub fn section_of(path: &str) -> Option<&str> {
        path.split_once('.').map(|(section, _)| section)
    }

    /// Distinct section names, in sorted order.
    pub fn sections(&self) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();
        for path in self.params.keys() {
            if let Some(section) = Self::section_of(path) {
                if sections.last().map(String::as_str) != Some(section) {
                    sections.push(section.to_string());
                }
            }
        }
        sections.dedup();
        sections
    }

    /// Paths of ungrouped parameters, sorted by `(order, name)`.
    pub fn main_paths(&self) -> Vec<String> {
        self.sorted_paths(|path| Self::section_of(path).is_none())
    }

    /// Paths within one section, sorted by `(order, name)`.
    pub fn section_paths(&self, section: &str) -> Vec<String> {
        self.sorted_paths(|path| Self::section_of(path) == Some(section))
    }

    fn sorted_paths(&self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        let mut entries: Vec<(&String, &Parameter)> = self
            .params
            .iter()
            .filter(|(path, _)| keep(path))
            .collect();
        entries.sort_by(|(_, a), (_, b)| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        entries.into_iter().map(|(path, _)| path.clone()).collect()
    }

    /// Paths whose values differ from `other`. Paths missing on either side
    /// count as differing.
    pub fn diff_paths(&self, other: &ParameterTree) -> Vec<String> {
        let mut diffs = Vec::new();
        for (path, param) in &self.params {
            match other.value(path) {
                Some(value) if *value == param.value => {}
                _ => diffs.push(path.clone()),
            }
        }
        for path in other.params.keys() {
            if !self.params.contains_key(path) {
                diffs.push(path.clone());
            }
        }
        diffs.sort();
        diffs.dedup();
        diffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> ParameterTree {
        let mut tree = ParameterTree::new("default");
        tree.insert(
            "directory",
            Parameter::new("directory", ParameterKind::Directory, "/data".into())
                .with_description("Working directory")
                .with_order(1),
        );
        tree.insert(
            "setup_name",
            Parameter::new("setup_name", ParameterKind::Text, "storm1".into()).immutable(),
        );
        tree.insert(
            "camera1.exposure_time",
            Parameter::new(
                "exposure_time",
                ParameterKind::RangeFloat {
                    min: 0.001,
                    max: 10.0,
                },
                ParameterValue::Float(0.1),
            )
            .with_description("Exposure time (s)")
            .with_order(2),
        );
        tree.insert(
            "camera1.emccd_gain",
            Parameter::new(
                "emccd_gain",
                ParameterKind::RangeInt { min: 0, max: 255 },
                ParameterValue::Int(20),
            )
            .with_order(1),
        );
        tree.insert(
            "mosaic.objective",
            Parameter::new(
                "objective",
                ParameterKind::SetString {
                    allowed: vec!["obj1".into(), "obj2".into()],
                },
                "obj1".into(),
            ),
        );
        tree
    }

    #[test]
    fn sections_and_main_group() {
        let tree = sample_tree();
        assert_eq!(tree.sections(), vec!["camera1", "mosaic"]);
        assert_eq!(tree.main_paths(), vec!["directory", "setup_name"]);
    }

    #[test]
    fn section_paths_sort_by_order_then_name() {
        let tree = sample_tree();
        assert_eq!(
            tree.section_paths("camera1"),
            vec!["camera1.emccd_gain", "camera1.exposure_time"]
        );
    }

    #[test]
    fn range_validation_rejects_out_of_range() {
        let mut tree = sample_tree();
        assert!(tree
            .set_value("camera1.exposure_time", ParameterValue::Float(5.0))
            .is_ok());
        let err = tree
            .set_value("camera1.exposure_time", ParameterValue::Float(100.0))
            .unwrap_err();
        assert!(matches!(err, ScopeError::OutOfRange(_)));
    }

    #[test]
    fn set_validation_rejects_unknown_member() {
        let mut tree = sample_tree();
        assert!(tree.set_value("mosaic.objective", "obj2".into()).is_ok());
        let err = tree
            .set_value("mosaic.objective", "obj9".into())
            .unwrap_err();
        assert!(matches!(err, ScopeError::NotInSet(_)));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let mut tree = sample_tree();
        let err = tree
            .set_value("camera1.emccd_gain", "not a number".into())
            .unwrap_err();
        assert!(matches!(err, ScopeError::TypeMismatch { .. }));
    }

    #[test]
    fn immutable_parameters_reject_writes() {
        let mut tree = sample_tree();
        let err = tree.set_value("setup_name", "other".into()).unwrap_err();
        assert!(matches!(err, ScopeError::Immutable(_)));
    }

    #[test]
    fn diff_paths_reports_exact_differences() {
        let original = sample_tree();
        let mut edited = original.clone();
        assert!(edited.diff_paths(&original).is_empty());

        edited
            .set_value("camera1.emccd_gain", ParameterValue::Int(30))
            .unwrap();
        edited.set_value("mosaic.objective", "obj2".into()).unwrap();
        assert_eq!(
            edited.diff_paths(&original),
            vec!["camera1.emccd_gain", "mosaic.objective"]
        );

        // Reverting one removes it from the diff.
        edited
            .set_value("camera1.emccd_gain", ParameterValue::Int(20))
            .unwrap();
        assert_eq!(edited.diff_paths(&original), vec!["mosaic.objective"]);
    }

    #[test]
    fn allowed_values_preserve_declaration_order() {
        let kind = ParameterKind::SetInt {
            allowed: vec![9, 3, 7],
        };
        let values = kind.allowed_values().unwrap();
        assert_eq!(
            values,
            vec![
                ParameterValue::Int(9),
                ParameterValue::Int(3),
                ParameterValue::Int(7)
            ]
        );
    }

    #[test]
    fn float_kinds_store_integer_literals_as_floats() {
        // TOML reads `value = 5` as an integer; float rows must not end up
        // comparing Int(5) against a user's Float(5.0).
        let param = Parameter::new("gain", ParameterKind::Float, ParameterValue::Int(5));
        assert_eq!(param.value, ParameterValue::Float(5.0));

        let mut tree = ParameterTree::new("t");
        tree.insert("gain", param);
        tree.set_value("gain", ParameterValue::Int(7)).unwrap();
        assert_eq!(tree.value("gain"), Some(&ParameterValue::Float(7.0)));

        let text = r#"
            [params.gain]
            name = "gain"
            value = 5

            [params.gain.kind]
            type = "float"
        "#;
        let loaded: ParameterTree = toml::from_str(text).unwrap();
        assert_eq!(loaded.value("gain"), Some(&ParameterValue::Float(5.0)));
    }

    #[test]
    fn replace_normalizes_the_incoming_value() {
        let mut tree = sample_tree();
        // Bypasses Parameter::new so the raw Int reaches replace itself.
        let corrected = Parameter {
            name: "exposure_time".to_string(),
            description: String::new(),
            order: 1,
            mutable: true,
            kind: ParameterKind::RangeFloat {
                min: 0.001,
                max: 10.0,
            },
            value: ParameterValue::Int(2),
        };
        tree.replace("camera1.exposure_time", corrected).unwrap();
        assert_eq!(
            tree.value("camera1.exposure_time"),
            Some(&ParameterValue::Float(2.0))
        );
    }

    #[test]
    fn replace_swaps_kind_and_value() {
        let mut tree = sample_tree();
        let corrected = Parameter::new(
            "objective",
            ParameterKind::SetString {
                allowed: vec!["obj2".into(), "obj3".into()],
            },
            "obj3".into(),
        );
        tree.replace("mosaic.objective", corrected).unwrap();
        assert_eq!(tree.value("mosaic.objective"), Some(&"obj3".into()));
        assert!(tree.replace("mosaic.missing", Parameter::new(
            "missing",
            ParameterKind::Text,
            "".into(),
        ))
        .is_err());
    }
}
