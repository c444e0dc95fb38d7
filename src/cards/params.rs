//! Card parameters.
//!
//! A card definition carries default parameters (`damage`, `count`,
//! `condition`, ...). Program nodes and deck variations override them.
//! The interpreter reads the merged map when a script refers to
//! `Amount::Param` or `ConditionSource::Param`.
//!
//! ## ParamValue Types
//!
//! - `Int`: amounts and counts
//! - `Text`: symbolic values such as condition names

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Value of a single card parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Int(_) => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Named parameters of a card or program node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params(FxHashMap<String, ParamValue>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder pattern).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Defaults overlaid with `overrides`; override entries win.
    #[must_use]
    pub fn merged(&self, overrides: &Params) -> Params {
        let mut out = self.clone();
        for (name, value) in &overrides.0 {
            out.0.insert(name.clone(), value.clone());
        }
        out
    }
}
