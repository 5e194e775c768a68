//! Grant payloads: the features and quotas a license confers.
//!
//! Grant values form a closed set so that narrowing can be checked
//! exhaustively:
//!
//! | variant     | wire form      |
//! |-------------|----------------|
//! | `Number`    | JSON integer   |
//! | `Flag`      | JSON boolean   |
//! | `Map`       | JSON object    |
//! | `Unbounded` | the string `*` |
//!
//! Anything else (floats, negative numbers, null, arrays, other strings) is
//! rejected rather than coerced.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Wire spelling of [`GrantValue::Unbounded`].
pub const UNBOUNDED: &str = "*";

/// A single constraint inside a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum GrantValue {
    /// A numeric ceiling (seats, instances, rate).
    Number(u64),
    /// An on/off feature flag.
    Flag(bool),
    /// A nested feature map.
    Map(BTreeMap<String, GrantValue>),
    /// No limit; any narrower value is acceptable beneath it.
    Unbounded,
}

impl GrantValue {
    /// Short name of the variant, used in conflict messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Flag(_) => "flag",
            Self::Map(_) => "map",
            Self::Unbounded => "unbounded",
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, GrantValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Converts a JSON value, failing with [`LicenseError::Encoding`] on any
    /// value outside the closed variant set.
    pub fn from_json(value: Value) -> LicenseResult<Self> {
        match value {
            Value::Bool(b) => Ok(Self::Flag(b)),
            Value::Number(n) => n.as_u64().map(Self::Number).ok_or_else(|| {
                LicenseError::Encoding(format!(
                    "grant numbers must be non-negative integers, got {n}"
                ))
            }),
            Value::String(s) if s == UNBOUNDED => Ok(Self::Unbounded),
            Value::String(s) => Err(LicenseError::Encoding(format!(
                "unsupported grant string {s:?}; only \"{UNBOUNDED}\" is allowed"
            ))),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                .collect::<LicenseResult<BTreeMap<_, _>>>()
                .map(Self::Map),
            Value::Null => Err(LicenseError::Encoding(
                "null is not a grant value".to_string(),
            )),
            Value::Array(_) => Err(LicenseError::Encoding(
                "arrays are not grant values".to_string(),
            )),
        }
    }

    /// Converts to the JSON wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(n) => Value::from(*n),
            Self::Flag(b) => Value::Bool(*b),
            Self::Map(m) => Value::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
            Self::Unbounded => Value::String(UNBOUNDED.to_string()),
        }
    }
}

impl From<u64> for GrantValue {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for GrantValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<BTreeMap<String, GrantValue>> for GrantValue {
    fn from(m: BTreeMap<String, GrantValue>) -> Self {
        Self::Map(m)
    }
}

impl TryFrom<Value> for GrantValue {
    type Error = LicenseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

impl From<GrantValue> for Value {
    fn from(value: GrantValue) -> Self {
        value.to_json()
    }
}

/// The grant payload of a license.
///
/// The top level is either a feature map or the wildcard, which authorizes
/// any feature a delegatee chooses to grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GrantValue", into = "GrantValue")]
pub struct Grant {
    root: GrantValue,
}

impl Grant {
    /// An empty grant: confers nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: GrantValue::Map(BTreeMap::new()),
        }
    }

    /// The wildcard grant: confers everything.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            root: GrantValue::Unbounded,
        }
    }

    /// Adds or replaces a top-level feature.
    ///
    /// On the wildcard grant this turns it into a map holding only `feature`.
    #[must_use]
    pub fn with(mut self, feature: impl Into<String>, value: impl Into<GrantValue>) -> Self {
        match &mut self.root {
            GrantValue::Map(m) => {
                m.insert(feature.into(), value.into());
            }
            _ => {
                let mut m = BTreeMap::new();
                m.insert(feature.into(), value.into());
                self.root = GrantValue::Map(m);
            }
        }
        self
    }

    /// Builds a grant from a JSON object or `"*"`.
    pub fn from_json(value: Value) -> LicenseResult<Self> {
        GrantValue::from_json(value)?.try_into()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        self.root.to_json()
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.root.is_unbounded()
    }

    /// Top-level features, or `None` for the wildcard grant.
    #[must_use]
    pub fn features(&self) -> Option<&BTreeMap<String, GrantValue>> {
        self.root.as_map()
    }

    /// Looks up a feature by dotted path, e.g. `limits.hz`.
    ///
    /// Beneath an unbounded value every path resolves to `Unbounded`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&GrantValue> {
        let mut current = &self.root;
        for segment in path.split('.') {
            match current {
                GrantValue::Unbounded => return Some(current),
                GrantValue::Map(m) => current = m.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    #[must_use]
    pub fn as_value(&self) -> &GrantValue {
        &self.root
    }

    pub(crate) fn from_root(root: GrantValue) -> Self {
        Self { root }
    }
}

impl Default for Grant {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<GrantValue> for Grant {
    type Error = LicenseError;

    fn try_from(root: GrantValue) -> Result<Self, Self::Error> {
        match root {
            GrantValue::Map(_) | GrantValue::Unbounded => Ok(Self { root }),
            other => Err(LicenseError::Encoding(format!(
                "a grant must be a feature map or \"{UNBOUNDED}\", got {}",
                other.kind()
            ))),
        }
    }
}

impl From<Grant> for GrantValue {
    fn from(grant: Grant) -> Self {
        grant.root
    }
}
