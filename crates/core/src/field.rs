use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Which designated record area a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Baseline,
    Final,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Final => "final",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "baseline" => Ok(Self::Baseline),
            "final" => Ok(Self::Final),
            _ => Err(CoreError::UnknownPosition(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage identity of a bound field: `"{position}::{canonical_id}"`.
///
/// Unique among live fields within a position; resolved once at bind time
/// and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    pub position: Position,
    pub canonical_id: String,
}

impl FieldKey {
    pub fn new(position: Position, canonical_id: impl Into<String>) -> Self {
        Self {
            position,
            canonical_id: canonical_id.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.position, self.canonical_id)
    }
}

impl FromStr for FieldKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, id) = s
            .split_once("::")
            .ok_or_else(|| CoreError::InvalidKey(s.to_string()))?;
        if id.is_empty() {
            return Err(CoreError::InvalidKey(s.to_string()));
        }
        Ok(Self {
            position: Position::parse(head)?,
            canonical_id: id.to_string(),
        })
    }
}

/// One editable value bound into a record area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: FieldKey,
    pub value: String,
    /// Value is treated/rendered as a calendar date rather than free text.
    pub date_typed: bool,
    /// Marks the baseline or final instance of a linked pair; drives the
    /// one-time baseline-to-final date propagation.
    pub origin: Option<Position>,
}

impl Field {
    pub fn new(key: FieldKey) -> Self {
        let origin = Some(key.position);
        Self {
            key,
            value: String::new(),
            date_typed: false,
            origin,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}
