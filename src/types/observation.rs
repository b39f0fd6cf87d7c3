//! Canonical observation records
//!
//! Every stage of the pipeline consumes and produces the same canonical shape:
//! a sequence of `{time, x, y, id}` records. Stages never mutate their input;
//! they return a new collection.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::errors::TrajectoryError;

/// Identifier of the entity an observation belongs to.
///
/// Tables without an id column use [`GroupId::Default`] for every row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupId {
    /// The single implicit group
    #[default]
    Default,
    /// Integer identifier
    Int(i64),
    /// String identifier
    Name(String),
}

impl GroupId {
    /// Whether this is the implicit single group
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, GroupId::Default)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Default => write!(f, "<default>"),
            GroupId::Int(i) => write!(f, "{}", i),
            GroupId::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for GroupId {
    fn from(value: i64) -> Self {
        GroupId::Int(value)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        GroupId::Name(value.to_string())
    }
}

/// A single time-stamped 2-D position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Timestamp (any monotone unit)
    pub time: f64,
    /// Position along the first axis
    pub x: f64,
    /// Position along the second axis
    pub y: f64,
    /// Owning entity; omitted from JSON for the default group
    #[serde(default, skip_serializing_if = "GroupId::is_default")]
    pub id: GroupId,
}

impl Observation {
    /// Create an observation in the default group
    pub fn new(time: f64, x: f64, y: f64) -> Self {
        Self {
            time,
            x,
            y,
            id: GroupId::Default,
        }
    }

    /// Create an observation in the given group
    pub fn with_id(time: f64, x: f64, y: f64, id: impl Into<GroupId>) -> Self {
        Self {
            time,
            x,
            y,
            id: id.into(),
        }
    }

    /// Copy of this observation with a new position
    #[inline]
    pub fn moved_to(&self, x: f64, y: f64) -> Self {
        Self {
            time: self.time,
            x,
            y,
            id: self.id.clone(),
        }
    }
}

/// Canonical table of observations.
///
/// Row order is preserved as given. Grouping happens in order of first
/// appearance of each id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    /// Wrap an existing set of rows
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    /// Build a table from column vectors.
    ///
    /// `ids` may be omitted, in which case every row belongs to the default
    /// group. All supplied columns must have the same length.
    pub fn from_columns(
        time: Vec<f64>,
        x: Vec<f64>,
        y: Vec<f64>,
        ids: Option<Vec<GroupId>>,
    ) -> Result<Self, TrajectoryError> {
        let n = time.len();
        if x.len() != n || y.len() != n {
            return Err(TrajectoryError::InputType {
                description: format!(
                    "columns have different lengths (time={}, x={}, y={})",
                    n,
                    x.len(),
                    y.len()
                ),
            });
        }
        let ids = match ids {
            Some(ids) if ids.len() != n => {
                return Err(TrajectoryError::InputType {
                    description: format!("id column has {} rows, expected {}", ids.len(), n),
                });
            }
            Some(ids) => ids,
            None => vec![GroupId::Default; n],
        };

        let rows = time
            .into_iter()
            .zip(x)
            .zip(y)
            .zip(ids)
            .map(|(((time, x), y), id)| Observation { time, x, y, id })
            .collect();
        Ok(Self { rows })
    }

    /// Parse a JSON array of `{time, x, y, id?}` records
    pub fn from_json(json: &str) -> Result<Self, TrajectoryError> {
        serde_json::from_str(json).map_err(|e| TrajectoryError::InputType {
            description: e.to_string(),
        })
    }

    /// Serialize to a JSON array of records.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    /// All rows in table order
    #[inline]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Consume the table, returning its rows
    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }

    /// Number of rows
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct group ids in order of first appearance
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.partition().into_iter().map(|(id, _)| id).collect()
    }

    /// Split rows by group, preserving first-appearance order of groups and
    /// table order of rows within each group.
    pub fn partition(&self) -> Vec<(GroupId, Vec<Observation>)> {
        let mut index: HashMap<&GroupId, usize> = HashMap::new();
        let mut groups: Vec<(GroupId, Vec<Observation>)> = Vec::new();

        for row in &self.rows {
            let slot = *index.entry(&row.id).or_insert_with(|| {
                groups.push((row.id.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(row.clone());
        }

        groups
    }
}

impl From<Vec<Observation>> for ObservationTable {
    fn from(rows: Vec<Observation>) -> Self {
        Self::new(rows)
    }
}

/// Return the rows sorted ascending by time.
///
/// The sort is stable, so rows sharing a timestamp keep their relative order.
pub fn sorted_by_time(rows: &[Observation]) -> Vec<Observation> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
    sorted
}
