//! Conform tables to shared header labels
use labtab_variables::{Variables, VariablesError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::array::ArrayTable;
use crate::error::TableError;

/// How the labels of a shared header axis are joined
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Join {
    /// Every label of either table
    #[default]
    Outer,
    /// Labels in both tables
    Inner,
    /// Labels of the first table
    Left,
    /// Labels of the second table
    Right,
    /// Both tables must have the same labels
    Exact,
}

/// Union of two sets of variables. Variables with the same name must be
/// equal.
pub fn align_variables(
    variables: &Variables,
    other: &Variables,
) -> Result<Variables, TableError> {
    Ok(variables.merge(other)?)
}

/// Join two lists of labels. The result follows the order of `left`, then
/// the order of `right` for labels only in `right`.
pub fn join_labels(
    left: &[String],
    right: &[String],
    join: Join,
    axis: &str,
) -> Result<Vec<String>, TableError> {
    let in_left: HashSet<&String> = left.iter().collect();
    let in_right: HashSet<&String> = right.iter().collect();
    let labels = match join {
        Join::Outer => left
            .iter()
            .chain(right.iter().filter(|label| !in_left.contains(label)))
            .cloned()
            .collect(),
        Join::Inner => left
            .iter()
            .filter(|label| in_right.contains(label))
            .cloned()
            .collect(),
        Join::Left => left.to_vec(),
        Join::Right => right.to_vec(),
        Join::Exact => {
            if in_left != in_right {
                return Err(TableError::LabelMismatch(String::from(axis)));
            }
            left.to_vec()
        }
    };
    Ok(labels)
}

/// Align the header axes two tables share.
///
/// Each shared axis, except those in `noncore`, is reindexed in both tables
/// to the joined labels. Labels new to a table are missing. Both results
/// are sorted along every axis.
pub fn align<S: AsRef<str>>(
    table: &ArrayTable,
    other: &ArrayTable,
    join: Join,
    noncore: &[S],
) -> Result<(ArrayTable, ArrayTable), TableError> {
    let mut left = table.dataset().clone();
    let mut right = other.dataset().clone();

    for axis in table.dimkeys() {
        if noncore.iter().any(|key| key.as_ref() == axis) {
            continue;
        }
        let (Some(left_labels), Some(right_labels)) =
            (left.labels(axis), right.labels(axis))
        else {
            continue;
        };
        if table.variables().try_get(axis)? != other.variables().try_get(axis)? {
            return Err(VariablesError::Conflict(String::from(axis)).into());
        }
        let labels = join_labels(left_labels, right_labels, join, axis)?;
        left = left.reindex(axis, &labels)?;
        right = right.reindex(axis, &labels)?;
    }

    let left = ArrayTable::new(table.name(), left, table.variables())?.sortall(true)?;
    let right = ArrayTable::new(other.name(), right, other.variables())?.sortall(true)?;
    Ok((left, right))
}
