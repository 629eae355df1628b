use crate::variable::Method;
use polars::prelude::{DataType, PolarsError};
use std::io;
use thiserror::Error;

/// Errors parsing, formatting, or combining a single variable
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableError {
    /// The label could not be parsed by the variable
    #[error("could not parse `{value}` as {kind} for variable `{name}`")]
    Parse {
        name: String,
        value: String,
        kind: &'static str,
    },
    /// The label is not one of the variable's categories
    #[error("`{label}` is not a category of variable `{name}`")]
    UnknownCategory { name: String, label: String },
    /// The value is of a kind the variable cannot format
    #[error("variable `{name}` cannot format {value}")]
    Format { name: String, value: String },
    /// Numeric behavior was requested from a non-numeric variable
    #[error("variable `{name}` is not numeric")]
    NotNumeric { name: String },
    /// The two variables cannot be combined with the operation
    #[error("cannot {method} variables `{left}` and `{right}`: {reason}")]
    Incompatible {
        method: Method,
        left: String,
        right: String,
        reason: String,
    },
    /// Division by a zero factor
    #[error("cannot divide variable `{name}` by zero")]
    ZeroFactor { name: String },
    /// A category appears more than once in a category list
    #[error("duplicate category `{0}`")]
    DuplicateCategory(String),
}

/// Errors manipulating a set of variables
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariablesError {
    /// Two variables share a name
    #[error("duplicate variable name `{0}`")]
    Duplicate(String),
    /// The requested variable does not exist
    #[error("variable `{0}` not found")]
    NotFound(String),
    /// Both sets define the variable, but differently
    #[error("variable `{0}` is defined differently in the two sets")]
    Conflict(String),
}

/// Errors inferring variables from a dataframe
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    /// Every value in the column is missing
    #[error("column `{col_name}` has no values")]
    BlankColumn { col_name: String },
    /// The column has a dtype with no corresponding variable type
    #[error("column `{col_name}` has unsupported data type {dtype}")]
    UnsupportedDataType { col_name: String, dtype: DataType },
    #[error("{0}")]
    Variables(#[from] VariablesError),
    #[error("{0}")]
    Read(#[from] ReadError),
}

/// Errors reading variables or data from a file
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
