use std::io;

use labtab_data::DatasetError;
use labtab_variables::{InferenceError, ReadError, VariableError, VariablesError};
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can arise when building, reshaping, or combining tables
#[derive(Debug, Error)]
pub enum TableError {
    #[error("variable error: {0}")]
    Variable(#[from] VariableError),
    #[error("variables error: {0}")]
    Variables(#[from] VariablesError),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The table has no column or key with this name
    #[error("no column or key named `{0}`")]
    KeyNotFound(String),
    /// A key was listed in more than one of data, header, or scope
    #[error("key `{0}` is listed in more than one role")]
    KeyOverlap(String),
    /// A data column holds a label that does not project onto a number
    #[error("data column `{column}` holds non-numeric label `{label}`")]
    NonNumericData { column: String, label: String },
    /// An axis holds labels that do not project onto numbers
    #[error("axis `{0}` is not numeric")]
    NonNumericAxis(String),
    /// A scope column takes more than one value
    #[error("scope column `{column}` is not constant: {labels:?}")]
    NonConstantScope { column: String, labels: Vec<String> },
    /// Two rows of a flat table share the same header labels
    #[error("header labels {0:?} appear in more than one row")]
    NonUniquePivot(Vec<String>),
    /// A table without headers must have exactly one row
    #[error("a table with no headers must have one row, found {0}")]
    NotSingleRow(usize),
    #[error("expected a single-layer table, found layers {0:?}")]
    NotSingleLayer(Vec<String>),
    #[error("expected a one-dimensional table, found dims {0:?}")]
    NotOneDimensional(Vec<String>),
    /// Tables to concatenate hold different data
    #[error("datakeys `{left}` and `{right}` differ")]
    DatakeyMismatch { left: String, right: String },
    /// A datakey appears in more than one table to layer
    #[error("datakey `{0}` appears in more than one table")]
    DuplicateDatakey(String),
    /// Tables to combine have different dims
    #[error("dims {left:?} and {right:?} differ")]
    DimMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
    /// An exact join found different labels along an axis
    #[error("labels along `{0}` differ")]
    LabelMismatch(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid file type `{0}`")]
    InvalidFileType(String),
    #[error("no tables given")]
    Empty,
}

/// Errors that can arise when running feeds, pipelines, and calculations
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    /// No query is registered under this table key
    #[error("no table registered under `{0}`")]
    UnknownTable(String),
    /// No parameters are registered under this calculation key
    #[error("no calculation registered under `{0}`")]
    UnknownCalculation(String),
    /// A source does not provide a queried column
    #[error("source has no column `{0}`")]
    MissingColumn(String),
}
