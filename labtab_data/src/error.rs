use ndarray::ShapeError;
use thiserror::Error;

/// Errors building or reshaping a `Dataset`
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DatasetError {
    /// A layer's shape does not match the dimension label lengths
    #[error("layer `{layer}` has shape {found:?} but the dims have shape {expected:?}")]
    ShapeMismatch {
        layer: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// A label appears more than once along a dimension
    #[error("label `{label}` appears more than once along dim `{dim}`")]
    DuplicateLabel { dim: String, label: String },
    /// The same key names more than one of a layer, dim, or scope coordinate
    #[error("key `{0}` is used more than once")]
    KeyCollision(String),
    #[error("dim `{0}` not found")]
    DimNotFound(String),
    #[error("layer `{0}` not found")]
    LayerNotFound(String),
    #[error("key `{0}` not found")]
    KeyNotFound(String),
    #[error("scope `{0}` not found")]
    ScopeNotFound(String),
    #[error("label `{label}` not found along dim `{dim}`")]
    LabelNotFound { dim: String, label: String },
    #[error("index {index} is out of bounds for dim `{dim}` with length {len}")]
    IndexOutOfBounds { dim: String, index: usize, len: usize },
    /// Only length-one dims can be squeezed into scope
    #[error("dim `{dim}` has length {len} and cannot be squeezed")]
    NotSqueezable { dim: String, len: usize },
    /// A transpose order must name every dim exactly once
    #[error("invalid dim order {0:?}")]
    InvalidOrder(Vec<String>),
    /// Two datasets disagree on the labels of a shared dim
    #[error("labels of dim `{0}` do not match")]
    LabelMismatch(String),
    /// Two datasets do not have the same dims
    #[error("dims {left:?} and {right:?} do not match")]
    DimMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
    /// Two datasets do not have the same layers
    #[error("layers {left:?} and {right:?} do not match")]
    LayerMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
    /// Two datasets disagree on a scope coordinate
    #[error("scope `{key}` is `{left}` in one dataset and `{right}` in another")]
    ScopeConflict {
        key: String,
        left: String,
        right: String,
    },
    #[error("no datasets to combine")]
    Empty,
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),
}
