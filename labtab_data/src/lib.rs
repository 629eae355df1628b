//! Labeled N-dimensional data containers.
//!
//! A [`Dataset`] holds one or more co-indexed `f64` arrays (layers) that share
//! a list of named dimensions. Each dimension carries one string label per
//! position. Scalar coordinates that are constant over the whole dataset are
//! kept as scope. Missing values are `NaN`.
#![warn(unused_extern_crates)]
#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]

mod combine;
mod dataset;
mod error;

pub use combine::{concat, merge};
pub use dataset::Dataset;
pub use error::DatasetError;
