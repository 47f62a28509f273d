//! Value-level tensor operations used by the autodiff layer.
//!
//! These work on plain [`DenseTensor`](crate::DenseTensor) values and never
//! touch the computation graph.

mod accumulate;
mod permutedims;

pub use accumulate::add_into;
pub use permutedims::{inverse_permutation, permutedims, permutedims_into, permuted};
