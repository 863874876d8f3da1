//! Basic analyzers: size, completeness and simple column statistics.

mod completeness;
mod mean;
mod min_max;
mod size;
mod sum;

pub use completeness::Completeness;
pub use mean::Mean;
pub use min_max::{Maximum, Minimum};
pub use size::Size;
pub use sum::Sum;
