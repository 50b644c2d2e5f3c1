//! Vector and rotation algebra shared by every placement and orientation stage.
//!
//! Every function is total. Degenerate inputs (zero-length vectors, parallel or antiparallel
//! axes) resolve through fixed fallbacks instead of errors and never produce NaN.

pub mod quat;
pub mod vector;

pub use quat::Quat;
pub use vector::{Vector, angle_between, normalize, vlen};
