//! Operations that build and edit duplexes inside an [`Assembly`](crate::Assembly).
//!
//! [`DuplexGenerator`] is the entry point; the stage modules below it are public so callers
//! can run individual steps (placement, orientation, fusion) on their own structures.

mod duplex;
mod resize;

pub mod error;
pub mod fuse;
pub mod orient;
pub mod placement;
pub mod regroup;
pub mod terminal;
pub mod transform;

pub use duplex::{BuildConfig, BuildReport, DuplexGenerator, DuplexSpec, ResizeReport};
pub use error::{Error, Warning};
pub use fuse::{FusionSummary, fuse, fuse_adjacent};
pub use regroup::{Classification, DuplexGroups, classify};
pub use transform::Transform;
