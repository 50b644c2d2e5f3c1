//! # HelixForge
//!
//! **HelixForge** procedurally builds reduced-representation DNA duplexes from a handful of
//! helix parameters and two endpoints, and resizes existing duplexes in place while keeping
//! their strands and axis bonded. Base pairs come from curated canonical-pose templates, are
//! stacked along a helical path, oriented between the endpoints, and fused into continuous
//! strands.
//!
//! ## Features
//!
//! - **Template-driven geometry** – Embedded TOML base-pair templates for the PAM3 and PAM5
//!   tiers, or any directory laid out the same way through an injected provider.
//! - **Structural graph** – `Assembly` stores pseudo-atoms, directed backbone bonds, and named
//!   colored chunks; `Ladder` and `Rail` read a duplex back rung by rung.
//! - **Total geometry kernel** – Quaternion and vector helpers backed by `nalgebra` resolve
//!   degenerate input through fixed fallbacks rather than errors.
//! - **Construction and resizing** – `ops::DuplexGenerator` builds, truncates, and extends
//!   duplexes, returning reports that carry non-fatal warnings next to the result.

mod db;
mod model;

pub mod geometry;
pub mod ops;
pub mod templates;

pub use model::assembly::{Assembly, AtomId, Bond, Chunk, ChunkId};
pub use model::atom::Atom;
pub use model::fragment::Fragment;
pub use model::ladder::{Ladder, Rail};
pub use model::types::{
    AtomKind, BasePairRole, Color, DisplayStyle, DuplexGroup, Form, Handedness, ModelTier, Point,
    Role, StrandTag, TagRule,
};
