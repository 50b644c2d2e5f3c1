//! Core data structures modeling reduced-representation DNA.
//!
//! This module defines pseudo-atoms, the mutable structural graph they live in, base-pair
//! fragments in canonical pose, and ladder/rail introspection over built duplexes. These
//! types are consumed and mutated by the placement, fusion, and resizing operations.

pub mod assembly;
pub mod atom;
pub mod fragment;
pub mod ladder;
pub mod types;
