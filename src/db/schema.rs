//! Deserializable representation of the base-pair templates shipped with `helix-forge`.
//!
//! The schema matches the TOML documents in `templates/<form>/<model>-bases/`. All structs
//! deny unknown fields so that a template with a typo or an unsupported key fails to load
//! instead of silently dropping data.

use crate::model::types::{AtomKind, BasePairRole, Form, ModelTier, StrandTag};
use serde::Deserialize;

/// Top-level template document.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BasePairTemplateFile {
    pub info: TemplateInfo,
    #[serde(default)]
    pub atoms: Vec<TemplateAtom>,
    #[serde(default)]
    pub bonds: Vec<TemplateBond>,
    /// Bonds to the neighboring base pairs, each ending in a placeholder position.
    #[serde(default)]
    pub open_bonds: Vec<TemplateOpenBond>,
}

/// Which slot of the template store the document fills, plus the helix it was built for.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateInfo {
    pub form: Form,
    pub model: ModelTier,
    pub role: BasePairRole,
    /// Rise (Å) the open-bond placeholders were laid out for.
    pub rise: f64,
    pub bases_per_turn: f64,
    /// Extra twist (radians) applied when this role is placed.
    #[serde(default)]
    pub theta_offset: f64,
    /// Extra axial shift (Å) applied when this role is placed.
    #[serde(default)]
    pub z_offset: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateAtom {
    pub name: String,
    pub kind: AtomKind,
    pub pos: [f64; 3],
    #[serde(default)]
    pub tag: StrandTag,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateBond {
    pub a1: String,
    pub a2: String,
    /// `1` when `a1 → a2` runs 5'→3', `-1` for the reverse, `0` when undirected.
    #[serde(default)]
    pub direction: i8,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateOpenBond {
    pub anchor: String,
    pub pos: [f64; 3],
    /// Direction of anchor → placeholder, same convention as [`TemplateBond::direction`].
    #[serde(default)]
    pub direction: i8,
}
