//! Helical placement of base-pair fragments along the canonical axis.
//!
//! Base pair `i` of `n` is turned by `θᵢ = −i·τ + θ_role` about the canonical axis and shifted
//! to `zᵢ = ½·rise·(n−1) − i·rise + z_role`, where `τ = handedness·2π/bases_per_turn`. The
//! stack is centered on the origin and runs from `+z` (index 0) to `−z`, so the canonical
//! helix axis points along `−Z`.

use super::transform::Transform;
use crate::db::TemplateProvider;
use crate::model::assembly::{Assembly, AtomId, ChunkId};
use crate::model::fragment::Fragment;
use crate::model::types::{BasePairRole, Form, Handedness, ModelTier, StrandTag};
use crate::ops::error::Error;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Base pair after placement: which template it came from and the atoms it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFragment {
    pub index: usize,
    pub role: BasePairRole,
    /// Fragment atoms followed by their placeholders.
    pub atoms: Vec<AtomId>,
}

/// Output of the placement stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placement {
    pub fragments: Vec<PlacedFragment>,
    /// Axis atom of base pair 0.
    pub axis_reference: Option<AtomId>,
    /// First-strand sugar of base pair 0.
    pub strand_reference: Option<AtomId>,
}

impl Placement {
    /// Every placed atom in placement order.
    pub fn atoms(&self) -> Vec<AtomId> {
        self.fragments
            .iter()
            .flat_map(|f| f.atoms.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Helix parameters consumed by [`place`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixParams {
    pub model: ModelTier,
    pub rise: f64,
    pub bases_per_turn: f64,
    pub handedness: Handedness,
    pub count: usize,
}

impl HelixParams {
    /// Signed twist between consecutive base pairs, in radians.
    pub fn twist_per_step(&self) -> f64 {
        self.handedness.sign() * 2.0 * PI / self.bases_per_turn
    }

    /// Helical angle of base pair `index` before any role offset.
    pub fn theta(&self, index: usize) -> f64 {
        -(index as f64) * self.twist_per_step()
    }

    /// Axial position of base pair `index` before any role offset.
    pub fn z(&self, index: usize) -> f64 {
        0.5 * self.rise * (self.count as f64 - 1.0) - index as f64 * self.rise
    }

    /// Template role requested for each index, in order.
    pub fn roles(&self) -> Vec<BasePairRole> {
        (0..self.count)
            .map(|i| self.model.role_for(i, self.count))
            .collect()
    }
}

/// Fetches every template the placement will need before anything is built.
///
/// # Errors
///
/// Propagates the provider's [`Error::TemplateNotFound`] or [`Error::TemplateParse`] for the
/// first missing role, so a doomed build fails before touching the assembly.
pub fn fetch_templates<P>(
    provider: &P,
    form: Form,
    params: &HelixParams,
) -> Result<BTreeMap<BasePairRole, Fragment>, Error>
where
    P: TemplateProvider + ?Sized,
{
    let mut templates = BTreeMap::new();
    for role in params.roles() {
        if !templates.contains_key(&role) {
            let fragment = provider.fetch(form, params.model, role)?;
            templates.insert(role, fragment);
        }
    }
    Ok(templates)
}

/// Places `params.count` fragments into `chunk` in canonical pose.
///
/// # Errors
///
/// Returns [`Error::TemplateNotFound`] if `templates` lacks a role the count requires.
pub fn place(
    assembly: &mut Assembly,
    chunk: ChunkId,
    params: &HelixParams,
    templates: &BTreeMap<BasePairRole, Fragment>,
) -> Result<Placement, Error> {
    let mut placement = Placement::default();

    for (index, role) in params.roles().into_iter().enumerate() {
        let Some(template) = templates.get(&role) else {
            return Err(Error::invalid(
                "templates",
                format!("no {role} template supplied for base pair {index}"),
            ));
        };
        let theta = params.theta(index) + template.theta_offset;
        let z = params.z(index) + template.z_offset;
        let atoms = template.instantiate(assembly, chunk, |p| Transform::helical_step(p, theta, z));

        if index == 0 {
            placement.axis_reference = find_atom(assembly, &atoms, |a| a.kind.is_axis());
            placement.strand_reference = find_atom(assembly, &atoms, |a| {
                a.kind.is_sugar() && a.tag == StrandTag::BaseA
            });
        }

        placement.fragments.push(PlacedFragment { index, role, atoms });
    }

    log::debug!(
        "placed {} {} base pairs (rise {:.3} Å, twist {:.2}°/step)",
        placement.len(),
        params.model,
        params.rise,
        params.twist_per_step().to_degrees()
    );
    Ok(placement)
}

fn find_atom<F>(assembly: &Assembly, atoms: &[AtomId], predicate: F) -> Option<AtomId>
where
    F: Fn(&crate::model::atom::Atom) -> bool,
{
    atoms
        .iter()
        .copied()
        .find(|id| assembly.atom(*id).is_some_and(&predicate))
}
