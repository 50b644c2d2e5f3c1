//! Rigid-body transforms over sets of atoms in an [`Assembly`].
//!
//! Placement and orientation move whole fragments or whole segments at once; these helpers
//! keep the per-atom loops in one place and make sure placeholders travel with their anchors
//! (they are ordinary atoms in the moved set).

use crate::geometry::{Quat, Vector};
use crate::model::assembly::{Assembly, AtomId};
use crate::model::types::Point;

/// Collection of rigid-body operations applied to atom sets.
pub struct Transform;

impl Transform {
    /// Translates the listed atoms by `offset`.
    pub fn translate(assembly: &mut Assembly, atoms: &[AtomId], offset: &Vector) {
        assembly.update_atoms(atoms, |atom| atom.translate_by(offset));
    }

    /// Rotates the listed atoms by `rotation` about `pivot`.
    ///
    /// # Arguments
    ///
    /// * `assembly` - Graph holding the atoms.
    /// * `atoms` - Atoms to move.
    /// * `rotation` - Rotation to apply.
    /// * `pivot` - Fixed point of the rotation.
    pub fn rotate_about(assembly: &mut Assembly, atoms: &[AtomId], rotation: &Quat, pivot: &Point) {
        assembly.update_atoms(atoms, |atom| {
            atom.pos = pivot + rotation.rotate(&(atom.pos - pivot));
        });
    }

    /// Applies `p ↦ rotation·p + offset` to the listed atoms.
    pub fn rotate_translate(
        assembly: &mut Assembly,
        atoms: &[AtomId],
        rotation: &Quat,
        offset: &Vector,
    ) {
        assembly.update_atoms(atoms, |atom| {
            atom.pos = Point::from(rotation.rotate(&atom.pos.coords) + offset);
        });
    }

    /// Geometric center of the listed atoms, or `None` when none of them exist.
    pub fn centroid(assembly: &Assembly, atoms: &[AtomId]) -> Option<Point> {
        let positions = assembly.positions(atoms);
        if positions.is_empty() {
            return None;
        }
        let sum = positions
            .iter()
            .fold(Vector::zeros(), |acc, p| acc + p.coords);
        Some(Point::from(sum / positions.len() as f64))
    }

    /// Helical step: turn by `theta` in the plane normal to the canonical axis, then shift
    /// by `z` along it.
    ///
    /// `x' = cos θ·x + sin θ·y`, `y' = −sin θ·x + cos θ·y`, `z' = z + Δz`.
    pub fn helical_step(p: &Point, theta: f64, z: f64) -> Point {
        let (s, c) = theta.sin_cos();
        Point::new(c * p.x + s * p.y, -s * p.x + c * p.y, p.z + z)
    }
}
