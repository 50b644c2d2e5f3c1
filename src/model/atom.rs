//! Pseudo-atom representation comprising name, reduced-model kind, position, and strand tag.
//!
//! Reduced DNA models place one pseudo-atom per structural site (axis point, sugar,
//! phosphate, or an open-valence placeholder). The kind fixes what the site is; the strand
//! tag is construction-time bookkeeping that records which template strand produced it and is
//! reset once the atom has been classified into its final group.

use super::types::{AtomKind, Point, Role, StrandTag};
use smol_str::SmolStr;
use std::fmt;

/// Labeled pseudo-atom with a kind, a mutable position, and a strand tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Template-local name (e.g. `Ssa`), kept for diagnostics.
    pub name: SmolStr,
    /// Reduced-model kind such as `Ax3` or `Pl5`.
    pub kind: AtomKind,
    /// Cartesian coordinates measured in ångströms.
    pub pos: Point,
    /// Transient strand marker assigned by templates.
    pub tag: StrandTag,
}

impl Atom {
    /// Creates a new untagged atom.
    ///
    /// # Arguments
    ///
    /// * `name` - Atom label such as `"Ax"` or `"Ssa"`.
    /// * `kind` - Reduced-model kind.
    /// * `pos` - Position in ångströms.
    ///
    /// # Returns
    ///
    /// An `Atom` whose tag is [`StrandTag::Unassigned`].
    pub fn new(name: &str, kind: AtomKind, pos: Point) -> Self {
        Self {
            name: SmolStr::new(name),
            kind,
            pos,
            tag: StrandTag::Unassigned,
        }
    }

    /// Builder-style helper that attaches a strand tag.
    pub fn with_tag(mut self, tag: StrandTag) -> Self {
        self.tag = tag;
        self
    }

    /// Open-valence placeholder at `pos`.
    pub fn singlet(pos: Point) -> Self {
        Self::new("X", AtomKind::Singlet, pos)
    }

    pub fn role(&self) -> Role {
        self.kind.role()
    }

    pub fn is_singlet(&self) -> bool {
        self.kind.is_singlet()
    }

    /// Computes the squared Euclidean distance to another atom.
    pub fn distance_squared(&self, other: &Atom) -> f64 {
        nalgebra::distance_squared(&self.pos, &other.pos)
    }

    /// Computes the Euclidean distance to another atom.
    pub fn distance(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.pos, &other.pos)
    }

    /// Translates the atom by an arbitrary vector.
    ///
    /// # Arguments
    ///
    /// * `vector` - Translation expressed as a `nalgebra::Vector3<f64>` in ångströms.
    pub fn translate_by(&mut self, vector: &nalgebra::Vector3<f64>) {
        self.pos += vector;
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Atom {{ name: \"{}\", kind: {}, tag: {}, pos: [{:.3}, {:.3}, {:.3}] }}",
            self.name, self.kind, self.tag, self.pos.x, self.pos.y, self.pos.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_new_is_untagged() {
        let pos = Point::new(1.0, 2.0, 3.0);
        let atom = Atom::new("Ax", AtomKind::Ax3, pos);

        assert_eq!(atom.name, "Ax");
        assert_eq!(atom.kind, AtomKind::Ax3);
        assert_eq!(atom.tag, StrandTag::Unassigned);
        assert_eq!(atom.pos, pos);
    }

    #[test]
    fn atom_with_tag_sets_marker() {
        let atom = Atom::new("Ssa", AtomKind::Ss3, Point::origin()).with_tag(StrandTag::BaseA);
        assert_eq!(atom.tag, StrandTag::BaseA);
        assert_eq!(atom.role(), Role::StrandPoint);
    }

    #[test]
    fn singlet_is_open_valence() {
        let atom = Atom::singlet(Point::new(0.0, 0.0, 1.0));
        assert!(atom.is_singlet());
        assert_eq!(atom.role(), Role::OpenValence);
    }

    #[test]
    fn atom_distance_calculates_correctly() {
        let atom1 = Atom::new("A", AtomKind::Ax3, Point::new(0.0, 0.0, 0.0));
        let atom2 = Atom::new("B", AtomKind::Ax3, Point::new(3.0, 4.0, 0.0));

        assert!((atom1.distance_squared(&atom2) - 25.0).abs() < 1e-10);
        assert!((atom1.distance(&atom2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn atom_translate_by_moves_position() {
        let mut atom = Atom::new("A", AtomKind::Ss3, Point::new(1.0, 1.0, 1.0));
        atom.translate_by(&nalgebra::Vector3::new(-1.0, 2.0, 0.5));
        assert_eq!(atom.pos, Point::new(0.0, 3.0, 1.5));
    }

    #[test]
    fn atom_display_includes_kind_and_tag() {
        let atom = Atom::new("Ssb", AtomKind::Ss3, Point::new(1.0, 2.0, 3.0))
            .with_tag(StrandTag::BaseB);
        let text = atom.to_string();
        assert!(text.contains("Ss3"));
        assert!(text.contains("tag: b"));
    }
}
