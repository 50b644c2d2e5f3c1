use super::assembly::{Assembly, AtomId, ChunkId};
use super::atom::Atom;
use super::types::{BasePairRole, Form, ModelTier, Point};
use std::fmt;

/// One base pair in canonical pose: atoms, internal bonds, and open valences.
///
/// Bonds and open bonds reference atoms by index into `atoms`. Directions follow the
/// [`crate::Bond`] convention (relative to the first atom, or to anchor → placeholder).
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub form: Form,
    pub model: ModelTier,
    pub role: BasePairRole,
    /// Rise (Å) the open-bond placeholders were laid out for.
    pub rise: f64,
    pub bases_per_turn: f64,
    /// Twist (radians) added to this fragment's helical angle when placed.
    pub theta_offset: f64,
    /// Shift (Å) added to this fragment's axial offset when placed.
    pub z_offset: f64,
    atoms: Vec<Atom>,
    bonds: Vec<(usize, usize, i8)>,
    open_bonds: Vec<(usize, Point, i8)>,
}

impl Fragment {
    pub fn new(
        form: Form,
        model: ModelTier,
        role: BasePairRole,
        atoms: Vec<Atom>,
        bonds: Vec<(usize, usize, i8)>,
        open_bonds: Vec<(usize, Point, i8)>,
    ) -> Self {
        debug_assert!(
            bonds.iter().all(|(a, b, _)| *a < atoms.len() && *b < atoms.len())
                && open_bonds.iter().all(|(a, _, _)| *a < atoms.len()),
            "Fragment {} {} {} references an atom index out of range.",
            form,
            model,
            role
        );

        Self {
            form,
            model,
            role,
            rise: form.default_rise(),
            bases_per_turn: form.default_bases_per_turn(),
            theta_offset: 0.0,
            z_offset: 0.0,
            atoms,
            bonds,
            open_bonds,
        }
    }

    pub fn with_geometry(mut self, rise: f64, bases_per_turn: f64) -> Self {
        self.rise = rise;
        self.bases_per_turn = bases_per_turn;
        self
    }

    pub fn with_offsets(mut self, theta_offset: f64, z_offset: f64) -> Self {
        self.theta_offset = theta_offset;
        self.z_offset = z_offset;
        self
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[(usize, usize, i8)] {
        &self.bonds
    }

    pub fn open_bonds(&self) -> &[(usize, Point, i8)] {
        &self.open_bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.atoms.iter().position(|a| a.name == name)
    }

    /// Copies the fragment into `assembly`, mapping every position through `place`.
    ///
    /// Open bonds become placeholder atoms bonded to their anchor. The returned handles list
    /// the fragment atoms in declaration order followed by the placeholders.
    pub fn instantiate<F>(&self, assembly: &mut Assembly, chunk: ChunkId, place: F) -> Vec<AtomId>
    where
        F: Fn(&Point) -> Point,
    {
        let mut ids: Vec<AtomId> = self
            .atoms
            .iter()
            .map(|atom| {
                let mut placed = atom.clone();
                placed.pos = place(&atom.pos);
                assembly.add_atom(chunk, placed)
            })
            .collect();

        for (a, b, direction) in &self.bonds {
            assembly.bond(ids[*a], ids[*b], *direction);
        }

        for (anchor, pos, direction) in &self.open_bonds {
            let anchor = ids[*anchor];
            let singlet = assembly.add_atom(chunk, Atom::singlet(place(pos)));
            assembly.bond(anchor, singlet, *direction);
            ids.push(singlet);
        }

        ids
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fragment {{ {} {} {}, atoms: {}, bonds: {}, open: {} }}",
            self.form,
            self.model,
            self.role,
            self.atoms.len(),
            self.bonds.len(),
            self.open_bonds.len()
        )
    }
}
