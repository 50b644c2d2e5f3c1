//! Ladder and rail discovery over an [`Assembly`].
//!
//! A ladder is read starting from an end axis atom: the axis rail follows axis–axis bonds,
//! and each strand rail follows the backbone from one sugar of the first rung to the sugar
//! attached to the next axis atom. Rails of one ladder always have the same length, so index
//! `i` in every rail names the same rung. A ladder stops where any strand breaks.

use super::assembly::{Assembly, AtomId};
use super::types::AtomKind;

/// Ordered run of same-role atoms along the axis or one strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rail {
    atoms: Vec<AtomId>,
}

impl Rail {
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<AtomId> {
        self.atoms.get(index).copied()
    }

    pub fn index_of(&self, atom: AtomId) -> Option<usize> {
        self.atoms.iter().position(|a| *a == atom)
    }

    /// 5'→3' direction when walking from index 0 to index 1.
    ///
    /// Returns `None` for rails of a single atom, or when the two atoms are joined through an
    /// undirected or intermediate bond the assembly does not record a direction for.
    pub fn bond_direction(&self, assembly: &Assembly) -> Option<i8> {
        let [first, second, ..] = self.atoms.as_slice() else {
            return None;
        };
        backbone_direction(assembly, *first, *second).filter(|d| *d != 0)
    }

    fn truncate(&mut self, len: usize) {
        self.atoms.truncate(len);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ladder {
    axis: Rail,
    strands: Vec<Rail>,
}

impl Ladder {
    /// Reads the ladder that ends at `axis_end`.
    ///
    /// # Returns
    ///
    /// `None` when the atom is missing, is not an axis atom, or is not at an end of its axis
    /// (it has more than one axis neighbor).
    pub fn from_end(assembly: &Assembly, axis_end: AtomId) -> Option<Ladder> {
        if !assembly.atom(axis_end)?.kind.is_axis() {
            return None;
        }
        if axis_neighbors(assembly, axis_end).len() > 1 {
            return None;
        }

        let mut axis = vec![axis_end];
        let mut previous = None;
        let mut current = axis_end;
        loop {
            let next: Vec<AtomId> = axis_neighbors(assembly, current)
                .into_iter()
                .filter(|a| Some(*a) != previous && !axis.contains(a))
                .collect();
            let [next] = next.as_slice() else {
                break;
            };
            axis.push(*next);
            previous = Some(current);
            current = *next;
        }

        let mut strands = Vec::new();
        let mut length = axis.len();
        for start in rung_sugars(assembly, axis_end) {
            let mut rail = vec![start];
            for rung in axis.iter().skip(1) {
                let Some(last) = rail.last().copied() else {
                    break;
                };
                let next = rung_sugars(assembly, *rung)
                    .into_iter()
                    .find(|s| backbone_direction(assembly, last, *s).is_some());
                match next {
                    Some(s) => rail.push(s),
                    None => break,
                }
            }
            length = length.min(rail.len());
            strands.push(Rail { atoms: rail });
        }

        let mut ladder = Ladder {
            axis: Rail { atoms: axis },
            strands,
        };
        ladder.axis.truncate(length);
        for rail in &mut ladder.strands {
            rail.truncate(length);
        }
        ladder
            .strands
            .sort_by_key(|rail| std::cmp::Reverse(rail.bond_direction(assembly).unwrap_or(0)));
        Some(ladder)
    }

    pub fn axis(&self) -> &Rail {
        &self.axis
    }

    pub fn strands(&self) -> &[Rail] {
        &self.strands
    }

    /// Number of rungs.
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// Rail index of `atom` in whichever rail contains it.
    pub fn rail_index(&self, atom: AtomId) -> Option<usize> {
        std::iter::once(&self.axis)
            .chain(self.strands.iter())
            .find_map(|rail| rail.index_of(atom))
    }

    /// Atoms of rung `index`: the first strand, the axis, and the second strand.
    pub fn rung(&self, index: usize) -> [Option<AtomId>; 3] {
        [
            self.strands.first().and_then(|r| r.get(index)),
            self.axis.get(index),
            self.strands.get(1).and_then(|r| r.get(index)),
        ]
    }

    /// The end rung the ladder was read from.
    pub fn end_base_atoms(&self) -> [Option<AtomId>; 3] {
        self.rung(0)
    }
}

/// Real axis atoms bonded to `atom`.
pub fn axis_neighbors(assembly: &Assembly, atom: AtomId) -> Vec<AtomId> {
    assembly
        .real_neighbors(atom)
        .map(|(other, _)| other)
        .filter(|other| assembly.atom(*other).is_some_and(|a| a.kind.is_axis()))
        .collect()
}

/// Sugar sites paired with the axis atom `axis`, directly or through a groove point.
pub fn rung_sugars(assembly: &Assembly, axis: AtomId) -> Vec<AtomId> {
    let mut sugars = Vec::new();
    for (neighbor, _) in assembly.real_neighbors(axis) {
        let Some(kind) = assembly.atom(neighbor).map(|a| a.kind) else {
            continue;
        };
        if kind.is_sugar() {
            sugars.push(neighbor);
        } else if matches!(kind, AtomKind::Gv5 | AtomKind::Gr5) {
            sugars.extend(
                assembly
                    .real_neighbors(neighbor)
                    .map(|(s, _)| s)
                    .filter(|s| assembly.atom(*s).is_some_and(|a| a.kind.is_sugar())),
            );
        }
    }
    sugars
}

/// Backbone direction from sugar `from` to sugar `to`, either bonded directly or through a
/// shared phosphate.
fn backbone_direction(assembly: &Assembly, from: AtomId, to: AtomId) -> Option<i8> {
    if let Some(d) = assembly.bond_direction(from, to) {
        return Some(d);
    }
    assembly
        .real_neighbors(from)
        .filter(|(p, _)| assembly.atom(*p).is_some_and(|a| a.kind == AtomKind::Pl5))
        .find_map(|(p, d)| assembly.bond_direction(p, to).map(|_| d))
}
