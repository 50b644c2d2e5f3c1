//! Mutable structural graph holding atoms, directed bonds, and named chunks.
//!
//! An [`Assembly`] is the model a duplex is built into and later resized in place. Atoms are
//! addressed by stable [`AtomId`] handles that survive unrelated deletions, every atom lives in
//! exactly one [`Chunk`], and bonds carry an optional 5'→3' direction so strand polarity is
//! preserved across splicing. Open valences are explicit placeholder atoms (singlets) bonded
//! to their anchor; deleting an atom with [`Assembly::kill`] leaves such placeholders behind on
//! the surviving neighbors.

use super::atom::Atom;
use super::types::{Color, DisplayStyle, Point};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Stable handle to an atom inside an [`Assembly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(usize);

/// Stable handle to a chunk inside an [`Assembly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(usize);

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}", self.0)
    }
}

/// Bond between two atoms with canonical endpoint ordering.
///
/// `direction` is expressed relative to `a1 → a2`: `1` when that walk runs 5'→3', `-1` for the
/// reverse, and `0` for undirected (axis or rung) bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub a1: AtomId,
    pub a2: AtomId,
    pub direction: i8,
}

impl Bond {
    /// Creates a new bond while canonicalizing the endpoint ordering.
    ///
    /// When the endpoints are swapped the direction is negated so it keeps describing the same
    /// physical polarity.
    pub fn new(from: AtomId, to: AtomId, direction: i8) -> Self {
        if from <= to {
            Self {
                a1: from,
                a2: to,
                direction,
            }
        } else {
            Self {
                a1: to,
                a2: from,
                direction: -direction,
            }
        }
    }

    /// Direction of the bond when walked starting at `from`.
    pub fn direction_from(&self, from: AtomId) -> i8 {
        if from == self.a1 {
            self.direction
        } else {
            -self.direction
        }
    }
}

/// Named, colored container of atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub name: String,
    pub color: Color,
    pub display: DisplayStyle,
    atoms: Vec<AtomId>,
}

impl Chunk {
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Node {
    atom: Atom,
    chunk: ChunkId,
    bonds: Vec<(AtomId, i8)>,
}

#[derive(Debug, Clone, Default)]
pub struct Assembly {
    nodes: BTreeMap<AtomId, Node>,
    chunks: BTreeMap<ChunkId, Chunk>,
    next_atom: usize,
    next_chunk: usize,
    gensym_counters: HashMap<String, usize>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chunk(&mut self, name: &str, color: Color, display: DisplayStyle) -> ChunkId {
        let id = ChunkId(self.next_chunk);
        self.next_chunk += 1;
        self.chunks.insert(
            id,
            Chunk {
                name: name.to_string(),
                color,
                display,
                atoms: Vec::new(),
            },
        );
        id
    }

    /// Adds an atom to an existing chunk and returns its handle.
    pub fn add_atom(&mut self, chunk: ChunkId, atom: Atom) -> AtomId {
        debug_assert!(self.chunks.contains_key(&chunk), "unknown {chunk}");
        let id = AtomId(self.next_atom);
        self.next_atom += 1;
        if let Some(c) = self.chunks.get_mut(&chunk) {
            c.atoms.push(id);
        }
        self.nodes.insert(
            id,
            Node {
                atom,
                chunk,
                bonds: Vec::new(),
            },
        );
        id
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.nodes.get(&id).map(|n| &n.atom)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.nodes.get_mut(&id).map(|n| &mut n.atom)
    }

    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.nodes.iter().map(|(id, n)| (*id, &n.atom))
    }

    pub fn atom_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of atoms that are not open-valence placeholders.
    pub fn real_atom_count(&self) -> usize {
        self.nodes.values().filter(|n| !n.atom.is_singlet()).count()
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        self.chunks.get_mut(&id)
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> {
        self.chunks.iter().map(|(id, c)| (*id, c))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_of(&self, id: AtomId) -> Option<ChunkId> {
        self.nodes.get(&id).map(|n| n.chunk)
    }

    /// Bonds two atoms. Returns `false` if either is missing, they are the same atom, or the
    /// bond already exists.
    ///
    /// `direction` is relative to `a → b`.
    pub fn bond(&mut self, a: AtomId, b: AtomId, direction: i8) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) || self.is_bonded(a, b) {
            return false;
        }
        if let Some(n) = self.nodes.get_mut(&a) {
            n.bonds.push((b, direction));
        }
        if let Some(n) = self.nodes.get_mut(&b) {
            n.bonds.push((a, -direction));
        }
        true
    }

    pub fn unbond(&mut self, a: AtomId, b: AtomId) -> bool {
        let mut removed = false;
        if let Some(n) = self.nodes.get_mut(&a) {
            let before = n.bonds.len();
            n.bonds.retain(|(other, _)| *other != b);
            removed = n.bonds.len() != before;
        }
        if let Some(n) = self.nodes.get_mut(&b) {
            n.bonds.retain(|(other, _)| *other != a);
        }
        removed
    }

    pub fn is_bonded(&self, a: AtomId, b: AtomId) -> bool {
        self.bond_direction(a, b).is_some()
    }

    /// Direction of the bond `a → b`, or `None` if the atoms are not bonded.
    pub fn bond_direction(&self, a: AtomId, b: AtomId) -> Option<i8> {
        self.nodes
            .get(&a)?
            .bonds
            .iter()
            .find(|(other, _)| *other == b)
            .map(|(_, d)| *d)
    }

    /// Overwrites the direction of an existing bond, expressed relative to `a → b`.
    pub fn set_bond_direction(&mut self, a: AtomId, b: AtomId, direction: i8) -> bool {
        if !self.is_bonded(a, b) {
            return false;
        }
        for (from, to, d) in [(a, b, direction), (b, a, -direction)] {
            if let Some(n) = self.nodes.get_mut(&from) {
                for entry in n.bonds.iter_mut().filter(|(other, _)| *other == to) {
                    entry.1 = d;
                }
            }
        }
        true
    }

    /// Neighbors of `id` together with the direction of each bond walked away from `id`.
    pub fn neighbors(&self, id: AtomId) -> impl Iterator<Item = (AtomId, i8)> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.bonds.iter().copied())
    }

    /// Real (non-placeholder) neighbors of `id`.
    pub fn real_neighbors(&self, id: AtomId) -> impl Iterator<Item = (AtomId, i8)> + '_ {
        self.neighbors(id)
            .filter(|(other, _)| self.atom(*other).is_some_and(|a| !a.is_singlet()))
    }

    /// Placeholders anchored on `id`, with the direction of each anchor → placeholder bond.
    pub fn singlets_of(&self, id: AtomId) -> Vec<(AtomId, i8)> {
        self.neighbors(id)
            .filter(|(other, _)| self.atom(*other).is_some_and(|a| a.is_singlet()))
            .collect()
    }

    /// Every bond exactly once, canonicalized.
    pub fn bonds(&self) -> Vec<Bond> {
        self.nodes
            .iter()
            .flat_map(|(id, n)| {
                n.bonds
                    .iter()
                    .filter(move |(other, _)| id < other)
                    .map(move |(other, d)| Bond::new(*id, *other, *d))
            })
            .collect()
    }

    pub fn bond_count(&self) -> usize {
        self.nodes.values().map(|n| n.bonds.len()).sum::<usize>() / 2
    }

    /// Removes an atom, its bonds, and any placeholders that were anchored only on it.
    ///
    /// Returns the removed atom, or `None` if it no longer exists.
    pub fn remove_atom(&mut self, id: AtomId) -> Option<Atom> {
        let node = self.nodes.remove(&id)?;
        self.detach_from_chunk(id, node.chunk);

        for (other, _) in &node.bonds {
            let orphaned = match self.nodes.get_mut(other) {
                Some(n) => {
                    n.bonds.retain(|(o, _)| *o != id);
                    n.atom.is_singlet() && n.bonds.is_empty()
                }
                None => false,
            };
            if orphaned {
                if let Some(n) = self.nodes.remove(other) {
                    self.detach_from_chunk(*other, n.chunk);
                }
            }
        }
        Some(node.atom)
    }

    /// Deletes an atom the way an editor does: each surviving real neighbor receives an
    /// open-valence placeholder halfway along the broken bond, carrying the bond's direction.
    ///
    /// Returns the removed atom, or `None` if it no longer exists.
    pub fn kill(&mut self, id: AtomId) -> Option<Atom> {
        let pos = self.atom(id)?.pos;
        let survivors: Vec<(AtomId, i8)> = self.real_neighbors(id).collect();

        let removed = self.remove_atom(id);
        for (neighbor, direction) in survivors {
            let (Some(anchor), Some(chunk)) = (self.atom(neighbor), self.chunk_of(neighbor)) else {
                continue;
            };
            let midpoint = nalgebra::center(&anchor.pos, &pos);
            let singlet = self.add_atom(chunk, Atom::singlet(midpoint));
            self.bond(neighbor, singlet, -direction);
        }
        removed
    }

    /// Creates a chunk from existing atoms, moving them out of their current chunks.
    ///
    /// Chunks left empty by the move are dropped.
    pub fn make_chunk(
        &mut self,
        name: &str,
        color: Color,
        display: DisplayStyle,
        atoms: &[AtomId],
    ) -> ChunkId {
        let chunk = self.add_chunk(name, color, display);
        for id in atoms {
            self.move_to_chunk(*id, chunk);
        }
        chunk
    }

    /// Moves one atom into `chunk`, preserving the target's insertion order.
    pub fn move_to_chunk(&mut self, id: AtomId, chunk: ChunkId) -> bool {
        if !self.chunks.contains_key(&chunk) {
            return false;
        }
        let Some(previous) = self.nodes.get(&id).map(|n| n.chunk) else {
            return false;
        };
        if previous == chunk {
            return true;
        }
        self.detach_from_chunk(id, previous);
        if let Some(n) = self.nodes.get_mut(&id) {
            n.chunk = chunk;
        }
        if let Some(c) = self.chunks.get_mut(&chunk) {
            c.atoms.push(id);
        }
        true
    }

    /// Applies `f` to every listed atom that still exists.
    pub fn update_atoms<F>(&mut self, ids: &[AtomId], mut f: F)
    where
        F: FnMut(&mut Atom),
    {
        for id in ids {
            if let Some(n) = self.nodes.get_mut(id) {
                f(&mut n.atom);
            }
        }
    }

    /// Positions of the listed atoms that still exist.
    pub fn positions(&self, ids: &[AtomId]) -> Vec<Point> {
        ids.iter().filter_map(|id| self.atom(*id)).map(|a| a.pos).collect()
    }

    /// Returns `prefix` followed by a counter unique within this assembly.
    pub fn gensym(&mut self, prefix: &str) -> String {
        let counter = self.gensym_counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}{counter}")
    }

    fn detach_from_chunk(&mut self, id: AtomId, chunk: ChunkId) {
        let now_empty = match self.chunks.get_mut(&chunk) {
            Some(c) => {
                c.atoms.retain(|a| *a != id);
                c.atoms.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.chunks.remove(&chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::AtomKind;

    fn chain_of_three() -> (Assembly, ChunkId, [AtomId; 3]) {
        let mut asm = Assembly::new();
        let chunk = asm.add_chunk("Strand", Color::BLUE, DisplayStyle::Default);
        let a = asm.add_atom(chunk, Atom::new("A", AtomKind::Ss3, Point::new(0.0, 0.0, 0.0)));
        let b = asm.add_atom(chunk, Atom::new("B", AtomKind::Ss3, Point::new(0.0, 0.0, 4.0)));
        let c = asm.add_atom(chunk, Atom::new("C", AtomKind::Ss3, Point::new(0.0, 0.0, 8.0)));
        asm.bond(a, b, 1);
        asm.bond(b, c, 1);
        (asm, chunk, [a, b, c])
    }

    #[test]
    fn bond_new_canonicalizes_and_flips_direction() {
        let low = AtomId(1);
        let high = AtomId(5);
        let bond = Bond::new(high, low, 1);
        assert_eq!(bond.a1, low);
        assert_eq!(bond.a2, high);
        assert_eq!(bond.direction, -1);
        assert_eq!(bond.direction_from(high), 1);
    }

    #[test]
    fn bond_records_direction_on_both_ends() {
        let (asm, _, [a, b, _]) = chain_of_three();
        assert_eq!(asm.bond_direction(a, b), Some(1));
        assert_eq!(asm.bond_direction(b, a), Some(-1));
        assert_eq!(asm.bond_count(), 2);
    }

    #[test]
    fn bond_rejects_duplicates_and_self_bonds() {
        let (mut asm, _, [a, b, _]) = chain_of_three();
        assert!(!asm.bond(a, b, 1));
        assert!(!asm.bond(a, a, 0));
        assert_eq!(asm.bond_count(), 2);
    }

    #[test]
    fn set_bond_direction_updates_both_sides() {
        let (mut asm, _, [a, b, _]) = chain_of_three();
        assert!(asm.set_bond_direction(b, a, 1));
        assert_eq!(asm.bond_direction(a, b), Some(-1));
    }

    #[test]
    fn kill_leaves_directed_placeholders_on_neighbors() {
        let (mut asm, _, [a, b, c]) = chain_of_three();
        assert!(asm.kill(b).is_some());

        let on_a = asm.singlets_of(a);
        assert_eq!(on_a.len(), 1);
        assert_eq!(on_a[0].1, 1);
        let pos = asm.atom(on_a[0].0).map(|s| s.pos);
        assert_eq!(pos, Some(Point::new(0.0, 0.0, 2.0)));

        let on_c = asm.singlets_of(c);
        assert_eq!(on_c.len(), 1);
        assert_eq!(on_c[0].1, -1);
        assert!(!asm.contains(b));
    }

    #[test]
    fn kill_of_missing_atom_reports_none() {
        let (mut asm, _, [_, b, _]) = chain_of_three();
        asm.remove_atom(b);
        assert!(asm.kill(b).is_none());
    }

    #[test]
    fn remove_atom_drops_orphaned_placeholders() {
        let (mut asm, chunk, [a, _, _]) = chain_of_three();
        let s = asm.add_atom(chunk, Atom::singlet(Point::new(0.0, 0.0, -2.0)));
        asm.bond(a, s, -1);

        asm.remove_atom(a);
        assert!(!asm.contains(s));
        assert_eq!(asm.atom_count(), 2);
    }

    #[test]
    fn make_chunk_moves_atoms_and_prunes_empty_chunks() {
        let (mut asm, original, ids) = chain_of_three();
        let moved = asm.make_chunk("Moved", Color::DARK_RED, DisplayStyle::Tubes, &ids);

        assert!(asm.chunk(original).is_none());
        assert_eq!(asm.chunk(moved).map(|c| c.atoms().to_vec()), Some(ids.to_vec()));
        assert_eq!(asm.chunk_of(ids[1]), Some(moved));
        assert_eq!(asm.chunk_count(), 1);
    }

    #[test]
    fn gensym_counts_per_prefix() {
        let mut asm = Assembly::new();
        assert_eq!(asm.gensym("Strand"), "Strand1");
        assert_eq!(asm.gensym("Strand"), "Strand2");
        assert_eq!(asm.gensym("Axis"), "Axis1");
    }

    #[test]
    fn bonds_lists_each_bond_once() {
        let (asm, _, [a, b, c]) = chain_of_three();
        let bonds = asm.bonds();
        assert_eq!(bonds.len(), 2);
        assert!(bonds.contains(&Bond::new(a, b, 1)));
        assert!(bonds.contains(&Bond::new(c, b, -1)));
    }
}
