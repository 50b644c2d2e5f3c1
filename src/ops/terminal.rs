//! End-of-duplex bookkeeping after fusion.

use super::error::Warning;
use crate::model::assembly::{Assembly, AtomId};
use crate::model::ladder::axis_neighbors;
use crate::model::types::{AtomKind, ModelTier, Point};

/// Finishes the ends of a freshly fused duplex for its model tier.
///
/// # Returns
///
/// Any warnings about strands that did not come out properly capped.
pub fn finish(assembly: &mut Assembly, model: ModelTier, atoms: &[AtomId]) -> Vec<Warning> {
    match model {
        ModelTier::Pam3 => {
            let ends = mark_pam3_ends(assembly, atoms);
            log::debug!("marked {} PAM3 axis end(s)", ends.len());
            Vec::new()
        }
        ModelTier::Pam5 => direct_pam5_caps(assembly, atoms).into_iter().collect(),
    }
}

/// Turns every PAM3 axis atom with at most one axis neighbor into a terminal axis atom.
///
/// # Returns
///
/// The atoms that were converted.
pub fn mark_pam3_ends(assembly: &mut Assembly, atoms: &[AtomId]) -> Vec<AtomId> {
    let ends: Vec<AtomId> = atoms
        .iter()
        .copied()
        .filter(|id| assembly.atom(*id).is_some_and(|a| a.kind == AtomKind::Ax3))
        .filter(|id| axis_neighbors(assembly, *id).len() <= 1)
        .collect();
    for &id in &ends {
        make_terminal(assembly, id);
    }
    ends
}

/// Marks an axis atom as a duplex end and drops its dangling placeholders.
pub fn make_terminal(assembly: &mut Assembly, id: AtomId) {
    if let Some(atom) = assembly.atom_mut(id) {
        atom.kind = atom.kind.terminal();
    }
    for (singlet, _) in assembly.singlets_of(id) {
        assembly.remove_atom(singlet);
    }
}

/// Gives every PAM5 cap bond its 5'→3' direction and checks that both strands are capped.
///
/// `Pe5 → Ss5` and `Ss5 → Sh5` are set to `+1`.
///
/// # Returns
///
/// [`Warning::UnterminatedStrand`] unless exactly two `Pe5` and two `Sh5` caps were found.
pub fn direct_pam5_caps(assembly: &mut Assembly, atoms: &[AtomId]) -> Option<Warning> {
    let mut five_prime = 0;
    let mut three_prime = 0;

    for &id in atoms {
        let Some(kind) = assembly.atom(id).map(|a| a.kind) else {
            continue;
        };
        let sugars: Vec<AtomId> = assembly
            .real_neighbors(id)
            .map(|(other, _)| other)
            .filter(|other| assembly.atom(*other).is_some_and(|a| a.kind == AtomKind::Ss5))
            .collect();
        match kind {
            AtomKind::Pe5 => {
                five_prime += 1;
                for sugar in sugars {
                    assembly.set_bond_direction(id, sugar, 1);
                }
            }
            AtomKind::Sh5 => {
                three_prime += 1;
                for sugar in sugars {
                    assembly.set_bond_direction(sugar, id, 1);
                }
            }
            _ => {}
        }
    }

    if five_prime == 2 && three_prime == 2 {
        None
    } else {
        let warning = Warning::UnterminatedStrand {
            five_prime,
            three_prime,
        };
        log::warn!("{}", warning);
        Some(warning)
    }
}

/// Terminal axis atoms among `atoms`, the handles [`crate::ops::DuplexGenerator::modify`]
/// accepts as a boundary.
pub fn axis_ends(assembly: &Assembly, atoms: &[AtomId]) -> Vec<AtomId> {
    atoms
        .iter()
        .copied()
        .filter(|id| {
            assembly
                .atom(*id)
                .is_some_and(|a| a.kind.is_terminal_axis())
        })
        .collect()
}

/// The terminal axis atom closest to `point`.
pub fn nearest_axis_end(assembly: &Assembly, atoms: &[AtomId], point: &Point) -> Option<AtomId> {
    axis_ends(assembly, atoms).into_iter().min_by(|a, b| {
        let da = assembly.atom(*a).map_or(f64::INFINITY, |x| (x.pos - point).norm());
        let db = assembly.atom(*b).map_or(f64::INFINITY, |x| (x.pos - point).norm());
        da.total_cmp(&db)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::types::{Color, DisplayStyle};

    fn axis_chain(asm: &mut Assembly, count: usize) -> Vec<AtomId> {
        let chunk = asm.add_chunk("axis", Color::AXIS_GRAY, DisplayStyle::Default);
        let ids: Vec<AtomId> = (0..count)
            .map(|i| {
                let at = Point::new(0.0, 0.0, i as f64);
                let id = asm.add_atom(chunk, Atom::new("Ax", AtomKind::Ax3, at));
                let s = asm.add_atom(chunk, Atom::singlet(Point::new(0.0, 0.0, i as f64 + 0.5)));
                asm.bond(id, s, 0);
                id
            })
            .collect();
        for pair in ids.windows(2) {
            asm.bond(pair[0], pair[1], 0);
        }
        ids
    }

    #[test]
    fn pam3_ends_become_terminal_without_placeholders() {
        let mut asm = Assembly::new();
        let ids = axis_chain(&mut asm, 4);
        let ends = mark_pam3_ends(&mut asm, &ids);

        assert_eq!(ends, vec![ids[0], ids[3]]);
        assert_eq!(asm.atom(ids[0]).map(|a| a.kind), Some(AtomKind::Ae3));
        assert_eq!(asm.atom(ids[1]).map(|a| a.kind), Some(AtomKind::Ax3));
        assert!(asm.singlets_of(ids[3]).is_empty());
        assert_eq!(asm.singlets_of(ids[1]).len(), 1);
    }

    #[test]
    fn lone_pam3_axis_atom_is_terminal() {
        let mut asm = Assembly::new();
        let ids = axis_chain(&mut asm, 1);
        assert_eq!(mark_pam3_ends(&mut asm, &ids), ids);
        assert_eq!(axis_ends(&asm, &ids), ids);
    }

    #[test]
    fn pam5_caps_get_directed_bonds() {
        let mut asm = Assembly::new();
        let chunk = asm.add_chunk("s", Color::BLUE, DisplayStyle::Default);
        let mut ids = Vec::new();
        for _ in 0..2 {
            let pe = asm.add_atom(chunk, Atom::new("Pe", AtomKind::Pe5, Point::origin()));
            let ss = asm.add_atom(chunk, Atom::new("Ss", AtomKind::Ss5, Point::origin()));
            let sh = asm.add_atom(chunk, Atom::new("Sh", AtomKind::Sh5, Point::origin()));
            asm.bond(pe, ss, 0);
            asm.bond(sh, ss, 0);
            ids.extend([pe, ss, sh]);
        }

        assert_eq!(direct_pam5_caps(&mut asm, &ids), None);
        assert_eq!(asm.bond_direction(ids[0], ids[1]), Some(1));
        assert_eq!(asm.bond_direction(ids[1], ids[2]), Some(1));
    }

    #[test]
    fn missing_pam5_cap_is_reported() {
        let mut asm = Assembly::new();
        let chunk = asm.add_chunk("s", Color::BLUE, DisplayStyle::Default);
        let pe = asm.add_atom(chunk, Atom::new("Pe", AtomKind::Pe5, Point::origin()));
        assert_eq!(
            direct_pam5_caps(&mut asm, &[pe]),
            Some(Warning::UnterminatedStrand {
                five_prime: 1,
                three_prime: 0
            })
        );
    }

    #[test]
    fn nearest_axis_end_picks_closest() {
        let mut asm = Assembly::new();
        let ids = axis_chain(&mut asm, 5);
        mark_pam3_ends(&mut asm, &ids);
        assert_eq!(nearest_axis_end(&asm, &ids, &Point::new(0.0, 0.0, 10.0)), Some(ids[4]));
        assert_eq!(nearest_axis_end(&asm, &ids, &Point::new(0.0, 0.0, -1.0)), Some(ids[0]));
    }
}
