//! Sorting a finished duplex into its two strand chunks and its axis chunk.
//!
//! Classification reads each atom's construction tag through its tier's tag table. The tags
//! only exist to drive this split, so once every atom has a group they are cleared back to
//! [`StrandTag::Unassigned`]; later resizes never see stale strand markers.

use super::duplex::BuildConfig;
use super::error::Error;
use crate::model::assembly::{Assembly, AtomId, ChunkId};
use crate::model::types::{DuplexGroup, ModelTier, StrandTag};
use std::collections::HashMap;

/// Chunks holding a regrouped duplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplexGroups {
    pub strand1: ChunkId,
    pub strand2: ChunkId,
    pub axis: ChunkId,
}

/// Atom partition produced by [`classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub strand1: Vec<AtomId>,
    pub strand2: Vec<AtomId>,
    pub axis: Vec<AtomId>,
}

impl Classification {
    pub fn group(&self, group: DuplexGroup) -> &[AtomId] {
        match group {
            DuplexGroup::Strand1 => &self.strand1,
            DuplexGroup::Strand2 => &self.strand2,
            DuplexGroup::Axis => &self.axis,
        }
    }

    pub fn len(&self) -> usize {
        self.strand1.len() + self.strand2.len() + self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, group: DuplexGroup, id: AtomId) {
        match group {
            DuplexGroup::Strand1 => self.strand1.push(id),
            DuplexGroup::Strand2 => self.strand2.push(id),
            DuplexGroup::Axis => self.axis.push(id),
        }
    }
}

/// Assigns every atom in `atoms` to exactly one group.
///
/// Real atoms are listed first, in input order; placeholders follow, each in the group of the
/// atom it is anchored on. Nothing is modified.
///
/// # Errors
///
/// Returns [`Error::Classification`] for the first real atom whose kind is not part of
/// `model`'s vocabulary or whose tag its rule does not recognize.
pub fn classify(
    assembly: &Assembly,
    atoms: &[AtomId],
    model: ModelTier,
) -> Result<Classification, Error> {
    let mut classification = Classification::default();
    let mut groups: HashMap<AtomId, DuplexGroup> = HashMap::new();
    let mut singlets = Vec::new();
    for &id in atoms {
        let Some(atom) = assembly.atom(id) else {
            continue;
        };
        if atom.is_singlet() {
            singlets.push(id);
            continue;
        }
        let error = || Error::Classification {
            atom: id,
            kind: atom.kind,
            tag: atom.tag,
            model,
        };
        let rule = model.rule_for(atom.kind).ok_or_else(error)?;
        let group = rule.group_for(atom.tag).ok_or_else(error)?;
        groups.insert(id, group);
        classification.push(group, id);
    }

    for id in singlets {
        let group = assembly
            .neighbors(id)
            .find_map(|(anchor, _)| groups.get(&anchor).copied())
            .unwrap_or(DuplexGroup::Axis);
        classification.push(group, id);
    }
    Ok(classification)
}

/// Classifies `atoms`, clears their construction tags, and moves them into three new chunks.
///
/// Chunks emptied by the move, such as a working chunk, are dropped.
///
/// # Errors
///
/// Propagates [`Error::Classification`]; the assembly is untouched in that case.
pub fn regroup(
    assembly: &mut Assembly,
    atoms: &[AtomId],
    model: ModelTier,
    config: &BuildConfig,
) -> Result<DuplexGroups, Error> {
    let classification = classify(assembly, atoms, model)?;
    clear_tags(assembly, atoms);

    let [color1, color2] = config.strand_colors;
    let name1 = assembly.gensym("Strand");
    let strand1 = assembly.make_chunk(&name1, color1, config.display, &classification.strand1);
    let name2 = assembly.gensym("Strand");
    let strand2 = assembly.make_chunk(&name2, color2, config.display, &classification.strand2);
    let axis = assembly.make_chunk("Axis", config.axis_color, config.display, &classification.axis);

    log::debug!(
        "regrouped {} atoms: {} in {}, {} in {}, {} in Axis",
        classification.len(),
        classification.strand1.len(),
        name1,
        classification.strand2.len(),
        name2,
        classification.axis.len()
    );
    Ok(DuplexGroups {
        strand1,
        strand2,
        axis,
    })
}

/// Resets construction tags on every listed atom.
pub fn clear_tags(assembly: &mut Assembly, atoms: &[AtomId]) {
    assembly.update_atoms(atoms, |atom| atom.tag = StrandTag::Unassigned);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::types::{AtomKind, Color, DisplayStyle, Point};

    fn rung(asm: &mut Assembly) -> (ChunkId, Vec<AtomId>) {
        let chunk = asm.add_chunk("work", Color::AXIS_GRAY, DisplayStyle::Default);
        let ax = asm.add_atom(chunk, Atom::new("Ax", AtomKind::Ae3, Point::origin()));
        let a = asm.add_atom(
            chunk,
            Atom::new("Ssa", AtomKind::Ss3, Point::new(1.0, 0.0, 0.0)).with_tag(StrandTag::BaseA),
        );
        let b = asm.add_atom(
            chunk,
            Atom::new("Ssb", AtomKind::Ss3, Point::new(-1.0, 0.0, 0.0)).with_tag(StrandTag::BaseB),
        );
        let s = asm.add_atom(chunk, Atom::singlet(Point::new(1.0, 0.0, 1.0)));
        asm.bond(ax, a, 0);
        asm.bond(ax, b, 0);
        asm.bond(a, s, 1);
        (chunk, vec![ax, a, b, s])
    }

    #[test]
    fn classify_partitions_every_atom_once() {
        let mut asm = Assembly::new();
        let (_, ids) = rung(&mut asm);
        let c = classify(&asm, &ids, ModelTier::Pam3).expect("classification");

        assert_eq!(c.strand1, vec![ids[1], ids[3]]);
        assert_eq!(c.strand2, vec![ids[2]]);
        assert_eq!(c.axis, vec![ids[0]]);
        assert_eq!(c.len(), ids.len());
    }

    #[test]
    fn classify_rejects_tag_outside_tier_vocabulary() {
        let mut asm = Assembly::new();
        let (_, ids) = rung(&mut asm);
        if let Some(atom) = asm.atom_mut(ids[2]) {
            atom.tag = StrandTag::Strand2;
        }
        let err = classify(&asm, &ids, ModelTier::Pam3).unwrap_err();
        assert!(matches!(
            err,
            Error::Classification {
                kind: AtomKind::Ss3,
                tag: StrandTag::Strand2,
                ..
            }
        ));
    }

    #[test]
    fn classify_rejects_kind_from_other_tier() {
        let mut asm = Assembly::new();
        let (_, ids) = rung(&mut asm);
        let err = classify(&asm, &ids, ModelTier::Pam5).unwrap_err();
        assert!(matches!(err, Error::Classification { model: ModelTier::Pam5, .. }));
    }

    #[test]
    fn regroup_moves_atoms_and_clears_tags() {
        let mut asm = Assembly::new();
        let (work, ids) = rung(&mut asm);
        let groups = regroup(&mut asm, &ids, ModelTier::Pam3, &BuildConfig::default())
            .expect("regroup");

        assert!(asm.chunk(work).is_none());
        let strand1 = asm.chunk(groups.strand1).map(|c| (c.name.clone(), c.color, c.len()));
        assert_eq!(strand1, Some(("Strand1".to_string(), Color::DARK_RED, 2)));
        assert_eq!(asm.chunk(groups.strand2).map(|c| c.color), Some(Color::BLUE));
        assert_eq!(asm.chunk(groups.axis).map(|c| c.name.as_str()), Some("Axis"));
        let untagged = ids
            .iter()
            .all(|id| asm.atom(*id).is_some_and(|a| a.tag == StrandTag::Unassigned));
        assert!(untagged);
    }

    #[test]
    fn failed_regroup_leaves_tags_in_place() {
        let mut asm = Assembly::new();
        let (work, ids) = rung(&mut asm);
        if let Some(atom) = asm.atom_mut(ids[0]) {
            atom.kind = AtomKind::Gv5;
        }
        assert!(regroup(&mut asm, &ids, ModelTier::Pam3, &BuildConfig::default()).is_err());
        assert_eq!(asm.atom(ids[1]).map(|a| a.tag), Some(StrandTag::BaseA));
        assert_eq!(asm.chunk(work).map(|c| c.len()), Some(4));
    }
}
