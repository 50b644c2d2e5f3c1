//! Bond formation between neighboring pieces of a duplex.
//!
//! Every placed fragment carries open-valence placeholders where it expects a neighbor. Two
//! pieces fuse where a placeholder of one lands within tolerance of a compatible placeholder
//! of the other (or of a terminal axis atom): both placeholders are dropped and their anchors
//! are bonded directly, inheriting the placeholder's 5'→3' direction.

use super::error::Warning;
use crate::model::assembly::{Assembly, AtomId};
use crate::model::types::Role;
use std::collections::{BTreeSet, HashSet};

/// Default capture radius for matching placeholders, in ångströms.
pub const DEFAULT_TOLERANCE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Site {
    Open {
        anchor: AtomId,
        singlet: AtomId,
        direction: i8,
        on_axis: bool,
    },
    Terminal {
        atom: AtomId,
    },
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    left: usize,
    right: usize,
    distance: f64,
}

/// Totals from fusing a whole chain of fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusionSummary {
    /// Number of [`fuse`] invocations, one per adjacent pair.
    pub calls: usize,
    pub bonds: usize,
    pub warnings: Vec<Warning>,
}

/// Fuses the open sites of `left` with those of `right`.
///
/// Candidate pairs are taken closest first; each site bonds at most once, and a pair whose
/// anchors are already bonded is skipped. Placeholders in either list are ignored directly,
/// they are reached through their anchors.
///
/// # Arguments
///
/// * `assembly` - Graph holding both pieces.
/// * `left` - Atoms of the first piece.
/// * `right` - Atoms of the second piece.
/// * `tolerance` - Maximum separation, in ångströms, between matching sites.
///
/// # Returns
///
/// The number of bonds created.
pub fn fuse(assembly: &mut Assembly, left: &[AtomId], right: &[AtomId], tolerance: f64) -> usize {
    let left_sites = open_sites(assembly, left);
    let right_sites = open_sites(assembly, right);
    fuse_sites(assembly, &left_sites, &right_sites, tolerance).len()
}

/// Fuses each fragment with the next one in order.
///
/// Every link class (the axis and each strand direction) that both sides of a pair offer
/// must form at least one bond. A pair that leaves any of them unjoined is reported as
/// [`Warning::PartialFusion`]; the chain is left with a gap there.
pub fn fuse_adjacent(
    assembly: &mut Assembly,
    fragments: &[&[AtomId]],
    tolerance: f64,
) -> FusionSummary {
    let mut summary = FusionSummary::default();
    for (i, pair) in fragments.windows(2).enumerate() {
        let left_sites = open_sites(assembly, pair[0]);
        let right_sites = open_sites(assembly, pair[1]);
        let expected = expected_links(&left_sites, &right_sites);
        let formed = fuse_sites(assembly, &left_sites, &right_sites, tolerance);
        summary.calls += 1;
        summary.bonds += formed.len();

        let missing: Vec<Link> = expected
            .into_iter()
            .filter(|link| !formed.contains(link))
            .collect();
        if formed.is_empty() || !missing.is_empty() {
            let pair_name = format!("base pairs {} and {}", i, i + 1);
            let join = if formed.is_empty() {
                pair_name
            } else {
                let rails: Vec<&str> = missing.iter().map(Link::name).collect();
                format!("the {} of {}", rails.join(" and "), pair_name)
            };
            let warning = Warning::PartialFusion { join };
            log::warn!("{}", warning);
            summary.warnings.push(warning);
        }
    }
    summary
}

/// Rail a fused bond continues, seen from the left piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Link {
    Axis,
    Strand(i8),
}

impl Link {
    fn of(site: &Site) -> Self {
        match *site {
            Site::Open { on_axis: true, .. } | Site::Terminal { .. } => Link::Axis,
            Site::Open { direction, .. } => Link::Strand(direction),
        }
    }

    fn complement(&self) -> Self {
        match *self {
            Link::Axis => Link::Axis,
            Link::Strand(direction) => Link::Strand(-direction),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Link::Axis => "axis",
            Link::Strand(d) if *d > 0 => "5'→3' strand",
            Link::Strand(d) if *d < 0 => "3'→5' strand",
            Link::Strand(_) => "undirected strand",
        }
    }
}

/// Link classes offered by `left` that `right` can complete.
fn expected_links(left: &[Site], right: &[Site]) -> BTreeSet<Link> {
    let offered: BTreeSet<Link> = right.iter().map(Link::of).collect();
    left.iter()
        .map(Link::of)
        .filter(|link| offered.contains(&link.complement()))
        .collect()
}

/// Bonds the closest compatible site pairs and returns the link class of each new bond.
fn fuse_sites(
    assembly: &mut Assembly,
    left_sites: &[Site],
    right_sites: &[Site],
    tolerance: f64,
) -> Vec<Link> {
    let mut candidates = Vec::new();
    for (i, l) in left_sites.iter().enumerate() {
        for (j, r) in right_sites.iter().enumerate() {
            if let Some(distance) = match_distance(assembly, l, r) {
                if distance <= tolerance {
                    candidates.push(Candidate {
                        left: i,
                        right: j,
                        distance,
                    });
                }
            }
        }
    }
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut used_left = HashSet::new();
    let mut used_right = HashSet::new();
    let mut formed = Vec::new();
    for candidate in candidates {
        if used_left.contains(&candidate.left) || used_right.contains(&candidate.right) {
            continue;
        }
        let (left, right) = (left_sites[candidate.left], right_sites[candidate.right]);
        if join(assembly, left, right) {
            used_left.insert(candidate.left);
            used_right.insert(candidate.right);
            formed.push(Link::of(&left));
        }
    }

    log::debug!(
        "fused {} bond(s) between {} and {} open sites (tolerance {:.2} Å)",
        formed.len(),
        left_sites.len(),
        right_sites.len(),
        tolerance
    );
    formed
}

fn open_sites(assembly: &Assembly, atoms: &[AtomId]) -> Vec<Site> {
    let mut sites = Vec::new();
    for &id in atoms {
        let Some(atom) = assembly.atom(id) else {
            continue;
        };
        if atom.is_singlet() {
            continue;
        }
        let on_axis = atom.role() == Role::AxisPoint;
        for (singlet, direction) in assembly.singlets_of(id) {
            sites.push(Site::Open {
                anchor: id,
                singlet,
                direction,
                on_axis,
            });
        }
        if atom.kind.is_terminal_axis() {
            sites.push(Site::Terminal { atom: id });
        }
    }
    sites
}

fn match_distance(assembly: &Assembly, left: &Site, right: &Site) -> Option<f64> {
    let distance = |a: AtomId, b: AtomId| Some(assembly.atom(a)?.distance(assembly.atom(b)?));
    match (*left, *right) {
        (
            Site::Open {
                singlet: s1,
                direction: d1,
                on_axis: axis1,
                ..
            },
            Site::Open {
                singlet: s2,
                direction: d2,
                on_axis: axis2,
                ..
            },
        ) if axis1 == axis2 && d1 == -d2 => distance(s1, s2),
        (
            Site::Open {
                anchor,
                singlet,
                on_axis: true,
                ..
            },
            Site::Terminal { atom },
        )
        | (
            Site::Terminal { atom },
            Site::Open {
                anchor,
                singlet,
                on_axis: true,
                ..
            },
        ) if anchor != atom => distance(singlet, atom),
        _ => None,
    }
}

fn join(assembly: &mut Assembly, left: Site, right: Site) -> bool {
    match (left, right) {
        (
            Site::Open {
                anchor: a1,
                singlet: s1,
                direction,
                ..
            },
            Site::Open {
                anchor: a2,
                singlet: s2,
                ..
            },
        ) => {
            if assembly.is_bonded(a1, a2) || !assembly.contains(s1) || !assembly.contains(s2) {
                return false;
            }
            assembly.remove_atom(s1);
            assembly.remove_atom(s2);
            assembly.bond(a1, a2, direction)
        }
        (
            Site::Open {
                anchor,
                singlet,
                direction,
                ..
            },
            Site::Terminal { atom },
        )
        | (
            Site::Terminal { atom },
            Site::Open {
                anchor,
                singlet,
                direction,
                ..
            },
        ) => {
            if assembly.is_bonded(anchor, atom) || !assembly.contains(singlet) {
                return false;
            }
            assembly.remove_atom(singlet);
            if !assembly.bond(anchor, atom, direction) {
                return false;
            }
            if let Some(terminal) = assembly.atom_mut(atom) {
                terminal.kind = terminal.kind.interior();
            }
            true
        }
        (Site::Terminal { .. }, Site::Terminal { .. }) => false,
    }
}
