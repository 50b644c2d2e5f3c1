//! Truncating and extending an existing duplex at one end.
//!
//! Both directions start from the ladder read at the boundary axis atom, so rung `i` of every
//! rail is `i` steps in from the end being resized.
//!
//! Extension builds one more rung than requested. Its first rung is laid exactly over the
//! boundary rung, turned about the axis until its strand points match the existing ones, and
//! then deleted; the placeholders that deletion leaves on the second rung sit where the
//! existing boundary atoms' outward placeholders are, so ordinary fusion splices the segment
//! on.

use super::duplex::{Builder, DuplexGenerator, DuplexSpec, MIN_SPAN, ResizeReport};
use super::error::{Error, Warning};
use super::fuse::fuse;
use super::orient::match_neighbor_frame;
use super::placement::fetch_templates;
use super::regroup::clear_tags;
use super::terminal::make_terminal;
use crate::db::TemplateProvider;
use crate::geometry::{Vector, normalize, vlen};
use crate::model::assembly::{Assembly, AtomId, ChunkId};
use crate::model::ladder::{Ladder, Rail};
use crate::model::types::{Point, StrandTag};

/// Deletes the `count` rungs nearest `boundary`.
///
/// Atoms that cannot be deleted are reported and skipped. Asking for the whole duplex or
/// more leaves it untouched.
pub(super) fn truncate(
    assembly: &mut Assembly,
    boundary: AtomId,
    count: usize,
) -> Result<ResizeReport, Error> {
    let ladder = boundary_ladder(assembly, boundary)?;
    let mut report = ResizeReport::default();

    if count >= ladder.len() {
        let warning = Warning::TruncationExceedsLength {
            requested: count,
            available: ladder.len(),
        };
        log::warn!("{}", warning);
        report.new_boundary = Some(boundary);
        report.warnings.push(warning);
        return Ok(report);
    }

    report.warnings = delete_rungs(assembly, &ladder, count);

    let new_end = ladder
        .axis()
        .get(count)
        .ok_or_else(|| Error::inconsistent(format!("axis rail ends before rung {}", count)))?;
    make_terminal(assembly, new_end);

    report.removed = count;
    report.new_boundary = Some(new_end);
    log::debug!("truncated {} rung(s); new end is {}", count, new_end);
    Ok(report)
}

/// Splices `count` new rungs onto the end at `boundary`.
pub(super) fn extend<P: TemplateProvider>(
    generator: &DuplexGenerator<P>,
    assembly: &mut Assembly,
    boundary: AtomId,
    spec: &DuplexSpec,
    count: usize,
    end1: &Point,
    end2: &Point,
) -> Result<ResizeReport, Error> {
    let config = generator.config();
    let old = boundary_ladder(assembly, boundary)?;
    let [Some(x0), Some(end), Some(x1)] = old.end_base_atoms() else {
        return Err(Error::inconsistent(format!(
            "boundary rung at {} does not pair two strands",
            boundary
        )));
    };
    let end_pos = position(assembly, end)?;
    let b = growth_direction(assembly, &old, &end_pos, end1, end2)?;
    let outward = [
        outward_direction(assembly, &old.strands()[0], &b),
        outward_direction(assembly, &old.strands()[1], &b),
    ];
    let chunks = [chunk_of(assembly, x0)?, chunk_of(assembly, end)?, chunk_of(assembly, x1)?];

    let params = spec.params(count + 1);
    let templates = fetch_templates(generator.provider(), spec.form, &params)?;
    let mut builder = Builder::start(assembly, params, config);
    builder.place(assembly, &templates)?;
    builder.align(assembly, &end_pos, &b);
    builder.fuse(assembly);
    builder.finish(assembly);

    let segment = builder
        .placement
        .axis_reference
        .and_then(|axis| Ladder::from_end(assembly, axis))
        .filter(|l| l.len() == count + 1 && l.strands().len() == 2)
        .ok_or_else(|| {
            Error::inconsistent(format!("new segment does not form a {}-rung ladder", count + 1))
        })?;
    let (rail0, rail1) = match_strands(assembly, &segment, outward);
    let [Some(y), Some(y_prime)] = [
        segment.strands()[rail0].get(0),
        segment.strands()[rail1].get(0),
    ] else {
        return Err(Error::inconsistent("new segment has an empty strand rail"));
    };
    let new_axis0 = segment
        .axis()
        .get(0)
        .ok_or_else(|| Error::inconsistent("new segment has an empty axis rail"))?;

    let current = position(assembly, y)? - position(assembly, new_axis0)?;
    let target = position(assembly, x0)? - end_pos;
    let atoms = builder.atoms(assembly);
    match_neighbor_frame(assembly, &atoms, &current, &target, &b, &end_pos);

    let mut report = ResizeReport {
        added: count,
        warnings: kill_all(assembly, [new_axis0, y, y_prime]),
        ..ResizeReport::default()
    };

    let joins = [
        ("first strand", x0, segment.strands()[rail0].get(1), config.fusion_tolerance),
        ("axis", end, segment.axis().get(1), config.splice_axis_tolerance),
        ("second strand", x1, segment.strands()[rail1].get(1), config.fusion_tolerance),
    ];
    for (label, old_atom, new_atom, tolerance) in joins {
        let Some(new_atom) = new_atom else {
            continue;
        };
        report.fusion_calls += 1;
        if fuse(assembly, &[old_atom], &[new_atom], tolerance) == 0 {
            let warning = Warning::PartialFusion {
                join: format!("the {} splice at {}", label, old_atom),
            };
            log::warn!("{}", warning);
            report.warnings.push(warning);
        }
    }

    let atoms = builder.atoms(assembly);
    clear_tags(assembly, &atoms);
    adopt(assembly, &atoms, &segment, [rail0, rail1], chunks);

    report.fusion_calls += builder.fusion.calls;
    report.new_boundary = segment.axis().get(count);
    let mut warnings = builder.into_warnings();
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    log::debug!("extended by {} rung(s); new end is {:?}", count, report.new_boundary);
    Ok(report)
}

/// Deletes the first `count` rungs of `ladder`, reporting atoms that are already gone.
fn delete_rungs(assembly: &mut Assembly, ladder: &Ladder, count: usize) -> Vec<Warning> {
    let ids: Vec<AtomId> = (0..count)
        .flat_map(|index| ladder.rung(index))
        .flatten()
        .collect();
    kill_all(assembly, ids)
}

/// Best-effort deletion; each atom that no longer exists yields a warning and is skipped.
fn kill_all(assembly: &mut Assembly, ids: impl IntoIterator<Item = AtomId>) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for id in ids {
        if assembly.kill(id).is_none() {
            let warning = Warning::AtomDeletionFailed { atom: id };
            log::warn!("{}", warning);
            warnings.push(warning);
        }
    }
    warnings
}

fn boundary_ladder(assembly: &Assembly, boundary: AtomId) -> Result<Ladder, Error> {
    Ladder::from_end(assembly, boundary).ok_or_else(|| {
        Error::inconsistent(format!("atom {} is not the end of a duplex axis", boundary))
    })
}

fn position(assembly: &Assembly, id: AtomId) -> Result<Point, Error> {
    assembly
        .atom(id)
        .map(|a| a.pos)
        .ok_or_else(|| Error::inconsistent(format!("atom {} disappeared during the splice", id)))
}

fn chunk_of(assembly: &Assembly, id: AtomId) -> Result<ChunkId, Error> {
    assembly
        .chunk_of(id)
        .ok_or_else(|| Error::inconsistent(format!("atom {} belongs to no chunk", id)))
}

/// Unit vector pointing out of the duplex at the boundary rung.
///
/// Taken from the last axis step when there is one, otherwise from the endpoints: toward
/// `end2`, or away from `end1` when `end2` sits on the boundary.
fn growth_direction(
    assembly: &Assembly,
    ladder: &Ladder,
    end_pos: &Point,
    end1: &Point,
    end2: &Point,
) -> Result<Vector, Error> {
    if let Some(inner) = ladder.axis().get(1) {
        let step = end_pos - position(assembly, inner)?;
        if vlen(&step) > MIN_SPAN {
            return Ok(normalize(&step));
        }
    }
    let toward = end2 - end_pos;
    if vlen(&toward) > MIN_SPAN {
        return Ok(normalize(&toward));
    }
    let away = end_pos - end1;
    if vlen(&away) > MIN_SPAN {
        return Ok(normalize(&away));
    }
    Err(Error::invalid(
        "endpoints",
        "both endpoints coincide with the boundary, so no growth direction is defined",
    ))
}

/// 5'→3' direction of the existing strand when walked away from the duplex.
///
/// A one-rung rail has no inward step to read it from; its outward placeholder is used
/// instead, the one reaching furthest along `b`.
fn outward_direction(assembly: &Assembly, rail: &Rail, b: &Vector) -> Option<i8> {
    if let Some(direction) = rail.bond_direction(assembly) {
        return Some(-direction);
    }
    let end = rail.get(0)?;
    let origin = assembly.atom(end)?.pos;
    let reach = |singlet: AtomId| {
        assembly
            .atom(singlet)
            .map_or(f64::NEG_INFINITY, |s| (s.pos - origin).dot(b))
    };
    assembly
        .singlets_of(end)
        .into_iter()
        .filter(|(_, d)| *d != 0)
        .max_by(|(s1, _), (s2, _)| reach(*s1).total_cmp(&reach(*s2)))
        .map(|(_, d)| d)
}

/// Rails of the new segment that continue the boundary's first and second strands.
///
/// A new rail continues an existing strand when its direction away from the overlap rung
/// matches that strand's outward direction. Without a usable direction the construction tags
/// decide: the `a` rail continues the first strand.
fn match_strands(
    assembly: &Assembly,
    segment: &Ladder,
    outward: [Option<i8>; 2],
) -> (usize, usize) {
    let directions: Vec<Option<i8>> = segment
        .strands()
        .iter()
        .map(|rail| rail.bond_direction(assembly))
        .collect();
    let find = |d: Option<i8>| d.and_then(|d| directions.iter().position(|x| *x == Some(d)));

    if let Some(i) = find(outward[0]) {
        return (i, 1 - i);
    }
    if let Some(i) = find(outward[1]) {
        return (1 - i, i);
    }
    let base_a = segment
        .strands()
        .iter()
        .position(|rail| {
            rail.get(0)
                .and_then(|id| assembly.atom(id))
                .is_some_and(|a| a.tag == StrandTag::BaseA)
        })
        .unwrap_or(0);
    (base_a, 1 - base_a)
}

/// Moves the spliced segment into the chunks of the strands and axis it continues.
///
/// `chunks` holds the first strand's, the axis's, and the second strand's chunk. Placeholders
/// follow their anchors.
fn adopt(
    assembly: &mut Assembly,
    atoms: &[AtomId],
    segment: &Ladder,
    rails: [usize; 2],
    chunks: [ChunkId; 3],
) {
    let [strand1, axis, strand2] = chunks;
    let destination = |id: AtomId| {
        if segment.strands()[rails[0]].index_of(id).is_some() {
            strand1
        } else if segment.strands()[rails[1]].index_of(id).is_some() {
            strand2
        } else {
            axis
        }
    };

    let (singlets, real): (Vec<AtomId>, Vec<AtomId>) = atoms
        .iter()
        .copied()
        .partition(|id| assembly.atom(*id).is_some_and(|a| a.is_singlet()));
    for id in real {
        assembly.move_to_chunk(id, destination(id));
    }
    for id in singlets {
        let target = assembly
            .neighbors(id)
            .next()
            .and_then(|(anchor, _)| assembly.chunk_of(anchor))
            .unwrap_or(axis);
        assembly.move_to_chunk(id, target);
    }
}
