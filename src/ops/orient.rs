//! Re-posing a canonical-pose stack into world space.
//!
//! Orientation happens in two stages. Axis alignment rotates the canonical axis (`−Z`) onto
//! the requested endpoint direction and translates base pair 0 onto the first endpoint.
//! Afterwards a rotation about the new axis fixes the remaining degree of freedom: for a fresh
//! duplex the first strand is turned toward the viewing plane, and for an extension the new
//! segment is turned to match the neighbor it will be spliced onto.

use super::transform::Transform;
use crate::geometry::{Quat, Vector, angle_between, normalize, vlen};
use crate::model::assembly::{Assembly, AtomId};
use crate::model::types::Point;

/// Canonical helix axis of a placed stack.
pub fn canonical_axis() -> Vector {
    Vector::new(0.0, 0.0, -1.0)
}

/// Rotates the canonical axis onto `b` and moves base pair 0 onto `end1`.
///
/// Each atom is mapped through `p ↦ R·p + b·½·rise·(n−1) + end1`, which is the same as turning
/// every fragment about its own centroid and then shifting it by `R·c − c + offset + end1`.
///
/// # Arguments
///
/// * `assembly` - Graph holding the stack.
/// * `atoms` - Every atom of the stack, placeholders included.
/// * `rise` - Axial spacing used during placement.
/// * `count` - Number of base pairs placed.
/// * `end1` - World position for the axis of base pair 0.
/// * `b` - Unit direction from base pair 0 toward the last base pair.
///
/// # Returns
///
/// The rotation that was applied.
pub fn align_axis(
    assembly: &mut Assembly,
    atoms: &[AtomId],
    rise: f64,
    count: usize,
    end1: &Point,
    b: &Vector,
) -> Quat {
    let a = canonical_axis();
    let theta = angle_between(&a, b);
    let rotation = if theta == 0.0 || theta == 180.0 {
        Quat::from_axis_angle(&Vector::y(), theta.to_radians())
    } else {
        Quat::rotation_between(&a, b)
    };

    let offset = b * (0.5 * rise * (count as f64 - 1.0)) + end1.coords;
    Transform::rotate_translate(assembly, atoms, &rotation, &offset);
    log::debug!("aligned helix axis: {:.2}° from canonical", theta);
    rotation
}

/// Turns a freshly aligned duplex about its axis so the first strand faces the viewer.
///
/// The desired axis→strand vector for base pair 0 is `(−line_of_sight) × b`, scaled to the
/// current one. The rotation angle is the angle between the two, negated when the current
/// vector points away from the viewer (`c · line_of_sight < 0`). This sign rule is exact when
/// the line of sight is perpendicular to the axis and can pick the mirrored solution for
/// oblique views.
///
/// # Returns
///
/// The signed angle in radians that was applied about `b`.
pub fn refine_in_plane(
    assembly: &mut Assembly,
    atoms: &[AtomId],
    axis_reference: AtomId,
    strand_reference: AtomId,
    b: &Vector,
    line_of_sight: &Vector,
    pivot: &Point,
) -> f64 {
    let (Some(axis), Some(strand)) = (
        assembly.atom(axis_reference),
        assembly.atom(strand_reference),
    ) else {
        return 0.0;
    };
    let current = strand.pos - axis.pos;
    let desired = normalize(&(-line_of_sight).cross(b)) * vlen(&current);

    let q = Quat::rotation_between(&current, &desired);
    let angle = if current.dot(line_of_sight) < 0.0 {
        -q.angle()
    } else {
        q.angle()
    };

    rotate_about_axis(assembly, atoms, b, angle, pivot);
    angle
}

/// Turns a new segment about `b` so its first rung's axis→strand vector matches the
/// neighbor's.
///
/// # Arguments
///
/// * `current` - Axis→strand vector of the new segment's first rung.
/// * `target` - Axis→strand vector of the existing boundary rung.
///
/// # Returns
///
/// The signed angle in radians that was applied about `b`.
pub fn match_neighbor_frame(
    assembly: &mut Assembly,
    atoms: &[AtomId],
    current: &Vector,
    target: &Vector,
    b: &Vector,
    pivot: &Point,
) -> f64 {
    let q = Quat::rotation_between(current, target);
    let angle = if current.dot(&target.cross(b)) < 0.0 {
        -q.angle()
    } else {
        q.angle()
    };

    rotate_about_axis(assembly, atoms, b, angle, pivot);
    log::debug!("matched neighbor frame: {:.2}° about axis", angle.to_degrees());
    angle
}

fn rotate_about_axis(
    assembly: &mut Assembly,
    atoms: &[AtomId],
    b: &Vector,
    angle: f64,
    pivot: &Point,
) {
    if angle != 0.0 {
        let rotation = Quat::from_axis_angle(b, angle);
        Transform::rotate_about(assembly, atoms, &rotation, pivot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::types::{AtomKind, Color, DisplayStyle};
    use std::f64::consts::PI;

    /// Two canonical-pose rungs: axis at z = ±1.7, strand along +x.
    fn canonical_pair() -> (Assembly, Vec<AtomId>) {
        let mut asm = Assembly::new();
        let chunk = asm.add_chunk("work", Color::AXIS_GRAY, DisplayStyle::Default);
        let ids = vec![
            asm.add_atom(chunk, Atom::new("Ax", AtomKind::Ax3, Point::new(0.0, 0.0, 1.7))),
            asm.add_atom(chunk, Atom::new("Ssa", AtomKind::Ss3, Point::new(6.0, 0.0, 1.7))),
            asm.add_atom(chunk, Atom::new("Ax", AtomKind::Ax3, Point::new(0.0, 0.0, -1.7))),
        ];
        (asm, ids)
    }

    fn pos(asm: &Assembly, id: AtomId) -> Point {
        asm.atom(id).map(|a| a.pos).unwrap_or_else(Point::origin)
    }

    #[test]
    fn align_axis_puts_first_rung_on_end1() {
        let (mut asm, ids) = canonical_pair();
        let end1 = Point::new(1.0, 2.0, 3.0);
        let b = normalize(&Vector::new(1.0, 1.0, 0.0));
        align_axis(&mut asm, &ids, 3.4, 2, &end1, &b);

        assert!((pos(&asm, ids[0]) - end1).norm() < 1e-9);
        let along = pos(&asm, ids[2]) - pos(&asm, ids[0]);
        assert!((along - b * 3.4).norm() < 1e-9);
    }

    #[test]
    fn align_axis_handles_parallel_and_antiparallel_directions() {
        for b in [Vector::new(0.0, 0.0, -1.0), Vector::new(0.0, 0.0, 1.0)] {
            let (mut asm, ids) = canonical_pair();
            align_axis(&mut asm, &ids, 3.4, 2, &Point::origin(), &b);
            let along = pos(&asm, ids[2]) - pos(&asm, ids[0]);
            assert!((along - b * 3.4).norm() < 1e-9, "direction {b:?}");
        }
    }

    #[test]
    fn refine_in_plane_turns_strand_toward_viewer_plane() {
        let (mut asm, ids) = canonical_pair();
        let b = Vector::x();
        align_axis(&mut asm, &ids, 3.4, 2, &Point::origin(), &b);
        let line_of_sight = Vector::new(0.0, 0.0, -1.0);

        refine_in_plane(&mut asm, &ids, ids[0], ids[1], &b, &line_of_sight, &Point::origin());

        let strand = pos(&asm, ids[1]) - pos(&asm, ids[0]);
        let desired = normalize(&(-line_of_sight).cross(&b)) * 6.0;
        assert!((strand - desired).norm() < 1e-9, "got {strand:?}");
        assert!((pos(&asm, ids[0]) - Point::origin()).norm() < 1e-9);
    }

    /// The sign rule compares the strand vector with the line of sight; for views that are
    /// not perpendicular to the axis it can land on the mirrored orientation. This pins the
    /// exact rule rather than the geometric ideal, so a change here is a behavior change.
    #[test]
    fn refine_in_plane_sign_rule_is_fragile_for_oblique_views() {
        let b = Vector::x();
        let strand_toward_viewer = Vector::new(0.0, 0.0, 6.0);
        let line_of_sight = Vector::new(0.0, 0.0, -1.0);
        let desired = normalize(&(-line_of_sight).cross(&b));
        let q = Quat::rotation_between(&strand_toward_viewer, &desired);
        assert!(strand_toward_viewer.dot(&line_of_sight) < 0.0);
        assert!((q.angle() - PI / 2.0).abs() < 1e-9);

        let mut asm = Assembly::new();
        let chunk = asm.add_chunk("work", Color::AXIS_GRAY, DisplayStyle::Default);
        let ax = asm.add_atom(chunk, Atom::new("Ax", AtomKind::Ax3, Point::origin()));
        let strand = Atom::new("Ssa", AtomKind::Ss3, Point::from(strand_toward_viewer));
        let s = asm.add_atom(chunk, strand);
        let origin = Point::origin();
        let angle = refine_in_plane(&mut asm, &[ax, s], ax, s, &b, &line_of_sight, &origin);

        assert!((angle + PI / 2.0).abs() < 1e-9);
        let strand = pos(&asm, s).coords;
        assert!((normalize(&strand) - desired).norm() < 1e-9);
    }

    #[test]
    fn refine_in_plane_is_noop_when_view_is_along_axis() {
        let (mut asm, ids) = canonical_pair();
        let before = pos(&asm, ids[1]);
        let angle = refine_in_plane(
            &mut asm,
            &ids,
            ids[0],
            ids[1],
            &Vector::new(0.0, 0.0, -1.0),
            &Vector::new(0.0, 0.0, -1.0),
            &Point::origin(),
        );
        assert_eq!(angle, 0.0);
        assert_eq!(pos(&asm, ids[1]), before);
    }

    #[test]
    fn match_neighbor_frame_rotates_onto_target_both_ways() {
        let targets = [
            Vector::new(0.0, 5.0, 0.0),
            Vector::new(0.0, -5.0, 0.0),
            Vector::new(-5.0, 0.1, 0.0),
        ];
        for target in targets {
            let mut asm = Assembly::new();
            let chunk = asm.add_chunk("work", Color::AXIS_GRAY, DisplayStyle::Default);
            let start = Point::new(5.0, 0.0, 0.0);
            let s = asm.add_atom(chunk, Atom::new("Ssa", AtomKind::Ss3, start));
            let (current, b, pivot) = (start.coords, Vector::z(), Point::origin());
            match_neighbor_frame(&mut asm, &[s], &current, &target, &b, &pivot);
            let got = pos(&asm, s).coords;
            assert!(
                (normalize(&got) - normalize(&target)).norm() < 1e-9,
                "target {target:?} got {got:?}"
            );
        }
    }
}
