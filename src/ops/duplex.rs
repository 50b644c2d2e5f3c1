//! Duplex construction and resizing.
//!
//! [`DuplexGenerator`] runs the whole pipeline for one call: fetch every template the count
//! requires, place the base pairs in canonical pose, orient the stack between the two
//! endpoints, fuse neighbors, finish the ends, and sort the atoms into strand and axis chunks.
//! Each call threads its own [`Builder`] through those stages, so nothing carries over between
//! calls.

use super::error::{Error, Warning};
use super::fuse::{self, FusionSummary};
use super::orient;
use super::placement::{self, HelixParams, Placement};
use super::regroup::{self, DuplexGroups};
use super::resize;
use super::terminal;
use crate::db::{EmbeddedTemplates, TemplateProvider};
use crate::geometry::{Vector, normalize, vlen};
use crate::model::assembly::{Assembly, AtomId, ChunkId};
use crate::model::fragment::Fragment;
use crate::model::types::{
    BasePairRole, Color, DisplayStyle, Form, Handedness, ModelTier, Point,
};
use std::collections::BTreeMap;

/// Endpoints closer than this (Å) do not define a helix axis.
pub(super) const MIN_SPAN: f64 = 1e-6;

/// Helix parameters for one construct or modify call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplexSpec {
    pub form: Form,
    pub model: ModelTier,
    /// Axial distance between consecutive base pairs (Å).
    pub rise: f64,
    pub bases_per_turn: f64,
    pub handedness: Handedness,
    /// Base pairs to build, or the signed change in length when resizing.
    pub count: i32,
}

impl DuplexSpec {
    /// Creates a spec using the canonical rise, twist, and handedness of `form`.
    pub fn new(form: Form, model: ModelTier, count: i32) -> Self {
        Self {
            form,
            model,
            rise: form.default_rise(),
            bases_per_turn: form.default_bases_per_turn(),
            handedness: form.handedness(),
            count,
        }
    }

    pub fn with_rise(mut self, rise: f64) -> Self {
        self.rise = rise;
        self
    }

    pub fn with_bases_per_turn(mut self, bases_per_turn: f64) -> Self {
        self.bases_per_turn = bases_per_turn;
        self
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    /// Checks that the helix geometry is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when the rise or bases per turn is not a positive
    /// finite number.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.rise.is_finite() && self.rise > 0.0) {
            return Err(Error::invalid(
                "rise",
                format!("expected a positive length, got {}", self.rise),
            ));
        }
        if !(self.bases_per_turn.is_finite() && self.bases_per_turn > 0.0) {
            return Err(Error::invalid(
                "bases_per_turn",
                format!("expected a positive count, got {}", self.bases_per_turn),
            ));
        }
        Ok(())
    }

    pub(super) fn params(&self, count: usize) -> HelixParams {
        HelixParams {
            model: self.model,
            rise: self.rise,
            bases_per_turn: self.bases_per_turn,
            handedness: self.handedness,
            count,
        }
    }
}

/// Tunables shared by every call on a [`DuplexGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Capture radius (Å) for fusing neighboring base pairs and strand splices.
    pub fusion_tolerance: f64,
    /// Capture radius (Å) for the axis splice when extending, which absorbs joint-angle error.
    pub splice_axis_tolerance: f64,
    /// Viewing direction the first strand of a new duplex is turned to face.
    pub line_of_sight: Vector,
    pub strand_colors: [Color; 2],
    pub axis_color: Color,
    pub display: DisplayStyle,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fusion_tolerance: fuse::DEFAULT_TOLERANCE,
            splice_axis_tolerance: 3.0,
            line_of_sight: Vector::new(0.0, 0.0, -1.0),
            strand_colors: [Color::DARK_RED, Color::BLUE],
            axis_color: Color::AXIS_GRAY,
            display: DisplayStyle::Default,
        }
    }
}

impl BuildConfig {
    pub fn with_line_of_sight(mut self, line_of_sight: Vector) -> Self {
        self.line_of_sight = line_of_sight;
        self
    }

    pub fn with_fusion_tolerance(mut self, tolerance: f64) -> Self {
        self.fusion_tolerance = tolerance;
        self
    }

    pub fn with_splice_axis_tolerance(mut self, tolerance: f64) -> Self {
        self.splice_axis_tolerance = tolerance;
        self
    }

    pub fn with_display(mut self, display: DisplayStyle) -> Self {
        self.display = display;
        self
    }
}

/// Outcome of [`DuplexGenerator::construct`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// `None` when zero base pairs were requested.
    pub groups: Option<DuplexGroups>,
    pub fragments_placed: usize,
    /// Template role used for each base pair.
    pub roles: Vec<BasePairRole>,
    pub fusion_calls: usize,
    pub bonds_formed: usize,
    pub warnings: Vec<Warning>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Outcome of [`DuplexGenerator::modify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResizeReport {
    pub added: usize,
    pub removed: usize,
    /// Terminal axis atom at the resized end, usable as the boundary of a further resize.
    pub new_boundary: Option<AtomId>,
    pub fusion_calls: usize,
    pub warnings: Vec<Warning>,
}

impl ResizeReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Builds and resizes duplexes from the templates of one provider.
#[derive(Debug, Clone)]
pub struct DuplexGenerator<P = EmbeddedTemplates> {
    provider: P,
    config: BuildConfig,
}

impl Default for DuplexGenerator<EmbeddedTemplates> {
    fn default() -> Self {
        Self::new(EmbeddedTemplates)
    }
}

impl<P: TemplateProvider> DuplexGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: BuildConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Builds a new duplex of `spec.count` base pairs running from `end1` toward `end2`.
    ///
    /// Base pair 0 is centered on `end1`; the others follow at `spec.rise` intervals along
    /// the endpoint direction. The first strand of base pair 0 is turned to face
    /// [`BuildConfig::line_of_sight`].
    ///
    /// # Arguments
    ///
    /// * `assembly` - Graph the duplex is added to.
    /// * `spec` - Helix parameters; `count` must not be negative.
    /// * `end1` - Axis position of base pair 0.
    /// * `end2` - Any point further along the desired axis.
    ///
    /// # Returns
    ///
    /// The new strand and axis chunks with the warnings raised along the way. A zero count
    /// returns an empty report without touching the assembly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a negative count, unusable helix geometry, or
    /// coincident endpoints; [`Error::TemplateNotFound`] or [`Error::TemplateParse`] before
    /// anything is built when a template is unavailable; and [`Error::Classification`] when
    /// the templates carry tags their tier does not know.
    pub fn construct(
        &self,
        assembly: &mut Assembly,
        spec: &DuplexSpec,
        end1: &Point,
        end2: &Point,
    ) -> Result<BuildReport, Error> {
        spec.validate()?;
        let count = usize::try_from(spec.count).map_err(|_| {
            Error::invalid(
                "count",
                format!("cannot build {} base pairs", spec.count),
            )
        })?;
        if count == 0 {
            log::info!("zero base pairs requested; nothing to build");
            return Ok(BuildReport::default());
        }
        let span = end2 - end1;
        if vlen(&span) < MIN_SPAN {
            return Err(Error::invalid(
                "endpoints",
                "end1 and end2 coincide, so they define no axis",
            ));
        }
        let b = normalize(&span);

        let params = spec.params(count);
        let templates = placement::fetch_templates(&self.provider, spec.form, &params)?;

        let mut builder = Builder::start(assembly, params, &self.config);
        builder.place(assembly, &templates)?;
        builder.align(assembly, end1, &b);
        builder.refine(assembly, end1, &b);
        builder.fuse(assembly);
        builder.finish(assembly);

        let atoms = builder.atoms(assembly);
        let groups = regroup::regroup(assembly, &atoms, spec.model, &self.config)?;

        let report = BuildReport {
            groups: Some(groups),
            fragments_placed: builder.placement.len(),
            roles: params.roles(),
            fusion_calls: builder.fusion.calls,
            bonds_formed: builder.fusion.bonds,
            warnings: builder.into_warnings(),
        };
        log::info!(
            "built {} {} {} base pairs ({} bonds fused, {} warning(s))",
            count,
            spec.form,
            spec.model,
            report.bonds_formed,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Grows or shrinks an existing duplex at `boundary` by `spec.count` base pairs.
    ///
    /// A negative count deletes that many rungs starting at the boundary. A positive count
    /// builds a new segment, turns it to match the boundary rung, and splices it on; the new
    /// atoms join the chunks of the strands and axis they continue. `end1` and `end2` give the
    /// growth direction only when the boundary rung has no axis neighbor to take it from.
    ///
    /// # Arguments
    ///
    /// * `assembly` - Graph holding the duplex.
    /// * `boundary` - Terminal axis atom at the end to resize.
    /// * `spec` - Helix parameters for new base pairs; `count` is the signed change.
    /// * `end1` - Axis point behind the boundary.
    /// * `end2` - Axis point beyond the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedModel`] for PAM5 duplexes,
    /// [`Error::StructuralInconsistency`] when `boundary` is not the end of a duplex axis, and
    /// the template errors of [`DuplexGenerator::construct`] when extending.
    pub fn modify(
        &self,
        assembly: &mut Assembly,
        boundary: AtomId,
        spec: &DuplexSpec,
        end1: &Point,
        end2: &Point,
    ) -> Result<ResizeReport, Error> {
        spec.validate()?;
        let Some(atom) = assembly.atom(boundary) else {
            return Err(Error::inconsistent(format!(
                "boundary atom {} is not part of the assembly",
                boundary
            )));
        };
        if spec.model == ModelTier::Pam5 || atom.kind.tier() == Some(ModelTier::Pam5) {
            return Err(Error::UnsupportedModel {
                model: ModelTier::Pam5,
                operation: "resize",
            });
        }

        let report = match spec.count {
            0 => ResizeReport {
                new_boundary: Some(boundary),
                ..ResizeReport::default()
            },
            delta if delta < 0 => {
                resize::truncate(assembly, boundary, delta.unsigned_abs() as usize)?
            }
            delta => {
                resize::extend(self, assembly, boundary, spec, delta as usize, end1, end2)?
            }
        };
        log::info!(
            "resized duplex at {}: +{} / -{} base pairs ({} warning(s))",
            boundary,
            report.added,
            report.removed,
            report.warnings.len()
        );
        Ok(report)
    }
}

/// Per-call state threaded through the construction stages.
pub(super) struct Builder<'a> {
    pub(super) params: HelixParams,
    config: &'a BuildConfig,
    chunk: ChunkId,
    pub(super) placement: Placement,
    pub(super) fusion: FusionSummary,
    warnings: Vec<Warning>,
}

impl<'a> Builder<'a> {
    /// Opens a working chunk for a new stack.
    pub(super) fn start(
        assembly: &mut Assembly,
        params: HelixParams,
        config: &'a BuildConfig,
    ) -> Self {
        let name = assembly.gensym("Duplex");
        let chunk = assembly.add_chunk(&name, config.axis_color, config.display);
        Self {
            params,
            config,
            chunk,
            placement: Placement::default(),
            fusion: FusionSummary::default(),
            warnings: Vec::new(),
        }
    }

    pub(super) fn place(
        &mut self,
        assembly: &mut Assembly,
        templates: &BTreeMap<BasePairRole, Fragment>,
    ) -> Result<(), Error> {
        self.placement = placement::place(assembly, self.chunk, &self.params, templates)?;
        Ok(())
    }

    pub(super) fn align(&mut self, assembly: &mut Assembly, end1: &Point, b: &Vector) {
        let atoms = self.placement.atoms();
        orient::align_axis(assembly, &atoms, self.params.rise, self.params.count, end1, b);
    }

    pub(super) fn refine(&mut self, assembly: &mut Assembly, end1: &Point, b: &Vector) {
        let (Some(axis), Some(strand)) = (
            self.placement.axis_reference,
            self.placement.strand_reference,
        ) else {
            return;
        };
        let atoms = self.placement.atoms();
        let angle = orient::refine_in_plane(
            assembly,
            &atoms,
            axis,
            strand,
            b,
            &self.config.line_of_sight,
            end1,
        );
        log::debug!("in-plane refinement: {:.2}°", angle.to_degrees());
    }

    pub(super) fn fuse(&mut self, assembly: &mut Assembly) {
        let fragments: Vec<&[AtomId]> = self
            .placement
            .fragments
            .iter()
            .map(|f| f.atoms.as_slice())
            .collect();
        self.fusion = fuse::fuse_adjacent(assembly, &fragments, self.config.fusion_tolerance);
        self.warnings.extend(self.fusion.warnings.iter().cloned());
    }

    pub(super) fn finish(&mut self, assembly: &mut Assembly) {
        let atoms = self.atoms(assembly);
        let warnings = terminal::finish(assembly, self.params.model, &atoms);
        self.warnings.extend(warnings);
    }

    /// Live atoms of the working chunk.
    pub(super) fn atoms(&self, assembly: &Assembly) -> Vec<AtomId> {
        assembly
            .chunk(self.chunk)
            .map(|c| c.atoms().to_vec())
            .unwrap_or_default()
    }

    pub(super) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DirectoryTemplates;
    use crate::model::ladder::Ladder;
    use crate::model::types::AtomKind;

    fn generator() -> DuplexGenerator {
        DuplexGenerator::default()
    }

    fn spec(model: ModelTier, count: i32) -> DuplexSpec {
        DuplexSpec::new(Form::BDna, model, count)
            .with_rise(3.38)
            .with_bases_per_turn(10.5)
    }

    fn kinds_in(asm: &Assembly, chunk: ChunkId, kind: AtomKind) -> Vec<Point> {
        asm.chunk(chunk)
            .map(|c| c.atoms().to_vec())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| asm.atom(id))
            .filter(|a| a.kind == kind || (kind == AtomKind::Ax3 && a.kind == AtomKind::Ae3))
            .map(|a| a.pos)
            .collect()
    }

    fn ladder(asm: &Assembly, axis: ChunkId) -> Ladder {
        let atoms = asm.chunk(axis).map(|c| c.atoms().to_vec()).unwrap_or_default();
        let end = terminal::axis_ends(asm, &atoms)
            .first()
            .copied()
            .expect("axis end");
        Ladder::from_end(asm, end).expect("ladder")
    }

    fn assert_full_ladder(asm: &Assembly, axis: ChunkId, count: usize) {
        let ladder = ladder(asm, axis);
        assert_eq!(ladder.len(), count);
        assert_eq!(ladder.strands().len(), 2);
        assert!(ladder.strands().iter().all(|rail| rail.len() == count));
    }

    fn build(spec: &DuplexSpec) -> (Assembly, BuildReport) {
        let mut asm = Assembly::new();
        let report = generator()
            .construct(&mut asm, spec, &Point::origin(), &Point::new(0.0, 0.0, 33.8))
            .expect("construct");
        (asm, report)
    }

    #[test]
    fn ten_base_pair_duplex_spans_nine_rises_along_z() {
        let (asm, report) = build(&spec(ModelTier::Pam3, 10));
        let groups = report.groups.expect("groups");

        let mut axis = kinds_in(&asm, groups.axis, AtomKind::Ax3);
        axis.sort_by(|a, b| a.z.total_cmp(&b.z));
        assert_eq!(axis.len(), 10);
        assert!(axis[0].coords.norm() < 1e-6);
        assert!((axis[9].z - 30.42).abs() < 1e-6);
        assert!(axis.iter().all(|p| p.x.abs() < 1e-6 && p.y.abs() < 1e-6));
        for pair in axis.windows(2) {
            assert!(((pair[1] - pair[0]).norm() - 3.38).abs() < 1e-6);
        }

        assert_eq!(kinds_in(&asm, groups.strand1, AtomKind::Ss3).len(), 10);
        assert_eq!(kinds_in(&asm, groups.strand2, AtomKind::Ss3).len(), 10);
        assert_eq!(report.fragments_placed, 10);
        assert_eq!(report.fusion_calls, 9);
        assert_eq!(report.bonds_formed, 27);
        assert!(report.is_clean(), "{:?}", report.warnings);
        assert_full_ladder(&asm, groups.axis, 10);
    }

    #[test]
    fn pam3_duplex_ends_are_terminal() {
        let (asm, report) = build(&spec(ModelTier::Pam3, 5));
        let groups = report.groups.expect("groups");
        assert_eq!(kinds_in(&asm, groups.axis, AtomKind::Ae3).len(), 2);
        assert!(report.roles.iter().all(|r| *r == BasePairRole::Middle));
    }

    #[test]
    fn classification_is_exhaustive() {
        let (asm, report) = build(&spec(ModelTier::Pam3, 6));
        let groups = report.groups.expect("groups");
        let total: usize = [groups.strand1, groups.strand2, groups.axis]
            .iter()
            .filter_map(|c| asm.chunk(*c))
            .map(|c| c.len())
            .sum();
        assert_eq!(asm.chunk_count(), 3);
        assert_eq!(total, asm.atom_count());
        let untagged = asm
            .atoms()
            .all(|(_, a)| a.tag == crate::model::types::StrandTag::Unassigned);
        assert!(untagged);
    }

    #[test]
    fn single_base_pair_uses_single_template_without_fusion() {
        let (asm, report) = build(&spec(ModelTier::Pam5, 1));
        assert_eq!(report.roles, vec![BasePairRole::Single]);
        assert_eq!(report.fusion_calls, 0);
        assert!(report.is_clean(), "{:?}", report.warnings);
        let groups = report.groups.expect("groups");
        assert_eq!(kinds_in(&asm, groups.strand1, AtomKind::Ss5).len(), 1);
        assert_eq!(kinds_in(&asm, groups.strand2, AtomKind::Ss5).len(), 1);
    }

    #[test]
    fn pam5_duplex_is_capped_and_directed() {
        let (asm, report) = build(&spec(ModelTier::Pam5, 4));
        assert_eq!(
            report.roles,
            vec![
                BasePairRole::Start,
                BasePairRole::Middle,
                BasePairRole::Middle,
                BasePairRole::End
            ]
        );
        assert!(report.is_clean(), "{:?}", report.warnings);
        assert_full_ladder(&asm, report.groups.expect("groups").axis, 4);
        let capped = asm
            .atoms()
            .filter(|(_, a)| a.kind == AtomKind::Pe5)
            .all(|(id, _)| asm.real_neighbors(id).all(|(_, d)| d == 1));
        assert!(capped);
    }

    #[test]
    fn left_handed_twist_on_right_handed_templates_reports_strand_gaps() {
        let left = spec(ModelTier::Pam3, 10).with_handedness(Handedness::Left);
        let (asm, report) = build(&left);
        let groups = report.groups.expect("groups");

        let mut axis = kinds_in(&asm, groups.axis, AtomKind::Ax3);
        axis.sort_by(|a, b| a.z.total_cmp(&b.z));
        assert!((axis[9].z - axis[0].z - 30.42).abs() < 1e-6);

        assert!(!report.is_clean());
        assert_eq!(report.bonds_formed, 9);
        assert_eq!(report.warnings.len(), 9);
        assert!(report.warnings.iter().all(|w| matches!(
            w,
            Warning::PartialFusion { join } if join.contains("strand") && !join.contains("axis")
        )));
        assert_eq!(ladder(&asm, groups.axis).len(), 1);
    }

    #[test]
    fn zero_count_is_a_noop() {
        let (asm, report) = build(&spec(ModelTier::Pam3, 0));
        assert_eq!(report, BuildReport::default());
        assert_eq!(asm.atom_count(), 0);
        assert_eq!(asm.chunk_count(), 0);
    }

    #[test]
    fn negative_count_is_rejected() {
        let mut asm = Assembly::new();
        let err = generator()
            .construct(
                &mut asm,
                &spec(ModelTier::Pam3, -2),
                &Point::origin(),
                &Point::new(0.0, 0.0, 1.0),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "count", .. }));
    }

    #[test]
    fn coincident_endpoints_are_rejected() {
        let mut asm = Assembly::new();
        let err = generator()
            .construct(&mut asm, &spec(ModelTier::Pam3, 2), &Point::origin(), &Point::origin())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "endpoints", .. }));
        assert_eq!(asm.atom_count(), 0);
    }

    #[test]
    fn missing_form_fails_before_building() {
        let mut asm = Assembly::new();
        let z = DuplexSpec::new(Form::ZDna, ModelTier::Pam3, 4);
        let err = generator()
            .construct(&mut asm, &z, &Point::origin(), &Point::new(0.0, 0.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { form: Form::ZDna, .. }));
        assert_eq!(asm.chunk_count(), 0);
    }

    #[test]
    fn invalid_rise_is_rejected() {
        let mut asm = Assembly::new();
        let err = generator()
            .construct(
                &mut asm,
                &spec(ModelTier::Pam3, 3).with_rise(0.0),
                &Point::origin(),
                &Point::new(1.0, 0.0, 0.0),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "rise", .. }));
    }

    #[test]
    fn directory_provider_is_injected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let generator = DuplexGenerator::new(DirectoryTemplates::new(dir.path()));
        let mut asm = Assembly::new();
        let err = generator
            .construct(
                &mut asm,
                &spec(ModelTier::Pam3, 2),
                &Point::origin(),
                &Point::new(0.0, 0.0, 1.0),
            )
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }

    #[test]
    fn first_strand_faces_the_viewer() {
        let mut asm = Assembly::new();
        let report = generator()
            .construct(
                &mut asm,
                &spec(ModelTier::Pam3, 3),
                &Point::origin(),
                &Point::new(10.0, 0.0, 0.0),
            )
            .expect("construct");
        let groups = report.groups.expect("groups");
        let first = kinds_in(&asm, groups.strand1, AtomKind::Ss3)
            .into_iter()
            .min_by(|a, b| a.x.total_cmp(&b.x))
            .expect("strand atom");
        let desired = Vector::new(0.0, 0.0, 1.0).cross(&Vector::x());
        assert!((normalize(&first.coords) - desired).norm() < 1e-6, "{first:?}");
    }
}
