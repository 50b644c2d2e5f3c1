use nalgebra::Point3;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub type Point = Point3<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum AtomKind {
    Ax3,
    Ae3,
    Ss3,
    Ax5,
    Ae5,
    Gv5,
    Gr5,
    Ss5,
    Sh5,
    Pl5,
    Pe5,
    Singlet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    AxisPoint,
    StrandPoint,
    TerminalCap,
    OpenValence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum StrandTag {
    #[serde(rename = "a")]
    BaseA,
    #[serde(rename = "b")]
    BaseB,
    Strand1,
    Strand2,
    #[default]
    #[serde(rename = "X")]
    Unassigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplexGroup {
    Strand1,
    Strand2,
    Axis,
}

/// How a tier assigns an atom kind to a [`DuplexGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRule {
    /// Strand membership read from the base letter (`a`/`b`).
    BaseLetter,
    /// Strand membership read from the strand identifier (`Strand1`/`Strand2`).
    StrandId,
    /// Always part of the axis.
    Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Form {
    #[serde(rename = "A-DNA")]
    ADna,
    #[serde(rename = "B-DNA")]
    BDna,
    #[serde(rename = "Z-DNA")]
    ZDna,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ModelTier {
    #[serde(rename = "PAM3")]
    Pam3,
    #[serde(rename = "PAM5")]
    Pam5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasePairRole {
    Start,
    Middle,
    End,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayStyle {
    #[default]
    Default,
    Lines,
    Tubes,
    BallAndStick,
}

impl AtomKind {
    pub fn name(&self) -> &'static str {
        match self {
            AtomKind::Ax3 => "Ax3",
            AtomKind::Ae3 => "Ae3",
            AtomKind::Ss3 => "Ss3",
            AtomKind::Ax5 => "Ax5",
            AtomKind::Ae5 => "Ae5",
            AtomKind::Gv5 => "Gv5",
            AtomKind::Gr5 => "Gr5",
            AtomKind::Ss5 => "Ss5",
            AtomKind::Sh5 => "Sh5",
            AtomKind::Pl5 => "Pl5",
            AtomKind::Pe5 => "Pe5",
            AtomKind::Singlet => "X",
        }
    }

    pub fn role(&self) -> Role {
        match self {
            AtomKind::Ax3
            | AtomKind::Ae3
            | AtomKind::Ax5
            | AtomKind::Ae5
            | AtomKind::Gv5
            | AtomKind::Gr5 => Role::AxisPoint,
            AtomKind::Ss3 | AtomKind::Ss5 | AtomKind::Pl5 => Role::StrandPoint,
            AtomKind::Sh5 | AtomKind::Pe5 => Role::TerminalCap,
            AtomKind::Singlet => Role::OpenValence,
        }
    }

    pub fn is_singlet(&self) -> bool {
        *self == AtomKind::Singlet
    }

    /// True for atoms lying on the helix axis itself (excluding groove points).
    pub fn is_axis(&self) -> bool {
        matches!(
            self,
            AtomKind::Ax3 | AtomKind::Ae3 | AtomKind::Ax5 | AtomKind::Ae5
        )
    }

    pub fn is_terminal_axis(&self) -> bool {
        matches!(self, AtomKind::Ae3 | AtomKind::Ae5)
    }

    /// True for sugar sites, the atoms that pair with an axis point on each rung.
    pub fn is_sugar(&self) -> bool {
        matches!(self, AtomKind::Ss3 | AtomKind::Ss5)
    }

    /// Interior counterpart of a terminal axis kind, or the kind itself.
    pub fn interior(&self) -> AtomKind {
        match self {
            AtomKind::Ae3 => AtomKind::Ax3,
            AtomKind::Ae5 => AtomKind::Ax5,
            other => *other,
        }
    }

    /// Terminal counterpart of an interior axis kind, or the kind itself.
    pub fn terminal(&self) -> AtomKind {
        match self {
            AtomKind::Ax3 => AtomKind::Ae3,
            AtomKind::Ax5 => AtomKind::Ae5,
            other => *other,
        }
    }

    pub fn tier(&self) -> Option<ModelTier> {
        match self {
            AtomKind::Ax3 | AtomKind::Ae3 | AtomKind::Ss3 => Some(ModelTier::Pam3),
            AtomKind::Singlet => None,
            _ => Some(ModelTier::Pam5),
        }
    }
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AtomKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ax3" => Ok(AtomKind::Ax3),
            "Ae3" => Ok(AtomKind::Ae3),
            "Ss3" => Ok(AtomKind::Ss3),
            "Ax5" => Ok(AtomKind::Ax5),
            "Ae5" => Ok(AtomKind::Ae5),
            "Gv5" => Ok(AtomKind::Gv5),
            "Gr5" => Ok(AtomKind::Gr5),
            "Ss5" => Ok(AtomKind::Ss5),
            "Sh5" => Ok(AtomKind::Sh5),
            "Pl5" => Ok(AtomKind::Pl5),
            "Pe5" => Ok(AtomKind::Pe5),
            "X" | "Singlet" => Ok(AtomKind::Singlet),
            _ => Err(format!("Invalid atom kind: {}", s)),
        }
    }
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::AxisPoint => "Axis Point",
            Role::StrandPoint => "Strand Point",
            Role::TerminalCap => "Terminal Cap",
            Role::OpenValence => "Open Valence",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl StrandTag {
    pub fn name(&self) -> &'static str {
        match self {
            StrandTag::BaseA => "a",
            StrandTag::BaseB => "b",
            StrandTag::Strand1 => "Strand1",
            StrandTag::Strand2 => "Strand2",
            StrandTag::Unassigned => "X",
        }
    }
}

impl fmt::Display for StrandTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StrandTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(StrandTag::BaseA),
            "b" => Ok(StrandTag::BaseB),
            "Strand1" => Ok(StrandTag::Strand1),
            "Strand2" => Ok(StrandTag::Strand2),
            "X" | "" => Ok(StrandTag::Unassigned),
            _ => Err(format!("Invalid strand tag: {}", s)),
        }
    }
}

impl DuplexGroup {
    pub fn name(&self) -> &'static str {
        match self {
            DuplexGroup::Strand1 => "Strand 1",
            DuplexGroup::Strand2 => "Strand 2",
            DuplexGroup::Axis => "Axis",
        }
    }
}

impl fmt::Display for DuplexGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TagRule {
    /// Resolves the group for a tag under this rule, or `None` when the tag is not part of the
    /// rule's vocabulary.
    pub fn group_for(&self, tag: StrandTag) -> Option<DuplexGroup> {
        match (self, tag) {
            (TagRule::Axis, _) => Some(DuplexGroup::Axis),
            (TagRule::BaseLetter, StrandTag::BaseA) => Some(DuplexGroup::Strand1),
            (TagRule::BaseLetter, StrandTag::BaseB) => Some(DuplexGroup::Strand2),
            (TagRule::StrandId, StrandTag::Strand1) => Some(DuplexGroup::Strand1),
            (TagRule::StrandId, StrandTag::Strand2) => Some(DuplexGroup::Strand2),
            _ => None,
        }
    }
}

const PAM3_TAGS: &[(AtomKind, TagRule)] = &[
    (AtomKind::Ss3, TagRule::BaseLetter),
    (AtomKind::Ax3, TagRule::Axis),
    (AtomKind::Ae3, TagRule::Axis),
];

const PAM5_TAGS: &[(AtomKind, TagRule)] = &[
    (AtomKind::Pl5, TagRule::StrandId),
    (AtomKind::Pe5, TagRule::StrandId),
    (AtomKind::Ss5, TagRule::BaseLetter),
    (AtomKind::Sh5, TagRule::BaseLetter),
    (AtomKind::Ax5, TagRule::Axis),
    (AtomKind::Ae5, TagRule::Axis),
    (AtomKind::Gv5, TagRule::Axis),
    (AtomKind::Gr5, TagRule::Axis),
];

impl ModelTier {
    pub fn name(&self) -> &'static str {
        match self {
            ModelTier::Pam3 => "PAM3",
            ModelTier::Pam5 => "PAM5",
        }
    }

    /// Tag vocabulary for this tier: every classifiable atom kind and how it is grouped.
    pub fn tag_table(&self) -> &'static [(AtomKind, TagRule)] {
        match self {
            ModelTier::Pam3 => PAM3_TAGS,
            ModelTier::Pam5 => PAM5_TAGS,
        }
    }

    pub fn rule_for(&self, kind: AtomKind) -> Option<TagRule> {
        self.tag_table()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, rule)| *rule)
    }

    /// Template role requested for base pair `index` of `count`.
    ///
    /// PAM3 always uses the middle template, whatever the position.
    pub fn role_for(&self, index: usize, count: usize) -> BasePairRole {
        match self {
            ModelTier::Pam3 => BasePairRole::Middle,
            ModelTier::Pam5 => BasePairRole::for_index(index, count),
        }
    }

    pub fn axis_kind(&self) -> AtomKind {
        match self {
            ModelTier::Pam3 => AtomKind::Ax3,
            ModelTier::Pam5 => AtomKind::Ax5,
        }
    }

    pub fn sugar_kind(&self) -> AtomKind {
        match self {
            ModelTier::Pam3 => AtomKind::Ss3,
            ModelTier::Pam5 => AtomKind::Ss5,
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PAM3" => Ok(ModelTier::Pam3),
            "PAM5" => Ok(ModelTier::Pam5),
            _ => Err(format!("Invalid model tier: {}", s)),
        }
    }
}

impl Form {
    pub fn name(&self) -> &'static str {
        match self {
            Form::ADna => "A-DNA",
            Form::BDna => "B-DNA",
            Form::ZDna => "Z-DNA",
        }
    }

    /// Typical rise between base-pair planes in ångströms.
    pub fn default_rise(&self) -> f64 {
        match self {
            Form::ADna => 2.56,
            Form::BDna => 3.391,
            Form::ZDna => 3.715,
        }
    }

    pub fn default_bases_per_turn(&self) -> f64 {
        match self {
            Form::ADna => 11.0,
            Form::BDna => 10.5,
            Form::ZDna => 12.0,
        }
    }

    pub fn handedness(&self) -> Handedness {
        match self {
            Form::ADna | Form::BDna => Handedness::Right,
            Form::ZDna => Handedness::Left,
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Form {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A-DNA" | "A" => Ok(Form::ADna),
            "B-DNA" | "B" => Ok(Form::BDna),
            "Z-DNA" | "Z" => Ok(Form::ZDna),
            _ => Err(format!("Invalid duplex form: {}", s)),
        }
    }
}

impl Handedness {
    pub fn name(&self) -> &'static str {
        match self {
            Handedness::Right => "Right",
            Handedness::Left => "Left",
        }
    }

    /// Signed multiplier applied to the per-step twist.
    pub fn sign(&self) -> f64 {
        match self {
            Handedness::Right => -1.0,
            Handedness::Left => 1.0,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Handedness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "right" | "-1" => Ok(Handedness::Right),
            "left" | "+1" | "1" => Ok(Handedness::Left),
            _ => Err(format!("Invalid handedness: {}", s)),
        }
    }
}

impl BasePairRole {
    pub fn name(&self) -> &'static str {
        match self {
            BasePairRole::Start => "start",
            BasePairRole::Middle => "middle",
            BasePairRole::End => "end",
            BasePairRole::Single => "single",
        }
    }

    /// Stem of the template file holding this role, e.g. `StartBasePair`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            BasePairRole::Start => "StartBasePair",
            BasePairRole::Middle => "MiddleBasePair",
            BasePairRole::End => "EndBasePair",
            BasePairRole::Single => "SingleBasePair",
        }
    }

    pub fn for_index(index: usize, count: usize) -> Self {
        if count == 1 {
            BasePairRole::Single
        } else if index == 0 {
            BasePairRole::Start
        } else if index + 1 == count {
            BasePairRole::End
        } else {
            BasePairRole::Middle
        }
    }
}

impl fmt::Display for BasePairRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BasePairRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(BasePairRole::Start),
            "middle" => Ok(BasePairRole::Middle),
            "end" => Ok(BasePairRole::End),
            "single" => Ok(BasePairRole::Single),
            _ => Err(format!("Invalid base-pair role: {}", s)),
        }
    }
}

impl Color {
    pub const DARK_RED: Color = Color::new(128, 0, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const AXIS_GRAY: Color = Color::new(102, 102, 102);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl DisplayStyle {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayStyle::Default => "Default",
            DisplayStyle::Lines => "Lines",
            DisplayStyle::Tubes => "Tubes",
            DisplayStyle::BallAndStick => "Ball and Stick",
        }
    }
}

impl fmt::Display for DisplayStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_kind_roles_cover_every_kind() {
        assert_eq!(AtomKind::Ax3.role(), Role::AxisPoint);
        assert_eq!(AtomKind::Gv5.role(), Role::AxisPoint);
        assert_eq!(AtomKind::Ss5.role(), Role::StrandPoint);
        assert_eq!(AtomKind::Pl5.role(), Role::StrandPoint);
        assert_eq!(AtomKind::Pe5.role(), Role::TerminalCap);
        assert_eq!(AtomKind::Sh5.role(), Role::TerminalCap);
        assert_eq!(AtomKind::Singlet.role(), Role::OpenValence);
    }

    #[test]
    fn atom_kind_terminal_and_interior_are_inverse_for_axis() {
        assert_eq!(AtomKind::Ax3.terminal(), AtomKind::Ae3);
        assert_eq!(AtomKind::Ae3.interior(), AtomKind::Ax3);
        assert_eq!(AtomKind::Ae5.interior(), AtomKind::Ax5);
        assert_eq!(AtomKind::Ss3.terminal(), AtomKind::Ss3);
    }

    #[test]
    fn atom_kind_from_str_round_trips_names() {
        for kind in [AtomKind::Ax3, AtomKind::Pl5, AtomKind::Sh5, AtomKind::Singlet] {
            assert_eq!(kind.name().parse::<AtomKind>(), Ok(kind));
        }
        assert!("Zz9".parse::<AtomKind>().is_err());
    }

    #[test]
    fn tag_tables_are_disjoint_between_tiers() {
        for (kind, _) in ModelTier::Pam3.tag_table() {
            assert!(ModelTier::Pam5.rule_for(*kind).is_none());
        }
        for (kind, _) in ModelTier::Pam5.tag_table() {
            assert!(ModelTier::Pam3.rule_for(*kind).is_none());
        }
    }

    #[test]
    fn tag_rule_rejects_foreign_vocabulary() {
        assert_eq!(
            TagRule::BaseLetter.group_for(StrandTag::BaseB),
            Some(DuplexGroup::Strand2)
        );
        assert_eq!(TagRule::BaseLetter.group_for(StrandTag::Strand1), None);
        assert_eq!(TagRule::StrandId.group_for(StrandTag::Unassigned), None);
        assert_eq!(
            TagRule::Axis.group_for(StrandTag::Unassigned),
            Some(DuplexGroup::Axis)
        );
    }

    #[test]
    fn base_pair_role_selection_by_position() {
        assert_eq!(BasePairRole::for_index(0, 1), BasePairRole::Single);
        assert_eq!(BasePairRole::for_index(0, 4), BasePairRole::Start);
        assert_eq!(BasePairRole::for_index(2, 4), BasePairRole::Middle);
        assert_eq!(BasePairRole::for_index(3, 4), BasePairRole::End);
    }

    #[test]
    fn pam3_always_requests_middle_template() {
        for i in 0..5 {
            assert_eq!(ModelTier::Pam3.role_for(i, 5), BasePairRole::Middle);
        }
        assert_eq!(ModelTier::Pam3.role_for(0, 1), BasePairRole::Middle);
        assert_eq!(ModelTier::Pam5.role_for(0, 1), BasePairRole::Single);
    }

    #[test]
    fn form_defaults_and_parsing() {
        assert_eq!("b-dna".parse::<Form>(), Ok(Form::BDna));
        assert_eq!(Form::ZDna.handedness(), Handedness::Left);
        assert!((Form::BDna.default_rise() - 3.391).abs() < 1e-12);
        assert_eq!(Handedness::Right.sign(), -1.0);
    }

    #[test]
    fn color_display_is_hex() {
        assert_eq!(Color::DARK_RED.to_string(), "#800000");
    }
}
