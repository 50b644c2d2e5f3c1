//! Error and warning types returned by the high-level operations modules.
//!
//! Errors abort the whole construct or modify call: a missing template, a template that does
//! not parse, or a structure whose tags or connectivity do not match what the model tier
//! expects. Warnings describe non-fatal problems (a join that found no bonding partners, an
//! atom that could not be deleted) and are returned alongside successful results so partial
//! structures remain available for inspection.

use crate::model::assembly::AtomId;
use crate::model::types::{AtomKind, BasePairRole, Form, ModelTier, StrandTag};
use thiserror::Error;

/// Error conditions surfaced by the operations layer.
#[derive(Debug, Error)]
pub enum Error {
    /// No template exists for the requested form, model tier, and role.
    #[error("no {role} base-pair template for {form} {model}")]
    TemplateNotFound {
        form: Form,
        model: ModelTier,
        role: BasePairRole,
    },

    /// A template resource exists but could not be read or parsed.
    #[error("failed to load template '{path}': {details}")]
    TemplateParse { path: String, details: String },

    /// An atom's tag is not part of its model tier's vocabulary.
    #[error("cannot classify atom {atom} ({kind}, tag '{tag}') under {model} tagging rules")]
    Classification {
        atom: AtomId,
        kind: AtomKind,
        tag: StrandTag,
        model: ModelTier,
    },

    /// Boundary discovery or splicing found an unexpected structure.
    #[error("structural inconsistency: {details}")]
    StructuralInconsistency { details: String },

    /// The operation is not available for this model tier.
    #[error("{operation} is not supported for {model} duplexes")]
    UnsupportedModel {
        model: ModelTier,
        operation: &'static str,
    },

    /// A numeric or geometric input is outside its valid range.
    #[error("invalid {name}: {details}")]
    InvalidParameter { name: &'static str, details: String },
}

impl Error {
    /// Helper for constructing an [`Error::TemplateParse`] variant.
    ///
    /// # Arguments
    ///
    /// * `path` - Resource the template was read from.
    /// * `details` - Reader or parser diagnostic.
    pub fn template_parse(path: impl Into<String>, details: impl Into<String>) -> Self {
        Self::TemplateParse {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Helper for constructing an [`Error::StructuralInconsistency`] variant.
    pub fn inconsistent(details: impl Into<String>) -> Self {
        Self::StructuralInconsistency {
            details: details.into(),
        }
    }

    /// Helper for constructing an [`Error::InvalidParameter`] variant.
    ///
    /// # Arguments
    ///
    /// * `name` - Parameter that was rejected.
    /// * `details` - Why the value is unusable.
    pub fn invalid(name: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            details: details.into(),
        }
    }
}

/// Non-fatal conditions collected while building or resizing a duplex.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    /// Two neighboring pieces were expected to bond but no compatible pair was in range.
    #[error("no bonding partners found across {join}; the chain is left with a gap")]
    PartialFusion { join: String },

    /// Best-effort deletion skipped an atom that no longer exists.
    #[error("could not delete atom {atom}: it is no longer part of the structure")]
    AtomDeletionFailed { atom: AtomId },

    /// Terminal caps do not mark exactly one 5' and one 3' end per strand.
    #[error("unterminated strands: {five_prime} 5' and {three_prime} 3' caps, expected 2 each")]
    UnterminatedStrand { five_prime: usize, three_prime: usize },

    /// Truncation asked for more base pairs than the duplex has.
    #[error("cannot remove {requested} of {available} base pairs; nothing was removed")]
    TruncationExceedsLength { requested: usize, available: usize },
}
