//! Base-pair template providers.
//!
//! Placement asks a [`TemplateProvider`] for the canonical-pose fragment of one base pair.
//! The compiled-in [`EmbeddedTemplates`] serve the shipped B-DNA set; [`DirectoryTemplates`]
//! reads the same TOML layout from a root directory supplied by the caller, so alternative
//! forms or tuned geometries can be used without rebuilding.

mod loader;
mod schema;
mod store;

use crate::model::fragment::Fragment;
use crate::model::types::{BasePairRole, Form, ModelTier};
use crate::ops::Error;
use std::io;
use std::path::{Path, PathBuf};

/// Source of canonical-pose base-pair fragments.
pub trait TemplateProvider {
    /// Returns the fragment for `(form, model, role)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] when no such template exists, or
    /// [`Error::TemplateParse`] when it exists but cannot be read.
    fn fetch(&self, form: Form, model: ModelTier, role: BasePairRole) -> Result<Fragment, Error>;
}

/// Templates compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplates;

impl TemplateProvider for EmbeddedTemplates {
    fn fetch(&self, form: Form, model: ModelTier, role: BasePairRole) -> Result<Fragment, Error> {
        store::get_store()
            .fragments
            .get(&store::TemplateKey::new(form, model, role))
            .cloned()
            .ok_or(Error::TemplateNotFound { form, model, role })
    }
}

/// Lists every compiled-in template, sorted by form, model, and role.
pub fn embedded_fragments() -> Vec<&'static Fragment> {
    let mut fragments: Vec<&'static Fragment> = store::get_store().fragments.values().collect();
    fragments.sort_by_key(|f| (f.form.name(), f.model.name(), f.role));
    fragments
}

/// Templates read from `<root>/<form>/<model>-bases/<Role>BasePair.toml` on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File the template for `(form, model, role)` is expected at.
    pub fn path_for(&self, form: Form, model: ModelTier, role: BasePairRole) -> PathBuf {
        self.root
            .join(form.name())
            .join(format!("{}-bases", model.name()))
            .join(format!("{}.toml", role.file_stem()))
    }
}

impl TemplateProvider for DirectoryTemplates {
    fn fetch(&self, form: Form, model: ModelTier, role: BasePairRole) -> Result<Fragment, Error> {
        let path = self.path_for(form, model, role);
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::TemplateNotFound { form, model, role },
            _ => Error::template_parse(path.display().to_string(), e.to_string()),
        })?;

        let fragment = loader::parse_fragment(&content)
            .map_err(|e| Error::template_parse(path.display().to_string(), e))?;

        if (fragment.form, fragment.model, fragment.role) != (form, model, role) {
            return Err(Error::template_parse(
                path.display().to_string(),
                format!(
                    "declares {} {} {} but was requested as {} {} {}",
                    fragment.form, fragment.model, fragment.role, form, model, role
                ),
            ));
        }
        Ok(fragment)
    }
}
