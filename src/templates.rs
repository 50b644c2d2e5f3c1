//! Read-only access to base-pair templates and the providers that serve them.

use crate::db;
use crate::model::fragment::Fragment;

pub use crate::db::{DirectoryTemplates, EmbeddedTemplates, TemplateProvider};

/// Every compiled-in template, sorted by form, model tier, and role.
pub fn embedded() -> Vec<&'static Fragment> {
    db::embedded_fragments()
}
