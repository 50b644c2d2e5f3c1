use super::loader;
use crate::model::fragment::Fragment;
use crate::model::types::{BasePairRole, Form, ModelTier};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub form: Form,
    pub model: ModelTier,
    pub role: BasePairRole,
}

impl TemplateKey {
    pub fn new(form: Form, model: ModelTier, role: BasePairRole) -> Self {
        Self { form, model, role }
    }

    pub fn of(fragment: &Fragment) -> Self {
        Self::new(fragment.form, fragment.model, fragment.role)
    }
}

pub struct DataStore {
    pub fragments: HashMap<TemplateKey, Fragment>,
}

static STORE: OnceLock<DataStore> = OnceLock::new();

pub fn get_store() -> &'static DataStore {
    STORE.get_or_init(loader::load_all_templates)
}
