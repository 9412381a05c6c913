use crate::assets::AssetDatabase;
use crate::document::Guid;

use super::diagnostics::Diagnostics;
use super::error::ResolveError;
use super::factory::{ComponentFactory, ScriptRegistry};

/// Read-only collaborators shared by every resolve call.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub assets: &'a AssetDatabase,
    pub scripts: &'a ScriptRegistry,
}

impl<'a> ResolveContext<'a> {
    pub fn new(assets: &'a AssetDatabase, scripts: &'a ScriptRegistry) -> Self {
        Self { assets, scripts }
    }

    pub fn factory(&self) -> ComponentFactory<'a> {
        ComponentFactory::new(self.assets, self.scripts)
    }
}

/// Marks `template` as being instanced. Fails when it is already on the
/// stack of templates being instanced.
pub(crate) fn enter_template(
    diagnostics: &mut Diagnostics,
    template: &Guid,
) -> Result<(), ResolveError> {
    if diagnostics.in_scope(template) {
        let mut chain = diagnostics.scope_chain();
        chain.push(template.clone());
        return Err(ResolveError::RecursiveTemplate {
            template: template.clone(),
            chain,
        });
    }
    diagnostics.push_scope(template.clone());
    Ok(())
}

pub(crate) fn leave_template(diagnostics: &mut Diagnostics) {
    diagnostics.pop_scope();
}
