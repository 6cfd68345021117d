use std::sync::Arc;

use crate::hook::registry::TargetHooks;

/// Logical schema definition. Owns the shared plugin list that every
/// physical target bound to it resolves at call time, so registrations
/// made after binding are still picked up.
pub struct EntityDef {
    name: String,
    hooks: Arc<TargetHooks>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            hooks: Arc::new(TargetHooks::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hooks(&self) -> &Arc<TargetHooks> {
        &self.hooks
    }
}

/// A logical entity bound to a physical collection name.
pub struct Model {
    pub name: String,
    pub entity: Arc<EntityDef>,
    pub collection: String,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        entity: Arc<EntityDef>,
        collection: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            entity,
            collection: collection.into(),
        })
    }
}
