use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::config::config as settings;
use crate::error::HookError;
use crate::hook::model::{EntityDef, Model};
use crate::hook::registration::{HookConfig, HookRegistration};

/// Per-target configuration: the ordered plugin list plus a per-target
/// settings bag. Shared via `Arc` between a logical entity and every
/// physical target bound to it.
pub struct TargetHooks {
    plugins: RwLock<Vec<Arc<HookRegistration>>>,
    settings: RwLock<Map<String, Value>>,
}

impl TargetHooks {
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
            settings: RwLock::new(Map::new()),
        }
    }

    /// Current plugin list, in pipeline order. The snapshot is what a
    /// single pipeline run iterates; later registrations affect later
    /// calls only.
    pub fn snapshot(&self) -> Vec<Arc<HookRegistration>> {
        self.plugins.read().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().unwrap().len()
    }

    /// Names of the named plugins, in pipeline order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins
            .read()
            .unwrap()
            .iter()
            .filter_map(|plugin| plugin.name.clone())
            .collect()
    }

    pub fn set_setting(&self, key: impl Into<String>, value: Value) {
        self.settings.write().unwrap().insert(key.into(), value);
    }

    pub fn setting(&self, key: &str) -> Option<Value> {
        self.settings.read().unwrap().get(key).cloned()
    }

    /// Insert a registration honoring `once`/`replace`/`top`. Duplicate
    /// `once` registrations without `replace` are silently ignored so
    /// repeated module imports stay idempotent.
    pub(crate) fn apply(&self, registration: HookRegistration) {
        let mut plugins = self.plugins.write().unwrap();

        if registration.once {
            if let Some(name) = registration.name.as_deref() {
                if let Some(existing) = plugins
                    .iter()
                    .position(|plugin| plugin.name.as_deref() == Some(name))
                {
                    if registration.replace {
                        plugins.remove(existing);
                    } else {
                        if settings().registry.warn_duplicate_names {
                            debug!("Duplicate plugin registration '{}' ignored", name);
                        }
                        return;
                    }
                }
            }
        }

        let registration = Arc::new(registration);
        if registration.top {
            plugins.insert(0, registration);
        } else {
            plugins.push(registration);
        }
    }
}

impl Default for TargetHooks {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide hook state: target name to plugin list, the patched-host
/// guard set, and the target-to-model association cache. Initialized
/// once, never torn down.
pub struct HookRegistry {
    targets: RwLock<HashMap<String, Arc<TargetHooks>>>,
    patched: RwLock<HashSet<String>>,
    models: RwLock<HashMap<String, Arc<Model>>>,
}

static GLOBAL: Lazy<Arc<HookRegistry>> = Lazy::new(|| Arc::new(HookRegistry::new()));

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            targets: RwLock::new(HashMap::new()),
            patched: RwLock::new(HashSet::new()),
            models: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry most callers share.
    pub fn global() -> Arc<HookRegistry> {
        GLOBAL.clone()
    }

    /// Register a plugin on a logical entity. The config's target host is
    /// required and gets patched (idempotently) as a side effect, so a
    /// lone registration call is enough to bootstrap interception.
    pub fn register(&self, entity: &EntityDef, config: HookConfig) -> Result<(), HookError> {
        let target = config.target.clone().ok_or(HookError::MissingTarget)?;
        self.patch_host(target.id());

        if settings().registry.log_registrations {
            debug!(
                "Registering plugin {:?} on entity '{}' (host '{}')",
                config.name.as_deref().unwrap_or("<unnamed>"),
                entity.name(),
                target.id()
            );
        }

        entity.hooks().apply(HookRegistration::from_config(&config));
        Ok(())
    }

    /// Mark a host as patched. `true` the first time, `false` (no-op)
    /// for every re-invocation.
    pub fn patch_host(&self, host_id: &str) -> bool {
        self.patched.write().unwrap().insert(host_id.to_string())
    }

    pub fn is_patched(&self, host_id: &str) -> bool {
        self.patched.read().unwrap().contains(host_id)
    }

    /// Associate a model's physical collection with its entity's plugin
    /// list. Idempotent for a given model.
    pub fn bind_model(&self, model: &Arc<Model>) {
        self.targets
            .write()
            .unwrap()
            .insert(model.collection.clone(), model.entity.hooks().clone());
    }

    /// Resolved configuration for a target, if any model was bound to it.
    pub fn hooks_for(&self, target: &str) -> Option<Arc<TargetHooks>> {
        self.targets.read().unwrap().get(target).cloned()
    }

    /// Reverse lookup: which model owns a physical collection. Scans the
    /// caller's candidates on first use and memoizes the hit; misses are
    /// not cached, so a model that appears later is still found.
    pub fn model_for(&self, target: &str, candidates: &[Arc<Model>]) -> Option<Arc<Model>> {
        if let Some(hit) = self.models.read().unwrap().get(target) {
            return Some(hit.clone());
        }

        let found = candidates
            .iter()
            .find(|model| model.collection == target)
            .cloned();

        if let Some(model) = &found {
            self.models
                .write()
                .unwrap()
                .insert(target.to_string(), model.clone());
        }

        found
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RawCollection, StoreHandle};

    struct TestHost;

    impl StoreHandle for TestHost {
        fn id(&self) -> &str {
            "test-host"
        }

        fn collection(&self, _name: &str) -> Option<Arc<dyn RawCollection>> {
            None
        }
    }

    fn registration(name: Option<&str>, once: bool, replace: bool, top: bool) -> HookRegistration {
        HookRegistration {
            name: name.map(str::to_string),
            once,
            replace,
            top,
            pre: None,
            post: None,
        }
    }

    #[test]
    fn registrations_append_in_order() {
        let hooks = TargetHooks::new();
        hooks.apply(registration(Some("a"), false, false, false));
        hooks.apply(registration(Some("b"), false, false, false));
        assert_eq!(hooks.plugin_names(), vec!["a", "b"]);
    }

    #[test]
    fn top_prepends() {
        let hooks = TargetHooks::new();
        hooks.apply(registration(Some("a"), false, false, false));
        hooks.apply(registration(Some("b"), false, false, true));
        assert_eq!(hooks.plugin_names(), vec!["b", "a"]);
    }

    #[test]
    fn once_suppresses_duplicates() {
        let hooks = TargetHooks::new();
        hooks.apply(registration(Some("x"), true, false, false));
        hooks.apply(registration(Some("x"), true, false, false));
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks.plugin_names(), vec!["x"]);
    }

    #[test]
    fn once_replace_swaps_and_honors_top() {
        let hooks = TargetHooks::new();
        hooks.apply(registration(Some("other"), false, false, false));
        hooks.apply(registration(Some("x"), true, false, false));
        hooks.apply(registration(Some("x"), true, true, true));
        assert_eq!(hooks.len(), 2);
        // the replacement landed at the head per its own top flag
        assert_eq!(hooks.plugin_names(), vec!["x", "other"]);
    }

    #[test]
    fn once_without_name_never_dedups() {
        let hooks = TargetHooks::new();
        hooks.apply(registration(None, true, false, false));
        hooks.apply(registration(None, true, false, false));
        assert_eq!(hooks.len(), 2);
    }

    #[test]
    fn register_requires_a_target() {
        let registry = HookRegistry::new();
        let entity = EntityDef::new("account");
        let err = registry
            .register(&entity, HookConfig::default())
            .unwrap_err();
        assert_eq!(err, HookError::MissingTarget);
    }

    #[test]
    fn register_patches_the_host_once() {
        let registry = HookRegistry::new();
        let entity = EntityDef::new("account");
        let host: Arc<dyn StoreHandle> = Arc::new(TestHost);

        registry
            .register(&entity, HookConfig::new(host.clone()).name("audit"))
            .unwrap();
        assert!(registry.is_patched("test-host"));
        // second patch is a no-op
        assert!(!registry.patch_host("test-host"));
    }

    #[test]
    fn bound_targets_share_the_entity_plugin_list() {
        let registry = HookRegistry::new();
        let entity = EntityDef::new("account");
        let model = Model::new("Account", entity.clone(), "accounts");
        registry.bind_model(&model);

        // registration after binding is visible through the target
        entity.hooks().apply(registration(Some("late"), false, false, false));
        let hooks = registry.hooks_for("accounts").unwrap();
        assert_eq!(hooks.plugin_names(), vec!["late"]);
        assert!(registry.hooks_for("unbound").is_none());
    }

    #[test]
    fn model_lookup_memoizes_hits_but_not_misses() {
        let registry = HookRegistry::new();
        let entity = EntityDef::new("account");
        let model = Model::new("Account", entity.clone(), "accounts");

        assert!(registry.model_for("accounts", &[]).is_none());

        let found = registry.model_for("accounts", &[model.clone()]).unwrap();
        assert_eq!(found.name, "Account");

        // cached hit survives an empty candidate list
        let cached = registry.model_for("accounts", &[]).unwrap();
        assert_eq!(cached.name, "Account");
    }
}
