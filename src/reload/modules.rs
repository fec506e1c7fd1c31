//! Module Cache
//!
//! Remembers the last successfully scanned declarations of every watched
//! module and turns a saved file into a hot update verdict: which
//! declarations are render-only, which are structural, and whether the
//! module has to be invalidated instead.

use std::path::Path;

use rustc_hash::FxHashMap;

use super::message::ComponentUpdate;
use crate::classify::Classifier;
use crate::core::Classification;
use crate::instrument::{ComponentInfo, InstrumentError, InstrumentOptions, scan};
use crate::runtime::UpdateError;
use crate::utils::hash;

#[derive(Debug)]
struct CachedModule {
    hash: u64,
    components: Vec<ComponentInfo>,
}

/// Outcome of feeding a saved module into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleChange {
    /// Content identical to the cached version
    Unchanged,
    /// First sighting, nothing mounted from it yet
    Added { components: usize },
    /// Every previous declaration still exists
    Update(Vec<ComponentUpdate>),
    /// Full reload of the module is required
    Invalidate { reason: String },
    /// Source does not parse; the cached version is kept
    Failed { error: String },
}

#[derive(Debug)]
pub struct ModuleCache {
    modules: FxHashMap<String, CachedModule>,
    classifier: Classifier,
    options: InstrumentOptions,
}

impl ModuleCache {
    pub fn new(options: InstrumentOptions) -> Self {
        Self {
            modules: FxHashMap::default(),
            classifier: Classifier::new(options.build_method.clone()),
            options,
        }
    }

    /// Whether `path` passes the configured file-type gate.
    pub fn accepts(&self, path: &Path) -> bool {
        crate::core::SourceKind::from_path(path, &self.options.extensions).is_some()
    }

    /// Record `source` as the current version of `module`.
    pub fn process(&mut self, module: &str, path: &Path, source: &str) -> ModuleChange {
        let hash = hash::compute(source);
        if self.modules.get(module).is_some_and(|m| m.hash == hash) {
            return ModuleChange::Unchanged;
        }

        let components = match scan(source, path, &self.options) {
            Ok(components) => components,
            Err(InstrumentError::Parse { message, .. }) => {
                return ModuleChange::Failed { error: message };
            }
            Err(e @ InstrumentError::Unsupported(_)) => {
                return ModuleChange::Invalidate {
                    reason: e.to_string(),
                };
            }
        };

        let cached = CachedModule { hash, components };
        let Some(previous) = self.modules.insert(module.to_string(), cached) else {
            let count = self.modules.get(module).map_or(0, |m| m.components.len());
            return ModuleChange::Added { components: count };
        };

        let current = &self.modules[module].components;
        if let Some(removed) = previous
            .components
            .iter()
            .find(|old| !current.iter().any(|c| c.name == old.name))
        {
            let reason = UpdateError::DeclarationRemoved {
                name: removed.name.clone(),
                module: module.to_string(),
            };
            return ModuleChange::Invalidate {
                reason: reason.to_string(),
            };
        }

        let updates = current
            .iter()
            .filter_map(|new| {
                let old = previous.components.iter().find(|c| c.name == new.name)?;
                Some(ComponentUpdate::new(&new.name, self.verdict(old, new)))
            })
            .collect();
        ModuleChange::Update(updates)
    }

    fn verdict(&self, old: &ComponentInfo, new: &ComponentInfo) -> Classification {
        if old.kind != new.kind {
            return Classification::Structural;
        }
        self.classifier.classify(&old.source, &new.source, new.kind)
    }

    /// Forget a deleted module; returns whether it was cached.
    pub fn remove(&mut self, module: &str) -> bool {
        self.modules.remove(module).is_some()
    }

    /// Declarations of `module` as last scanned.
    pub fn components(&self, module: &str) -> &[ComponentInfo] {
        self.modules
            .get(module)
            .map_or(&[], |m| m.components.as_slice())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
