//! Instance Registry
//!
//! Maps declaration keys to the live nodes mounted from them and drives
//! hot updates of a reloaded module.
//!
//! Entries are only added by [`InstanceRegistry::register`] and only removed
//! by [`InstanceRegistry::evict_module`] when a module is unloaded. Nodes of
//! unmounted subtrees stay registered; hard remounts skip them.

use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use super::host::Host;
use super::instance::Instance;
use super::module::{Declaration, ModuleExports};
use super::node::{LiveNode, queue_publish};
use super::reconcile::{ReconcileOutcome, reconcile};
use super::scheduler::Scheduler;
use crate::classify::Classifier;
use crate::core::{Classification, DeclarationKey};

/// Why a module update must fall back to a full reload.
///
/// The `Display` text is the failure string handed to the reload transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("module not found: no module was supplied to the hot update")]
    ModuleNotFound,

    #[error("declaration `{name}` was removed from `{module}`")]
    DeclarationRemoved { name: String, module: String },
}

#[derive(Debug)]
struct Entry {
    name: String,
    module: String,
    nodes: Vec<Rc<LiveNode>>,
}

#[derive(Debug, Default)]
pub struct InstanceRegistry {
    entries: IndexMap<DeclarationKey, Entry>,
    classifier: Classifier,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(classifier: Classifier) -> Self {
        Self {
            entries: IndexMap::new(),
            classifier,
        }
    }

    /// Add `node` under its declaration's key. Registering the same node
    /// twice is a no-op; returns whether it was added.
    pub fn register(&mut self, node: Rc<LiveNode>) -> bool {
        let decl = node.declaration();
        let entry = self.entries.entry(decl.key()).or_insert_with(|| Entry {
            name: decl.name().to_string(),
            module: decl.module().to_string(),
            nodes: Vec::new(),
        });
        if entry.nodes.iter().any(|n| Rc::ptr_eq(n, &node)) {
            return false;
        }
        entry.nodes.push(node);
        true
    }

    /// Apply a reloaded module to every node registered from it.
    ///
    /// Every declaration of the module is processed, including the ones
    /// after a removed declaration; the first failure is returned once the
    /// batch is done.
    pub fn update<H: Host + ?Sized>(
        &mut self,
        module: Option<&ModuleExports>,
        host: &mut H,
        scheduler: &Scheduler,
    ) -> Result<(), UpdateError> {
        let Some(module) = module else {
            crate::debug!("hmr"; "update without a module");
            return Err(UpdateError::ModuleNotFound);
        };

        let mut failure = None;
        for entry in self.entries.values().filter(|e| e.module == module.path()) {
            let Some(decl) = module.get(&entry.name) else {
                crate::debug!("hmr"; "{} no longer exports {}", entry.module, entry.name);
                failure.get_or_insert_with(|| UpdateError::DeclarationRemoved {
                    name: entry.name.clone(),
                    module: entry.module.clone(),
                });
                continue;
            };
            for node in &entry.nodes {
                let outcome = self.update_node(node, decl, &mut *host, scheduler);
                crate::debug!("hmr"; "{}: {:?}", entry.name, outcome);
            }
        }

        failure.map_or(Ok(()), Err)
    }

    fn update_node<H: Host + ?Sized>(
        &self,
        node: &Rc<LiveNode>,
        decl: &Rc<Declaration>,
        host: &mut H,
        scheduler: &Scheduler,
    ) -> ReconcileOutcome {
        let old = node.instance();
        // diff against what is running, not against the last skipped edit
        let running = old.borrow().declaration().clone();
        let classification = if running.kind() == decl.kind() {
            self.classifier
                .classify(running.source(), decl.source(), decl.kind())
        } else {
            Classification::Structural
        };

        let snapshot = classification
            .is_render_only()
            .then(|| node.snapshot())
            .flatten();
        let new = Instance::construct(decl, snapshot.as_ref());
        let outcome = reconcile(&new, &old, classification, host);
        if matches!(outcome, ReconcileOutcome::Skipped(_)) {
            return outcome;
        }

        node.set_declaration(decl.clone());
        if !classification.is_render_only() {
            node.clear_snapshot();
        }
        node.instance_ref().redirect(new.clone());
        queue_publish(scheduler, node, &new);
        outcome
    }

    /// Drop every entry of `module`; returns the number of declarations
    /// removed.
    pub fn evict_module(&mut self, module: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.module != module);
        before - self.entries.len()
    }

    /// Nodes registered under `key`.
    pub fn nodes(&self, key: DeclarationKey) -> &[Rc<LiveNode>] {
        self.entries.get(&key).map_or(&[], |e| e.nodes.as_slice())
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = DeclarationKey> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::host::MemoryHost;
    use crate::runtime::value::Value;
    use crate::runtime::view::View;

    fn decl(name: &str, source: &str) -> Rc<Declaration> {
        Declaration::function("src/app.jsx", name, source)
            .state("n", || Value::from(0))
            .build(|_| View::element("div"))
    }

    fn node(decl: &Rc<Declaration>) -> Rc<LiveNode> {
        LiveNode::new(decl.clone(), Instance::construct(decl, None))
    }

    #[test]
    fn test_register_is_idempotent() {
        let a = decl("A", "function A() { return 1; }");
        let mut registry = InstanceRegistry::new();
        let n = node(&a);
        assert!(registry.register(n.clone()));
        assert!(!registry.register(n));
        assert!(registry.register(node(&a)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.nodes(a.key()).len(), 2);
    }

    #[test]
    fn test_update_without_module() {
        let a = decl("A", "function A() { return 1; }");
        let mut registry = InstanceRegistry::new();
        registry.register(node(&a));
        let mut host = MemoryHost::new();
        let scheduler = Scheduler::new();

        let err = registry.update(None, &mut host, &scheduler).unwrap_err();
        assert_eq!(err, UpdateError::ModuleNotFound);
        assert!(err.to_string().starts_with("module not found"));
        assert_eq!(host.mutations(), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_other_modules_are_untouched() {
        let a = decl("A", "function A() { return 1; }");
        let mut registry = InstanceRegistry::new();
        let n = node(&a);
        registry.register(n.clone());
        let before = n.instance();

        let other = ModuleExports::new("src/other.jsx");
        let mut host = MemoryHost::new();
        registry
            .update(Some(&other), &mut host, &Scheduler::new())
            .unwrap();
        assert!(Rc::ptr_eq(&before, &n.instance()));
    }

    #[test]
    fn test_declaration_is_reassigned_in_place() {
        let a = decl("A", "function A() { return 1; }");
        let a2 = decl("A", "function A() { return 2; }");
        let mut registry = InstanceRegistry::new();
        let n = node(&a);
        registry.register(n.clone());

        let module = ModuleExports::new("src/app.jsx").export(a2.clone());
        let mut host = MemoryHost::new();
        registry
            .update(Some(&module), &mut host, &Scheduler::new())
            .unwrap();
        assert!(Rc::ptr_eq(&n.declaration(), &a2));
        assert_eq!(registry.nodes(a.key()).len(), 1);
    }

    #[test]
    fn test_evict_module() {
        let mut registry = InstanceRegistry::new();
        registry.register(node(&decl("A", "")));
        registry.register(node(&decl("B", "")));
        let other = Declaration::function("src/other.jsx", "C", "").build(|_| View::text(""));
        registry.register(node(&other));

        assert_eq!(registry.evict_module("src/app.jsx"), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys().collect::<Vec<_>>(), [other.key()]);
    }
}
