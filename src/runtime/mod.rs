//! Hot-update runtime.
//!
//! Single-threaded model of the framework side of a hot update:
//!
//! - [`InstanceRegistry`]: declaration key -> live nodes
//! - [`reconcile`]: soft update or hard remount of one instance
//! - [`Host`]: the UI tree, treated as a black box
//! - [`Scheduler`]: deferred work such as state snapshot publication
//!
//! [`HotRuntime`] bundles the three stateful parts and exposes the
//! operations a reload transport needs.

mod effect;
mod host;
mod instance;
mod module;
mod node;
mod reconcile;
mod registry;
mod scheduler;
mod snapshot;
mod value;
mod view;

use std::rc::Rc;

pub use effect::{Effect, EffectScope};
pub use host::{Host, MemoryHost, MemoryKind, NodeId};
pub use instance::{Instance, Lifecycle, SharedInstance, Slot};
pub use module::{BuildFn, Declaration, DeclarationBuilder, FieldInit, FieldKind, FieldSpec, ModuleExports};
pub use node::{InstanceRef, LiveNode};
pub use reconcile::{ReconcileOutcome, SkipReason, reconcile};
pub use registry::{InstanceRegistry, UpdateError};
pub use scheduler::{Scheduler, Task};
pub use snapshot::StateSnapshot;
pub use value::Value;
pub use view::View;

use crate::classify::Classifier;

/// Registry, scheduler and host tree of one running application.
#[derive(Debug)]
pub struct HotRuntime<H: Host> {
    registry: InstanceRegistry,
    scheduler: Scheduler,
    host: H,
}

impl<H: Host> HotRuntime<H> {
    pub fn new(host: H) -> Self {
        Self::with_classifier(host, Classifier::default())
    }

    pub fn with_classifier(host: H, classifier: Classifier) -> Self {
        Self {
            registry: InstanceRegistry::with_classifier(classifier),
            scheduler: Scheduler::new(),
            host,
        }
    }

    /// Instantiate `decl` and append it to `container`.
    ///
    /// The node is registered before its state is initialized, and its
    /// snapshot is published on the next [`flush`](Self::flush).
    pub fn mount(&mut self, decl: &Rc<Declaration>, container: NodeId) -> Rc<LiveNode> {
        let instance = Instance::construct(decl, None);
        let node = LiveNode::new(decl.clone(), instance.clone());
        self.registry.register(node.clone());
        node::queue_publish(&self.scheduler, &node, &instance);
        Instance::mount(&instance, &mut self.host, container);
        node
    }

    /// Unmount a node's current instance. The node stays registered.
    pub fn unmount(&mut self, node: &LiveNode) {
        node.instance().borrow_mut().unmount(&mut self.host);
    }

    /// Apply a reloaded module, then run deferred work.
    ///
    /// An error means the caller must fall back to a full reload of the
    /// module; its `Display` text says why.
    pub fn apply(&mut self, module: Option<&ModuleExports>) -> Result<(), UpdateError> {
        let result = self
            .registry
            .update(module, &mut self.host, &self.scheduler);
        self.scheduler.flush();
        result
    }

    /// Forget every declaration of an unloaded module.
    pub fn unload(&mut self, module: &str) -> usize {
        self.registry.evict_module(module)
    }

    /// Run deferred work; returns the number of tasks run.
    pub fn flush(&self) -> usize {
        self.scheduler.flush()
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
