//! Live instantiation records.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::instance::SharedInstance;
use super::module::Declaration;
use super::scheduler::Scheduler;
use super::snapshot::StateSnapshot;

/// Shared reference cell handed to code holding on to "this instance".
///
/// Cloning shares the cell; [`redirect`](Self::redirect) moves every holder
/// to the replacement at once.
#[derive(Clone)]
pub struct InstanceRef(Rc<RefCell<SharedInstance>>);

impl InstanceRef {
    pub fn new(instance: SharedInstance) -> Self {
        Self(Rc::new(RefCell::new(instance)))
    }

    pub fn get(&self) -> SharedInstance {
        self.0.borrow().clone()
    }

    pub fn redirect(&self, instance: SharedInstance) {
        *self.0.borrow_mut() = instance;
    }

    pub fn points_to(&self, instance: &SharedInstance) -> bool {
        Rc::ptr_eq(&self.0.borrow(), instance)
    }
}

impl fmt::Debug for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceRef({})", self.0.borrow().borrow().id())
    }
}

/// One mounted occurrence of a declaration, kept across hot updates.
///
/// The declaration is reassigned in place on every update, so holders of
/// the record stay valid across reloads.
pub struct LiveNode {
    declaration: RefCell<Rc<Declaration>>,
    instance: InstanceRef,
    snapshot: RefCell<Option<StateSnapshot>>,
}

impl LiveNode {
    pub fn new(declaration: Rc<Declaration>, instance: SharedInstance) -> Rc<Self> {
        Rc::new(Self {
            declaration: RefCell::new(declaration),
            instance: InstanceRef::new(instance),
            snapshot: RefCell::new(None),
        })
    }

    pub fn declaration(&self) -> Rc<Declaration> {
        self.declaration.borrow().clone()
    }

    pub fn instance(&self) -> SharedInstance {
        self.instance.get()
    }

    pub fn instance_ref(&self) -> InstanceRef {
        self.instance.clone()
    }

    /// Last published state snapshot.
    pub fn snapshot(&self) -> Option<StateSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub(super) fn set_declaration(&self, declaration: Rc<Declaration>) {
        *self.declaration.borrow_mut() = declaration;
    }

    pub(super) fn clear_snapshot(&self) {
        self.snapshot.borrow_mut().take();
    }

    pub(super) fn publish(&self, snapshot: StateSnapshot) {
        *self.snapshot.borrow_mut() = Some(snapshot);
    }
}

impl fmt::Debug for LiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveNode")
            .field("declaration", &self.declaration.borrow().name())
            .field("instance", &self.instance)
            .field("snapshot", &self.snapshot.borrow().is_some())
            .finish()
    }
}

/// Queue publication of `instance`'s state on `node`.
///
/// Runs after the constructing step completes. A publish for an instance
/// the node no longer points at is dropped.
pub(super) fn queue_publish(scheduler: &Scheduler, node: &Rc<LiveNode>, instance: &SharedInstance) {
    if !instance.borrow().declaration().has_state() {
        return;
    }
    let node = node.clone();
    let instance = instance.clone();
    scheduler.queue(move || {
        if node.instance.points_to(&instance) {
            node.publish(instance.borrow().snapshot());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::instance::Instance;
    use crate::runtime::value::Value;
    use crate::runtime::view::View;

    fn decl() -> Rc<Declaration> {
        Declaration::function("m", "Counter", "")
            .state("count", || Value::from(0))
            .build(|_| View::text(""))
    }

    #[test]
    fn test_redirect_is_seen_by_holders() {
        let decl = decl();
        let first = Instance::construct(&decl, None);
        let node = LiveNode::new(decl.clone(), first.clone());
        let holder = node.instance_ref();

        let second = Instance::construct(&decl, None);
        node.instance_ref().redirect(second.clone());
        assert!(holder.points_to(&second));
        assert!(Rc::ptr_eq(&node.instance(), &second));
    }

    #[test]
    fn test_publish_is_deferred() {
        let decl = decl();
        let inst = Instance::construct(&decl, None);
        let node = LiveNode::new(decl, inst.clone());
        let scheduler = Scheduler::new();

        queue_publish(&scheduler, &node, &inst);
        assert!(node.snapshot().is_none());
        scheduler.flush();
        assert_eq!(node.snapshot().and_then(|s| s.get("count")), Some(Value::from(0)));
    }

    #[test]
    fn test_stale_publish_is_dropped() {
        let decl = decl();
        let first = Instance::construct(&decl, None);
        let node = LiveNode::new(decl.clone(), first.clone());
        let scheduler = Scheduler::new();
        queue_publish(&scheduler, &node, &first);

        node.instance_ref().redirect(Instance::construct(&decl, None));
        scheduler.flush();
        assert!(node.snapshot().is_none());
    }

    #[test]
    fn test_stateless_declaration_publishes_nothing() {
        let decl = Declaration::function("m", "Static", "").build(|_| View::text(""));
        let inst = Instance::construct(&decl, None);
        let node = LiveNode::new(decl, inst.clone());
        let scheduler = Scheduler::new();
        queue_publish(&scheduler, &node, &inst);
        assert_eq!(scheduler.pending(), 0);
    }
}
