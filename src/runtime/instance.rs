//! Component instances.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::effect::{Effect, EffectScope};
use super::host::{Host, NodeId};
use super::module::{Declaration, FieldKind};
use super::snapshot::StateSnapshot;
use super::value::Value;
use super::view::View;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

pub type SharedInstance = Rc<RefCell<Instance>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Active,
    Unmounted,
}

/// Storage of one field. The slot is shared with published snapshots.
#[derive(Debug, Clone)]
pub struct Slot {
    kind: FieldKind,
    value: Rc<RefCell<Value>>,
}

impl Slot {
    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn get(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: Value) -> Value {
        self.value.replace(value)
    }
}

/// One runtime occurrence of a declaration.
pub struct Instance {
    id: u64,
    declaration: Rc<Declaration>,
    fields: IndexMap<String, Slot>,
    scope: EffectScope,
    root: Option<NodeId>,
    view: Option<View>,
    anchor: Option<NodeId>,
    lifecycle: Lifecycle,
    this: Weak<RefCell<Instance>>,
}

impl Instance {
    /// Construct an instance, the way instrumented component code does:
    /// state fields read the snapshot first and fall back to their
    /// initializer, effects are created fresh in a new scope.
    pub fn construct(decl: &Rc<Declaration>, snapshot: Option<&StateSnapshot>) -> SharedInstance {
        let scope = EffectScope::new();
        let mut fields = IndexMap::with_capacity(decl.fields().len());

        for spec in decl.fields() {
            let value = match spec.kind {
                FieldKind::State => snapshot
                    .and_then(|s| s.get(&spec.name))
                    .filter(|v| !v.contains_effect())
                    .unwrap_or_else(|| (spec.init)()),
                FieldKind::Effect => {
                    let effect = Effect::new(format!("{}.{}", decl.name(), spec.name));
                    scope.track(effect.clone());
                    Value::Effect(effect)
                }
                FieldKind::Intrinsic => (spec.init)(),
            };
            fields.insert(
                spec.name.clone(),
                Slot {
                    kind: spec.kind,
                    value: Rc::new(RefCell::new(value)),
                },
            );
        }

        Rc::new_cyclic(|this| {
            RefCell::new(Instance {
                id: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
                declaration: decl.clone(),
                fields,
                scope,
                root: None,
                view: None,
                anchor: None,
                lifecycle: Lifecycle::Created,
                this: this.clone(),
            })
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn declaration(&self) -> &Rc<Declaration> {
        &self.declaration
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.fields.get(name)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.get(name).map(Slot::get)
    }

    /// Set field `name`; returns `false` when the field is not declared.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        match self.fields.get(name) {
            Some(slot) => {
                slot.set(value.into());
                true
            }
            None => false,
        }
    }

    /// Every effect currently held in a field.
    pub fn effects(&self) -> Vec<Effect> {
        let mut out = Vec::new();
        for slot in self.fields.values() {
            collect_effects(&slot.value.borrow(), &mut out);
        }
        out
    }

    #[inline]
    pub fn scope(&self) -> &EffectScope {
        &self.scope
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    /// Container the instance was mounted into.
    #[inline]
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// The instance's reference to itself.
    pub fn self_ref(&self) -> Option<SharedInstance> {
        self.this.upgrade()
    }

    /// Live getters over every state field.
    pub fn snapshot(&self) -> StateSnapshot {
        let mut snapshot = StateSnapshot::new();
        for (name, slot) in &self.fields {
            if slot.kind == FieldKind::State {
                snapshot.expose(name.clone(), slot.value.clone());
            }
        }
        snapshot
    }

    /// Run the declaration's build function.
    pub fn render_view(this: &SharedInstance) -> View {
        let inst = this.borrow();
        let decl = inst.declaration.clone();
        decl.build(&inst)
    }

    /// Render and append to `container`.
    pub fn mount<H: Host + ?Sized>(this: &SharedInstance, host: &mut H, container: NodeId) -> NodeId {
        let view = Self::render_view(this);
        let root = host.render(&view);
        host.insert_before(container, root, None);

        let mut inst = this.borrow_mut();
        inst.root = Some(root);
        inst.view = Some(view);
        inst.anchor = Some(container);
        inst.lifecycle = Lifecycle::Active;
        root
    }

    /// Dispose effects and remove the rendered subtree.
    pub fn unmount<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.scope.dispose();
        if let Some(root) = self.root.take() {
            host.remove(root);
        }
        self.view = None;
        self.lifecycle = Lifecycle::Unmounted;
    }

    pub(super) fn fields(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(super) fn set_rendered(&mut self, root: Option<NodeId>, view: Option<View>) {
        self.root = root;
        self.view = view;
    }

    pub(super) fn take_rendered(&mut self) -> (Option<NodeId>, Option<View>, Option<NodeId>) {
        (self.root.take(), self.view.take(), self.anchor)
    }

    pub(super) fn set_anchor(&mut self, anchor: Option<NodeId>) {
        self.anchor = anchor;
    }

    pub(super) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    pub(super) fn repoint(this: &SharedInstance) {
        this.borrow_mut().this = Rc::downgrade(this);
    }
}

fn collect_effects(value: &Value, out: &mut Vec<Effect>) {
    match value {
        Value::Effect(e) => out.push(e.clone()),
        Value::List(items) => items.iter().for_each(|v| collect_effects(v, out)),
        _ => {}
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("declaration", &self.declaration.name())
            .field("lifecycle", &self.lifecycle)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::host::MemoryHost;

    fn counter() -> Rc<Declaration> {
        Declaration::function("m", "Counter", "")
            .state("count", || Value::from(0))
            .effect("ticker")
            .intrinsic("props", || Value::Null)
            .build(|inst| {
                let count = inst.get("count").unwrap_or(Value::Null);
                View::element("button").child(View::text(count.to_string()))
            })
    }

    #[test]
    fn test_construct_defaults() {
        let inst = Instance::construct(&counter(), None);
        let inst = inst.borrow();
        assert_eq!(inst.get("count"), Some(Value::from(0)));
        assert_eq!(inst.effects().len(), 1);
        assert_eq!(inst.scope().active_count(), 1);
        assert_eq!(inst.lifecycle(), Lifecycle::Created);
        assert!(inst.self_ref().is_some());
    }

    #[test]
    fn test_construct_restores_snapshot() {
        let old = Instance::construct(&counter(), None);
        old.borrow().set("count", 5);
        let snapshot = old.borrow().snapshot();
        let new = Instance::construct(&counter(), Some(&snapshot));
        assert_eq!(new.borrow().get("count"), Some(Value::from(5)));
        // effects are never restored
        assert_ne!(old.borrow().effects(), new.borrow().effects());
    }

    #[test]
    fn test_snapshot_only_exposes_state() {
        let inst = Instance::construct(&counter(), None);
        let snapshot = inst.borrow().snapshot();
        assert_eq!(snapshot.names().collect::<Vec<_>>(), ["count"]);
    }

    #[test]
    fn test_mount_and_unmount() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let inst = Instance::construct(&counter(), None);
        let root = Instance::mount(&inst, &mut host, container);
        assert_eq!(host.children(container), &[root]);
        assert_eq!(host.text_content(root), "0");
        assert!(inst.borrow().is_active());

        inst.borrow_mut().unmount(&mut host);
        let inst = inst.borrow();
        assert_eq!(inst.lifecycle(), Lifecycle::Unmounted);
        assert_eq!(inst.scope().active_count(), 0);
        assert!(host.children(container).is_empty());
    }

    #[test]
    fn test_set_unknown_field() {
        let inst = Instance::construct(&counter(), None);
        assert!(!inst.borrow().set("nope", 1));
    }
}
