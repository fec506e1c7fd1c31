//! Reconciler
//!
//! Moves a live component from its old instance to a freshly constructed
//! one, either in place (soft update) or by unmounting and mounting again
//! (hard remount).

use std::fmt;

use super::host::Host;
use super::instance::{Instance, Lifecycle, SharedInstance};
use super::module::FieldKind;
use crate::core::Classification;

/// Why a hard remount did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The old instance is not mounted.
    Inactive,
    /// The old instance's root has no parent to remount into.
    MissingMountTarget,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inactive => "instance is not active",
            Self::MissingMountTarget => "no mount target",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    SoftUpdated,
    Remounted,
    Skipped(SkipReason),
}

/// Move from `old` to `new` according to `classification`.
pub fn reconcile<H: Host + ?Sized>(
    new: &SharedInstance,
    old: &SharedInstance,
    classification: Classification,
    host: &mut H,
) -> ReconcileOutcome {
    match classification {
        Classification::RenderOnly => soft_update(new, old, host),
        Classification::Structural => hard_remount(new, old, host),
    }
}

/// Keep the old subtree and state, swap in the new declaration's logic.
fn soft_update<H: Host + ?Sized>(
    new: &SharedInstance,
    old: &SharedInstance,
    host: &mut H,
) -> ReconcileOutcome {
    let (root, view, anchor, lifecycle) = {
        let mut old = old.borrow_mut();
        // effects go first; the subtree stays where it is
        old.scope().dispose();

        {
            let new = new.borrow();
            for (name, slot) in new.fields() {
                if slot.kind() != FieldKind::State {
                    continue;
                }
                let Some(prev) = old.slot(name) else {
                    continue;
                };
                let value = prev.get();
                if !value.contains_effect() {
                    slot.set(value);
                }
            }
        }

        let lifecycle = old.lifecycle();
        let (root, view, anchor) = old.take_rendered();
        old.set_lifecycle(Lifecycle::Unmounted);
        (root, view, anchor, lifecycle)
    };

    {
        let mut inst = new.borrow_mut();
        inst.set_rendered(root, view);
        inst.set_anchor(anchor);
        inst.set_lifecycle(lifecycle);
    }
    Instance::repoint(new);

    let next = Instance::render_view(new);
    let mut inst = new.borrow_mut();
    let patched = match (inst.root(), inst.view()) {
        (Some(root), Some(prev)) => Some(host.patch(root, prev, &next)),
        _ => None,
    };
    let root = patched.or(inst.root());
    inst.set_rendered(root, Some(next));

    crate::debug!("hmr"; "soft update of {}", inst.declaration().name());
    ReconcileOutcome::SoftUpdated
}

/// Replace the old instance with a fresh mount at the same position.
fn hard_remount<H: Host + ?Sized>(
    new: &SharedInstance,
    old: &SharedInstance,
    host: &mut H,
) -> ReconcileOutcome {
    let name = new.borrow().declaration().name().to_string();

    let target = {
        let old = old.borrow();
        if !old.is_active() {
            Err(SkipReason::Inactive)
        } else {
            old.root()
                .and_then(|r| host.parent(r).map(|p| (r, p)))
                .ok_or(SkipReason::MissingMountTarget)
        }
    };
    let (root, parent) = match target {
        Ok(target) => target,
        Err(reason) => {
            // the new instance is discarded, so are its effects
            new.borrow().scope().dispose();
            crate::debug!("hmr"; "skipped remount of {}: {}", name, reason);
            return ReconcileOutcome::Skipped(reason);
        }
    };

    let placeholder = host.create_placeholder();
    host.insert_before(parent, placeholder, Some(root));

    old.borrow_mut().unmount(&mut *host);

    let view = Instance::render_view(new);
    let fresh = host.render(&view);
    host.replace_child(parent, fresh, placeholder);

    {
        let mut inst = new.borrow_mut();
        inst.set_rendered(Some(fresh), Some(view));
        inst.set_anchor(Some(parent));
        inst.set_lifecycle(Lifecycle::Active);
    }
    Instance::repoint(new);

    crate::debug!("hmr"; "remounted {}", name);
    ReconcileOutcome::Remounted
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::runtime::host::MemoryHost;
    use crate::runtime::module::Declaration;
    use crate::runtime::value::Value;
    use crate::runtime::view::View;
    use crate::runtime::Effect;

    fn counter(label: &'static str, default: i32) -> Rc<crate::runtime::Declaration> {
        Declaration::function("m", "Counter", "")
            .state("count", move || Value::from(default))
            .state("handle", || Value::Null)
            .effect("ticker")
            .intrinsic("props", || Value::from("fresh"))
            .build(move |inst| {
                let count = inst.get("count").unwrap_or(Value::Null);
                View::element("button").child(View::text(format!("{label}{count}")))
            })
    }

    fn mounted(host: &mut MemoryHost) -> (SharedInstance, crate::runtime::NodeId) {
        let container = host.create_container();
        let inst = Instance::construct(&counter("", 0), None);
        Instance::mount(&inst, &mut *host, container);
        inst.borrow().set("count", 3);
        (inst, container)
    }

    #[test]
    fn test_soft_update_keeps_state_and_subtree() {
        let mut host = MemoryHost::new();
        let (old, container) = mounted(&mut host);
        let old_root = old.borrow().root().unwrap();
        let old_effects = old.borrow().effects();

        old.borrow().set("props", "stale");

        let new = Instance::construct(&counter("Clicked ", 0), None);
        let outcome = reconcile(&new, &old, Classification::RenderOnly, &mut host);
        assert_eq!(outcome, ReconcileOutcome::SoftUpdated);

        let inst = new.borrow();
        assert_eq!(inst.get("count"), Some(Value::from(3)));
        assert_eq!(inst.root(), Some(old_root));
        assert_eq!(host.children(container), &[old_root]);
        assert_eq!(host.text_content(container), "Clicked 3");
        assert!(inst.is_active());
        assert!(Rc::ptr_eq(&inst.self_ref().unwrap(), &new));

        // old effects disposed, none carried over by identity
        assert!(old_effects.iter().all(|e| !e.is_active()));
        for effect in inst.effects() {
            assert!(effect.is_active());
            assert!(!old_effects.contains(&effect));
        }
        // intrinsic fields are not copied
        assert_eq!(inst.get("props"), Some(Value::from("fresh")));
        assert_eq!(old.borrow().lifecycle(), Lifecycle::Unmounted);
    }

    #[test]
    fn test_soft_update_skips_effect_values_in_state() {
        let mut host = MemoryHost::new();
        let (old, _) = mounted(&mut host);
        let stray = Effect::new("subscription");
        old.borrow().set("handle", stray.clone());

        let new = Instance::construct(&counter("", 0), None);
        reconcile(&new, &old, Classification::RenderOnly, &mut host);
        assert_eq!(new.borrow().get("handle"), Some(Value::Null));
        assert!(!new.borrow().effects().contains(&stray));
    }

    #[test]
    fn test_hard_remount_replaces_root() {
        let mut host = MemoryHost::new();
        let (old, container) = mounted(&mut host);
        let old_root = old.borrow().root().unwrap();

        let new = Instance::construct(&counter("", 10), None);
        let outcome = reconcile(&new, &old, Classification::Structural, &mut host);
        assert_eq!(outcome, ReconcileOutcome::Remounted);

        let new_root = new.borrow().root().unwrap();
        assert_ne!(new_root, old_root);
        assert_eq!(host.children(container), &[new_root]);
        assert!(!host.contains(old_root));
        assert_eq!(host.text_content(container), "10");

        let old = old.borrow();
        assert_eq!(old.lifecycle(), Lifecycle::Unmounted);
        assert_eq!(old.scope().active_count(), 0);
        assert!(new.borrow().is_active());
    }

    #[test]
    fn test_hard_remount_keeps_sibling_position() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let before = host.render(&View::text("a"));
        host.insert_before(container, before, None);
        let old = Instance::construct(&counter("", 0), None);
        Instance::mount(&old, &mut host, container);
        let after = host.render(&View::text("z"));
        host.insert_before(container, after, None);

        let new = Instance::construct(&counter("", 0), None);
        reconcile(&new, &old, Classification::Structural, &mut host);
        let new_root = new.borrow().root().unwrap();
        assert_eq!(host.children(container), &[before, new_root, after]);
    }

    #[test]
    fn test_hard_remount_of_inactive_instance_is_noop() {
        let mut host = MemoryHost::new();
        let (old, _) = mounted(&mut host);
        old.borrow_mut().unmount(&mut host);
        let before = host.mutations();

        let new = Instance::construct(&counter("", 0), None);
        let outcome = reconcile(&new, &old, Classification::Structural, &mut host);
        assert_eq!(outcome, ReconcileOutcome::Skipped(SkipReason::Inactive));
        assert_eq!(host.mutations(), before);
        assert_eq!(new.borrow().lifecycle(), Lifecycle::Created);
        assert!(new.borrow().scope().is_disposed());
        assert!(new.borrow().effects().iter().all(|e| !e.is_active()));
    }

    #[test]
    fn test_hard_remount_without_parent_is_skipped() {
        let mut host = MemoryHost::new();
        let (old, container) = mounted(&mut host);
        let root = old.borrow().root().unwrap();
        // detach the root behind the runtime's back
        let other = host.create_container();
        host.replace_child(container, other, root);
        let before = host.mutations();

        let new = Instance::construct(&counter("", 0), None);
        let outcome = reconcile(&new, &old, Classification::Structural, &mut host);
        assert_eq!(outcome, ReconcileOutcome::Skipped(SkipReason::MissingMountTarget));
        assert_eq!(host.mutations(), before);
        assert!(old.borrow().is_active());
        assert_eq!(new.borrow().scope().active_count(), 0);
        assert!(old.borrow().effects().iter().all(|e| e.is_active()));
    }
}
