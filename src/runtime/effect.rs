//! Reactive effects and the scopes that own them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_EFFECT: AtomicU64 = AtomicU64::new(1);

/// A live reactive object.
///
/// Effects compare by identity: two handles are equal only when they point
/// at the same effect. An effect holds its subscription until disposed.
#[derive(Clone)]
pub struct Effect(Rc<EffectState>);

struct EffectState {
    id: u64,
    label: String,
    active: Cell<bool>,
}

impl Effect {
    pub fn new(label: impl Into<String>) -> Self {
        Self(Rc::new(EffectState {
            id: NEXT_EFFECT.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            active: Cell::new(true),
        }))
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.0.active.get()
    }

    /// Drop the subscription. Returns `false` if it was already disposed.
    pub fn dispose(&self) -> bool {
        self.0.active.replace(false)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Effect) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Effect(#{} {}", self.0.id, self.0.label)?;
        if !self.is_active() {
            f.write_str(", disposed")?;
        }
        f.write_str(")")
    }
}

/// The set of effects created by one instance.
#[derive(Debug, Default)]
pub struct EffectScope {
    effects: RefCell<Vec<Effect>>,
    disposed: Cell<bool>,
}

impl EffectScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `effect`. Effects added to a disposed scope are disposed at once.
    pub fn track(&self, effect: Effect) {
        if self.disposed.get() {
            effect.dispose();
        }
        self.effects.borrow_mut().push(effect);
    }

    /// Dispose every tracked effect; returns how many were still active.
    pub fn dispose(&self) -> usize {
        self.disposed.set(true);
        self.effects
            .borrow()
            .iter()
            .filter(|effect| effect.dispose())
            .count()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Number of effects still holding a subscription.
    pub fn active_count(&self) -> usize {
        self.effects.borrow().iter().filter(|e| e.is_active()).count()
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_identity() {
        let a = Effect::new("a");
        let b = Effect::new("a");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_scope_dispose() {
        let scope = EffectScope::new();
        let a = Effect::new("a");
        let b = Effect::new("b");
        b.dispose();
        scope.track(a.clone());
        scope.track(b);
        assert_eq!(scope.active_count(), 1);

        assert_eq!(scope.dispose(), 1);
        assert!(!a.is_active());
        assert_eq!(scope.active_count(), 0);
        // second dispose is a no-op
        assert_eq!(scope.dispose(), 0);
    }

    #[test]
    fn test_track_after_dispose() {
        let scope = EffectScope::new();
        scope.dispose();
        let late = Effect::new("late");
        scope.track(late.clone());
        assert!(!late.is_active());
    }
}
