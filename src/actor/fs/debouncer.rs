use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet period before a batch is handed to the HmrActor.
pub(super) const DEBOUNCE_MS: u64 = 300;

/// Collects notify events per path until the tree has been quiet for
/// [`DEBOUNCE_MS`].
pub(super) struct Debouncer {
    pub(super) pending: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

/// What a second event does to a path that already has a pending change.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Merge {
    Keep,
    Replace(ChangeKind),
    Cancel,
}

/// Combine a pending change with a newer one on the same path.
///
/// A save by delete + rename arrives as removed then created, and must
/// read as a change. A file created and deleted inside one window never
/// reaches the client.
pub(super) fn merge(pending: ChangeKind, incoming: ChangeKind) -> Merge {
    use ChangeKind::*;
    match (pending, incoming) {
        (Removed, Created | Modified) => Merge::Replace(incoming),
        (Modified, Removed) => Merge::Replace(Removed),
        (Created, Removed) => Merge::Cancel,
        _ => Merge::Keep,
    }
}

fn change_kind(kind: EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        // touch and chmod
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        _ => None,
    }
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            pending: FxHashMap::default(),
            last_event: None,
        }
    }

    pub(super) fn push(&mut self, event: &notify::Event) {
        let Some(kind) = change_kind(event.kind) else {
            return;
        };

        for path in event.paths.iter().filter(|p| !is_editor_artifact(p)) {
            let path = normalize_path(path);
            match self.pending.get(&path).map(|&pending| (pending, merge(pending, kind))) {
                None => {
                    crate::debug!("watch"; "{} {}", kind.label(), path.display());
                    self.pending.insert(path, kind);
                }
                Some((_, Merge::Keep)) => continue,
                Some((pending, Merge::Replace(next))) => {
                    crate::debug!("watch"; "{} -> {} {}", pending.label(), next.label(), path.display());
                    self.pending.insert(path, next);
                }
                Some((_, Merge::Cancel)) => {
                    crate::debug!("watch"; "created and removed {}", path.display());
                    self.pending.remove(&path);
                }
            }
            self.last_event = Some(Instant::now());
        }
    }

    pub(super) fn is_settled(&self) -> bool {
        self.last_event
            .is_some_and(|at| at.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
            && !self.pending.is_empty()
    }

    /// The batch, once quiet; `None` while events are still arriving.
    pub(super) fn take_settled(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_settled() {
            return None;
        }
        self.last_event = None;
        let batch = std::mem::take(&mut self.pending);
        (!batch.is_empty()).then_some(batch)
    }

    /// How long the actor may sleep before the batch can settle.
    pub(super) fn next_wake(&self) -> Duration {
        match self.last_event {
            Some(at) => Duration::from_millis(DEBOUNCE_MS)
                .saturating_sub(at.elapsed())
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(86400),
        }
    }
}

/// Swap, backup and lock files editors write next to the real one.
pub(super) fn is_editor_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    name.starts_with('.')
        || name.ends_with('~')
        || matches!(ext, "swp" | "swo" | "swx" | "bak" | "tmp" | "orig")
}
