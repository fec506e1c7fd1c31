use std::path::PathBuf;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Debounced file events, routed by kind
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Routed {
    pub(super) changed: Vec<PathBuf>,
    pub(super) removed: Vec<PathBuf>,
    pub(super) config_changed: bool,
}

impl Routed {
    pub(super) fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty() && !self.config_changed
    }
}
