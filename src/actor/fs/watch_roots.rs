use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// The configured watch roots and whether notify currently holds each.
///
/// A root that is deleted loses its watch with it; it is picked up again
/// once it reappears.
pub(super) struct WatchRoots {
    roots: Vec<(PathBuf, bool)>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            roots: paths.into_iter().map(|p| (p, false)).collect(),
        }
    }

    /// Watch every root that exists now. Failing to watch an existing root
    /// is fatal at startup.
    pub(super) fn attach(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for (path, attached) in &mut self.roots {
            if !path.exists() {
                crate::log!("watch"; "{} does not exist yet, waiting for it", path.display());
                continue;
            }
            watcher.watch(path, mode(path))?;
            *attached = true;
        }
        Ok(())
    }

    /// Forget deleted roots and watch the ones that came back.
    pub(super) fn reattach(&mut self, watcher: &mut RecommendedWatcher) {
        for (path, attached) in &mut self.roots {
            let exists = path.exists();
            if *attached {
                *attached = exists;
                continue;
            }
            if exists && watcher.watch(path, mode(path)).is_ok() {
                *attached = true;
                crate::debug!("watch"; "watching {} again", path.display());
            }
        }
    }

    #[cfg(test)]
    pub(super) fn attached(&self) -> usize {
        self.roots.iter().filter(|(_, a)| *a).count()
    }
}

/// Source directories recursively, the config file by itself.
fn mode(path: &Path) -> RecursiveMode {
    if path.is_dir() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    }
}
