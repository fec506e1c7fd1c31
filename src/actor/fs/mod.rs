//! FileSystem Actor
//!
//! Watches component roots and the config file, and sends debounced events
//! to the HmrActor.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (merge per path) → route (by kind) → HmrMsg
//! ```

use std::path::{Path, PathBuf};

use notify::RecommendedWatcher;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::HmrMsg;

// Per-path merging of notify events.
mod debouncer;
// Shared fs event types.
mod types;
// Roots that come and go.
mod watch_roots;


use debouncer::Debouncer;
use types::{ChangeKind, Routed};
use watch_roots::WatchRoots;

/// Turns notify events under the watch roots into `HmrMsg`s.
pub struct FsActor {
    /// Filled by the notify callback thread.
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    // dropping the watcher stops all watches
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    hmr_tx: mpsc::Sender<HmrMsg>,
    /// Routed as `ConfigChanged`, never as a component change.
    config_path: PathBuf,
}

impl FsActor {
    /// Start watching right away. Events that arrive while the HmrActor
    /// primes its cache wait in the notify channel.
    pub fn new(
        paths: Vec<PathBuf>,
        config_path: PathBuf,
        hmr_tx: mpsc::Sender<HmrMsg>,
    ) -> notify::Result<Self> {
        // notify is sync-only
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            hmr_tx,
            config_path,
        })
    }

    /// Debounce and forward until the HmrActor hangs up.
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let hmr_tx = self.hmr_tx;
        let config_path = self.config_path;
        let mut watcher = self.watcher;
        let mut watch_roots = self.watch_roots;
        let mut debouncer = Debouncer::new();

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Bridge the blocking notify channel into tokio
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.push(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.next_wake()) => {
                    watch_roots.reattach(&mut watcher);
                    let Some(raw) = debouncer.take_settled() else {
                        continue;
                    };
                    if send_routed(route(raw, &config_path), &hmr_tx).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Split raw events into component changes, removals and config changes.
fn route(raw: FxHashMap<PathBuf, ChangeKind>, config_path: &Path) -> Routed {
    let mut routed = Routed::default();
    for (path, kind) in raw {
        if path == config_path {
            routed.config_changed |= kind != ChangeKind::Removed;
            continue;
        }
        match kind {
            ChangeKind::Created | ChangeKind::Modified => routed.changed.push(path),
            ChangeKind::Removed => routed.removed.push(path),
        }
    }
    // HashMap order is arbitrary; keep messages stable
    routed.changed.sort();
    routed.removed.sort();
    routed
}

/// Forward routed events. Returns `Err(())` if the HmrActor shut down.
async fn send_routed(routed: Routed, hmr_tx: &mpsc::Sender<HmrMsg>) -> Result<(), ()> {
    if routed.is_empty() {
        return Ok(());
    }
    // Config first: it may change the extension gate for the files below
    if routed.config_changed {
        hmr_tx.send(HmrMsg::ConfigChanged).await.map_err(|_| ())?;
    }
    if !routed.removed.is_empty() {
        hmr_tx
            .send(HmrMsg::Removed(routed.removed))
            .await
            .map_err(|_| ())?;
    }
    if !routed.changed.is_empty() {
        hmr_tx
            .send(HmrMsg::Changed(routed.changed))
            .await
            .map_err(|_| ())?;
    }
    Ok(())
}
