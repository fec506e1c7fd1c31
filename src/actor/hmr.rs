//! HMR Actor
//!
//! Turns changed component files into hot update messages:
//!
//! ```text
//! Changed(paths) -> ModuleCache::process -> update | invalidate | error
//! Removed(paths) -> invalidate (module not found)
//! ConfigChanged  -> reload hotpatch.toml, rebuild cache
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::messages::{HmrMsg, WsMsg};
use crate::config::{HotpatchConfig, cfg, reload_config};
use crate::logger::{Status, status};
use crate::reload::message::{ComponentUpdate, HotMessage};
use crate::reload::modules::{ModuleCache, ModuleChange};
use crate::runtime::UpdateError;

pub struct HmrActor {
    rx: mpsc::Receiver<HmrMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    config: Arc<HotpatchConfig>,
    cache: ModuleCache,
    /// Modules whose last save failed to parse
    failing: FxHashSet<String>,
}

impl HmrActor {
    pub fn new(
        rx: mpsc::Receiver<HmrMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        config: Arc<HotpatchConfig>,
    ) -> Self {
        let cache = ModuleCache::new(config.instrument_options());
        Self {
            rx,
            ws_tx,
            config,
            cache,
            failing: FxHashSet::default(),
        }
    }

    /// Scan every component file under the watch roots so the first save
    /// already has a baseline to compare against.
    pub fn prime(&mut self) -> usize {
        let roots = self.config.serve.watch.clone();
        for path in collect_sources(&roots, &self.cache) {
            let Ok(source) = std::fs::read_to_string(&path) else {
                continue;
            };
            let module = self.config.module_id(&path);
            if let ModuleChange::Failed { error } = self.cache.process(&module, &path, &source) {
                crate::log!("hmr"; "{}: {}", module, error);
            }
        }
        self.cache.len()
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let primed = self.prime();
        crate::debug!("hmr"; "primed {} modules", primed);

        while let Some(msg) = self.rx.recv().await {
            let sent = match msg {
                HmrMsg::Changed(paths) => self.handle_changed(&paths).await,
                HmrMsg::Removed(paths) => self.handle_removed(&paths).await,
                HmrMsg::ConfigChanged => {
                    self.handle_config();
                    Ok(())
                }
                HmrMsg::Shutdown => break,
            };
            if sent.is_err() {
                crate::debug!("hmr"; "ws actor gone, stopping");
                break;
            }
        }
    }

    async fn handle_changed(&mut self, paths: &[PathBuf]) -> Result<(), ()> {
        for path in paths {
            if !self.cache.accepts(path) {
                continue;
            }
            let Ok(source) = std::fs::read_to_string(path) else {
                crate::debug!("hmr"; "unreadable: {}", path.display());
                continue;
            };
            let module = self.config.module_id(path);
            let change = self.cache.process(&module, path, &source);
            self.dispatch(&module, path, change).await?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, module: &str, path: &Path, change: ModuleChange) -> Result<(), ()> {
        match change {
            ModuleChange::Unchanged => status(Status::Unchanged, &format!("unchanged: {module}")),
            ModuleChange::Added { components } => {
                crate::debug!("hmr"; "new module {} ({} components)", module, components);
            }
            ModuleChange::Update(components) => {
                self.clear_failure(module).await?;
                status(Status::Updated, &format!("hot update: {}", describe(module, &components)));
                self.send(HotMessage::update(module, components)).await?;
            }
            ModuleChange::Invalidate { reason } => {
                self.clear_failure(module).await?;
                status(Status::Reloading, &format!("reload {module}: {reason}"));
                self.send(HotMessage::invalidate(module, reason)).await?;
            }
            ModuleChange::Failed { error } => {
                self.failing.insert(module.to_string());
                status(Status::Failed, &format!("failed: {module}\n{error}"));
                let display = path.display().to_string();
                self.send(HotMessage::error(display, error.clone())).await?;
                self.send(HotMessage::invalidate(module, error)).await?;
            }
        }
        Ok(())
    }

    async fn handle_removed(&mut self, paths: &[PathBuf]) -> Result<(), ()> {
        for path in paths {
            let module = self.config.module_id(path);
            self.clear_failure(&module).await?;
            if self.cache.remove(&module) {
                let reason = UpdateError::ModuleNotFound.to_string();
                status(Status::Reloading, &format!("removed: {module}"));
                self.send(HotMessage::invalidate(module, reason)).await?;
            }
        }
        Ok(())
    }

    fn handle_config(&mut self) {
        match reload_config() {
            Ok(true) => {
                self.config = cfg();
                self.cache = ModuleCache::new(self.config.instrument_options());
                let primed = self.prime();
                crate::log!("hmr"; "config reloaded, {} modules rescanned", primed);
            }
            Ok(false) => crate::debug!("hmr"; "config unchanged"),
            Err(e) => status(Status::Failed, &format!("config reload failed\n{e:#}")),
        }
    }

    /// Clear the error overlay once the last failing module recovers.
    async fn clear_failure(&mut self, module: &str) -> Result<(), ()> {
        if self.failing.remove(module) && self.failing.is_empty() {
            self.send(HotMessage::ClearError).await?;
        }
        Ok(())
    }

    async fn send(&self, msg: HotMessage) -> Result<(), ()> {
        self.ws_tx.send(WsMsg::Send(msg)).await.map_err(|_| ())
    }
}

/// Gated component files under `roots`, sorted for a stable scan order.
fn collect_sources(roots: &[PathBuf], cache: &ModuleCache) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = roots
        .iter()
        .filter(|root| root.exists())
        .flat_map(|root| jwalk::WalkDir::new(root).skip_hidden(true))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| cache.accepts(path))
        .collect();
    sources.sort();
    sources.dedup();
    sources
}

/// `src/App.jsx (Counter render-only, Header structural)`
fn describe(module: &str, components: &[ComponentUpdate]) -> String {
    if components.is_empty() {
        return module.to_string();
    }
    let verdicts: Vec<_> = components
        .iter()
        .map(|c| format!("{} {}", c.name, c.classification))
        .collect();
    format!("{module} ({})", verdicts.join(", "))
}
