//! Actor Coordinator - Wires up the Hot Update Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Wires up actors
//! - Runs them concurrently

mod runtime;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::hmr::HmrActor;
use super::messages::{HmrMsg, WsMsg};
use super::ws::WsActor;
use crate::config::HotpatchConfig;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<HotpatchConfig>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Create from Arc<HotpatchConfig>.
    pub fn with_config(config: Arc<HotpatchConfig>) -> Self {
        Self {
            config,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (hmr_tx, hmr_rx) = mpsc::channel::<HmrMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let serve = &self.config.serve;
        let port =
            crate::reload::server::start_ws_server_with_channel(serve.interface, serve.port, ws_tx.clone())?;
        if port != serve.port {
            crate::log!("serve"; "port {} is taken, using {}", serve.port, port);
        }
        crate::log!("serve"; "ws://{}:{}", serve.interface, port);

        let fs_actor = FsActor::new(
            watch_paths(&self.config),
            self.config.config_path.clone(),
            hmr_tx.clone(),
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
        let hmr_actor = HmrActor::new(hmr_rx, ws_tx.clone(), Arc::clone(&self.config));
        let ws_actor = WsActor::new(ws_rx);

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(fs_actor, hmr_actor, ws_actor, hmr_tx, ws_tx, shutdown_rx).await?;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

/// Watch roots plus the config file, when there is one.
fn watch_paths(config: &HotpatchConfig) -> Vec<PathBuf> {
    let mut paths = config.serve.watch.clone();
    if config.config_path.exists() && !paths.iter().any(|p| config.config_path.starts_with(p)) {
        paths.push(config.config_path.clone());
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_watch_paths_include_config_file() {
        let dir = TempDir::new().unwrap();
        let mut config = HotpatchConfig::default();
        config.serve.watch = vec![dir.path().join("src")];
        config.config_path = dir.path().join("hotpatch.toml");

        // no config file on disk
        assert_eq!(watch_paths(&config).len(), 1);

        fs::write(&config.config_path, "").unwrap();
        assert_eq!(watch_paths(&config).len(), 2);

        // already covered by a recursive root
        config.serve.watch = vec![dir.path().to_path_buf()];
        assert_eq!(watch_paths(&config), [dir.path().to_path_buf()]);
    }
}
