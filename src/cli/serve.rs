//! `hotpatch serve`: watch sources and push hot updates.

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;

use crate::actor::Coordinator;
use crate::config::HotpatchConfig;
use crate::core::register_shutdown;
use crate::log;

/// Run the watcher and WebSocket server until Ctrl+C.
pub fn serve(config: Arc<HotpatchConfig>) -> Result<()> {
    if !config.build.mode.is_dev() {
        log!("warning"; "serving in {} mode, hot updates are disabled in transformed output", config.build.mode.name());
    }
    for root in config.serve.watch.iter().filter(|root| !root.exists()) {
        log!("warning"; "watch root {} does not exist", root.display());
    }

    let (shutdown_tx, shutdown_rx) = channel::bounded(1);
    register_shutdown(shutdown_tx);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(
        Coordinator::with_config(config)
            .with_shutdown_signal(shutdown_rx)
            .run(),
    )
}
