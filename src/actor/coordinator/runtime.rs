use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::hmr::HmrActor;
use crate::actor::messages::{HmrMsg, WsMsg};
use crate::actor::ws::WsActor;

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    hmr: HmrActor,
    ws: WsActor,
    hmr_tx: mpsc::Sender<HmrMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let fs_handle = tokio::spawn(async move { fs.run().await });
    let hmr_handle = tokio::spawn(async move { hmr.run().await });
    let ws_handle = tokio::spawn(async move { ws.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = fs_handle => {}
            _ = hmr_handle => {}
        }
    }

    let _ = hmr_tx.send(HmrMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

    Ok(())
}
