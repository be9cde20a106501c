use crate::{
    api::{execute, ExplorerApi},
    types::{AppEvent, FetchRequest},
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Fetch worker. Each request runs on its own task so a slow endpoint never
/// holds up the others; results come back tagged with the request's ticket
/// and the UI decides whether they are still current.
pub async fn run_fetcher<A>(
    api: Arc<A>,
    mut rx: UnboundedReceiver<FetchRequest>,
    tx: UnboundedSender<AppEvent>,
) -> Result<()>
where
    A: ExplorerApi + Send + Sync + ?Sized + 'static,
{
    log::info!("[ecashx][source] fetch worker started");
    while let Some(req) = rx.recv().await {
        let api = Arc::clone(&api);
        let tx = tx.clone();
        tokio::spawn(async move {
            log::debug!("[ecashx][source] {:?} -> {:?}", req.ticket, req.query);
            let result = execute(api.as_ref(), &req.query)
                .await
                .map_err(|e| {
                    log::warn!("[ecashx][source] {:?} failed: {e:#}", req.query);
                    format!("{e:#}")
                });
            let _ = tx.send(AppEvent::Loaded {
                ticket: req.ticket,
                result,
            });
        });
    }
    log::info!("[ecashx][source] request channel closed, fetch worker exiting");
    Ok(())
}
