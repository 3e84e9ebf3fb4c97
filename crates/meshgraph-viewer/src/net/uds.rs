use crate::net::Incoming;
use anyhow::{bail, Context, Result};
use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use meshgraph_core::{MeshState, Msg};
use std::time::Duration;
use tokio::net::UnixStream;
use tokio::time::MissedTickBehavior;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub fn spawn_poller(sock_path: String, interval: Duration, tx: Sender<Incoming>) {
    std::thread::Builder::new()
        .name("meshgraph-poller".into())
        .spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            rt.block_on(poll_loop(sock_path, interval, tx));
        })
        .expect("spawn poller thread");
}

async fn poll_loop(sock_path: String, interval: Duration, tx: Sender<Incoming>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let inc = match fetch_snapshot(&sock_path).await {
            Ok(state) => Incoming::Snapshot(state),
            Err(e) => {
                tracing::warn!(socket = %sock_path, error = %format!("{e:#}"), "snapshot fetch failed");
                Incoming::failed(&e)
            }
        };
        if tx.send(inc).is_err() {
            tracing::debug!("viewer gone, poller exiting");
            return;
        }
    }
}

/// One request/reply exchange with the agent.
pub async fn fetch_snapshot(sock_path: &str) -> Result<MeshState> {
    tokio::time::timeout(FETCH_TIMEOUT, exchange(sock_path))
        .await
        .with_context(|| format!("snapshot request to {sock_path} timed out"))?
}

async fn exchange(sock_path: &str) -> Result<MeshState> {
    let stream = UnixStream::connect(sock_path)
        .await
        .with_context(|| format!("connect UDS {sock_path}"))?;
    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());

    framed
        .send(tokio_util::bytes::Bytes::from(serde_json::to_vec(&Msg::RequestSnapshot)?))
        .await
        .context("send snapshot request")?;

    let Some(frame) = framed.next().await else {
        bail!("agent closed the connection without replying");
    };
    let bytes = frame.context("read reply frame")?;
    match serde_json::from_slice::<Msg>(&bytes).context("decode reply")? {
        Msg::Snapshot { state } => Ok(state),
        Msg::Error { message } => bail!("agent error: {message}"),
        other => bail!("unexpected reply: {other:?}"),
    }
}
