use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use meshgraph_core::Msg;
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::config::SourceMode;

pub async fn run(sock_path: &str, source: Arc<SourceMode>) -> Result<()> {
    let listener =
        UnixListener::bind(sock_path).with_context(|| format!("bind UDS {sock_path}"))?;
    tracing::info!(sock_path, source = ?source, "meshgraph-agent listening");

    loop {
        let (stream, _addr) = listener.accept().await?;
        tracing::debug!("viewer connected");
        let source = Arc::clone(&source);
        tokio::spawn(async move {
            if let Err(e) = serve(stream, source).await {
                tracing::warn!(error = ?e, "viewer connection failed");
            }
        });
    }
}

async fn serve(stream: UnixStream, source: Arc<SourceMode>) -> Result<()> {
    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());

    while let Some(frame) = framed.next().await {
        let bytes = frame?;
        let msg: Msg = match serde_json::from_slice(&bytes) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable frame");
                continue;
            }
        };
        if let Some(reply) = respond(&source, msg) {
            framed.send(tokio_util::bytes::Bytes::from(serde_json::to_vec(&reply)?)).await?;
        }
    }
    Ok(())
}

pub fn respond(source: &SourceMode, msg: Msg) -> Option<Msg> {
    match msg {
        Msg::Hello { .. } => Some(Msg::Hello {
            version: env!("CARGO_PKG_VERSION").into(),
        }),
        Msg::Ping => Some(Msg::Pong),
        Msg::RequestSnapshot => Some(match source.load() {
            Ok(state) => Msg::Snapshot { state },
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "snapshot unavailable");
                Msg::Error {
                    message: format!("{e:#}"),
                }
            }
        }),
        _ => None,
    }
}
