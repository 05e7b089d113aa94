//! Client sessions over newline-delimited JSON.
//!
//! Each connection gets its own [`Overlay`]. Request lines are dispatched to
//! the overlay's command handlers; every highlight message the overlay emits
//! is written back as one JSON line. The topology and load sources are
//! shared by all sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use linkwatch_overlay::{dispatch, LoadSource, Output, Overlay, Request, TopologySource};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::settings::Settings;

/// Per-session overlay configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub period: Duration,
    pub threshold_kbps: u64,
    pub channel_buffer: usize,
}

impl From<&Settings> for SessionOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            period: settings.period(),
            threshold_kbps: settings.threshold_kbps,
            channel_buffer: settings.channel_buffer,
        }
    }
}

/// Accepts connections and runs one session per client.
#[derive(Debug, Clone)]
pub struct Server {
    topology: Arc<dyn TopologySource>,
    loads: Arc<dyn LoadSource>,
    options: SessionOptions,
}

impl Server {
    pub fn new(
        topology: Arc<dyn TopologySource>,
        loads: Arc<dyn LoadSource>,
        options: SessionOptions,
    ) -> Self {
        Self {
            topology,
            loads,
            options,
        }
    }

    /// Accept clients until the listener fails.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        info!("Listening on {}", listener.local_addr()?);
        loop {
            let (stream, peer) = listener.accept().await.context("Accept failed")?;
            if let Err(e) = stream.set_nodelay(true) {
                debug!("{}: unable to set TCP_NODELAY: {}", peer, e);
            }
            let server = self.clone();
            tokio::spawn(async move {
                info!("Client {} connected", peer);
                if let Err(e) = server.run_session(stream, peer).await {
                    warn!("Session {} ended with error: {:#}", peer, e);
                }
                info!("Client {} disconnected", peer);
            });
        }
    }

    /// Run a single session to completion.
    ///
    /// Returns when the client closes its side of the stream or reading from
    /// it fails. The overlay is stopped before returning in both cases.
    /// Lines that are not UTF-8 or not a valid request are logged and skipped.
    pub async fn run_session<S>(&self, stream: S, peer: SocketAddr) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let (output, mut rx) = Output::channel(self.options.channel_buffer);

        let overlay = Overlay::builder()
            .topology(self.topology.clone())
            .loads(self.loads.clone())
            .output(output)
            .period(self.options.period)
            .threshold_kbps(self.options.threshold_kbps)
            .build()?;

        let writer_task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let mut line = serde_json::to_vec(&message)?;
                line.push(b'\n');
                writer.write_all(&line).await?;
            }
            writer.shutdown().await?;
            Ok::<_, anyhow::Error>(())
        });

        let read_result = read_requests(BufReader::new(reader), &overlay, peer).await;

        debug!("{}: end of input, stopping overlay", peer);
        if let Err(e) = overlay.stop().await {
            warn!("{}: unable to stop overlay: {}", peer, e);
        }
        drop(overlay);

        writer_task.await??;
        read_result
    }
}

/// Dispatch request lines until end of input.
async fn read_requests<R>(mut reader: R, overlay: &Overlay, peer: SocketAddr) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let text = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(e) => {
                warn!("{}: request is not UTF-8: {}", peer, e);
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }
        match Request::parse(text) {
            Ok(request) => {
                if let Err(e) = dispatch(overlay, &request).await {
                    warn!("{}: {} failed: {}", peer, request.event, e);
                }
            }
            Err(e) => warn!("{}: {}", peer, e),
        }
    }
}
