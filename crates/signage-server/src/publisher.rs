//! Change-gated stream publishing.
//!
//! Each connected station gets its own task that polls the resolver at a
//! fixed interval and sends a [`MediaUpdate`] only when the resolved
//! snapshot changed. The task stops when:
//! - the client side ([`StationStream`]) is dropped,
//! - the registry shuts down,
//! - the station disappears (a final [`StreamError::StationGone`] is sent).
//!
//! Store failures other than a missing station are logged and retried on the
//! next tick.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use signage_core::{MediaStore, StationId};
use signage_protocol::MediaUpdate;

use crate::gate::ChangeGate;
use crate::registry::StreamRegistry;
use crate::resolver::{ResolveError, SelectionResolver};

/// Terminal stream conditions reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("station {0} no longer exists")]
    StationGone(StationId),
}

/// Item produced by a station stream.
pub type StreamItem = Result<MediaUpdate, StreamError>;

/// Client end of one station stream.
///
/// Dropping it stops the polling task.
pub struct StationStream {
    id: u64,
    station_id: StationId,
    rx: mpsc::Receiver<StreamItem>,
    _cancel: DropGuard,
}

impl StationStream {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn station_id(&self) -> StationId {
        self.station_id
    }

    /// Wait for the next item; `None` once the task has ended.
    pub async fn recv(&mut self) -> Option<StreamItem> {
        self.rx.recv().await
    }
}

impl Stream for StationStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Spawns change-gated polling tasks.
pub struct StreamPublisher<S> {
    resolver: SelectionResolver<S>,
    registry: StreamRegistry,
    poll_interval: Duration,
    buffer: usize,
}

impl<S> Clone for StreamPublisher<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            registry: self.registry.clone(),
            poll_interval: self.poll_interval,
            buffer: self.buffer,
        }
    }
}

impl<S: MediaStore + 'static> StreamPublisher<S> {
    pub fn new(
        resolver: SelectionResolver<S>,
        registry: StreamRegistry,
        poll_interval: Duration,
        buffer: usize,
    ) -> Self {
        Self {
            resolver,
            registry,
            poll_interval,
            buffer: buffer.max(1),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Start streaming a station.
    ///
    /// The station is not checked up front: a missing station shows up as a
    /// `StationGone` item on the first poll.
    pub fn spawn(&self, station_id: StationId) -> StationStream {
        let (tx, rx) = mpsc::channel(self.buffer);
        let (id, cancel, guard) = self.registry.register();

        let worker = StreamWorker {
            id,
            station_id,
            resolver: self.resolver.clone(),
            registry: self.registry.clone(),
            poll_interval: self.poll_interval,
            tx,
            cancel: cancel.clone(),
        };
        self.registry.spawn(async move {
            let _open = guard;
            worker.run().await;
        });

        StationStream {
            id,
            station_id,
            rx,
            _cancel: cancel.drop_guard(),
        }
    }
}

struct StreamWorker<S> {
    id: u64,
    station_id: StationId,
    resolver: SelectionResolver<S>,
    registry: StreamRegistry,
    poll_interval: Duration,
    tx: mpsc::Sender<StreamItem>,
    cancel: CancellationToken,
}

impl<S: MediaStore> StreamWorker<S> {
    async fn run(self) {
        info!(stream_id = self.id, station_id = self.station_id, "Station stream started");
        let mut gate = ChangeGate::new();

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            match self.resolver.resolve(self.station_id).await {
                Ok(resolution) => {
                    if gate.observe(resolution.snapshot()) {
                        let update = resolution.update(self.resolver.urls());
                        debug!(
                            stream_id = self.id,
                            station_id = self.station_id,
                            items = update.media.len(),
                            "Publishing media update"
                        );
                        if !self.send(Ok(update)).await {
                            break;
                        }
                        self.registry.stats().record_emission();
                    }
                }
                Err(ResolveError::NotFound(id)) => {
                    info!(stream_id = self.id, station_id = id, "Station gone, closing stream");
                    self.send(Err(StreamError::StationGone(id))).await;
                    break;
                }
                Err(err) => {
                    warn!(
                        stream_id = self.id,
                        station_id = self.station_id,
                        "Failed to resolve station media, retrying next tick: {}",
                        err
                    );
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = self.tx.closed() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        debug!(stream_id = self.id, station_id = self.station_id, "Station stream stopped");
    }

    /// Send one item; false when the stream should stop.
    async fn send(&self, item: StreamItem) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(item) => sent.is_ok(),
        }
    }
}
