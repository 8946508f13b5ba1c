//! Cancellable handle over a run's event stream

use futures::stream::{AbortHandle, Abortable};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::session::error::ServiceError;
use crate::session::wire::RunEvent;

type Item = Result<RunEvent, ServiceError>;

/// Stream of normalised events for one run
///
/// Closing the handle (directly or through a cloned [`AbortHandle`]) ends
/// the stream at the next poll; the producer notices when its next send
/// fails after the handle is dropped.
pub struct RunStream {
    inner: Abortable<ReceiverStream<Item>>,
    handle: AbortHandle,
}

impl RunStream {
    /// Create a new run stream from a channel receiver
    pub fn new(receiver: mpsc::Receiver<Item>) -> Self {
        let (handle, registration) = AbortHandle::new_pair();
        Self {
            inner: Abortable::new(ReceiverStream::new(receiver), registration),
            handle,
        }
    }

    /// Create a channel pair for building a run stream
    pub fn channel(buffer: usize) -> (RunStreamSender, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (RunStreamSender { sender: tx }, Self::new(rx))
    }

    /// A stream that yields the given items and then ends
    pub fn from_events(events: impl IntoIterator<Item = Item>) -> Self {
        let events: Vec<Item> = events.into_iter().collect();
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every item
            let _ = tx.try_send(event);
        }
        Self::new(rx)
    }

    /// Handle that closes this stream from elsewhere
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.clone()
    }

    /// Close the stream; pending and future events are discarded
    pub fn close(&self) {
        self.handle.abort();
    }

    /// Whether the stream was closed
    pub fn is_closed(&self) -> bool {
        self.inner.is_aborted()
    }
}

impl Stream for RunStream {
    type Item = Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Sender half for building a run stream
#[derive(Clone)]
pub struct RunStreamSender {
    sender: mpsc::Sender<Item>,
}

impl RunStreamSender {
    /// Send an event
    pub async fn send(&self, event: RunEvent) -> Result<(), mpsc::error::SendError<Item>> {
        self.sender.send(Ok(event)).await
    }

    /// Send an error
    pub async fn send_error(&self, error: ServiceError) -> Result<(), mpsc::error::SendError<Item>> {
        self.sender.send(Err(error)).await
    }

    /// Check if the receiving side is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Wait until the receiving side is gone
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}
