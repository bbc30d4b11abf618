use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::errors::{ChatError, ChatResult};
use crate::models::event::StreamEvent;

pub type SinkItem = ChatResult<StreamEvent>;

enum SinkState {
    Open(mpsc::Sender<SinkItem>),
    /// Completed normally, or the receiver went away
    Closed,
    Failed,
}

/// The sending half of a reply's event stream.
///
/// Once the sink is closed or failed every further call is a no-op: `emit` reports
/// `ChatError::DownstreamSend` without sending, `complete` and `fail` do nothing.
pub struct EventSink {
    state: SinkState,
}

impl EventSink {
    /// Create a sink and the receiver to hand to the transport. `capacity` bounds how many
    /// events can be buffered before `emit` waits for the client.
    pub fn channel(capacity: usize) -> (EventSink, EventReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            EventSink {
                state: SinkState::Open(tx),
            },
            EventReceiver {
                inner: ReceiverStream::new(rx),
            },
        )
    }

    /// Send an event. Fails with `ChatError::DownstreamSend` when the receiver is gone,
    /// after which the sink is closed.
    pub async fn emit(&mut self, event: StreamEvent) -> ChatResult<()> {
        let SinkState::Open(tx) = &self.state else {
            return Err(ChatError::DownstreamSend);
        };
        if tx.send(Ok(event)).await.is_err() {
            self.state = SinkState::Closed;
            return Err(ChatError::DownstreamSend);
        }
        Ok(())
    }

    /// End the stream normally
    pub fn complete(&mut self) {
        if self.is_open() {
            self.state = SinkState::Closed;
        }
    }

    /// End the stream with an error the receiver will see as its last item
    pub async fn fail(&mut self, error: ChatError) {
        if !self.is_open() {
            return;
        }
        if let SinkState::Open(tx) = std::mem::replace(&mut self.state, SinkState::Failed) {
            // Nobody left to tell if the receiver is gone
            let _ = tx.send(Err(error)).await;
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SinkState::Open(_))
    }
}

/// The receiving half of a reply's event stream. Ends when the sink completes or fails.
pub struct EventReceiver {
    inner: ReceiverStream<SinkItem>,
}

impl Stream for EventReceiver {
    type Item = SinkItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
