//! Latest-wins stream throttling

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait to add throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Emit at most once per `duration`.
    ///
    /// Items arriving within one interval replace each other; only the latest
    /// is emitted at the next tick.
    fn throttle(self, duration: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, duration)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// A stream combinator that throttles emission rate
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        interval: Interval,
        pending: Option<S::Item>,
        done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    pub fn new(stream: S, duration: Duration) -> Self {
        let mut interval = interval(duration);
        // Don't burst after a slow consumer
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream, interval, pending: None, done: false }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(this.pending.take());
        }

        ready!(this.interval.poll_tick(cx));

        // Drain everything available, keeping only the latest
        loop {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.pending = Some(item),
                Poll::Ready(None) => {
                    *this.done = true;
                    return Poll::Ready(this.pending.take());
                }
                Poll::Pending => {
                    return match this.pending.take() {
                        Some(item) => Poll::Ready(Some(item)),
                        // Inner stream registered the waker; wait for the next tick after it fires
                        None => Poll::Pending,
                    };
                }
            }
        }
    }
}
