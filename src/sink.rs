use std::sync::Arc;

use crate::channel::Receiver;
use crate::error::Result;
use crate::item::Item;
use crate::pipeline::{spawn_unit, PipelineCtx};

/// Callback invoked by the sink for every real value, in arrival order.
/// The CLI uses this for verbose output; tests use it to capture the
/// drained sequence.
pub(crate) type Observer<T> = Box<dyn FnMut(&T) + Send>;

/// What the sink learned from draining the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SinkReport {
    /// Total real values received
    pub(crate) received: u64,
    /// Whether the observed sequence was non-decreasing
    pub(crate) sorted: bool,
}

/// Terminal consumer of the pipeline.
///
/// Counts real values, verifies they arrive in non-decreasing order, and
/// delivers the one completion report the driver is blocked on. Terminates
/// on the second `EndOfStream`; real values may still arrive between the two
/// markers, since the first one only announces that upstream stages have
/// begun flushing their retained values.
pub(crate) struct Sink<T: Ord + Send + 'static> {
    inbound: Receiver<Item<T>>,
    ctx: Arc<PipelineCtx>,
    observer: Option<Observer<T>>,
}

impl<T: Ord + Send + 'static> Sink<T> {
    pub(crate) fn spawn(
        inbound: Receiver<Item<T>>,
        ctx: Arc<PipelineCtx>,
        observer: Option<Observer<T>>,
    ) -> Result<()> {
        let sink = Sink {
            inbound,
            ctx: Arc::clone(&ctx),
            observer,
        };
        spawn_unit("sink".to_string(), ctx, move || sink.run())
    }

    fn run(mut self) -> Result<()> {
        let mut received = 0u64;
        let mut sorted = true;
        let mut previous: Option<T> = None;
        let mut closing = false;

        loop {
            match self.inbound.get()? {
                Item::EndOfStream => {
                    if closing {
                        break;
                    }
                    closing = true;
                }
                Item::Value(value) => {
                    if previous.as_ref().is_some_and(|p| *p > value) {
                        // Sticky: one inversion marks the whole run
                        sorted = false;
                    }
                    if let Some(observer) = self.observer.as_mut() {
                        observer(&value);
                    }
                    received += 1;
                    previous = Some(value);
                }
            }
        }

        self.ctx.complete(SinkReport { received, sorted });
        Ok(())
    }
}
