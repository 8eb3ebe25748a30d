use std::sync::Arc;

use crate::channel::{self, Receiver, Sender};
use crate::error::Result;
use crate::item::Item;
use crate::pipeline::{spawn_unit, PipelineCtx};
use crate::sink::{Observer, Sink};

/// One compare-and-forward filter in the sort chain.
///
/// A comparator retains the larger of any two values it has compared and
/// forwards the smaller one downstream, so the k-th comparator ends up
/// holding the k-th largest value of the stream. It moves through four
/// phases, driven by successive `get()` results on its inbound channel:
///
/// 1. no value stored yet — the first item becomes `held`
/// 2. value stored, no successor — the second item decides whether the
///    successor is another comparator (on a value) or the sink (on the
///    first end-of-stream marker)
/// 3. steady state — compare, forward the minimum, retain the maximum
/// 4. draining — the successor has been told the stream is ending; forward
///    everything verbatim until the second marker, then terminate
///
/// Every comparator creates its own successor, so the chain grows to exactly
/// one comparator per input value with no global coordination.
pub(crate) struct Comparator<T: Ord + Send + 'static> {
    inbound: Receiver<Item<T>>,
    ctx: Arc<PipelineCtx>,
    /// Handed down the chain until the last comparator builds the sink
    observer: Option<Observer<T>>,
}

impl<T: Ord + Send + 'static> Comparator<T> {
    /// Spawn a comparator thread owning `inbound`.
    pub(crate) fn spawn(
        inbound: Receiver<Item<T>>,
        ctx: Arc<PipelineCtx>,
        observer: Option<Observer<T>>,
    ) -> Result<()> {
        let index = ctx.record_stage();
        tracing::trace!(index, "spawning comparator");
        let stage = Comparator {
            inbound,
            ctx: Arc::clone(&ctx),
            observer,
        };
        spawn_unit(format!("comparator-{index}"), ctx, move || stage.run())
    }

    fn run(mut self) -> Result<()> {
        // Phase 1: the first item arrives.
        let mut held = match self.inbound.get()? {
            Item::Value(value) => value,
            // Unreachable while comparators are only spawned on a value, but
            // defined anyway: hand the empty stream straight to the sink.
            Item::EndOfStream => {
                let out = self.spawn_sink()?;
                out.put(Item::EndOfStream)?;
                return drain(self.inbound, out);
            }
        };

        // Phase 2: held is set, nobody downstream yet. The second item
        // decides what kind of successor this comparator needs.
        let outbound = match self.inbound.get()? {
            Item::Value(value) => {
                let out = self.spawn_comparator()?;
                held = compare_and_forward(&out, held, value)?;
                out
            }
            Item::EndOfStream => {
                let out = self.spawn_sink()?;
                out.put(Item::EndOfStream)?;
                out.put(Item::Value(held))?;
                return drain(self.inbound, out);
            }
        };

        // Phase 3: steady state.
        loop {
            match self.inbound.get()? {
                Item::Value(value) => held = compare_and_forward(&outbound, held, value)?,
                Item::EndOfStream => {
                    // Flush the retained value between the two markers
                    outbound.put(Item::EndOfStream)?;
                    outbound.put(Item::Value(held))?;
                    return drain(self.inbound, outbound);
                }
            }
        }
    }

    fn spawn_comparator(&mut self) -> Result<Sender<Item<T>>> {
        let (tx, rx) = channel::bounded(self.ctx.capacity, self.ctx.shutdown_flag());
        Comparator::spawn(rx, Arc::clone(&self.ctx), self.observer.take())?;
        Ok(tx)
    }

    fn spawn_sink(&mut self) -> Result<Sender<Item<T>>> {
        let (tx, rx) = channel::bounded(self.ctx.capacity, self.ctx.shutdown_flag());
        Sink::spawn(rx, Arc::clone(&self.ctx), self.observer.take())?;
        Ok(tx)
    }
}

/// Forward the smaller of the two values and return the one to retain.
/// Ties keep the incoming value, which preserves arrival order for equal
/// payloads.
fn compare_and_forward<T: Ord + Send>(out: &Sender<Item<T>>, held: T, incoming: T) -> Result<T> {
    if incoming < held {
        out.put(Item::Value(incoming))?;
        Ok(held)
    } else {
        out.put(Item::Value(held))?;
        Ok(incoming)
    }
}

/// Phase 4: forward everything verbatim until the second end-of-stream
/// marker, then terminate and release both channel halves.
fn drain<T: Ord + Send>(inbound: Receiver<Item<T>>, out: Sender<Item<T>>) -> Result<()> {
    loop {
        match inbound.get()? {
            Item::EndOfStream => {
                out.put(Item::EndOfStream)?;
                return Ok(());
            }
            item => out.put(item)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineCtx;

    #[test]
    fn test_compare_forwards_minimum() {
        let (ctx, _done) = PipelineCtx::new(1);
        let (tx, rx) = channel::bounded(2, ctx.shutdown_flag());

        let retained = compare_and_forward(&tx, 7, 3).unwrap();
        assert_eq!(retained, 7);
        assert_eq!(rx.get().unwrap(), Item::Value(3));

        let retained = compare_and_forward(&tx, 3, 7).unwrap();
        assert_eq!(retained, 7);
        assert_eq!(rx.get().unwrap(), Item::Value(3));
    }

    #[test]
    fn test_compare_tie_retains_incoming() {
        let (ctx, _done) = PipelineCtx::new(1);
        let (tx, rx) = channel::bounded(2, ctx.shutdown_flag());

        let retained = compare_and_forward(&tx, 4, 4).unwrap();
        assert_eq!(retained, 4);
        assert_eq!(rx.get().unwrap(), Item::Value(4));
    }

    #[test]
    fn test_drain_forwards_verbatim_until_second_marker() {
        let (ctx, _done) = PipelineCtx::new(1);
        let (in_tx, in_rx) = channel::bounded(8, ctx.shutdown_flag());
        let (out_tx, out_rx) = channel::bounded(8, ctx.shutdown_flag());

        for item in [Item::Value(9), Item::Value(2), Item::EndOfStream] {
            in_tx.put(item).unwrap();
        }
        drain(in_rx, out_tx).unwrap();

        assert_eq!(out_rx.get().unwrap(), Item::Value(9));
        assert_eq!(out_rx.get().unwrap(), Item::Value(2));
        assert_eq!(out_rx.get().unwrap(), Item::EndOfStream);
    }
}
