use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use crate::channel;
use crate::error::Result;
use crate::item::Item;
use crate::pipeline::{spawn_unit, PipelineCtx};
use crate::sink::{Observer, Sink};
use crate::stage::Comparator;

/// Deterministic pseudo-random input for the pipeline: the same seed and
/// count always yield the same sequence.
pub fn seeded_values(seed: u64, count: usize) -> impl Iterator<Item = u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    std::iter::repeat_with(move || rng.gen()).take(count)
}

/// Head of the pipeline: feeds every input value into the first channel,
/// followed by the two end-of-stream markers.
///
/// The successor is decided lazily off the first value. A non-empty stream
/// gets comparator #1; an empty stream is wired straight to the sink, so a
/// run over zero values creates zero comparators.
pub(crate) struct ValueSource<I: Iterator> {
    values: I,
    ctx: Arc<PipelineCtx>,
    observer: Option<Observer<I::Item>>,
}

impl<I> ValueSource<I>
where
    I: Iterator + Send + 'static,
    I::Item: Ord + Send + 'static,
{
    pub(crate) fn spawn(
        values: I,
        ctx: Arc<PipelineCtx>,
        observer: Option<Observer<I::Item>>,
    ) -> Result<()> {
        let source = ValueSource {
            values,
            ctx: Arc::clone(&ctx),
            observer,
        };
        spawn_unit("source".to_string(), ctx, move || source.run())
    }

    fn run(mut self) -> Result<()> {
        let (tx, rx) = channel::bounded(self.ctx.capacity, self.ctx.shutdown_flag());

        match self.values.next() {
            None => Sink::spawn(rx, Arc::clone(&self.ctx), self.observer.take())?,
            Some(first) => {
                Comparator::spawn(rx, Arc::clone(&self.ctx), self.observer.take())?;
                // put() blocking on a full ring is the only generation
                // throttle; values are produced no faster than the chain
                // drains them.
                tx.put(Item::Value(first))?;
                while let Some(value) = self.values.next() {
                    tx.put(Item::Value(value))?;
                }
            }
        }

        tx.put(Item::EndOfStream)?;
        tx.put(Item::EndOfStream)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_values_deterministic() {
        let a: Vec<u32> = seeded_values(42, 64).collect();
        let b: Vec<u32> = seeded_values(42, 64).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a: Vec<u32> = seeded_values(1, 32).collect();
        let b: Vec<u32> = seeded_values(2, 32).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert_eq!(seeded_values(42, 0).count(), 0);
    }
}
