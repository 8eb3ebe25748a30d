use crossbeam::channel::{bounded as oneshot, Receiver as DoneReceiver, Sender as DoneSender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{PipelineError, Result};
use crate::sink::{Observer, SinkReport};
use crate::source::ValueSource;

/// Default capacity of every channel between pipeline units
pub const DEFAULT_BUFFER_CAPACITY: usize = 1;

/// Outcome delivered on the completion channel: the sink's report, or the
/// first error any unit ran into.
pub(crate) type Outcome = std::result::Result<SinkReport, PipelineError>;

/// State shared by every unit of one run, threaded through stage
/// construction instead of living in process-wide globals.
pub(crate) struct PipelineCtx {
    /// Capacity for every channel the topology creates
    pub(crate) capacity: usize,
    /// Raised on failure so blocked units unwind instead of waiting forever
    shutdown: Arc<AtomicBool>,
    /// Comparators spawned so far (one per input value)
    stages_spawned: AtomicUsize,
    done: DoneSender<Outcome>,
}

impl PipelineCtx {
    pub(crate) fn new(capacity: usize) -> (Arc<Self>, DoneReceiver<Outcome>) {
        let (done, done_rx) = oneshot(1);
        let ctx = Arc::new(Self {
            capacity,
            shutdown: Arc::new(AtomicBool::new(false)),
            stages_spawned: AtomicUsize::new(0),
            done,
        });
        (ctx, done_rx)
    }

    /// Shared flag observed by every channel's blocking loops
    pub(crate) fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Count a new comparator, returning its index in the chain.
    pub(crate) fn record_stage(&self) -> usize {
        self.stages_spawned.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn stages_spawned(&self) -> usize {
        self.stages_spawned.load(Ordering::Relaxed)
    }

    /// Deliver the sink's report. Only the first outcome of a run counts.
    pub(crate) fn complete(&self, report: SinkReport) {
        let _ = self.done.try_send(Ok(report));
    }

    /// Record a unit failure and tear the whole topology down.
    pub(crate) fn fail(&self, error: PipelineError) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.done.try_send(Err(error));
    }
}

/// Spawn one pipeline unit as a named thread. A unit that returns an error
/// reports it through the shared context, so no failure is silently lost to
/// a detached thread.
pub(crate) fn spawn_unit<F>(name: String, ctx: Arc<PipelineCtx>, unit: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    thread::Builder::new().name(name).spawn(move || {
        if let Err(error) = unit() {
            ctx.fail(error);
        }
    })?;
    Ok(())
}

/// What a completed run reports back to the caller
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Total real values the sink received
    pub received: u64,
    /// Whether the sink observed a non-decreasing sequence
    pub sorted: bool,
    /// Comparators created over the run (equals the input length)
    pub stages: usize,
    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

/// Builder and driver for one pipeline sort run.
///
/// # Example
///
/// ```
/// use pipeline_sort::SortPipeline;
///
/// let report = SortPipeline::new()
///     .with_buffer_capacity(4)
///     .run(vec![5, 3, 8, 1])
///     .unwrap();
/// assert!(report.sorted);
/// assert_eq!(report.received, 4);
/// ```
pub struct SortPipeline<T: Ord + Send + 'static> {
    buffer_capacity: usize,
    observer: Option<Observer<T>>,
}

impl<T: Ord + Send + 'static> SortPipeline<T> {
    pub fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            observer: None,
        }
    }

    /// Set the capacity of every channel between units. Must be at least 1;
    /// validated when the run starts.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Install a callback the sink invokes for every real value it receives,
    /// in arrival order.
    pub fn observe<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Sort `values` through a freshly grown chain of comparators.
    ///
    /// Spawns the source, then blocks until the sink raises the single
    /// completion signal. The driver joins nothing; termination of every
    /// unit is guaranteed by the two-marker drain, and failures arrive
    /// through the same completion channel.
    pub fn run<I>(self, values: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        if self.buffer_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "buffer capacity must be at least 1".to_string(),
            ));
        }

        let (ctx, done) = PipelineCtx::new(self.buffer_capacity);
        let start = Instant::now();

        ValueSource::spawn(values.into_iter(), Arc::clone(&ctx), self.observer)?;

        let outcome = done.recv().map_err(|_| PipelineError::NoReport)?;
        let elapsed = start.elapsed();
        let stages = ctx.stages_spawned();

        let report = outcome?;
        tracing::debug!(
            received = report.received,
            sorted = report.sorted,
            stages,
            ?elapsed,
            "pipeline drained"
        );
        Ok(RunReport {
            received: report.received,
            sorted: report.sorted,
            stages,
            elapsed,
        })
    }
}

impl<T: Ord + Send + 'static> Default for SortPipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = SortPipeline::new().with_buffer_capacity(0).run(vec![1, 2]);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_capacity() {
        let pipeline: SortPipeline<i32> = SortPipeline::default();
        assert_eq!(pipeline.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn test_ctx_counts_stages() {
        let (ctx, _done) = PipelineCtx::new(1);
        assert_eq!(ctx.record_stage(), 0);
        assert_eq!(ctx.record_stage(), 1);
        assert_eq!(ctx.stages_spawned(), 2);
    }

    #[test]
    fn test_fail_raises_shutdown() {
        let (ctx, done) = PipelineCtx::new(1);
        ctx.fail(PipelineError::Interrupted);
        assert!(ctx.shutdown_flag().load(Ordering::Relaxed));
        assert!(done.recv().unwrap().is_err());
    }
}
