//! A concurrent pipeline sort over bounded channels.
//!
//! Sorting is realized as a dynamically grown chain of single-value filters:
//! every comparator stage retains the larger of any two values it has seen
//! and forwards the smaller one, so the sink at the end of the chain drains
//! the whole stream in ascending order. The chain grows lazily, one stage
//! per input value, with each stage creating its own successor.
//!
//! # Features
//!
//! - Lock-free bounded SPSC channels built on crossbeam's ArrayQueue
//! - Lazy topology growth: stages spawn their own successors on demand
//! - Two-marker termination handshake that flushes every retained value
//! - Shutdown propagation so a failing stage tears the whole chain down
//! - Single completion signal awaited by the driver, no thread joining
//!
//! # Example
//!
//! ```
//! use pipeline_sort::{seeded_values, SortPipeline};
//!
//! let report = SortPipeline::new()
//!     .run(seeded_values(42, 100))
//!     .expect("pipeline failed");
//!
//! assert!(report.sorted);
//! assert_eq!(report.received, 100);
//! assert_eq!(report.stages, 100);
//! ```

pub mod channel;
pub mod error;
pub mod item;
pub mod pipeline;
pub mod source;

mod sink;
mod stage;

// Re-exports for convenience
pub use channel::{bounded, Receiver, Sender};
pub use error::{PipelineError, Result};
pub use item::Item;
pub use pipeline::{RunReport, SortPipeline, DEFAULT_BUFFER_CAPACITY};
pub use source::seeded_values;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
