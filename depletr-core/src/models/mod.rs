pub mod alignment;
pub mod interval;
pub mod interval_store;
pub mod metrics;

pub use alignment::{AlignmentRecord, MateInfo, ReadFlags};
pub use interval::{GenomicInterval, RawInterval, Strand};
pub use interval_store::{IntervalStore, RejectedInterval, StoreBuild};
pub use metrics::{DepletionEfficiency, DepletionMetrics, DepletionTier};
