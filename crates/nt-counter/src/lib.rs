//! Frequency counters for name trimming.
//!
//! Two interchangeable variants behind [`Counter`]:
//! - [`ExactCounter`]: hash map, exact, human-readable snapshots
//! - [`SketchCounter`]: count-min sketch, bounded memory, overcounts only

pub mod exact;
pub mod frequency;
pub mod sketch;
pub mod snapshot;
pub mod traits;

pub use exact::ExactCounter;
pub use frequency::FrequencyCounter;
pub use sketch::SketchCounter;
pub use snapshot::{load_snapshot, save_snapshot};
pub use traits::Counter;

#[cfg(test)]
mod tests;
