//! Platform abstraction layer
//!
//! Host-independent pieces of the browser/native glue:
//! - Key identifiers to held-state sampling
//! - Frame loop cancellation and fixed-interval timing

pub mod input;
pub mod scheduler;

pub use input::{Action, InputSampler};
pub use scheduler::{FixedInterval, LoopHandle, LoopToken};
