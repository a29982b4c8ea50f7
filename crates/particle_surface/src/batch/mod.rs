//! Directory-level batch conversion.
//!
//! Discovers frame files, runs one `FrameTask` per frame on a bounded
//! `WorkerPool`, and reports every outcome in discovery order.

pub mod discovery;
pub mod orchestrator;
pub mod types;

pub use discovery::discover_frames;
pub use orchestrator::BatchOrchestrator;
pub use types::{BatchConfig, BatchResult, BatchStats, FramePattern};
