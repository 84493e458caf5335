//! Save/load persistence
//!
//! Features:
//! - Key-value storage capability with typed JSON helpers
//! - In-memory store for native builds and tests
//! - Stage progress aggregate with shape validation and fresh-state recovery

pub mod progress;
pub mod storage;

pub use progress::{
    ProgressStore, ProgressSummary, ProgressTracker, StageProgressRecord, StageStatus,
    get_next_stage_id,
};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
