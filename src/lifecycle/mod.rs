//! Version lifecycle operations
//!
//! One generic manager drives both project families. Construction injects
//! the artifacts root, the stage vocabulary, and the id prefix, so the
//! agent and tool pipelines are two call sites over the same code path.

mod manager;

pub use manager::{
    LifecycleManager, StageDocument, StageUpdate, StalenessReport, CHANGE_LOG_FILE, SUMMARY_FILE,
};
