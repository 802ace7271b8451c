// Forged - Lifecycle state store for generated agents and tools
// Tracks multi-stage build workflows through durable per-project status documents

pub mod checksum;
pub mod cli;
pub mod config;
pub mod error;
pub mod idgen;
pub mod lifecycle;
pub mod mcp;
pub mod models;
pub mod sandbox;
pub mod stages;
pub mod state;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use config::{ProjectKind, WorkspaceConfig};
pub use error::{LifecycleError, LifecycleResult};
pub use lifecycle::{LifecycleManager, StageUpdate, StalenessReport};
pub use models::{StageRecord, StatusDocument, VersionRecord, VersionStatus};
pub use stages::StageRegistry;
