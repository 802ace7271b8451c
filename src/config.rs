//! Workspace configuration
//!
//! Loaded from `forge/config.toml` under the workspace root. The stage
//! vocabularies are part of the configuration so deployments (and tests)
//! can substitute their own pipelines instead of relying on ambient
//! constants.

use crate::error::{LifecycleError, LifecycleResult};
use crate::stages::StageRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory under the workspace root that holds all forged state
pub const FORGE_DIR: &str = "forge";

/// Which artifact family a project belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Agent,
    Tool,
}

impl ProjectKind {
    /// Parse from a caller-supplied token (case-insensitive)
    pub fn parse(token: &str) -> LifecycleResult<Self> {
        match token.trim().to_lowercase().as_str() {
            "agent" => Ok(ProjectKind::Agent),
            "tool" => Ok(ProjectKind::Tool),
            other => Err(LifecycleError::validation(format!(
                "unknown project kind '{}': must be 'agent' or 'tool'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Agent => "agent",
            ProjectKind::Tool => "tool",
        }
    }
}

/// A configured stage vocabulary override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Canonical stage names, in execution order
    pub stages: Vec<String>,

    /// Alias table: synonym -> canonical name
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl PipelineConfig {
    pub fn registry(&self) -> StageRegistry {
        StageRegistry::new(self.stages.iter(), self.aliases.iter())
    }
}

/// Forged workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace display name
    pub workspace_name: String,

    /// Agent projects directory, relative to `forge/`
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,

    /// Tool projects directory, relative to `forge/`
    #[serde(default = "default_tools_dir")]
    pub tools_dir: PathBuf,

    /// Prefix for allocated version identifiers
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Retry budget for conflicting document saves
    #[serde(default = "default_save_retries")]
    pub save_retries: u32,

    /// Override for the agent update pipeline
    #[serde(default)]
    pub agent_pipeline: Option<PipelineConfig>,

    /// Override for the tool build pipeline
    #[serde(default)]
    pub tool_pipeline: Option<PipelineConfig>,
}

fn default_agents_dir() -> PathBuf {
    PathBuf::from("agents")
}

fn default_tools_dir() -> PathBuf {
    PathBuf::from("tools")
}

fn default_id_prefix() -> String {
    "v".to_string()
}

fn default_save_retries() -> u32 {
    3
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            workspace_name: "My Workspace".to_string(),
            agents_dir: default_agents_dir(),
            tools_dir: default_tools_dir(),
            id_prefix: default_id_prefix(),
            save_retries: default_save_retries(),
            agent_pipeline: None,
            tool_pipeline: None,
        }
    }
}

impl WorkspaceConfig {
    /// Path of the config file under a workspace root
    pub fn path(workspace_root: &Path) -> PathBuf {
        workspace_root.join(FORGE_DIR).join("config.toml")
    }

    /// Load config from `forge/config.toml`, falling back to defaults
    pub fn load(workspace_root: &Path) -> anyhow::Result<Self> {
        let config_path = Self::path(workspace_root);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: WorkspaceConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to `forge/config.toml`
    pub fn save(&self, workspace_root: &Path) -> anyhow::Result<()> {
        let config_path = Self::path(workspace_root);
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Artifacts root for one project kind
    pub fn artifacts_root(&self, workspace_root: &Path, kind: ProjectKind) -> PathBuf {
        let dir = match kind {
            ProjectKind::Agent => &self.agents_dir,
            ProjectKind::Tool => &self.tools_dir,
        };
        workspace_root.join(FORGE_DIR).join(dir)
    }

    /// Stage vocabulary for one project kind (configured or built-in)
    pub fn registry(&self, kind: ProjectKind) -> StageRegistry {
        let override_config = match kind {
            ProjectKind::Agent => &self.agent_pipeline,
            ProjectKind::Tool => &self.tool_pipeline,
        };
        match override_config {
            Some(pipeline) => pipeline.registry(),
            None => match kind {
                ProjectKind::Agent => StageRegistry::agent_pipeline(),
                ProjectKind::Tool => StageRegistry::tool_pipeline(),
            },
        }
    }
}
