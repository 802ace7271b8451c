use crate::config::{ProjectKind, WorkspaceConfig};
use crate::lifecycle::LifecycleManager;
use crate::Result;
use colored::Colorize;
use std::env;

/// List tracked projects, optionally filtered by kind
pub fn run(kind: Option<&str>) -> Result<()> {
    let workspace_root = env::current_dir()?;
    let config = WorkspaceConfig::load(&workspace_root)?;

    let kinds: Vec<ProjectKind> = match kind {
        Some(k) => vec![ProjectKind::parse(k)?],
        None => vec![ProjectKind::Agent, ProjectKind::Tool],
    };

    let mut total = 0;
    for kind in kinds {
        let manager = LifecycleManager::for_kind(&workspace_root, &config, kind);
        let projects = manager.list_projects()?;
        if projects.is_empty() {
            continue;
        }

        let heading = match kind {
            ProjectKind::Agent => "Agent projects:",
            ProjectKind::Tool => "Tool projects:",
        };
        println!("{}", heading.green().bold());
        for project in &projects {
            println!("   • {}", project);
        }
        println!();
        total += projects.len();
    }

    if total == 0 {
        println!("{}", "No projects found.".yellow());
        println!("{}", "Run 'forged init' to set up a workspace, then create projects through the MCP tools.".bright_black());
    }

    Ok(())
}
