use crate::config::{ProjectKind, WorkspaceConfig};
use crate::lifecycle::LifecycleManager;
use crate::Result;
use colored::Colorize;
use std::env;

/// Print the change log of one version
pub fn run(project: &str, version_id: &str, kind: &str) -> Result<()> {
    let workspace_root = env::current_dir()?;
    let kind = ProjectKind::parse(kind)?;
    let config = WorkspaceConfig::load(&workspace_root)?;
    let manager = LifecycleManager::for_kind(&workspace_root, &config, kind);

    let doc = manager.project_status(project)?;
    let version = doc.find_version(version_id)?;

    println!(
        "{}",
        format!("Change log: {} / {}", project, version_id)
            .cyan()
            .bold()
    );
    println!();

    if version.change_log.is_empty() {
        println!("{}", "No entries yet.".yellow());
        return Ok(());
    }

    for entry in &version.change_log {
        let meta = match &entry.stage {
            Some(stage) => format!(
                "{}  [{}]",
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                stage
            ),
            None => entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        println!("   {} {}", "•".green(), entry.title.bold());
        println!("     {}", meta.bright_black());
        println!("     {}", entry.description);
        println!();
    }

    Ok(())
}
