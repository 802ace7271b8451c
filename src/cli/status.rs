use crate::config::{ProjectKind, WorkspaceConfig};
use crate::lifecycle::LifecycleManager;
use crate::models::VersionStatus;
use crate::Result;
use colored::{ColoredString, Colorize};
use std::env;

/// Show the status document of one project
pub async fn run(project: &str, kind: &str, json: bool) -> Result<()> {
    let workspace_root = env::current_dir()?;
    let kind = ProjectKind::parse(kind)?;
    let config = WorkspaceConfig::load(&workspace_root)?;
    let manager = LifecycleManager::for_kind(&workspace_root, &config, kind);

    let doc = match manager.project_status(project) {
        Ok(doc) => doc,
        Err(e) if e.is_not_found() => {
            if json {
                println!(
                    "{{\"error\": \"project_not_found\", \"project\": \"{}\"}}",
                    project
                );
            } else {
                println!("{}", format!("Project '{}' not found", project).red());
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Status for: {} ({})", project, kind.as_str())
            .cyan()
            .bold()
    );

    if doc.versions.is_empty() {
        println!();
        println!("{}", "No versions yet.".yellow());
        return Ok(());
    }

    for version in &doc.versions {
        let (icon, label) = status_badge(version.status);
        let current = doc.current_version.as_deref() == Some(version.version_id.as_str());

        println!();
        if current {
            println!("   {} {} {}", icon, version.version_id.bold(), "(current)".bright_black());
        } else {
            println!("   {} {}", icon, version.version_id.bold());
        }
        println!("      Status:  {}", label);
        println!(
            "      Started: {}",
            version.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(request) = &version.request {
            println!("      Request: {}", request);
        }

        for stage in &version.stages {
            println!(
                "      {} {:<24} {}",
                stage_marker(&stage.status),
                stage.name,
                stage.status
            );
        }

        if !version.change_log.is_empty() {
            println!("      Log: {} entries", version.change_log.len());
        }
        if let Some(summary) = &version.summary {
            println!("      Summary: {}", summary);
        }
    }

    // Drift warnings for the version being worked on.
    if let Some(current) = &doc.current_version {
        if let Ok(report) = manager.stage_staleness(project, current) {
            if !report.is_fresh() {
                println!();
                if !report.stale_stages.is_empty() {
                    println!(
                        "   {} Stale stage documents: {}",
                        "⚠".yellow(),
                        report.stale_stages.join(", ")
                    );
                }
                if !report.missing_documents.is_empty() {
                    println!(
                        "   {} Missing stage documents: {}",
                        "⚠".yellow(),
                        report.missing_documents.join(", ")
                    );
                }
            }
        }
    }

    Ok(())
}

fn status_badge(status: VersionStatus) -> (&'static str, ColoredString) {
    match status {
        VersionStatus::InProgress => ("🔨", "in_progress".blue()),
        VersionStatus::Completed => ("✅", "completed".green()),
        VersionStatus::Failed => ("❌", "failed".red()),
        VersionStatus::Cancelled => ("🚫", "cancelled".bright_black()),
    }
}

fn stage_marker(status: &str) -> ColoredString {
    match status {
        "completed" => "✓".green(),
        "in_progress" => "●".blue(),
        "blocked" => "✗".red(),
        "pending" => "○".bright_black(),
        _ => "•".normal(),
    }
}
