use crate::config::{WorkspaceConfig, FORGE_DIR};
use crate::Result;
use colored::Colorize;
use std::env;

/// Scaffold the forge workspace in the current directory
pub async fn run(name: Option<&str>, force: bool) -> Result<()> {
    let workspace_root = env::current_dir()?;
    let config_path = WorkspaceConfig::path(&workspace_root);

    if config_path.exists() && !force {
        println!();
        println!(
            "   {} forge/config.toml already exists",
            "⚠️".yellow()
        );

        use dialoguer::Confirm;
        let overwrite = Confirm::new()
            .with_prompt("Overwrite existing configuration?")
            .default(false)
            .interact()?;

        if !overwrite {
            println!("   Keeping existing configuration");
            return Ok(());
        }
    }

    let mut config = WorkspaceConfig::default();
    config.workspace_name = match name {
        Some(n) => n.to_string(),
        None => workspace_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "workspace".to_string()),
    };

    config.save(&workspace_root)?;

    let forge_dir = workspace_root.join(FORGE_DIR);
    std::fs::create_dir_all(forge_dir.join(&config.agents_dir))?;
    std::fs::create_dir_all(forge_dir.join(&config.tools_dir))?;

    println!();
    println!("   ✓ forge/config.toml");
    println!("   ✓ forge/{}/", config.agents_dir.display());
    println!("   ✓ forge/{}/", config.tools_dir.display());
    println!();
    println!(
        "{}",
        format!("Workspace '{}' is ready.", config.workspace_name)
            .green()
            .bold()
    );
    println!();
    println!("Next steps:");
    println!("   1. Run the MCP server:     {}", "forged mcp-server".cyan());
    println!("   2. List projects any time: {}", "forged list".cyan());

    Ok(())
}
