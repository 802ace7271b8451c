use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use forged::Result;
use std::io;

#[derive(Parser)]
#[command(name = "forged")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lifecycle state store for generated agents and tools", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a forged workspace in the current directory
    Init {
        /// Workspace name
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing configuration without prompting
        #[arg(short, long)]
        force: bool,
    },

    /// Show the status of a project
    Status {
        /// Project name
        project: String,

        /// Project kind (agent or tool)
        #[arg(short, long, default_value = "agent")]
        kind: String,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// List all tracked projects
    List {
        /// Restrict to one project kind (agent or tool)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Show the change log of a version
    Log {
        /// Project name
        project: String,

        /// Version ID
        version_id: String,

        /// Project kind (agent or tool)
        #[arg(short, long, default_value = "agent")]
        kind: String,
    },

    /// Run the MCP server over stdio
    #[command(name = "mcp-server")]
    McpServer,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { name, force } => {
            println!("{}", "🚀 Initializing forged workspace...".cyan());
            forged::cli::init::run(name.as_deref(), force).await?;
        }

        Commands::Status {
            project,
            kind,
            json,
        } => {
            forged::cli::status::run(&project, &kind, json).await?;
        }

        Commands::List { kind } => {
            forged::cli::list::run(kind.as_deref())?;
        }

        Commands::Log {
            project,
            version_id,
            kind,
        } => {
            forged::cli::log::run(&project, &version_id, &kind)?;
        }

        Commands::McpServer => {
            forged::cli::mcp_server::run().await?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "forged", &mut io::stdout());
        }
    }

    Ok(())
}
