use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use unitydeploy_core::{
    BundledResources, DirectoryResources, Installer, PluginLayout, ProjectRoot, ResourceProvider,
};

#[derive(Parser)]
#[command(name = "unitydeploy", about = "Install the editor plugin into Unity projects")]
struct Cli {
    /// JSON file overriding the plugin layout
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Directory of resource files named `<namespace>.<subpackage>.<file>`,
    /// used instead of the bundled plugin
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether the plugin needs installing
    Check { project: PathBuf },
    /// Install missing plugin files if needed
    Install { project: PathBuf },
    /// Show present and missing plugin files
    Status {
        project: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("UNITYDEPLOY_LOG")
        .unwrap_or_else(|_| EnvFilter::new("unitydeploy=info,unitydeploy_core=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();

    let layout = match &cli.layout {
        Some(path) => PluginLayout::from_json_file(path)
            .with_context(|| format!("Failed to load layout: {:?}", path))?,
        None => PluginLayout::default(),
    };
    let resources: Box<dyn ResourceProvider> = match &cli.resources {
        Some(dir) => Box::new(DirectoryResources::new(dir)),
        None => Box::new(BundledResources::rider_plugin()),
    };
    let installer = Installer::new(layout, resources).context("Invalid plugin layout")?;

    match cli.command {
        Command::Check { project } => {
            let needed = installer.is_installation_needed(&ProjectRoot::new(project))?;
            println!("{}", if needed { "needed" } else { "not needed" });
        }
        Command::Install { project } => {
            let project = ProjectRoot::new(project);
            let written = installer
                .install_if_required(&project)
                .with_context(|| format!("Failed to install plugin into {:?}", project.path()))?;
            for path in &written {
                println!("{}", path.display());
            }
            println!("Installed files: {}", written.len());
        }
        Command::Status { project, json } => {
            let state = installer.installation_state(&ProjectRoot::new(project))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else if !state.applicable {
                println!("not a Unity project");
            } else {
                println!("present: {}", state.present.join(", "));
                println!("missing: {}", state.missing.join(", "));
            }
        }
    }

    Ok(())
}
