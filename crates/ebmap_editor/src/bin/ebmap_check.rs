//! Load an EarthBound map project, report what it holds and optionally
//! write it back out in canonical form.

use clap::Parser;
use ebmap_editor::ProjectData;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_WARNINGS: u8 = 2;

/// Check an EarthBound map project directory
#[derive(Parser)]
#[command(name = "ebmap-check")]
#[command(version)]
struct Args {
    /// Project directory containing Project.snake
    path: PathBuf,

    /// Save the project back to the same directory after loading
    #[arg(long)]
    rewrite: bool,

    /// Exit with a non-zero status when the project has warnings
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut project = match ProjectData::load_dir(&args.path) {
        Ok(project) => project,
        Err(e) => {
            error!("failed to load {:?}: {}", args.path, e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    println!("{}", args.path.display());
    println!("  tilesets:          {}", project.tilesets().len());
    println!("  NPCs:              {}", project.npcs.len());
    println!("  NPC placements:    {}", project.npc_instances().len());
    println!("  triggers:          {}", project.triggers().len());
    println!("  warps:             {}", project.warps.len());
    println!("  teleports:         {}", project.teleports.len());
    println!("  hotspots:          {}", project.hotspots.len());
    println!("  enemy map groups:  {}", project.enemy_map_groups.len());
    println!("  sector fields:     {}", project.user_data_fields.len());

    let warnings = project.warnings();
    for warning in &warnings {
        println!("warning: {}", warning);
    }

    if args.rewrite {
        if let Err(e) = project.save_dir(&args.path) {
            error!("failed to save {:?}: {}", args.path, e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if args.strict && !warnings.is_empty() {
        ExitCode::from(EXIT_WARNINGS)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
