pub mod centroids;
pub mod config;
pub mod data;
pub mod processing;
pub mod render;
pub mod server;
pub mod types;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use types::{Centroid, CentroidGroup};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the violation hotspot map
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the generated map and the query API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            println!("Generating map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;
            let (centroids, groups) = run_pipeline(&app_config)?;

            render::generate_map(&app_config, &centroids, &groups)?;

            println!("Generation complete!");
        }
        Commands::Serve { config } => {
            println!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;
            let (centroids, groups) = run_pipeline(&app_config)?;

            render::generate_map(&app_config, &centroids, &groups)?;

            server::start_server(app_config, centroids, groups).await?;
        }
    }

    Ok(())
}

/// Load, assign, and group: the full computation shared by both commands.
/// Unassignable records are excluded from the groups and reported here.
fn run_pipeline(
    app_config: &config::AppConfig,
) -> anyhow::Result<(Vec<Centroid>, Vec<CentroidGroup>)> {
    let centroids = app_config.resolve_centroids()?;

    let records = data::load_data(app_config)?;

    let assignment = processing::assign(records, &centroids)?;
    if !assignment.unassignable.is_empty() {
        eprintln!(
            "Excluded {} record(s) with non-numeric coordinates:",
            assignment.unassignable.len()
        );
        for record in &assignment.unassignable {
            eprintln!("  {:?}", record.fields);
        }
    }
    println!("Assigned {} records", assignment.assigned.len());

    let groups =
        processing::group_by_centroid(assignment.assigned, &centroids, &app_config.quadrants)?;
    println!("Grouped into {} clusters", groups.len());

    Ok((centroids, groups))
}
