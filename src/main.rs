//! # Velo-route CLI
//!
//! Command-line interface for the velo-route library.
//! Inspects a graph directory, snaps coordinates to nodes and plans bicycle
//! itineraries, printing JSON reports on stdout.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

use velo_route::{
    CostProfile, ElevationProfile, Graph, ItineraryPlanner, PlannerConfig, RouteComputer, Waypoint,
};

mod cli;

use cli::{parse_lat_lon, NodeReport, RouteReport};

/// Command-line interface for velo-route
#[derive(Parser)]
#[command(name = "velo-route")]
#[command(about = "Bicycle route planner over a compact Swiss road graph")]
#[command(long_about = "Plans bicycle routes over a graph directory:
  velo-route info --graph data/ch
  velo-route nearest --graph data/ch --at 46.9511,7.4386
  velo-route route --graph data/ch --waypoint 46.9511,7.4386 --waypoint 46.5191,6.5668

Coordinates are WGS84 'lat,lon' in degrees. Route options can be read from a
TOML file with --config; flags given on the command line override it.")]
#[command(version = env!("VELO_ROUTE_VERSION"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show table sizes of a graph
    Info {
        /// Graph directory
        #[arg(long)]
        graph: PathBuf,
    },
    /// Find the graph node nearest to a coordinate
    Nearest {
        /// Graph directory
        #[arg(long)]
        graph: PathBuf,
        /// Query coordinate (lat,lon)
        #[arg(long)]
        at: String,
        /// Search radius in metres
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Plan a route through two or more waypoints
    Route {
        /// Graph directory
        #[arg(long)]
        graph: PathBuf,
        /// Waypoint coordinate (lat,lon), repeated in travel order
        #[arg(long = "waypoint", required = true)]
        waypoints: Vec<String>,
        /// Planner configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Radius in metres for snapping waypoints to nodes
        #[arg(long)]
        radius: Option<f64>,
        /// Maximum spacing in metres of elevation samples
        #[arg(long)]
        max_step: Option<f64>,
        /// Edge cost model
        #[arg(long, value_enum)]
        cost: Option<CostProfile>,
        /// Include the route geometry in the report
        #[arg(long)]
        points: bool,
    },
}

/// Route flags that override the configuration file
struct RouteOverrides {
    radius: Option<f64>,
    max_step: Option<f64>,
    cost: Option<CostProfile>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    if let Err(e) = run(cli) {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.verbose {
        eprintln!("🚲 Velo-route v{} starting...", env!("VELO_ROUTE_VERSION"));
    }

    match cli.command {
        Commands::Info { graph } => {
            let graph = load_graph(&graph)?;
            print_json(&graph.stats())
        }
        Commands::Nearest { graph, at, radius } => {
            let radius = radius.unwrap_or(PlannerConfig::default().search_radius);
            nearest(&graph, &at, radius)
        }
        Commands::Route {
            graph,
            waypoints,
            config,
            radius,
            max_step,
            cost,
            points,
        } => {
            let config = planner_config(
                config.as_deref(),
                RouteOverrides {
                    radius,
                    max_step,
                    cost,
                },
            )?;
            route(&graph, &waypoints, &config, points)
        }
    }
}

fn load_graph(dir: &Path) -> Result<Graph> {
    Graph::load_from(dir).with_context(|| format!("Failed to load graph from {}", dir.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

/// Configuration file values, or defaults, with command-line overrides applied.
fn planner_config(path: Option<&Path>, overrides: RouteOverrides) -> Result<PlannerConfig> {
    let mut config = match path {
        Some(path) => PlannerConfig::from_toml_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(radius) = overrides.radius {
        config.search_radius = radius;
    }
    if let Some(max_step) = overrides.max_step {
        config.profile_max_step = max_step;
    }
    if let Some(cost) = overrides.cost {
        config.cost = cost;
    }
    config.validate()?;
    Ok(config)
}

fn nearest(graph_dir: &Path, at: &str, radius: f64) -> Result<()> {
    if radius.is_nan() || radius < 0.0 {
        bail!("Search radius must be >= 0, got {radius}");
    }
    let graph = load_graph(graph_dir)?;
    let point = parse_lat_lon(at)?;
    let node_id = graph
        .node_closest_to(&point, radius)
        .ok_or_else(|| anyhow!("No graph node within {radius} m of {at}"))?;
    print_json(&NodeReport::new(&graph, node_id, &point))
}

fn route(graph_dir: &Path, coordinates: &[String], config: &PlannerConfig, with_points: bool) -> Result<()> {
    if coordinates.len() < 2 {
        bail!("A route needs at least two --waypoint coordinates");
    }
    let graph = load_graph(graph_dir)?;

    let waypoints = coordinates
        .iter()
        .map(|at| {
            let point = parse_lat_lon(at)?;
            Waypoint::snap(&graph, point, config.search_radius).ok_or_else(|| {
                anyhow!("No graph node within {} m of waypoint {at}", config.search_radius)
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let start = Instant::now();
    let computer = RouteComputer::new(&graph, config.cost.cost_function(&graph));
    let mut planner = ItineraryPlanner::new(computer, config.cache_capacity);
    let route = planner
        .plan(&waypoints)?
        .ok_or_else(|| anyhow!("No route connects the given waypoints"))?;
    info!(
        "Planned {:.0} m over {} legs in {:.3}s",
        route.length(),
        route.segment_count(),
        start.elapsed().as_secs_f64()
    );

    let profile = ElevationProfile::of_route(&route, config.profile_max_step)?;
    print_json(&RouteReport::new(&route, &profile, &waypoints, with_points))
}
