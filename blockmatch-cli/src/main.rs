use blockmatch::image::io::load_gray_image;
use blockmatch::{
    mesh_lattice_points, regular_grid_points, Affine2D, Correspondences, Identity2D,
    InvertibleCoordinateTransform, MatchConfig, Matcher, Metric, Point, RejectionCounts,
    RejectionParams, Similarity2D, Translation2D,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Blockmatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    Pmcc,
    Ssd,
}

impl From<MetricConfig> for Metric {
    fn from(value: MetricConfig) -> Self {
        match value {
            MetricConfig::Pmcc => Metric::Pmcc,
            MetricConfig::Ssd => Metric::SquareDifference,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TransformConfig {
    Identity,
    Translation {
        tx: f32,
        ty: f32,
    },
    Similarity {
        scale: f32,
        angle_deg: f32,
        tx: f32,
        ty: f32,
    },
    Affine {
        m: [f32; 6],
    },
}

impl TransformConfig {
    fn build(&self) -> Box<dyn InvertibleCoordinateTransform> {
        match *self {
            TransformConfig::Identity => Box::new(Identity2D),
            TransformConfig::Translation { tx, ty } => Box::new(Translation2D::new(tx, ty)),
            TransformConfig::Similarity {
                scale,
                angle_deg,
                tx,
                ty,
            } => Box::new(Similarity2D::new(scale, angle_deg.to_radians(), tx, ty)),
            TransformConfig::Affine { m } => {
                Box::new(Affine2D::new(m[0], m[1], m[2], m[3], m[4], m[5]))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PointsConfig {
    Mesh {
        num_x: usize,
    },
    Grid {
        step: usize,
        #[serde(default)]
        margin: usize,
    },
    List {
        points: Vec<[f32; 2]>,
    },
}

impl PointsConfig {
    fn build(&self, width: usize, height: usize) -> blockmatch::BlockMatchResult<Vec<Point>> {
        match self {
            PointsConfig::Mesh { num_x } => {
                mesh_lattice_points(*num_x, (width - 1) as f32, (height - 1) as f32)
            }
            PointsConfig::Grid { step, margin } => {
                regular_grid_points(width, height, *step, *margin)
            }
            PointsConfig::List { points } => Ok(points.iter().copied().map(Point::new).collect()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    block_radius_x: usize,
    block_radius_y: usize,
    search_radius_x: usize,
    search_radius_y: usize,
    min_r: f32,
    scale: f32,
    rod: f32,
    max_curvature: f32,
    min_sigma: f32,
    noise_seed: u64,
    parallel: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            block_radius_x: cfg.block_radius_x,
            block_radius_y: cfg.block_radius_y,
            search_radius_x: cfg.search_radius_x,
            search_radius_y: cfg.search_radius_y,
            min_r: cfg.min_r,
            scale: cfg.scale,
            rod: cfg.rejection.rod,
            max_curvature: cfg.rejection.max_curvature,
            min_sigma: cfg.min_sigma,
            noise_seed: cfg.noise_seed,
            parallel: cfg.parallel,
        }
    }
}

impl From<&MatchConfigJson> for MatchConfig {
    fn from(value: &MatchConfigJson) -> Self {
        MatchConfig {
            block_radius_x: value.block_radius_x,
            block_radius_y: value.block_radius_y,
            search_radius_x: value.search_radius_x,
            search_radius_y: value.search_radius_y,
            min_r: value.min_r,
            scale: value.scale,
            rejection: RejectionParams {
                rod: value.rod,
                max_curvature: value.max_curvature,
            },
            min_sigma: value.min_sigma,
            noise_seed: value.noise_seed,
            parallel: value.parallel,
            ..MatchConfig::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct Config {
    source_path: String,
    target_path: String,
    #[serde(default)]
    output_path: Option<String>,
    #[serde(default = "default_metric")]
    metric: MetricConfig,
    #[serde(default = "default_transform")]
    transform: TransformConfig,
    #[serde(default = "default_points")]
    points: PointsConfig,
    #[serde(default, rename = "match")]
    match_cfg: MatchConfigJson,
}

fn default_metric() -> MetricConfig {
    MetricConfig::Pmcc
}

fn default_transform() -> TransformConfig {
    TransformConfig::Identity
}

fn default_points() -> PointsConfig {
    PointsConfig::Mesh { num_x: 16 }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    source: [f32; 2],
    target: [f32; 2],
}

#[derive(Debug, Serialize)]
struct RejectionRecord {
    out_of_bounds: usize,
    degenerate_block: usize,
    no_maximum: usize,
    below_min_r: usize,
    ambiguous: usize,
    edge_response: usize,
    undefined_neighborhood: usize,
    outside_trust_region: usize,
}

impl From<RejectionCounts> for RejectionRecord {
    fn from(value: RejectionCounts) -> Self {
        Self {
            out_of_bounds: value.out_of_bounds,
            degenerate_block: value.degenerate_block,
            no_maximum: value.no_maximum,
            below_min_r: value.below_min_r,
            ambiguous: value.ambiguous,
            edge_response: value.edge_response,
            undefined_neighborhood: value.undefined_neighborhood,
            outside_trust_region: value.outside_trust_region,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    candidates: usize,
    rejected: RejectionRecord,
    matches: Vec<MatchRecord>,
}

impl Output {
    fn new(candidates: usize, found: Correspondences) -> Self {
        let rejected = found.rejections.into();
        let matches = found
            .iter()
            .map(|m| MatchRecord {
                source: m.source.local(),
                target: m.target.local(),
            })
            .collect();
        Self {
            candidates,
            rejected,
            matches,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("blockmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.source_path.is_empty() || config.target_path.is_empty() {
        return Err("source_path and target_path must be set in the config".into());
    }

    let source = load_gray_image(&config.source_path)?;
    let target = load_gray_image(&config.target_path)?;
    let transform = config.transform.build();
    let points = config.points.build(source.width(), source.height())?;

    let matcher = Matcher::new(MatchConfig::from(&config.match_cfg));
    let found = match Metric::from(config.metric) {
        Metric::Pmcc => {
            matcher.match_by_maximal_pmcc(source.view(), target.view(), transform.as_ref(), &points)?
        }
        Metric::SquareDifference => matcher.match_by_minimal_square_difference(
            source.view(),
            target.view(),
            transform.as_ref(),
            &points,
        )?,
    };

    let output = Output::new(points.len(), found);
    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
