use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mapclip3d::cancel::CancelToken;
use mapclip3d::capture::{CaptureResult, FileSnapshotSource, SnapshotCapture};
use mapclip3d::config::FileConfig;
use mapclip3d::domain::GeoPolygon;
use mapclip3d::geometry::{BoundingBox, VisibleRegion};
use mapclip3d::mesh::{
    estimate_stl_size, validate_mesh, write_mesh_json, write_obj, write_stl,
};
use mapclip3d::pipeline::{PreparedPolygon, build_scene};
use mapclip3d::texture::{Material, SceneDescription, SceneKind};

/// Clip a map snapshot to a drawn polygon and export it as a textured 3D mesh
///
/// Examples:
///   # Untextured mesh of a polygon
///   mapclip3d --polygon area.json
///
///   # Textured with a snapshot covering the polygon's own bounds
///   mapclip3d --polygon area.json --image snapshot.png -o area.obj
///
///   # Snapshot covers a wider region than the polygon
///   mapclip3d --polygon area.json --image snapshot.png --region region.json
#[derive(Parser, Debug)]
#[command(name = "mapclip3d")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches mapclip3d.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Polygon as a JSON array of {"latitude", "longitude"} objects, in drawing order
    #[arg(short = 'p', long)]
    polygon: PathBuf,

    /// Captured map snapshot (PNG or JPEG)
    #[arg(short = 'i', long)]
    image: Option<PathBuf>,

    /// Region the snapshot actually covers, as JSON {center, latitude_delta, longitude_delta}
    #[arg(long, requires = "image")]
    region: Option<PathBuf>,

    /// Output OBJ file path (defaults to {polygon stem}.obj)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also write a binary STL of the clipped shape
    #[arg(long)]
    stl: Option<PathBuf>,

    /// Also write the mesh buffers (positions, uvs, indices, normals) as JSON
    #[arg(long)]
    mesh_json: Option<PathBuf>,

    /// Mesh width in world units
    #[arg(short = 's', long)]
    scale: Option<f32>,

    /// Texture decode budget in milliseconds
    #[arg(long)]
    texture_timeout_ms: Option<u64>,

    /// Print a JSON summary of the scene instead of the text report
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct SceneSummary<'a> {
    kind: &'static str,
    fallback_cause: Option<String>,
    vertices: usize,
    triangles: usize,
    degenerate_bounds: bool,
    bounds: Option<&'a BoundingBox>,
    texture_size: Option<(u32, u32)>,
    color: Option<u32>,
    output: &'a Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let verbose = args.verbose || file_config.verbose;
    init_tracing(verbose);

    let mut config = file_config.pipeline();
    if let Some(scale) = args.scale {
        config.scale = scale;
    }
    if let Some(ms) = args.texture_timeout_ms {
        config.texture_timeout = std::time::Duration::from_millis(ms);
    }

    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| args.polygon.with_extension("obj"));

    let polygon = read_polygon(&args.polygon)?;
    if !polygon.is_valid() {
        warn!(
            points = polygon.len(),
            "polygon has fewer than 3 points, a placeholder will be produced"
        );
    }

    let cancel = CancelToken::new();
    let _view = cancel.drop_guard();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let capture = match args.image {
        Some(ref image) => {
            let spinner = create_spinner("Capturing snapshot...");
            let start = Instant::now();
            let result = capture_snapshot(
                image,
                args.region.as_deref(),
                &polygon,
                &SnapshotCapture::from_config(&config),
                &cancel,
            )
            .await?;
            spinner.finish_with_message(format!(
                "Snapshot {} [{:.1}s]",
                if result.is_some() { "ready" } else { "unavailable" },
                start.elapsed().as_secs_f32()
            ));
            result
        }
        None => None,
    };
    let image_path = capture.as_ref().and(args.image.clone());

    let spinner = create_spinner("Building clipped mesh...");
    let start = Instant::now();
    let Some((prepared, scene)) = build_scene(&polygon, capture, &config, &cancel).await else {
        spinner.abandon_with_message("Cancelled");
        bail!("Cancelled before the scene was built");
    };
    spinner.finish_with_message(format!(
        "Built {} triangles from {} points [{:.1}s]",
        scene.mesh.triangle_count(),
        scene.mesh.vertex_count(),
        start.elapsed().as_secs_f32()
    ));

    let report = validate_mesh(&scene.mesh);
    for warning in &report.warnings {
        warn!("{}", warning);
    }

    let spinner = create_spinner("Writing mesh...");
    let texture = match scene.material {
        Material::Textured { .. } => image_path.as_deref(),
        Material::SolidColor { .. } => None,
    };
    write_obj(&output_path, &scene.mesh, texture).context("Failed to write OBJ file")?;
    if let Some(ref stl_path) = args.stl {
        write_stl(stl_path, &scene.mesh).context("Failed to write STL file")?;
    }
    if let Some(ref json_path) = args.mesh_json {
        write_mesh_json(json_path, &scene.mesh).context("Failed to write mesh JSON")?;
    }
    spinner.finish_with_message(format!("Wrote {}", output_path.display()));

    if args.json {
        let summary = summarize(&prepared, &scene, &output_path);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    print_report(&prepared, &scene, &report.summary());
    println!("Output: {}", output_path.display());
    if let Some(ref stl_path) = args.stl {
        println!(
            "STL:    {} ({:.1} KB)",
            stl_path.display(),
            estimate_stl_size(scene.mesh.triangle_count()) as f64 / 1024.0
        );
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_polygon(path: &Path) -> Result<GeoPolygon> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read polygon file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse polygon file: {}", path.display()))
}

fn read_region(path: &Path) -> Result<VisibleRegion> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read region file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse region file: {}", path.display()))
}

/// Replay a saved snapshot through the capture flow
///
/// A capture failure degrades to an untextured mesh instead of aborting.
async fn capture_snapshot(
    image: &Path,
    region: Option<&Path>,
    polygon: &GeoPolygon,
    capture: &SnapshotCapture,
    cancel: &CancelToken,
) -> Result<Option<CaptureResult>> {
    let mut source = FileSnapshotSource::new(image);
    if let Some(region_path) = region {
        source = source.with_visible_region(read_region(region_path)?);
    }

    let Some(bounds) = BoundingBox::from_polygon(polygon.as_slice()) else {
        warn!("empty polygon, skipping snapshot");
        return Ok(None);
    };

    // The file is on disk already, so the surface is ready at once
    let (ready_tx, ready_rx) = oneshot::channel();
    ready_tx.send(()).ok();

    match capture.capture(&source, &bounds, ready_rx, cancel).await {
        Some(Ok(result)) => Ok(Some(result)),
        Some(Err(e)) => {
            warn!(error = %e, "snapshot capture failed, continuing without texture");
            Ok(None)
        }
        None => bail!("Cancelled during snapshot capture"),
    }
}

fn kind_name(kind: &SceneKind) -> &'static str {
    match kind {
        SceneKind::Textured => "textured",
        SceneKind::Untextured { .. } => "untextured",
        SceneKind::Placeholder => "placeholder",
    }
}

fn summarize<'a>(
    prepared: &'a PreparedPolygon,
    scene: &SceneDescription,
    output: &'a Path,
) -> SceneSummary<'a> {
    let texture_size = match &scene.material {
        Material::Textured { texture, .. } => Some((texture.width(), texture.height())),
        Material::SolidColor { .. } => None,
    };
    let fallback_cause = match &scene.kind {
        SceneKind::Untextured { cause } => Some(cause.to_string()),
        _ => None,
    };

    SceneSummary {
        kind: kind_name(&scene.kind),
        fallback_cause,
        vertices: scene.mesh.vertex_count(),
        triangles: scene.mesh.triangle_count(),
        degenerate_bounds: prepared.normalization.is_degenerate(),
        bounds: prepared.bounds.as_ref(),
        texture_size,
        color: scene.material.color(),
        output,
    }
}

fn print_report(prepared: &PreparedPolygon, scene: &SceneDescription, validation: &str) {
    println!("Scene: {}", kind_name(&scene.kind));
    if let SceneKind::Untextured { cause } = &scene.kind {
        println!("  Fallback: {}", cause);
    }
    if let Some(bounds) = &prepared.bounds {
        println!(
            "  Bounds: lat {:.5}..{:.5}, lng {:.5}..{:.5}",
            bounds.min_lat, bounds.max_lat, bounds.min_lng, bounds.max_lng
        );
        println!(
            "  Center: ({:.5}, {:.5})",
            bounds.center.latitude, bounds.center.longitude
        );
    }
    if prepared.normalization.is_degenerate() {
        println!("  Warning: polygon has zero width or height");
    }
    match &scene.material {
        Material::Textured { texture, .. } => {
            println!("  Texture: {}x{}", texture.width(), texture.height())
        }
        Material::SolidColor { color, .. } => println!("  Color: #{:06x}", color),
    }
    if let Some((lo, hi)) = scene.mesh.extent() {
        println!(
            "  Extent: {:.2} x {:.2} units",
            hi[0] - lo[0],
            hi[1] - lo[1]
        );
    }
    println!("  {}", validation);
    println!();
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
