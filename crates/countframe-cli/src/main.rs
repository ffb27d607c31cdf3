//! countframe CLI - inspect counting regions from the terminal.
//!
//! Builds a region from box bounds, an outline file or a raw image stack,
//! applies margins and
//! reports volumes, classifies points and objects, prints slice edges, or
//! detects content outlines in a raw image stack.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use countframe::countframe_geom::ImageStack;
use countframe::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "countframe")]
#[command(about = "Counting-region geometry for image stacks", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RegionArgs {
    /// Box bounds as xmin,xmax,ymin,ymax,zmin,zmax
    #[arg(long, value_parser = parse_list::<6>, conflicts_with_all = ["outlines", "image"])]
    bounds: Option<[f64; 6]>,
    /// Outline set (JSON) describing an adaptive region
    #[arg(long, conflicts_with = "image")]
    outlines: Option<PathBuf>,
    /// Raw 8-bit image stack; the region kind comes from the settings
    #[arg(long, requires = "dims")]
    image: Option<PathBuf>,
    /// Image stack size as nx,ny,nz
    #[arg(long, value_parser = parse_dims)]
    dims: Option<[usize; 3]>,
    /// Voxel spacing as x,y,z in nm
    #[arg(long, value_parser = parse_list::<3>)]
    spacing: Option<[f64; 3]>,
    /// Margins as a region line, e.g. RectangularBoundingRegion=10,10,0,10,10,0
    #[arg(long)]
    margins: Option<String>,
    /// Only count object categories starting with this
    #[arg(long)]
    constraint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print volumes and margins of a region
    Describe {
        #[command(flatten)]
        region: RegionArgs,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify points or object bounding boxes against a region
    Classify {
        #[command(flatten)]
        region: RegionArgs,
        /// Point as x,y,z (repeatable)
        #[arg(long = "point", value_parser = parse_list::<3>)]
        points: Vec<[f64; 3]>,
        /// JSON file with [{"category": .., "bounds": [xmin,xmax,ymin,ymax,zmin,zmax]}]
        #[arg(long)]
        objects: Option<PathBuf>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the region edges visible on one slice
    Project {
        #[command(flatten)]
        region: RegionArgs,
        /// axial, coronal or sagittal
        #[arg(long, default_value = "axial")]
        plane: Plane,
        /// Slice coordinate along the plane normal
        #[arg(long)]
        slice: f64,
    },
    /// Detect per-slice content outlines in a raw 8-bit image stack
    Detect {
        /// Raw voxels, x fastest then y then z
        input: PathBuf,
        /// Stack size as nx,ny,nz
        #[arg(long, value_parser = parse_dims)]
        dims: [usize; 3],
        /// Voxel spacing as x,y,z in nm
        #[arg(long, value_parser = parse_list::<3>)]
        spacing: Option<[f64; 3]>,
        /// Content threshold (defaults to the settings)
        #[arg(long)]
        threshold: Option<u8>,
        /// Output outline file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
struct ObjectRecord {
    category: String,
    bounds: [f64; 6],
}

#[derive(Debug, Serialize)]
struct ClassifiedItem {
    item: String,
    classification: Classification,
    counted: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => RegionSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => RegionSettings::default(),
    };

    match cli.command {
        Commands::Describe { region, json } => {
            let region = build_region(&region, &settings)?;
            describe(&region, json)?;
        }
        Commands::Classify {
            region,
            points,
            objects,
            json,
        } => {
            let region = build_region(&region, &settings)?;
            classify(&region, &points, objects.as_deref(), json)?;
        }
        Commands::Project {
            region,
            plane,
            slice,
        } => {
            let region = build_region(&region, &settings)?;
            project(&region, plane, slice)?;
        }
        Commands::Detect {
            input,
            dims,
            spacing,
            threshold,
            output,
        } => {
            detect(
                &input,
                dims,
                spacing.unwrap_or(settings.spacing),
                threshold.unwrap_or(settings.border_threshold),
                output.as_deref(),
            )?;
        }
    }

    Ok(())
}

fn parse_list<const N: usize>(s: &str) -> std::result::Result<[f64; N], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let count = values.len();
    values
        .try_into()
        .map_err(|_| format!("expected {N} comma-separated numbers, got {count}"))
}

fn parse_dims(s: &str) -> std::result::Result<[usize; 3], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<usize>().map_err(|e| format!("'{v}': {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let count = values.len();
    values
        .try_into()
        .map_err(|_| format!("expected nx,ny,nz, got {count} values"))
}

fn build_region(args: &RegionArgs, settings: &RegionSettings) -> Result<RegionGeometry> {
    let spacing = args.spacing.unwrap_or(settings.spacing);
    let region = match (&args.bounds, &args.outlines, &args.image) {
        (Some(bounds), None, None) => RegionGeometry::rectangular("1", *bounds, spacing)?,
        (None, Some(path), None) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading outlines from {}", path.display()))?;
            let mut outlines: OutlineSet = serde_json::from_str(&text)
                .with_context(|| format!("parsing outlines in {}", path.display()))?;
            if let Some(spacing) = args.spacing {
                outlines.spacing = spacing;
            }
            RegionGeometry::adaptive("1", &outlines)?
        }
        (None, None, Some(path)) => {
            let Some(dims) = args.dims else {
                bail!("--image needs --dims");
            };
            let stack = read_stack(path, dims, spacing)?;
            let policy = MarginPolicy::for_image(&stack, settings.default_kind, settings.border_threshold)?;
            info!(kind = %policy.kind(), "region built from image");
            RegionGeometry::new("1", policy, spacing)?
        }
        _ => bail!("give exactly one of --bounds, --outlines or --image"),
    };
    let mut region = match &args.constraint {
        Some(c) => region.with_constraint(c.as_str()),
        None => region,
    };

    match &args.margins {
        Some(line) => {
            let parsed = format::parse(line).with_context(|| format!("parsing margins '{line}'"))?;
            if parsed.kind != region.kind() {
                warn!(stored = %parsed.kind, region = %region.kind(), "margin line is for a different region type");
            }
            region
                .try_set_margins(parsed.margins)
                .context("margins do not fit the region")?;
        }
        None => {
            if let Err(violation) = region.try_set_margins(settings.default_margins) {
                warn!(%violation, "default margins do not fit, using zero");
            }
        }
    }
    debug!(line = %format::serialize(&region), "region ready");
    Ok(region)
}

fn describe(region: &RegionGeometry, json: bool) -> Result<()> {
    let report = region.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
        println!("Line: {}", format::serialize(region));
    }
    Ok(())
}

fn classify(
    region: &RegionGeometry,
    points: &[[f64; 3]],
    objects: Option<&Path>,
    json: bool,
) -> Result<()> {
    let classifier = VolumeClassifier::new(region);
    let mut items = Vec::new();

    for p in points {
        let classification = classifier.classify_point(&Point3::new(p[0], p[1], p[2]));
        items.push(ClassifiedItem {
            item: format!("{},{},{}", p[0], p[1], p[2]),
            classification,
            counted: classification == Classification::InsideInclusion,
        });
    }

    if let Some(path) = objects {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading objects from {}", path.display()))?;
        let records: Vec<ObjectRecord> = serde_json::from_str(&text)?;
        for record in records {
            let extent = Aabb3::from_bounds(record.bounds);
            items.push(ClassifiedItem {
                classification: classifier.classify_extent(&extent),
                counted: classifier.is_counted(&extent, &record.category),
                item: record.category,
            });
        }
    }

    if items.is_empty() {
        bail!("nothing to classify: pass --point or --objects");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for item in &items {
            let mark = if item.counted { "counted" } else { "-" };
            println!("{}\t{:?}\t{}", item.item, item.classification, mark);
        }
        let counted = items.iter().filter(|i| i.counted).count();
        println!("{counted} of {} counted", items.len());
    }
    Ok(())
}

fn project(region: &RegionGeometry, plane: Plane, slice: f64) -> Result<()> {
    let face = SliceFaceProjector::new(plane).project(region, slice);
    let edges: Vec<_> = face
        .edges()
        .iter()
        .map(|e| {
            serde_json::json!({
                "edge": e.edge,
                "kind": e.edge.kind(),
                "visible": e.visible,
                "points": e.polyline.points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
            })
        })
        .collect();
    let out = serde_json::json!({
        "plane": plane,
        "slice": slice,
        "revision": face.revision,
        "visible": face.is_visible(),
        "edges": edges,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn read_stack(path: &Path, dims: [usize; 3], spacing: [f64; 3]) -> Result<ImageStack> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    ImageStack::new(dims, spacing, data).with_context(|| format!("loading image stack {}", path.display()))
}

fn detect(
    input: &Path,
    dims: [usize; 3],
    spacing: [f64; 3],
    threshold: u8,
    output: Option<&Path>,
) -> Result<()> {
    let stack = read_stack(input, dims, spacing)?;
    let borders = StackBorders::detect(&stack, threshold);
    info!(slices = borders.slices().len(), threshold, "outlines detected");

    let outlines = OutlineSet::from_extension(&borders)?;
    let json = serde_json::to_string_pretty(&outlines)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!(
                "Wrote {} outlines to {}",
                outlines.slices.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
