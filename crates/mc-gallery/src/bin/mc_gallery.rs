use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use image::{GrayImage, Rgb, RgbImage};
use serde::Serialize;

use mc_cluster::assign_targets_to_regions;
use mc_core::{gray_from_channels, Image, Point2f};
use mc_regions::{
    label_components, region_boundaries, region_props, Connectivity, RegionConstraints,
    RegionProps,
};
use mc_segment::{clear_borders, fill_holes, foreground_overlap};
use mc_threshold::{binarize, threshold, ThresholdAlgorithm};

#[derive(Parser, Debug)]
#[command(name = "mc_gallery")]
#[command(about = "Run microcluster algorithms on image fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "threshold")]
    Threshold(ThresholdArgs),
    #[command(name = "label")]
    Label(LabelArgs),
    #[command(name = "filter")]
    Filter(FilterArgs),
    #[command(name = "overlap")]
    Overlap(OverlapArgs),
    #[command(name = "cluster")]
    Cluster(ClusterArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out/gallery")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ThresholdOpts {
    /// Threshold selection algorithm: otsu, li, or yen.
    #[arg(long, default_value = "otsu")]
    algorithm: String,
    #[arg(long, default_value_t = 256)]
    nbins: usize,
}

#[derive(Args, Debug, Clone)]
struct ConstraintOpts {
    #[arg(long)]
    min_area: Option<f32>,
    #[arg(long)]
    max_area: Option<f32>,
    #[arg(long)]
    min_solidity: Option<f32>,
    #[arg(long)]
    max_solidity: Option<f32>,
    #[arg(long)]
    min_eccentricity: Option<f32>,
    #[arg(long)]
    max_eccentricity: Option<f32>,
}

#[derive(Args, Debug, Clone)]
struct ThresholdArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    thresh: ThresholdOpts,
}

#[derive(Args, Debug, Clone)]
struct LabelArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    thresh: ThresholdOpts,
    #[arg(long, default_value_t = 8)]
    connectivity: usize,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    thresh: ThresholdOpts,
    #[arg(long, default_value_t = 8)]
    connectivity: usize,
    #[command(flatten)]
    constraints: ConstraintOpts,
}

#[derive(Args, Debug, Clone)]
struct OverlapArgs {
    #[arg(long, required = true)]
    reference: PathBuf,
    #[arg(long, required = true)]
    samples: PathBuf,
    #[arg(long, default_value = "out/gallery")]
    out: PathBuf,
    #[command(flatten)]
    thresh: ThresholdOpts,
}

#[derive(Args, Debug, Clone)]
struct ClusterArgs {
    #[arg(long, required = true)]
    reference: PathBuf,
    #[arg(long, required = true)]
    samples: PathBuf,
    #[arg(long, default_value = "out/gallery")]
    out: PathBuf,
    #[command(flatten)]
    thresh: ThresholdOpts,
    #[arg(long, default_value_t = 8)]
    connectivity: usize,
    #[command(flatten)]
    constraints: ConstraintOpts,
    /// Maximum accepted distance between a target and its nearest region.
    #[arg(long, default_value_t = 10.0)]
    distance_thresh: f32,
}

#[derive(Debug, Clone, Serialize)]
struct PointDto {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Serialize)]
struct RegionDto {
    label: u32,
    area: usize,
    centroid: PointDto,
    solidity: f32,
    eccentricity: f32,
}

#[derive(Debug, Clone, Serialize)]
struct MetaThreshold {
    algorithm: String,
    nbins: usize,
    threshold: f32,
    foreground_fraction: f32,
}

#[derive(Debug, Clone, Serialize)]
struct MetaLabel {
    algorithm: String,
    connectivity: &'static str,
    component_count: usize,
    regions: Vec<RegionDto>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaFilter {
    connectivity: &'static str,
    component_count: usize,
    kept: Vec<RegionDto>,
    dropped: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaOverlap {
    overlap_foreground: usize,
    filled_foreground: usize,
    cleared_foreground: usize,
}

#[derive(Debug, Clone, Serialize)]
struct ClusterDto {
    region: u32,
    targets: Vec<PointDto>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaCluster {
    algorithm: String,
    connectivity: &'static str,
    distance_thresh: f32,
    region_count: usize,
    target_count: usize,
    assigned_count: usize,
    clusters: Vec<ClusterDto>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Threshold(args) => run_threshold(args),
        Command::Label(args) => run_label(args),
        Command::Filter(args) => run_filter(args),
        Command::Overlap(args) => run_overlap(args),
        Command::Cluster(args) => run_cluster(args),
    }
}

fn run_threshold(args: ThresholdArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common.out, "threshold")?;
    let img = load_input_gray(&args.common.input)?;

    let algorithm = parse_algorithm(&args.thresh.algorithm)?;
    let t = threshold(&img, algorithm, args.thresh.nbins)?;
    let mask = binarize(&img, t, 255);

    let fg = mask.data().iter().filter(|&&v| v > 0).count();
    save_mask(case_dir.join("mask.png"), &mask)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaThreshold {
            algorithm: args.thresh.algorithm,
            nbins: args.thresh.nbins,
            threshold: t,
            foreground_fraction: fg as f32 / mask.data().len().max(1) as f32,
        },
    )?;

    Ok(())
}

fn run_label(args: LabelArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common.out, "label")?;
    let img = load_input_gray(&args.common.input)?;

    let algorithm = parse_algorithm(&args.thresh.algorithm)?;
    let connectivity = parse_connectivity(args.connectivity)?;

    let t = threshold(&img, algorithm, args.thresh.nbins)?;
    let mask = binarize(&img, t, 255);
    let (labels, count) = label_components(&mask, connectivity);
    let props = region_props(&labels, count);

    save_label_vis(case_dir.join("labels.png"), &labels, count)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaLabel {
            algorithm: args.thresh.algorithm,
            connectivity: connectivity_name(connectivity),
            component_count: count,
            regions: props.iter().map(region_dto).collect(),
        },
    )?;

    Ok(())
}

fn run_filter(args: FilterArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common.out, "filter")?;
    let img = load_input_gray(&args.common.input)?;

    let algorithm = parse_algorithm(&args.thresh.algorithm)?;
    let connectivity = parse_connectivity(args.connectivity)?;
    let constraints = constraints_from(&args.constraints);

    let t = threshold(&img, algorithm, args.thresh.nbins)?;
    let mask = binarize(&img, t, 255);

    let (labels, count) = label_components(&mask, connectivity);
    let props = region_props(&labels, count);

    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    let mut wanted = vec![false; count];
    for (i, p) in props.iter().enumerate() {
        if constraints.accepts(p) {
            wanted[i] = true;
            kept.push(region_dto(p));
        } else {
            dropped.push(p.label);
        }
    }

    let filtered = mc_regions::select_regions(&labels, &wanted, 255);
    save_mask(case_dir.join("filtered.png"), &filtered)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaFilter {
            connectivity: connectivity_name(connectivity),
            component_count: count,
            kept,
            dropped,
        },
    )?;

    Ok(())
}

fn run_overlap(args: OverlapArgs) -> Result<()> {
    let case_dir = prepare_case(&args.out, "overlap")?;

    let algorithm = parse_algorithm(&args.thresh.algorithm)?;
    let reference = load_binarized(&args.reference, algorithm, args.thresh.nbins)?;
    let samples = load_binarized(&args.samples, algorithm, args.thresh.nbins)?;

    let overlap = foreground_overlap(&reference, &samples)?;
    let filled = fill_holes(&overlap);
    let cleared = clear_borders(&overlap);

    save_mask(case_dir.join("overlap.png"), &overlap)?;
    save_mask(case_dir.join("filled.png"), &filled)?;
    save_mask(case_dir.join("cleared.png"), &cleared)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaOverlap {
            overlap_foreground: count_foreground(&overlap),
            filled_foreground: count_foreground(&filled),
            cleared_foreground: count_foreground(&cleared),
        },
    )?;

    Ok(())
}

fn run_cluster(args: ClusterArgs) -> Result<()> {
    let case_dir = prepare_case(&args.out, "cluster")?;

    let algorithm = parse_algorithm(&args.thresh.algorithm)?;
    let connectivity = parse_connectivity(args.connectivity)?;
    let constraints = constraints_from(&args.constraints);

    let reference_gray = load_input_gray(&args.reference)?;
    let t_ref = threshold(&reference_gray, algorithm, args.thresh.nbins)?;
    let reference = binarize(&reference_gray, t_ref, 255);
    let samples = load_binarized(&args.samples, algorithm, args.thresh.nbins)?;

    // Cluster regions come from the reference mask: fill pores, then keep
    // the blobs inside the shape window.
    let region_mask = mc_regions::filter_regions(
        &fill_holes(&reference),
        connectivity,
        &constraints,
        255,
    );
    let (region_labels, region_count) = label_components(&region_mask, connectivity);
    let regions: BTreeMap<u32, Vec<Point2f>> = region_boundaries(&region_labels, region_count)
        .into_iter()
        .enumerate()
        .map(|(i, boundary)| (i as u32 + 1, boundary))
        .collect();

    // Targets are the centroids of blobs present in both masks, with
    // border-touching blobs stripped.
    let target_mask = clear_borders(&foreground_overlap(&reference, &samples)?);
    let (target_labels, target_count) = label_components(&target_mask, connectivity);
    let targets: BTreeMap<u32, Point2f> = region_props(&target_labels, target_count)
        .into_iter()
        .map(|p| (p.label, p.centroid))
        .collect();

    let clusters = assign_targets_to_regions(&targets, &regions, args.distance_thresh)?;

    save_mask(case_dir.join("regions.png"), &region_mask)?;
    save_mask(case_dir.join("targets.png"), &target_mask)?;
    save_overlay(
        case_dir.join("overlay.png"),
        &reference_gray,
        &regions,
        &targets,
    )?;

    let assigned_count = clusters.values().map(Vec::len).sum();
    write_json(
        case_dir.join("meta.json"),
        &MetaCluster {
            algorithm: args.thresh.algorithm,
            connectivity: connectivity_name(connectivity),
            distance_thresh: args.distance_thresh,
            region_count,
            target_count,
            assigned_count,
            clusters: clusters
                .iter()
                .map(|(&region, points)| ClusterDto {
                    region,
                    targets: points.iter().map(|p| PointDto { x: p.x, y: p.y }).collect(),
                })
                .collect(),
        },
    )?;

    Ok(())
}

fn parse_algorithm(name: &str) -> Result<ThresholdAlgorithm> {
    match name {
        "otsu" => Ok(ThresholdAlgorithm::Otsu),
        "li" => Ok(ThresholdAlgorithm::Li),
        "yen" => Ok(ThresholdAlgorithm::Yen),
        other => bail!("unknown threshold algorithm '{other}' (expected otsu, li, or yen)"),
    }
}

fn parse_connectivity(neighbors: usize) -> Result<Connectivity> {
    match neighbors {
        4 => Ok(Connectivity::C4),
        8 => Ok(Connectivity::C8),
        other => bail!("connectivity must be 4 or 8, got {other}"),
    }
}

fn connectivity_name(connectivity: Connectivity) -> &'static str {
    match connectivity {
        Connectivity::C4 => "C4",
        Connectivity::C8 => "C8",
    }
}

fn constraints_from(opts: &ConstraintOpts) -> RegionConstraints {
    let mut constraints = RegionConstraints::default();
    if let Some(v) = opts.min_area {
        constraints.min_area = v;
    }
    if let Some(v) = opts.max_area {
        constraints.max_area = v;
    }
    if let Some(v) = opts.min_solidity {
        constraints.min_solidity = v;
    }
    if let Some(v) = opts.max_solidity {
        constraints.max_solidity = v;
    }
    if let Some(v) = opts.min_eccentricity {
        constraints.min_eccentricity = v;
    }
    if let Some(v) = opts.max_eccentricity {
        constraints.max_eccentricity = v;
    }
    constraints
}

fn region_dto(props: &RegionProps) -> RegionDto {
    RegionDto {
        label: props.label,
        area: props.area,
        centroid: PointDto {
            x: props.centroid.x,
            y: props.centroid.y,
        },
        solidity: props.solidity,
        eccentricity: props.eccentricity,
    }
}

fn count_foreground(mask: &Image<u8>) -> usize {
    mask.data().iter().filter(|&&v| v > 0).count()
}

fn prepare_case(out: &Path, case_name: &str) -> Result<PathBuf> {
    let case_dir = out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    Ok(case_dir)
}

fn load_input_gray(path: &Path) -> Result<Image<u8>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let rgb = dyn_img.to_rgb8();
    let (w, h) = rgb.dimensions();

    gray_from_channels(w as usize, h as usize, 3, rgb.as_raw())
        .with_context(|| format!("reducing {} to grayscale", path.display()))
}

fn load_binarized(path: &Path, algorithm: ThresholdAlgorithm, nbins: usize) -> Result<Image<u8>> {
    let gray = load_input_gray(path)?;
    let t = threshold(&gray, algorithm, nbins)
        .with_context(|| format!("thresholding {}", path.display()))?;
    Ok(binarize(&gray, t, 255))
}

fn save_mask(path: PathBuf, mask: &Image<u8>) -> Result<()> {
    save_luma_raw(path, mask.width(), mask.height(), mask.data().to_vec())
}

fn save_label_vis(path: PathBuf, labels: &Image<u32>, count: usize) -> Result<()> {
    let scale = if count == 0 { 0.0 } else { 255.0 / count as f32 };
    let vis: Vec<u8> = labels
        .data()
        .iter()
        .map(|&l| (l as f32 * scale).round().clamp(0.0, 255.0) as u8)
        .collect();

    save_luma_raw(path, labels.width(), labels.height(), vis)
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json<T: Serialize>(path: PathBuf, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing metadata")?;
    fs::write(&path, text).with_context(|| format!("writing json {}", path.display()))
}

fn save_overlay(
    path: PathBuf,
    base: &Image<u8>,
    regions: &BTreeMap<u32, Vec<Point2f>>,
    targets: &BTreeMap<u32, Point2f>,
) -> Result<()> {
    let width = base.width();
    let height = base.height();

    let mut rgb = RgbImage::new(width as u32, height as u32);
    for (i, &v) in base.data().iter().enumerate() {
        let x = (i % width) as u32;
        let y = (i / width) as u32;
        rgb.put_pixel(x, y, Rgb([v, v, v]));
    }

    for boundary in regions.values() {
        for p in boundary {
            let x = p.x.round() as i64;
            let y = p.y.round() as i64;
            if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                rgb.put_pixel(x as u32, y as u32, Rgb([255, 64, 64]));
            }
        }
    }

    for p in targets.values() {
        for (dx, dy) in [(0i64, 0i64), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            let x = p.x.round() as i64 + dx;
            let y = p.y.round() as i64 + dy;
            if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                rgb.put_pixel(x as u32, y as u32, Rgb([64, 255, 64]));
            }
        }
    }

    rgb.save(&path)
        .with_context(|| format!("saving overlay {}", path.display()))
}
