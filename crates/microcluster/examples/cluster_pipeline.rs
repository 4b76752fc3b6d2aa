//! Example: full blob-clustering pipeline on a reference/samples image pair.
//!
//! Loads two images of the same scene, thresholds both into binary masks,
//! derives cluster regions from the reference mask (holes filled, shape
//! constraints applied) and target centroids from the blobs present in both
//! masks (border-touching blobs stripped), then assigns each target to its
//! nearest region under a distance threshold.
//!
//! A per-region summary and total timing are printed to stdout; the full
//! assignment is written to a JSON file next to the reference image.
//!
//! Run from the workspace root:
//!   cargo run -p microcluster --example cluster_pipeline -- --help
//!   cargo run -p microcluster --example cluster_pipeline -- \
//!       --reference data/ref.png --samples data/smp.png

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::ImageReader;
use serde::Serialize;

use microcluster::{
    assign_targets_to_regions, binarize, clear_borders, fill_holes, foreground_overlap,
    gray_from_channels, label_components, region_boundaries, region_props, threshold,
    Connectivity, Image, Point2f, RegionConstraints, ThresholdAlgorithm, DEFAULT_NBINS,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Cluster target blobs against labeled regions of a reference image")]
struct Args {
    /// Reference image defining the cluster regions
    #[arg(long)]
    reference: PathBuf,

    /// Samples image; blobs present in both images become targets
    #[arg(long)]
    samples: PathBuf,

    /// Threshold selection algorithm: otsu, li, or yen
    #[arg(long, default_value = "otsu")]
    algorithm: String,

    /// Maximum accepted distance between a target and its nearest region
    #[arg(long, default_value_t = 10.0)]
    distance_thresh: f32,

    /// Smallest region area kept, in pixels
    #[arg(long, default_value_t = 1.0)]
    min_area: f32,

    /// Output JSON path (default: <reference stem>_clusters.json next to it)
    #[arg(long)]
    out: Option<PathBuf>,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PointDto {
    x: f32,
    y: f32,
}

#[derive(Serialize)]
struct ClusterDto {
    region: u32,
    targets: Vec<PointDto>,
}

#[derive(Serialize)]
struct Report {
    distance_thresh: f32,
    region_count: usize,
    target_count: usize,
    assigned_count: usize,
    clusters: Vec<ClusterDto>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let algorithm = match args.algorithm.as_str() {
        "otsu" => ThresholdAlgorithm::Otsu,
        "li" => ThresholdAlgorithm::Li,
        "yen" => ThresholdAlgorithm::Yen,
        other => bail!("unknown threshold algorithm '{other}' (expected otsu, li, or yen)"),
    };

    let started = Instant::now();

    let reference = load_gray(&args.reference)?;
    let samples = load_gray(&args.samples)?;

    let t_ref = threshold(&reference, algorithm, DEFAULT_NBINS)?;
    let ref_mask = binarize(&reference, t_ref, 255);
    let t_smp = threshold(&samples, algorithm, DEFAULT_NBINS)?;
    let smp_mask = binarize(&samples, t_smp, 255);

    let constraints = RegionConstraints {
        min_area: args.min_area,
        ..RegionConstraints::default()
    };
    let region_mask = microcluster::filter_regions(
        &fill_holes(&ref_mask),
        Connectivity::C8,
        &constraints,
        255,
    );
    let (region_labels, region_count) = label_components(&region_mask, Connectivity::C8);
    let regions: BTreeMap<u32, Vec<Point2f>> = region_boundaries(&region_labels, region_count)
        .into_iter()
        .enumerate()
        .map(|(i, boundary)| (i as u32 + 1, boundary))
        .collect();

    let target_mask = clear_borders(&foreground_overlap(&ref_mask, &smp_mask)?);
    let (target_labels, target_count) = label_components(&target_mask, Connectivity::C8);
    let targets: BTreeMap<u32, Point2f> = region_props(&target_labels, target_count)
        .into_iter()
        .map(|p| (p.label, p.centroid))
        .collect();

    let clusters = assign_targets_to_regions(&targets, &regions, args.distance_thresh)?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

    let assigned_count: usize = clusters.values().map(Vec::len).sum();
    println!(
        "{} regions, {} targets, {} assigned ({:.1} ms)",
        region_count, target_count, assigned_count, elapsed_ms
    );
    for (region, points) in &clusters {
        println!("  region {:>3}: {} targets", region, points.len());
    }

    let report = Report {
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
    };

    let out_path = args.out.unwrap_or_else(|| default_out_path(&args.reference));
    let text = serde_json::to_string_pretty(&report).context("serializing cluster report")?;
    std::fs::write(&out_path, text)
        .with_context(|| format!("writing report to {}", out_path.display()))?;
    println!("report written to {}", out_path.display());

    Ok(())
}

fn load_gray(path: &Path) -> Result<Image<u8>> {
    let dyn_img = ImageReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .decode()
        .with_context(|| format!("decoding {}", path.display()))?;

    let rgb = dyn_img.to_rgb8();
    let (w, h) = rgb.dimensions();
    gray_from_channels(w as usize, h as usize, 3, rgb.as_raw())
        .with_context(|| format!("reducing {} to grayscale", path.display()))
}

fn default_out_path(reference: &Path) -> PathBuf {
    let stem = reference
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("reference");
    reference.with_file_name(format!("{stem}_clusters.json"))
}
