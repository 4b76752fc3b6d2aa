use mc_core::{Error, Image};

use crate::histogram::GrayHistogram;

/// Global threshold selection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdAlgorithm {
    /// Maximize between-class variance (Otsu).
    Otsu,
    /// Iterative minimum cross entropy (Li).
    Li,
    /// Maximize Yen's maximum-correlation criterion.
    Yen,
}

/// Default histogram resolution for the histogram-based algorithms.
pub const DEFAULT_NBINS: usize = 256;

/// Computes a global threshold for `image` with the selected algorithm.
///
/// `nbins` controls histogram resolution for [`ThresholdAlgorithm::Otsu`] and
/// [`ThresholdAlgorithm::Yen`]; Li's method iterates on gray levels directly
/// and ignores it. Pixels strictly above the returned value are foreground,
/// see [`binarize`].
pub fn threshold(
    image: &Image<u8>,
    algorithm: ThresholdAlgorithm,
    nbins: usize,
) -> Result<f32, Error> {
    match algorithm {
        ThresholdAlgorithm::Otsu => {
            let hist = GrayHistogram::from_image(image, nbins)?;
            Ok(otsu(&hist))
        }
        ThresholdAlgorithm::Li => {
            let hist = GrayHistogram::from_image(image, DEFAULT_NBINS)?;
            Ok(li(&hist))
        }
        ThresholdAlgorithm::Yen => {
            let hist = GrayHistogram::from_image(image, nbins)?;
            Ok(yen(&hist))
        }
    }
}

/// Binarizes `image` with the strictly-greater rule: `pixel > thresh` maps
/// to `foreground`, everything else to `0`.
pub fn binarize(image: &Image<u8>, thresh: f32, foreground: u8) -> Image<u8> {
    let mut out = Image::new_fill(image.width(), image.height(), 0u8);
    for (dst, &src) in out.data_mut().iter_mut().zip(image.data()) {
        if src as f32 > thresh {
            *dst = foreground;
        }
    }
    out
}

fn otsu(hist: &GrayHistogram) -> f32 {
    let total = hist.total() as f64;

    let mut sum = 0.0;
    for (i, &count) in hist.counts().iter().enumerate() {
        sum += hist.bin_value(i) as f64 * count as f64;
    }

    let mut sum_b = 0.0;
    let mut weight_b = 0.0;
    let mut max_variance = 0.0;
    let mut best_bin = 0;

    for (i, &count) in hist.counts().iter().enumerate() {
        weight_b += count as f64;
        if weight_b == 0.0 {
            continue;
        }

        let weight_f = total - weight_b;
        if weight_f == 0.0 {
            break;
        }

        sum_b += hist.bin_value(i) as f64 * count as f64;
        let mean_b = sum_b / weight_b;
        let mean_f = (sum - sum_b) / weight_f;

        let variance = weight_b * weight_f * (mean_b - mean_f) * (mean_b - mean_f);
        if variance > max_variance {
            max_variance = variance;
            best_bin = i;
        }
    }

    hist.bin_value(best_bin)
}

// Li & Tam's iterative minimum-cross-entropy fix point,
// t <- (mu_bg - mu_fg) / (ln mu_bg - ln mu_fg).
// Gray levels are shifted by +1 so the logarithms stay defined at level 0.
fn li(hist: &GrayHistogram) -> f32 {
    const MAX_ITER: usize = 64;
    const TOLERANCE: f64 = 0.5;

    let mut sum = 0.0;
    let mut total = 0.0;
    for (i, &count) in hist.counts().iter().enumerate() {
        sum += (hist.bin_value(i) as f64 + 1.0) * count as f64;
        total += count as f64;
    }

    let mut t = sum / total;
    for _ in 0..MAX_ITER {
        let mut sum_b = 0.0;
        let mut w_b = 0.0;
        let mut sum_f = 0.0;
        let mut w_f = 0.0;

        for (i, &count) in hist.counts().iter().enumerate() {
            let value = hist.bin_value(i) as f64 + 1.0;
            if value <= t {
                sum_b += value * count as f64;
                w_b += count as f64;
            } else {
                sum_f += value * count as f64;
                w_f += count as f64;
            }
        }

        // One side empty means the histogram is constant on one side of t;
        // the fix point is already as good as it gets.
        if w_b == 0.0 || w_f == 0.0 {
            break;
        }

        let mu_b = sum_b / w_b;
        let mu_f = sum_f / w_f;
        let next = (mu_b - mu_f) / (mu_b.ln() - mu_f.ln());

        let done = (next - t).abs() < TOLERANCE;
        t = next;
        if done {
            break;
        }
    }

    (t - 1.0) as f32
}

fn yen(hist: &GrayHistogram) -> f32 {
    let total = hist.total() as f64;

    let p: Vec<f64> = hist.counts().iter().map(|&c| c as f64 / total).collect();

    let mut total_sq = 0.0;
    for &q in &p {
        total_sq += q * q;
    }

    let mut p1 = 0.0;
    let mut p1_sq = 0.0;
    let mut best_crit = f64::NEG_INFINITY;
    let mut best_bin = 0;

    for (i, &q) in p.iter().enumerate() {
        p1 += q;
        p1_sq += q * q;

        let p2_sq = total_sq - p1_sq;
        if p1 <= 0.0 || p1 >= 1.0 || p1_sq <= 0.0 || p2_sq <= 0.0 {
            continue;
        }

        let sep = p1 * (1.0 - p1);
        let crit = (sep * sep / (p1_sq * p2_sq)).ln();
        if crit > best_crit {
            best_crit = crit;
            best_bin = i;
        }
    }

    hist.bin_value(best_bin)
}

#[cfg(test)]
mod tests {
    use super::{binarize, threshold, ThresholdAlgorithm, DEFAULT_NBINS};
    use mc_core::{Error, Image};

    fn bimodal() -> Image<u8> {
        let mut data = vec![10u8; 50];
        data.extend(vec![200u8; 50]);
        Image::from_vec(10, 10, data).expect("valid image")
    }

    #[test]
    fn otsu_separates_bimodal_modes() {
        let img = bimodal();
        let t = threshold(&img, ThresholdAlgorithm::Otsu, DEFAULT_NBINS).expect("valid input");

        assert!((10.0..200.0).contains(&t), "threshold {t} outside modes");

        let mask = binarize(&img, t, 255);
        let fg = mask.data().iter().filter(|&&v| v > 0).count();
        assert_eq!(fg, 50);
    }

    #[test]
    fn li_separates_bimodal_modes() {
        let img = bimodal();
        let t = threshold(&img, ThresholdAlgorithm::Li, DEFAULT_NBINS).expect("valid input");

        assert!((10.0..200.0).contains(&t), "threshold {t} outside modes");
    }

    #[test]
    fn li_returns_constant_for_constant_image() {
        let img = Image::new_fill(4, 4, 42u8);
        let t = threshold(&img, ThresholdAlgorithm::Li, DEFAULT_NBINS).expect("valid input");

        assert!((t - 42.0).abs() < 1.0, "expected ~42, got {t}");
    }

    #[test]
    fn yen_separates_bimodal_modes() {
        let img = bimodal();
        let t = threshold(&img, ThresholdAlgorithm::Yen, DEFAULT_NBINS).expect("valid input");

        assert!((10.0..200.0).contains(&t), "threshold {t} outside modes");
    }

    #[test]
    fn binarize_is_strictly_greater() {
        let img = Image::from_vec(3, 1, vec![9u8, 10, 11]).expect("valid image");
        let mask = binarize(&img, 10.0, 255);

        assert_eq!(mask.data(), &[0, 0, 255]);
    }

    #[test]
    fn threshold_rejects_empty_image() {
        let empty = Image::from_vec(0, 0, Vec::new()).expect("valid image");
        assert!(matches!(
            threshold(&empty, ThresholdAlgorithm::Otsu, DEFAULT_NBINS),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
