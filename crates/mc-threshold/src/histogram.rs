use mc_core::{Error, Image};

/// Gray-level histogram over `[0, 255]` collapsed into `nbins` equal bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayHistogram {
    counts: Vec<u64>,
    total: u64,
}

impl GrayHistogram {
    /// Builds a histogram with `nbins` bins, `1 ..= 256`.
    pub fn from_image(image: &Image<u8>, nbins: usize) -> Result<Self, Error> {
        if nbins == 0 || nbins > 256 {
            return Err(Error::InvalidArgument {
                name: "nbins",
                reason: "must be in 1..=256",
            });
        }
        if image.data().is_empty() {
            return Err(Error::InvalidArgument {
                name: "image",
                reason: "must contain at least one pixel",
            });
        }

        let mut counts = vec![0u64; nbins];
        for &v in image.data() {
            counts[v as usize * nbins / 256] += 1;
        }
        let total = image.data().len() as u64;

        Ok(Self { counts, total })
    }

    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Gray level at the center of `bin`. With 256 bins this is the gray
    /// level itself.
    pub fn bin_value(&self, bin: usize) -> f32 {
        let width = 256.0 / self.counts.len() as f32;
        (bin as f32 + 0.5) * width - 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::GrayHistogram;
    use mc_core::{Error, Image};

    #[test]
    fn full_resolution_bins_count_gray_levels() {
        let img = Image::from_vec(4, 1, vec![0u8, 0, 7, 255]).expect("valid image");
        let hist = GrayHistogram::from_image(&img, 256).expect("valid histogram");

        assert_eq!(hist.counts()[0], 2);
        assert_eq!(hist.counts()[7], 1);
        assert_eq!(hist.counts()[255], 1);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.bin_value(7), 7.0);
    }

    #[test]
    fn coarse_bins_collapse_levels() {
        let img = Image::from_vec(4, 1, vec![0u8, 127, 128, 255]).expect("valid image");
        let hist = GrayHistogram::from_image(&img, 2).expect("valid histogram");

        assert_eq!(hist.counts(), &[2, 2]);
    }

    #[test]
    fn rejects_bad_bin_counts_and_empty_images() {
        let img = Image::from_vec(2, 1, vec![0u8, 1]).expect("valid image");
        assert!(matches!(
            GrayHistogram::from_image(&img, 0),
            Err(Error::InvalidArgument { name: "nbins", .. })
        ));
        assert!(matches!(
            GrayHistogram::from_image(&img, 257),
            Err(Error::InvalidArgument { name: "nbins", .. })
        ));

        let empty = Image::from_vec(0, 0, Vec::new()).expect("valid image");
        assert!(matches!(
            GrayHistogram::from_image(&empty, 256),
            Err(Error::InvalidArgument { name: "image", .. })
        ));
    }
}
