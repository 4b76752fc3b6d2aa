use mc_core::Image;

use crate::label::{label_components, Connectivity};
use crate::props::{region_props, RegionProps};

/// Acceptance window on region shape descriptors.
///
/// An explicit value passed into each call; the default is fully unbounded,
/// so `RegionConstraints::default()` accepts every region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionConstraints {
    pub min_area: f32,
    pub max_area: f32,
    pub min_solidity: f32,
    pub max_solidity: f32,
    pub min_eccentricity: f32,
    pub max_eccentricity: f32,
}

impl Default for RegionConstraints {
    fn default() -> Self {
        Self {
            min_area: f32::NEG_INFINITY,
            max_area: f32::INFINITY,
            min_solidity: f32::NEG_INFINITY,
            max_solidity: f32::INFINITY,
            min_eccentricity: f32::NEG_INFINITY,
            max_eccentricity: f32::INFINITY,
        }
    }
}

impl RegionConstraints {
    pub fn accepts(&self, props: &RegionProps) -> bool {
        let area = props.area as f32;

        area >= self.min_area
            && area <= self.max_area
            && props.solidity >= self.min_solidity
            && props.solidity <= self.max_solidity
            && props.eccentricity >= self.min_eccentricity
            && props.eccentricity <= self.max_eccentricity
    }
}

/// Builds a binary mask of the wanted labels.
///
/// `wanted[i]` decides the fate of label `i + 1`; kept pixels are written as
/// `foreground`, everything else as `0`.
pub fn select_regions(labels: &Image<u32>, wanted: &[bool], foreground: u8) -> Image<u8> {
    let mut out = Image::new_fill(labels.width(), labels.height(), 0u8);

    for (dst, &l) in out.data_mut().iter_mut().zip(labels.data()) {
        if l == 0 {
            continue;
        }
        if wanted.get(l as usize - 1).copied().unwrap_or(false) {
            *dst = foreground;
        }
    }

    out
}

/// Retains only the connected components of `mask` whose shape descriptors
/// fall inside `constraints`. Labels, measures, filters, re-selects.
pub fn filter_regions(
    mask: &Image<u8>,
    connectivity: Connectivity,
    constraints: &RegionConstraints,
    foreground: u8,
) -> Image<u8> {
    let (labels, count) = label_components(mask, connectivity);
    let props = region_props(&labels, count);

    let wanted: Vec<bool> = props.iter().map(|p| constraints.accepts(p)).collect();

    select_regions(&labels, &wanted, foreground)
}

#[cfg(test)]
mod tests {
    use super::{filter_regions, select_regions, RegionConstraints};
    use crate::label::{label_components, Connectivity};
    use mc_core::Image;

    fn two_blob_mask() -> Image<u8> {
        // One 4-pixel square, one isolated pixel.
        Image::from_vec(
            5,
            3,
            vec![
                255, 255, 0, 0, 0, //
                255, 255, 0, 0, 255, //
                0, 0, 0, 0, 0, //
            ],
        )
        .expect("valid image")
    }

    #[test]
    fn default_constraints_keep_all_foreground() {
        let mask = two_blob_mask();
        let kept = filter_regions(
            &mask,
            Connectivity::C4,
            &RegionConstraints::default(),
            255,
        );

        let expected: Vec<u8> = mask.data().iter().map(|&v| if v > 0 { 255 } else { 0 }).collect();
        assert_eq!(kept.data(), &expected[..]);
    }

    #[test]
    fn area_window_drops_out_of_range_blobs() {
        let mask = two_blob_mask();
        let constraints = RegionConstraints {
            min_area: 2.0,
            ..RegionConstraints::default()
        };
        let kept = filter_regions(&mask, Connectivity::C4, &constraints, 255);

        assert_eq!(kept.get(0, 0), Some(&255));
        assert_eq!(kept.get(4, 1), Some(&0));
    }

    #[test]
    fn select_regions_respects_wanted_flags() {
        let mask = two_blob_mask();
        let (labels, count) = label_components(&mask, Connectivity::C4);
        assert_eq!(count, 2);

        let only_second = select_regions(&labels, &[false, true], 255);
        assert_eq!(only_second.get(0, 0), Some(&0));
        assert_eq!(only_second.get(4, 1), Some(&255));
    }
}
