use mc_core::Image;

pub(crate) const DX: [isize; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
pub(crate) const DY: [isize; 8] = [0, -1, -1, -1, 0, 1, 1, 1];
const DIRS_C4: [u8; 4] = [0, 2, 4, 6];
const DIRS_C8: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Pixel neighborhood used when growing components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    C4,
    C8,
}

pub(crate) fn dirs_for(connectivity: Connectivity) -> &'static [u8] {
    match connectivity {
        Connectivity::C4 => &DIRS_C4,
        Connectivity::C8 => &DIRS_C8,
    }
}

/// Labels connected foreground components of a binary mask.
///
/// Foreground is any pixel `> 0`. Components are numbered from `1` in scan
/// order; background pixels stay `0`. Returns the label map and the number
/// of components found.
pub fn label_components(mask: &Image<u8>, connectivity: Connectivity) -> (Image<u32>, usize) {
    let (width, height) = mask.dims();
    let mut labels = Image::new_fill(width, height, 0u32);
    if width == 0 || height == 0 {
        return (labels, 0);
    }

    let dirs = dirs_for(connectivity);
    let src = mask.data();
    let dst = labels.data_mut();

    let mut next = 0u32;
    let mut stack: Vec<usize> = Vec::new();

    for start in 0..src.len() {
        if src[start] == 0 || dst[start] != 0 {
            continue;
        }

        next += 1;
        dst[start] = next;
        stack.push(start);

        while let Some(p) = stack.pop() {
            let x = p % width;
            let y = p / width;

            for &dir in dirs {
                let nx = x as isize + DX[dir as usize];
                let ny = y as isize + DY[dir as usize];
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }

                let np = ny as usize * width + nx as usize;
                if src[np] != 0 && dst[np] == 0 {
                    dst[np] = next;
                    stack.push(np);
                }
            }
        }
    }

    (labels, next as usize)
}

#[cfg(test)]
mod tests {
    use super::{label_components, Connectivity};
    use mc_core::Image;

    #[test]
    fn diagonal_pixels_split_under_c4_join_under_c8() {
        let mask = Image::from_vec(2, 2, vec![255u8, 0, 0, 255]).expect("valid image");

        let (labels, count) = label_components(&mask, Connectivity::C4);
        assert_eq!(count, 2);
        assert_eq!(labels.data(), &[1, 0, 0, 2]);

        let (labels, count) = label_components(&mask, Connectivity::C8);
        assert_eq!(count, 1);
        assert_eq!(labels.data(), &[1, 0, 0, 1]);
    }

    #[test]
    fn background_stays_zero_and_labels_are_dense() {
        let mask = Image::from_vec(
            5,
            3,
            vec![
                255, 255, 0, 0, 255, //
                0, 0, 0, 0, 255, //
                255, 0, 0, 0, 0, //
            ],
        )
        .expect("valid image");

        let (labels, count) = label_components(&mask, Connectivity::C4);
        assert_eq!(count, 3);

        let mut seen = vec![false; count];
        for (&m, &l) in mask.data().iter().zip(labels.data()) {
            if m == 0 {
                assert_eq!(l, 0);
            } else {
                assert!(l >= 1 && l as usize <= count);
                seen[l as usize - 1] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn empty_mask_has_no_components() {
        let mask = Image::new_fill(4, 4, 0u8);
        let (labels, count) = label_components(&mask, Connectivity::C8);

        assert_eq!(count, 0);
        assert!(labels.data().iter().all(|&l| l == 0));
    }
}
