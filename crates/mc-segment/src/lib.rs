//! Binary segmentation combinators.
//!
//! Pixels are treated as binary with threshold `> 0`.
//! Outputs are `0` or `255` in `u8`.

use mc_core::{Error, Image};

/// Mask of the pixels that are foreground in both inputs.
///
/// The inputs must have identical dimensions.
pub fn foreground_overlap(a: &Image<u8>, b: &Image<u8>) -> Result<Image<u8>, Error> {
    if a.dims() != b.dims() {
        return Err(Error::DimensionMismatch {
            left: a.dims(),
            right: b.dims(),
        });
    }

    let mut out = Image::new_fill(a.width(), a.height(), 0u8);
    for ((dst, &va), &vb) in out.data_mut().iter_mut().zip(a.data()).zip(b.data()) {
        if va > 0 && vb > 0 {
            *dst = 255;
        }
    }

    Ok(out)
}

/// Fills enclosed background holes.
///
/// Background components with no 4-connected path to the image border become
/// foreground; background reachable from the border stays background.
pub fn fill_holes(mask: &Image<u8>) -> Image<u8> {
    let (width, height) = mask.dims();
    let mut out = Image::new_fill(width, height, 0u8);
    if width == 0 || height == 0 {
        return out;
    }

    let src = mask.data();
    let outside = flood_from_border(src, width, height, |v| v == 0, false);

    for (i, dst) in out.data_mut().iter_mut().enumerate() {
        if src[i] > 0 || !outside[i] {
            *dst = 255;
        }
    }

    out
}

/// Removes foreground components that touch the image border.
///
/// Components are 8-connected; interior components survive unchanged.
pub fn clear_borders(mask: &Image<u8>) -> Image<u8> {
    let (width, height) = mask.dims();
    let mut out = Image::new_fill(width, height, 0u8);
    if width == 0 || height == 0 {
        return out;
    }

    let src = mask.data();
    let touches_border = flood_from_border(src, width, height, |v| v > 0, true);

    for (i, dst) in out.data_mut().iter_mut().enumerate() {
        if src[i] > 0 && !touches_border[i] {
            *dst = 255;
        }
    }

    out
}

// Marks every pixel satisfying `pred` that is connected to a border pixel
// satisfying `pred`. `diagonal` switches between 4- and 8-neighborhoods.
fn flood_from_border(
    src: &[u8],
    width: usize,
    height: usize,
    pred: impl Fn(u8) -> bool,
    diagonal: bool,
) -> Vec<bool> {
    let mut marked = vec![false; src.len()];
    let mut stack: Vec<usize> = Vec::new();

    let seed = |p: usize, marked: &mut Vec<bool>, stack: &mut Vec<usize>| {
        if pred(src[p]) && !marked[p] {
            marked[p] = true;
            stack.push(p);
        }
    };

    for x in 0..width {
        seed(x, &mut marked, &mut stack);
        seed((height - 1) * width + x, &mut marked, &mut stack);
    }
    for y in 0..height {
        seed(y * width, &mut marked, &mut stack);
        seed(y * width + width - 1, &mut marked, &mut stack);
    }

    while let Some(p) = stack.pop() {
        let x = (p % width) as isize;
        let y = (p / width) as isize;

        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if !diagonal && dx != 0 && dy != 0 {
                    continue;
                }

                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }

                let np = ny as usize * width + nx as usize;
                if pred(src[np]) && !marked[np] {
                    marked[np] = true;
                    stack.push(np);
                }
            }
        }
    }

    marked
}
