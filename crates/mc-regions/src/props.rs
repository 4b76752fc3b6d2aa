use mc_core::{Image, Point2f};

use crate::label::{DX, DY};

/// Shape descriptors of one labeled region.
///
/// Solidity is the pixel area divided by the area of the convex hull of the
/// region's pixel centers; 1 for convex regions, lower the more bays and
/// notches the region has. Eccentricity comes from the second central
/// moments: 0 for a circle or square, approaching 1 for a line.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionProps {
    pub label: u32,
    /// Pixel count.
    pub area: usize,
    /// Mean of pixel centers, `x` along columns, `y` along rows.
    pub centroid: Point2f,
    /// `[min_row, min_col, max_row, max_col]`, inclusive.
    pub bbox: [usize; 4],
    pub solidity: f32,
    pub eccentricity: f32,
}

/// Computes [`RegionProps`] for every label `1..=count`, in label order.
///
/// Labels outside `1..=count` are ignored; a label with no pixels yields a
/// zero-area entry so the output always has `count` elements.
pub fn region_props(labels: &Image<u32>, count: usize) -> Vec<RegionProps> {
    let width = labels.width();

    let mut pixels: Vec<Vec<(i64, i64)>> = vec![Vec::new(); count];
    for (i, &l) in labels.data().iter().enumerate() {
        if l == 0 || l as usize > count {
            continue;
        }
        let x = (i % width) as i64;
        let y = (i / width) as i64;
        pixels[l as usize - 1].push((x, y));
    }

    pixels
        .iter()
        .enumerate()
        .map(|(i, pts)| props_of(i as u32 + 1, pts))
        .collect()
}

fn props_of(label: u32, pts: &[(i64, i64)]) -> RegionProps {
    if pts.is_empty() {
        return RegionProps {
            label,
            area: 0,
            centroid: Point2f::default(),
            bbox: [0, 0, 0, 0],
            solidity: 1.0,
            eccentricity: 0.0,
        };
    }

    let n = pts.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut min_x = i64::MAX;
    let mut max_x = i64::MIN;
    let mut min_y = i64::MAX;
    let mut max_y = i64::MIN;

    for &(x, y) in pts {
        sum_x += x as f64;
        sum_y += y as f64;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let cx = sum_x / n;
    let cy = sum_y / n;

    let mut mu20 = 0.0;
    let mut mu02 = 0.0;
    let mut mu11 = 0.0;
    for &(x, y) in pts {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        mu20 += dx * dx;
        mu02 += dy * dy;
        mu11 += dx * dy;
    }
    mu20 /= n;
    mu02 /= n;
    mu11 /= n;

    RegionProps {
        label,
        area: pts.len(),
        centroid: Point2f {
            x: cx as f32,
            y: cy as f32,
        },
        bbox: [
            min_y as usize,
            min_x as usize,
            max_y as usize,
            max_x as usize,
        ],
        solidity: solidity(pts),
        eccentricity: eccentricity(mu20, mu02, mu11),
    }
}

fn eccentricity(mu20: f64, mu02: f64, mu11: f64) -> f32 {
    let half_trace = (mu20 + mu02) / 2.0;
    let common = (((mu20 - mu02) / 2.0).powi(2) + mu11 * mu11).sqrt();

    let major = half_trace + common;
    let minor = (half_trace - common).max(0.0);

    if major <= f64::EPSILON {
        return 0.0;
    }

    (1.0 - minor / major).max(0.0).sqrt() as f32
}

fn solidity(pts: &[(i64, i64)]) -> f32 {
    let hull = convex_hull(pts);
    if hull.len() < 3 {
        // Single pixels and collinear runs are their own hull.
        return 1.0;
    }

    // Shoelace area of the hull polygon, then Pick's theorem to turn it
    // into a lattice pixel count: pixels = A + B/2 + 1.
    let mut twice_area = 0i64;
    let mut boundary = 0i64;
    for (i, &(x0, y0)) in hull.iter().enumerate() {
        let (x1, y1) = hull[(i + 1) % hull.len()];
        twice_area += x0 * y1 - x1 * y0;
        boundary += gcd((x1 - x0).abs(), (y1 - y0).abs());
    }

    let hull_pixels = twice_area.abs() as f64 / 2.0 + boundary as f64 / 2.0 + 1.0;
    (pts.len() as f64 / hull_pixels).min(1.0) as f32
}

// Monotone chain over integer pixel coordinates. Input pixels are unique by
// construction; output is counter-clockwise without the closing point.
fn convex_hull(pts: &[(i64, i64)]) -> Vec<(i64, i64)> {
    if pts.len() < 3 {
        return pts.to_vec();
    }

    let mut sorted = pts.to_vec();
    sorted.sort_unstable();

    let cross =
        |o: (i64, i64), a: (i64, i64), b: (i64, i64)| -> i64 {
            (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
        };

    let mut hull: Vec<(i64, i64)> = Vec::with_capacity(sorted.len() + 1);
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }

    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev() {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Extracts the boundary pixels of every label `1..=count`, in label order.
///
/// A pixel is boundary if any 4-neighbor carries a different label or falls
/// outside the image. Points are emitted in scan order as pixel centers.
pub fn region_boundaries(labels: &Image<u32>, count: usize) -> Vec<Vec<Point2f>> {
    let (width, height) = labels.dims();
    let data = labels.data();
    let mut boundaries: Vec<Vec<Point2f>> = vec![Vec::new(); count];

    const C4: [usize; 4] = [0, 2, 4, 6];

    for (i, &l) in data.iter().enumerate() {
        if l == 0 || l as usize > count {
            continue;
        }

        let x = i % width;
        let y = i / width;

        let mut on_boundary = false;
        for &dir in &C4 {
            let nx = x as isize + DX[dir];
            let ny = y as isize + DY[dir];
            if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                on_boundary = true;
                break;
            }
            if data[ny as usize * width + nx as usize] != l {
                on_boundary = true;
                break;
            }
        }

        if on_boundary {
            boundaries[l as usize - 1].push(Point2f {
                x: x as f32,
                y: y as f32,
            });
        }
    }

    boundaries
}

#[cfg(test)]
mod tests {
    use super::{region_boundaries, region_props};
    use crate::label::{label_components, Connectivity};
    use mc_core::Image;

    fn mask_from_rows(rows: &[&[u8]]) -> Image<u8> {
        let height = rows.len();
        let width = rows[0].len();
        let mut data = Vec::with_capacity(width * height);
        for row in rows {
            data.extend_from_slice(row);
        }
        Image::from_vec(width, height, data).expect("valid image")
    }

    #[test]
    fn rectangle_has_exact_area_centroid_bbox() {
        let mask = mask_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 255, 255, 255, 0],
            &[0, 255, 255, 255, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let (labels, count) = label_components(&mask, Connectivity::C8);
        let props = region_props(&labels, count);

        assert_eq!(props.len(), 1);
        let r = &props[0];
        assert_eq!(r.label, 1);
        assert_eq!(r.area, 6);
        assert!((r.centroid.x - 2.0).abs() < 1e-6);
        assert!((r.centroid.y - 1.5).abs() < 1e-6);
        assert_eq!(r.bbox, [1, 1, 2, 3]);
        assert!((r.solidity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn square_is_round_bar_is_elongated() {
        let square = mask_from_rows(&[
            &[255, 255, 255],
            &[255, 255, 255],
            &[255, 255, 255],
        ]);
        let (labels, count) = label_components(&square, Connectivity::C8);
        let props = region_props(&labels, count);
        assert!(props[0].eccentricity < 1e-3);

        let bar = mask_from_rows(&[&[255, 255, 255, 255, 255, 255, 255]]);
        let (labels, count) = label_components(&bar, Connectivity::C8);
        let props = region_props(&labels, count);
        assert!(props[0].eccentricity > 0.99);
    }

    #[test]
    fn cross_shape_is_not_solid() {
        let cross = mask_from_rows(&[
            &[0, 0, 255, 0, 0],
            &[0, 0, 255, 0, 0],
            &[255, 255, 255, 255, 255],
            &[0, 0, 255, 0, 0],
            &[0, 0, 255, 0, 0],
        ]);
        let (labels, count) = label_components(&cross, Connectivity::C4);
        let props = region_props(&labels, count);

        assert_eq!(props[0].area, 9);
        assert!(props[0].solidity < 0.8, "solidity {}", props[0].solidity);
    }

    #[test]
    fn single_pixel_region_is_degenerate() {
        let mask = mask_from_rows(&[&[0, 0], &[0, 255]]);
        let (labels, count) = label_components(&mask, Connectivity::C8);
        let props = region_props(&labels, count);

        assert_eq!(props[0].area, 1);
        assert_eq!(props[0].solidity, 1.0);
        assert_eq!(props[0].eccentricity, 0.0);
    }

    #[test]
    fn filled_square_boundary_excludes_interior() {
        let mask = mask_from_rows(&[
            &[255, 255, 255],
            &[255, 255, 255],
            &[255, 255, 255],
        ]);
        let (labels, count) = label_components(&mask, Connectivity::C8);
        let boundaries = region_boundaries(&labels, count);

        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].len(), 8);
        assert!(!boundaries[0]
            .iter()
            .any(|p| p.x == 1.0 && p.y == 1.0));
    }

    #[test]
    fn touching_regions_have_separate_boundaries() {
        let mask = mask_from_rows(&[&[255, 255, 0, 255]]);
        let (labels, count) = label_components(&mask, Connectivity::C4);
        let boundaries = region_boundaries(&labels, count);

        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].len(), 2);
        assert_eq!(boundaries[1].len(), 1);
    }
}
