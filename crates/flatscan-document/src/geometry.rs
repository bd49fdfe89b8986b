// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry shared by the corner search and rectification: polygon
// area, perimeter, closed Douglas-Peucker simplification, and degeneracy
// checks on corner quadrilaterals.

use flatscan_core::Point2D;
use imageproc::point::Point;

/// Relative tolerance below which three corners count as collinear.
///
/// Compared against twice the triangle area divided by the squared extent of
/// the quadrilateral, so it is independent of image resolution.
pub const COLLINEAR_TOLERANCE: f64 = 1e-6;

/// Area enclosed by a closed polygon (shoelace formula). Orientation does not
/// matter; the result is always non-negative.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area: i64 = 0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as i64 * points[j].y as i64;
        twice_area -= points[j].x as i64 * points[i].y as i64;
    }
    twice_area.abs() as f64 / 2.0
}

/// Perimeter of a closed polygon, including the closing edge.
pub fn arc_length(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| distance(points[i], points[(i + 1) % n]))
        .sum()
}

/// Simplify a closed contour with the Douglas-Peucker algorithm.
///
/// The contour is split at two far-apart anchor vertices (the point farthest
/// from the first point, and the point farthest from that one); each of the
/// two chains between the anchors is simplified independently and the kept
/// vertices are returned in contour order, without repeating the first vertex.
pub fn approximate_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let first = farthest_from(points, 0);
    let second = farthest_from(points, first);
    if first == second {
        // Every point coincides.
        return vec![points[0]];
    }
    let (a, b) = (first.min(second), first.max(second));

    let mut keep = vec![false; n];
    keep[a] = true;
    keep[b] = true;

    let forward: Vec<usize> = (a..=b).collect();
    let wrapping: Vec<usize> = (b..n).chain(0..=a).collect();
    mark_chain(points, &forward, epsilon, &mut keep);
    mark_chain(points, &wrapping, epsilon, &mut keep);

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Iterative Douglas-Peucker over one open chain of contour indices.
fn mark_chain(points: &[Point<i32>], chain: &[usize], epsilon: f64, keep: &mut [bool]) {
    if chain.len() < 3 {
        return;
    }
    let mut stack = vec![(0usize, chain.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let p0 = points[chain[start]];
        let p1 = points[chain[end]];

        let mut split = start;
        let mut max_dist = 0.0;
        for (offset, &index) in chain[start + 1..end].iter().enumerate() {
            let d = line_distance(points[index], p0, p1);
            if d > max_dist {
                max_dist = d;
                split = start + 1 + offset;
            }
        }

        if max_dist > epsilon {
            keep[chain[split]] = true;
            stack.push((start, split));
            stack.push((split, end));
        }
    }
}

fn farthest_from(points: &[Point<i32>], origin: usize) -> usize {
    let o = points[origin];
    let mut best = origin;
    let mut best_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let d = distance(o, p);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the infinite line through `a` and `b` (or to `a` when
/// the two coincide).
fn line_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return distance(p, a);
    }
    let cross = dx * (p.y - a.y) as f64 - dy * (p.x - a.x) as f64;
    cross.abs() / len
}

/// Twice the signed area of triangle `abc`.
fn cross(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    let (abx, aby) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let (acx, acy) = ((c.x - a.x) as f64, (c.y - a.y) as f64);
    abx * acy - aby * acx
}

/// Describe why four corners cannot define a perspective transform, or
/// `None` if they can.
///
/// Coincident corners and any three collinear corners make the 4-point
/// perspective solve singular.
pub fn quad_degeneracy(corners: &[Point2D; 4]) -> Option<String> {
    let mut extent = 0.0f64;
    for i in 0..4 {
        for j in (i + 1)..4 {
            let d = corners[i].distance(&corners[j]) as f64;
            if d == 0.0 {
                return Some(format!(
                    "corners {} and {} coincide at {}",
                    i, j, corners[i]
                ));
            }
            extent = extent.max(d);
        }
    }

    let scale = extent * extent;
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    for (i, j, k) in TRIPLES {
        let twice_area = cross(corners[i], corners[j], corners[k]).abs();
        if twice_area <= COLLINEAR_TOLERANCE * scale {
            return Some(format!(
                "corners {}, {} and {} are collinear",
                corners[i], corners[j], corners[k]
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        // Walk the border one pixel at a time, as a traced contour would.
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push(Point::new(x, y0));
        }
        for y in y0..y1 {
            pts.push(Point::new(x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(Point::new(x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(Point::new(x0, y));
        }
        pts
    }

    #[test]
    fn area_of_rectangle() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 5),
            Point::new(0, 5),
        ];
        assert!((polygon_area(&square) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn area_ignores_orientation() {
        let ccw = [Point::new(0, 0), Point::new(0, 4), Point::new(4, 4), Point::new(4, 0)];
        assert!((polygon_area(&ccw) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn perimeter_includes_closing_edge() {
        let square = [
            Point::new(0, 0),
            Point::new(3, 0),
            Point::new(3, 4),
            Point::new(0, 4),
        ];
        assert!((arc_length(&square) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn dense_rectangle_simplifies_to_four_corners() {
        let outline = rect_outline(10, 20, 110, 70);
        let epsilon = 0.05 * arc_length(&outline);
        let approx = approximate_polygon(&outline, epsilon);

        assert_eq!(approx.len(), 4, "got {:?}", approx);
        for corner in [
            Point::new(10, 20),
            Point::new(110, 20),
            Point::new(110, 70),
            Point::new(10, 70),
        ] {
            assert!(approx.contains(&corner), "missing {:?} in {:?}", corner, approx);
        }
    }

    #[test]
    fn small_epsilon_keeps_a_notch() {
        // A rectangle with a 10px inward notch on the top edge.
        let mut outline = Vec::new();
        for x in 0..40 {
            outline.push(Point::new(x, 0));
        }
        for y in 0..10 {
            outline.push(Point::new(40, y));
        }
        for x in 41..60 {
            outline.push(Point::new(x, 10));
        }
        for y in (0..10).rev() {
            outline.push(Point::new(60, y));
        }
        for x in 61..100 {
            outline.push(Point::new(x, 0));
        }
        for y in 0..100 {
            outline.push(Point::new(100, y));
        }
        for x in (1..=100).rev() {
            outline.push(Point::new(x, 100));
        }
        for y in (1..=100).rev() {
            outline.push(Point::new(0, y));
        }

        let coarse = approximate_polygon(&outline, 0.05 * arc_length(&outline));
        assert_eq!(coarse.len(), 4);

        let fine = approximate_polygon(&outline, 2.0);
        assert!(fine.len() > 4, "notch should survive: {:?}", fine);
    }

    #[test]
    fn tiny_inputs_pass_through() {
        let two = [Point::new(1, 1), Point::new(5, 5)];
        assert_eq!(approximate_polygon(&two, 1.0), two.to_vec());
    }

    #[test]
    fn convex_quad_is_not_degenerate() {
        let quad = [
            Point2D::new(10.0, 12.0),
            Point2D::new(400.0, 30.0),
            Point2D::new(20.0, 500.0),
            Point2D::new(390.0, 480.0),
        ];
        assert!(quad_degeneracy(&quad).is_none());
    }

    #[test]
    fn collinear_corners_are_degenerate() {
        let line = [
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(20.0, 20.0),
            Point2D::new(30.0, 30.0),
        ];
        let reason = quad_degeneracy(&line).expect("collinear");
        assert!(reason.contains("collinear"));
    }

    #[test]
    fn three_collinear_corners_are_degenerate() {
        let quad = [
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(200.0, 0.0),
            Point2D::new(50.0, 80.0),
        ];
        assert!(quad_degeneracy(&quad).is_some());
    }

    #[test]
    fn coincident_corners_are_degenerate() {
        let quad = [
            Point2D::new(5.0, 5.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 50.0),
            Point2D::new(50.0, 50.0),
        ];
        let reason = quad_degeneracy(&quad).expect("coincident");
        assert!(reason.contains("coincide"));
    }
}
