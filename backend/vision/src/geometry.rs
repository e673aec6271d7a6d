//! Closed-polygon helpers for the square-region finder.

use imageproc::contours::Contour;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned bounds in pixel coordinates (inclusive of `x`, `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// A closed polygon; the last point connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn from_contour(contour: &Contour<u32>) -> Self {
        Self::new(
            contour
                .points
                .iter()
                .map(|p| Point::new(p.x as f32, p.y as f32))
                .collect(),
        )
    }

    /// Shoelace area.
    pub fn area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f32 = (0..n)
            .map(|i| {
                let (a, b) = (self.points[i], self.points[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice.abs() / 2.0
    }

    pub fn perimeter(&self) -> f32 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.points[i].distance(&self.points[(i + 1) % n]))
            .sum()
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x) as u32 + 1,
            height: (max_y - min_y) as u32 + 1,
        })
    }

    /// Douglas-Peucker simplification of the closed curve.
    ///
    /// The curve is split at the vertex farthest from the first one and each
    /// half is simplified as an open polyline.
    pub fn approx_poly_dp(&self, epsilon: f32) -> Polygon {
        let n = self.points.len();
        if n <= 3 {
            return self.clone();
        }
        let origin = self.points[0];
        let far = (1..n)
            .max_by(|&a, &b| {
                origin
                    .distance(&self.points[a])
                    .total_cmp(&origin.distance(&self.points[b]))
            })
            .unwrap_or(n / 2);

        let mut first_half = self.points[..=far].to_vec();
        let mut second_half = self.points[far..].to_vec();
        second_half.push(origin);

        first_half = douglas_peucker(&first_half, epsilon);
        second_half = douglas_peucker(&second_half, epsilon);

        // Drop the shared endpoints once.
        first_half.pop();
        second_half.pop();
        first_half.extend(second_half);
        Polygon::new(first_half)
    }
}

fn douglas_peucker(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }
        let (index, dist) = ((start + 1)..end)
            .map(|i| (i, line_distance(&points[i], &points[start], &points[end])))
            .fold((start, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });
        if dist > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn line_distance(p: &Point, a: &Point, b: &Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}
