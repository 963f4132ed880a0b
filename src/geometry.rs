//! Integer-grid geometry for room outlines.
//!
//! Everything the generator places lives on an integer lattice:
//!
//! - [`Point`]: a 2D lattice point, also used for relative offsets.
//! - [`OrthoLine`]: an axis-aligned lattice segment. Door positions and
//!   configuration-space offsets are both stored as `OrthoLine`s.
//! - [`Rect`]: an axis-aligned rectangle given by two lattice corners.
//! - [`Polygon`]: a closed, axis-aligned orthogonal outline, normalized to
//!   counter-clockwise order. Each polygon caches a partition into
//!   rectangles so overlap areas can be computed as sums of rectangle
//!   intersections.
//!
//! The overlap and distance queries take explicit offsets
//! ([`Polygon::overlap_area_at`], [`Polygon::chebyshev_distance_at`]) so the
//! hot paths never allocate translated copies.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A lattice point, also used as a relative offset between placements.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Construct a point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin `(0, 0)`.
    pub const ORIGIN: Point = Point::new(0, 0);

    /// Manhattan (L1) norm.
    #[inline]
    pub fn l1_norm(self) -> i32 {
        self.x.abs() + self.y.abs()
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned lattice segment from `from` to `to` (both inclusive).
///
/// The endpoints may coincide (a degenerate single-point segment). Exactly
/// one coordinate varies along the segment, which makes segment–segment
/// intersection a rectangle-range computation: every `OrthoLine` is a
/// degenerate [`Rect`] with one zero-length side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct OrthoLine {
    pub from: Point,
    pub to: Point,
}

impl OrthoLine {
    /// Construct a segment. Panics in debug builds if the endpoints differ
    /// in both coordinates.
    #[inline]
    pub fn new(from: Point, to: Point) -> Self {
        debug_assert!(
            from.x == to.x || from.y == to.y,
            "ortho line must be axis-aligned: {from} -> {to}"
        );
        Self { from, to }
    }

    /// A single-point segment.
    #[inline]
    pub fn point(p: Point) -> Self {
        Self { from: p, to: p }
    }

    /// True if the segment runs along the x axis (single points count as
    /// horizontal).
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y
    }

    /// Number of unit steps between the endpoints.
    #[inline]
    pub fn length(&self) -> i32 {
        (self.to.x - self.from.x).abs() + (self.to.y - self.from.y).abs()
    }

    /// Number of lattice points on the segment (`length + 1`).
    #[inline]
    pub fn point_count(&self) -> u64 {
        self.length() as u64 + 1
    }

    /// The same segment with endpoints in lexicographic order.
    #[inline]
    pub fn canonical(&self) -> Self {
        if self.to < self.from {
            Self { from: self.to, to: self.from }
        } else {
            *self
        }
    }

    /// The unit step from `from` towards `to` (zero for a point).
    #[inline]
    pub fn direction(&self) -> Point {
        Point::new(
            (self.to.x - self.from.x).signum(),
            (self.to.y - self.from.y).signum(),
        )
    }

    /// The `i`-th lattice point counting from `from`.
    #[inline]
    pub fn at(&self, i: i32) -> Point {
        let d = self.direction();
        Point::new(self.from.x + d.x * i, self.from.y + d.y * i)
    }

    /// Iterate the lattice points from `from` to `to`.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..=self.length()).map(move |i| self.at(i))
    }

    /// True if `p` lies on the segment.
    pub fn contains(&self, p: Point) -> bool {
        let c = self.canonical();
        c.from.x <= p.x && p.x <= c.to.x && c.from.y <= p.y && p.y <= c.to.y
    }

    /// Translate the segment by `d`.
    #[inline]
    pub fn translate(&self, d: Point) -> Self {
        Self { from: self.from + d, to: self.to + d }
    }

    /// Point-reflect the segment through the origin.
    #[inline]
    pub fn negate(&self) -> Self {
        Self { from: -self.from, to: -self.to }
    }

    /// Intersection with another axis-aligned segment.
    ///
    /// Returns the shared lattice segment in canonical order: a sub-segment
    /// for collinear overlap, a single point where perpendicular segments
    /// cross, `None` otherwise.
    pub fn intersect(&self, other: &OrthoLine) -> Option<OrthoLine> {
        let a = self.canonical();
        let b = other.canonical();
        let min_x = a.from.x.max(b.from.x);
        let max_x = a.to.x.min(b.to.x);
        let min_y = a.from.y.max(b.from.y);
        let max_y = a.to.y.min(b.to.y);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        // One input range per axis is a single value, so the result is at
        // most one-dimensional.
        Some(OrthoLine::new(
            Point::new(min_x, min_y),
            Point::new(max_x, max_y),
        ))
    }

    /// Manhattan distance from `p` to the nearest point of the segment.
    pub fn l1_distance(&self, p: Point) -> i32 {
        let c = self.canonical();
        let nx = p.x.clamp(c.from.x, c.to.x);
        let ny = p.y.clamp(c.from.y, c.to.y);
        (p - Point::new(nx, ny)).l1_norm()
    }
}

impl fmt::Display for OrthoLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// An axis-aligned rectangle spanned by two lattice corners, `min <= max`
/// per coordinate. Geometric area, not cell count: a `1x1` room covers one
/// square of the grid and has four lattice corners.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Construct a rectangle from two opposite corners in any order.
    #[inline]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// Geometric area.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Length of the corner-to-corner diagonal.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        let w = self.width() as f64;
        let h = self.height() as f64;
        (w * w + h * h).sqrt()
    }

    #[inline]
    pub fn translate(&self, d: Point) -> Self {
        Self { min: self.min + d, max: self.max + d }
    }

    /// Area of the intersection with `other`, where the two rectangles are
    /// shifted by `self_off` and `other_off` respectively.
    #[inline]
    pub fn overlap_area_at(&self, self_off: Point, other: &Rect, other_off: Point) -> i64 {
        let w = (self.max.x + self_off.x).min(other.max.x + other_off.x)
            - (self.min.x + self_off.x).max(other.min.x + other_off.x);
        let h = (self.max.y + self_off.y).min(other.max.y + other_off.y)
            - (self.min.y + self_off.y).max(other.min.y + other_off.y);
        if w <= 0 || h <= 0 { 0 } else { w as i64 * h as i64 }
    }

    /// Chebyshev (L-infinity) distance between the shifted rectangles; zero
    /// when they touch or overlap.
    #[inline]
    pub fn chebyshev_distance_at(&self, self_off: Point, other: &Rect, other_off: Point) -> i32 {
        let gx = ((other.min.x + other_off.x) - (self.max.x + self_off.x))
            .max((self.min.x + self_off.x) - (other.max.x + other_off.x))
            .max(0);
        let gy = ((other.min.y + other_off.y) - (self.max.y + self_off.y))
            .max((self.min.y + self_off.y) - (other.max.y + other_off.y))
            .max(0);
        gx.max(gy)
    }
}

/// A closed axis-aligned orthogonal outline on the integer lattice.
///
/// Vertices are stored in counter-clockwise order (clockwise input is
/// reversed on construction), without the closing vertex repeated.
/// Consecutive edges must alternate between horizontal and vertical, which
/// rules out zero-length and collinear edges.
///
/// Construction also computes a partition of the interior into rectangles
/// (one horizontal slab per distinct `y` interval), which backs the overlap
/// and distance queries.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "Vec<Point>", try_from = "Vec<Point>")]
pub struct Polygon {
    points: Vec<Point>,
    rects: Vec<Rect>,
    bbox: Rect,
}

impl Polygon {
    /// Build a polygon from its outline vertices.
    ///
    /// Fails when the outline has fewer than four vertices, a non-axis-aligned
    /// or zero-length edge, two consecutive edges along the same axis, or
    /// zero signed area.
    pub fn new(mut points: Vec<Point>) -> Result<Self> {
        if points.len() < 4 {
            bail!("polygon needs at least 4 vertices, got {}", points.len());
        }
        let n = points.len();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let d = b - a;
            if (d.x == 0) == (d.y == 0) {
                bail!("edge {a} -> {b} is not a straight axis-aligned step");
            }
            let c = points[(i + 2) % n];
            let e = c - b;
            if (d.x == 0) == (e.x == 0) {
                bail!("consecutive edges at {b} do not alternate axes");
            }
        }
        let doubled = doubled_signed_area(&points);
        if doubled == 0 {
            bail!("polygon has zero area");
        }
        if doubled < 0 {
            points.reverse();
        }
        let rects = slab_partition(&points);
        debug_assert!(!rects.is_empty());
        let bbox = bounding_box(&points);
        Ok(Self { points, rects, bbox })
    }

    /// Axis-aligned `width x height` rectangle with its lower-left corner at
    /// the origin.
    pub fn rectangle(width: i32, height: i32) -> Self {
        Self::new(vec![
            Point::new(0, 0),
            Point::new(width, 0),
            Point::new(width, height),
            Point::new(0, height),
        ])
        .expect("rectangle outline is always valid")
    }

    /// Outline vertices in counter-clockwise order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Boundary sides in counter-clockwise traversal order, each as a
    /// directed segment. The interior lies to the left of each side.
    pub fn sides(&self) -> impl Iterator<Item = OrthoLine> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| OrthoLine::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// The rectangle partition of the interior.
    #[inline]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    #[inline]
    pub fn bounding_box(&self) -> Rect {
        self.bbox
    }

    /// Geometric area of the interior.
    pub fn area(&self) -> i64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// A copy of the polygon translated by `d`.
    pub fn translate(&self, d: Point) -> Self {
        Self {
            points: self.points.iter().map(|&p| p + d).collect(),
            rects: self.rects.iter().map(|r| r.translate(d)).collect(),
            bbox: self.bbox.translate(d),
        }
    }

    /// Area of the intersection with `other`, with the two polygons shifted
    /// by `self_off` and `other_off`.
    pub fn overlap_area_at(&self, self_off: Point, other: &Polygon, other_off: Point) -> i64 {
        if self.bbox.overlap_area_at(self_off, &other.bbox, other_off) == 0 {
            return 0;
        }
        let mut total = 0;
        for a in &self.rects {
            for b in &other.rects {
                total += a.overlap_area_at(self_off, b, other_off);
            }
        }
        total
    }

    /// True if the shifted polygons share interior area.
    #[inline]
    pub fn overlaps_at(&self, self_off: Point, other: &Polygon, other_off: Point) -> bool {
        self.overlap_area_at(self_off, other, other_off) > 0
    }

    /// Chebyshev distance between the shifted polygons; zero when they touch
    /// or overlap.
    pub fn chebyshev_distance_at(&self, self_off: Point, other: &Polygon, other_off: Point) -> i32 {
        let mut best = i32::MAX;
        for a in &self.rects {
            for b in &other.rects {
                best = best.min(a.chebyshev_distance_at(self_off, b, other_off));
                if best == 0 {
                    return 0;
                }
            }
        }
        best
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(p: Polygon) -> Self {
        p.points
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = anyhow::Error;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Polygon::new(points)
    }
}

/// Twice the signed area (positive for counter-clockwise outlines).
fn doubled_signed_area(points: &[Point]) -> i64 {
    let n = points.len();
    let mut sum = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    sum
}

fn bounding_box(points: &[Point]) -> Rect {
    let min_x = points.iter().map(|p| p.x).min().unwrap();
    let max_x = points.iter().map(|p| p.x).max().unwrap();
    let min_y = points.iter().map(|p| p.y).min().unwrap();
    let max_y = points.iter().map(|p| p.y).max().unwrap();
    Rect::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
}

/// Partition a simple orthogonal polygon into rectangles by horizontal
/// slabs.
///
/// All vertex `y` values delimit the slabs, so every vertical edge either
/// spans a slab fully or misses it. Within a slab the spanning edges'
/// `x` values, sorted, pair up into interior intervals (crossing parity).
fn slab_partition(points: &[Point]) -> Vec<Rect> {
    let n = points.len();
    let mut ys: Vec<i32> = points.iter().map(|p| p.y).collect();
    ys.sort_unstable();
    ys.dedup();

    let mut rects = Vec::new();
    for w in ys.windows(2) {
        let (y0, y1) = (w[0], w[1]);
        let mut xs: Vec<i32> = Vec::new();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            if a.x == b.x {
                let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
                if lo <= y0 && hi >= y1 {
                    xs.push(a.x);
                }
            }
        }
        xs.sort_unstable();
        debug_assert!(xs.len() % 2 == 0, "odd crossing count in slab [{y0}, {y1}]");
        for pair in xs.chunks_exact(2) {
            rects.push(Rect::new(Point::new(pair[0], y0), Point::new(pair[1], y1)));
        }
    }
    rects
}
