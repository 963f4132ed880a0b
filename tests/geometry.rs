use anyhow::Result;
use dungen::{OrthoLine, Point, Polygon};

fn l_shape() -> Polygon {
    // 4x2 base with a 2x2 tower on the left.
    Polygon::new(vec![
        Point::new(0, 0),
        Point::new(4, 0),
        Point::new(4, 2),
        Point::new(2, 2),
        Point::new(2, 4),
        Point::new(0, 4),
    ])
    .expect("valid L outline")
}

#[test]
fn rectangle_partition_covers_the_interior() {
    let square = Polygon::rectangle(4, 4);
    assert_eq!(square.rects().len(), 1);
    assert_eq!(square.area(), 16);

    let l = l_shape();
    assert_eq!(l.area(), 12, "4x2 base plus 2x2 tower");
    // Slabs at y=0..2 and y=2..4.
    assert_eq!(l.rects().len(), 2);
}

#[test]
fn clockwise_outlines_are_normalized() -> Result<()> {
    let ccw = Polygon::rectangle(3, 2);
    let cw = Polygon::new(vec![
        Point::new(0, 0),
        Point::new(0, 2),
        Point::new(3, 2),
        Point::new(3, 0),
    ])?;
    // Same shape, counter-clockwise either way (the start vertex may
    // differ).
    assert_eq!(cw.area(), ccw.area());
    assert_eq!(cw.rects(), ccw.rects());
    let cw_set: std::collections::HashSet<_> = cw.points().iter().copied().collect();
    let ccw_set: std::collections::HashSet<_> = ccw.points().iter().copied().collect();
    assert_eq!(cw_set, ccw_set);
    Ok(())
}

#[test]
fn invalid_outlines_are_rejected() {
    // Too few vertices.
    assert!(Polygon::new(vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)]).is_err());
    // Diagonal edge.
    assert!(
        Polygon::new(vec![
            Point::new(0, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(0, 2),
        ])
        .is_err()
    );
    // Two consecutive horizontal edges.
    assert!(
        Polygon::new(vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 2),
            Point::new(1, 2),
            Point::new(0, 2),
        ])
        .is_err()
    );
}

#[test]
fn overlap_area_with_offsets() {
    let a = Polygon::rectangle(4, 4);
    let b = Polygon::rectangle(4, 4);
    // Identical placement: full overlap.
    assert_eq!(a.overlap_area_at(Point::ORIGIN, &b, Point::ORIGIN), 16);
    // Shifted by half: 2x4 strip.
    assert_eq!(a.overlap_area_at(Point::ORIGIN, &b, Point::new(2, 0)), 8);
    // Touching edge to edge: zero area.
    assert_eq!(a.overlap_area_at(Point::ORIGIN, &b, Point::new(4, 0)), 0);
    assert!(!a.overlaps_at(Point::ORIGIN, &b, Point::new(4, 0)));

    // The L's notch fits a 2x2 square without overlap.
    let l = l_shape();
    let small = Polygon::rectangle(2, 2);
    assert_eq!(l.overlap_area_at(Point::ORIGIN, &small, Point::new(2, 2)), 0);
    assert_eq!(l.overlap_area_at(Point::ORIGIN, &small, Point::new(1, 1)), 3);
}

#[test]
fn chebyshev_distance_between_polygons() {
    let a = Polygon::rectangle(2, 2);
    let b = Polygon::rectangle(2, 2);
    assert_eq!(a.chebyshev_distance_at(Point::ORIGIN, &b, Point::new(5, 0)), 3);
    assert_eq!(a.chebyshev_distance_at(Point::ORIGIN, &b, Point::new(5, 5)), 3);
    assert_eq!(a.chebyshev_distance_at(Point::ORIGIN, &b, Point::new(2, 0)), 0);
    assert_eq!(a.chebyshev_distance_at(Point::ORIGIN, &b, Point::new(1, 1)), 0);
}

#[test]
fn ortho_line_intersections() {
    let h = OrthoLine::new(Point::new(0, 0), Point::new(6, 0));
    let h2 = OrthoLine::new(Point::new(4, 0), Point::new(9, 0));
    let shared = h.intersect(&h2).expect("collinear overlap");
    assert_eq!(shared, OrthoLine::new(Point::new(4, 0), Point::new(6, 0)));

    let v = OrthoLine::new(Point::new(2, -3), Point::new(2, 3));
    let cross = h.intersect(&v).expect("perpendicular crossing");
    assert_eq!(cross, OrthoLine::point(Point::new(2, 0)));

    let parallel = OrthoLine::new(Point::new(0, 1), Point::new(6, 1));
    assert!(h.intersect(&parallel).is_none());

    let disjoint = OrthoLine::new(Point::new(7, 0), Point::new(9, 0));
    assert!(h.intersect(&disjoint).is_none());
}

#[test]
fn ortho_line_points_and_distance() {
    let line = OrthoLine::new(Point::new(3, 1), Point::new(0, 1));
    assert_eq!(line.length(), 3);
    assert_eq!(line.point_count(), 4);
    let pts: Vec<Point> = line.points().collect();
    assert_eq!(pts.first(), Some(&Point::new(3, 1)));
    assert_eq!(pts.last(), Some(&Point::new(0, 1)));
    assert!(line.contains(Point::new(1, 1)));
    assert!(!line.contains(Point::new(1, 2)));

    assert_eq!(line.l1_distance(Point::new(5, 3)), 4);
    assert_eq!(line.l1_distance(Point::new(2, 1)), 0);
}
