//! Splits polylines into fragments bounded by a drawn-length limit.
//!
//! Cuts are placed at the exact interpolated point where the budget runs
//! out, and the next fragment starts at that same point, so the plotted
//! result shows no gap.

use plotpass_core::{distance, interpolate, Point, LENGTH_EPSILON_MM, ZERO_LENGTH_MM};

/// Cuts `points` into fragments whose length is at most `limit_mm + ε`.
///
/// A polyline with any non-finite point is skipped and yields no
/// fragments, as does one with fewer than two points. A limit that is not
/// positive and finite returns the polyline as a single fragment.
pub fn split_path(points: &[Point], limit_mm: f64) -> Vec<Vec<Point>> {
    split_path_limited(points, limit_mm, usize::MAX).0
}

/// Like [`split_path`], but stops after `max_fragments` fragments.
///
/// The flag is true when the polyline had more to give.
pub fn split_path_limited(
    points: &[Point],
    limit_mm: f64,
    max_fragments: usize,
) -> (Vec<Vec<Point>>, bool) {
    if points.len() < 2 || !points.iter().all(Point::is_finite) {
        return (Vec::new(), false);
    }
    if max_fragments == 0 {
        return (Vec::new(), true);
    }
    if !(limit_mm.is_finite() && limit_mm > 0.0) {
        return (vec![points.to_vec()], false);
    }

    let mut fragments = Vec::new();
    let mut current = vec![points[0]];
    let mut used = 0.0;

    for &next in &points[1..] {
        let mut from = current[current.len() - 1];
        let mut seg = distance(from, next);

        if seg <= ZERO_LENGTH_MM {
            current.push(next);
            continue;
        }

        while used + seg > limit_mm + LENGTH_EPSILON_MM {
            let remaining = limit_mm - used;
            let restart = if remaining > ZERO_LENGTH_MM {
                let cut = interpolate(from, next, remaining / seg);
                current.push(cut);
                from = cut;
                seg -= remaining;
                cut
            } else {
                // Budget exhausted exactly at `from`
                from
            };
            fragments.push(std::mem::replace(&mut current, vec![restart]));
            if fragments.len() == max_fragments {
                return (fragments, true);
            }
            used = 0.0;
        }

        current.push(next);
        used += seg;
    }

    if current.len() >= 2 {
        fragments.push(current);
    }

    (fragments, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotpass_core::polyline_length;

    #[test]
    fn test_short_path_is_untouched() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let fragments = split_path(&points, 100.0);
        assert_eq!(fragments, vec![points]);
    }

    #[test]
    fn test_no_limit_returns_whole_path() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert_eq!(split_path(&points, 0.0).len(), 1);
        assert_eq!(split_path(&points, f64::NAN).len(), 1);
    }

    #[test]
    fn test_degenerate_input_yields_nothing() {
        assert!(split_path(&[], 10.0).is_empty());
        assert!(split_path(&[Point::new(1.0, 1.0)], 10.0).is_empty());
        assert!(split_path(&[Point::new(1.0, 1.0), Point::new(f64::NAN, 0.0)], 10.0).is_empty());
    }

    #[test]
    fn test_non_finite_point_skips_whole_path() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(f64::INFINITY, 0.0),
            Point::new(10.0, 0.0),
        ];
        assert!(split_path(&points, 100.0).is_empty());
        assert!(split_path(&points, 0.0).is_empty());
    }

    #[test]
    fn test_limited_split_stops_early() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0e6, 0.0)];
        let (fragments, truncated) = split_path_limited(&points, 1.0e-3, 4);
        assert_eq!(fragments.len(), 4);
        assert!(truncated);
        assert!((fragments[3][1].x - 4.0e-3).abs() < 1e-9);

        let (fragments, truncated) = split_path_limited(&points, 5.0e5, 2);
        assert_eq!(fragments.len(), 2);
        assert!(!truncated);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_stub() {
        let points = vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0)];
        let fragments = split_path(&points, 10.0);
        assert_eq!(fragments.len(), 3);
        for fragment in &fragments {
            assert!((polyline_length(fragment) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cut_on_vertex() {
        // The budget ends exactly on the middle vertex
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
        ];
        let fragments = split_path(&points, 10.0);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert_eq!(fragments[1], vec![Point::new(10.0, 0.0), Point::new(10.0, 5.0)]);
    }
}
