//! Planar vector helpers shared by the tracer and the analyzer.
//!
//! All quantities are in grid units. Rotations follow the screen convention
//! used by the bench: 0° points along +x, 90° along +y (downwards on screen).

use glam::DVec2;

/// Unit vector for a rotation given in degrees.
#[inline]
pub fn direction_from_rotation(degrees: f64) -> DVec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    DVec2::new(cos, sin)
}

/// Mirror `direction` about a unit `normal`.
#[inline]
pub fn reflect(direction: DVec2, normal: DVec2) -> DVec2 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Position of `point` relative to the line `origin + t * direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Signed distance along the line to the foot of the perpendicular.
    pub along: f64,
    /// Distance from the point to the line.
    pub across: f64,
}

/// Project `point` onto the ray through `origin`; `direction` must be unit length.
pub fn project_onto_ray(origin: DVec2, direction: DVec2, point: DVec2) -> Projection {
    let along = (point - origin).dot(direction);
    let foot = origin + direction * along;
    Projection {
        along,
        across: point.distance(foot),
    }
}

/// Per-axis proximity test used when matching recorded path points.
#[inline]
pub fn within_box(a: DVec2, b: DVec2, tolerance: f64) -> bool {
    let d = (a - b).abs();
    d.x < tolerance && d.y < tolerance
}

/// Discretised heading, stable against the rounding noise reflections leave
/// behind (e.g. `cos(90°)` is not exactly zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Heading(i64, i64);

impl Heading {
    const SCALE: f64 = 1e6;

    pub fn of(direction: DVec2) -> Self {
        // `as` saturates and maps -0.0 to 0, so both zero signs land on one key.
        Self(
            (direction.x * Self::SCALE).round() as i64,
            (direction.y * Self::SCALE).round() as i64,
        )
    }
}

/// Serialise point lists as `[{"x": .., "y": ..}, ..]`.
pub mod point_list {
    use glam::DVec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Point {
        x: f64,
        y: f64,
    }

    pub fn serialize<S: Serializer>(points: &[DVec2], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().map(|p| Point { x: p.x, y: p.y }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DVec2>, D::Error> {
        let points = Vec::<Point>::deserialize(deserializer)?;
        Ok(points.into_iter().map(|p| DVec2::new(p.x, p.y)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_direction_from_rotation() {
        let right = direction_from_rotation(0.0);
        assert!((right - DVec2::X).length() < EPS);

        let down = direction_from_rotation(90.0);
        assert!((down - DVec2::Y).length() < EPS);

        let wrapped = direction_from_rotation(-270.0);
        assert!((wrapped - DVec2::Y).length() < EPS);
    }

    #[test]
    fn test_reflect_off_diagonal() {
        let normal = direction_from_rotation(45.0);
        let reflected = reflect(DVec2::X, normal);
        assert!((reflected - DVec2::new(0.0, -1.0)).length() < EPS);
    }

    #[test]
    fn test_reflect_grazing_is_identity() {
        let normal = direction_from_rotation(90.0);
        let reflected = reflect(DVec2::X, normal);
        assert!((reflected - DVec2::X).length() < EPS);
    }

    #[test]
    fn test_projection() {
        let p = project_onto_ray(DVec2::ZERO, DVec2::X, DVec2::new(5.0, 0.5));
        assert!((p.along - 5.0).abs() < EPS);
        assert!((p.across - 0.5).abs() < EPS);

        let behind = project_onto_ray(DVec2::ZERO, DVec2::X, DVec2::new(-2.0, 0.0));
        assert!(behind.along < 0.0);
    }

    #[test]
    fn test_within_box_is_per_axis() {
        let a = DVec2::new(10.0, 10.0);
        assert!(within_box(a, DVec2::new(10.4, 9.6), 0.5));
        assert!(!within_box(a, DVec2::new(10.5, 10.0), 0.5));
    }

    #[test]
    fn test_heading_ignores_rounding_noise() {
        let noisy = reflect(DVec2::new(0.0, -1.0), direction_from_rotation(90.0));
        assert_eq!(Heading::of(noisy), Heading::of(DVec2::Y));
        assert_ne!(Heading::of(DVec2::X), Heading::of(-DVec2::X));
    }
}
