//! Nearest-component search along a ray.
//!
//! Components are treated as points with a hit radius; a ray "hits" the
//! closest one lying ahead of it whose centre passes within that radius.

use glam::DVec2;
use crate::components::Component;
use crate::config::TraceConfig;
use crate::geometry::{project_onto_ray, Heading};
use crate::setup::GridSize;

/// A component struck by a ray.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub index: usize,
    pub component: &'a Component,
    /// Distance travelled to reach the component (grid units).
    pub distance: f64,
}

/// Find the nearest eligible component ahead of `origin` along `direction`.
///
/// `skip` receives the component index and the ray's heading and returns true
/// for components this branch has already entered on that heading. Lasers are
/// sources and never block a ray.
pub fn nearest_hit<'a, F>(
    components: &'a [Component],
    origin: DVec2,
    direction: DVec2,
    config: &TraceConfig,
    mut skip: F,
) -> Option<Hit<'a>>
where
    F: FnMut(usize, Heading) -> bool,
{
    let heading = Heading::of(direction);
    let mut best: Option<Hit<'a>> = None;

    for (index, component) in components.iter().enumerate() {
        if component.is_laser() || skip(index, heading) {
            continue;
        }
        let projection = project_onto_ray(origin, direction, component.position);
        if projection.along <= config.min_advance || projection.across >= config.hit_radius {
            continue;
        }
        // Strict comparison keeps the earlier component on exact ties.
        if best.map_or(true, |b| projection.along < b.distance) {
            best = Some(Hit {
                index,
                component,
                distance: projection.along,
            });
        }
    }
    best
}

/// Where an unobstructed ray leaves the bench.
pub fn exit_point(origin: DVec2, direction: DVec2, grid: &GridSize) -> DVec2 {
    grid.clamp(origin + direction * grid.ray_length())
}
