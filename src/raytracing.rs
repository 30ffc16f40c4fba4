//! Branching ray propagation.
//!
//! Every laser seeds one root branch. A branch advances from component to
//! component until it is absorbed, leaves the bench, fades below the intensity
//! floor or exhausts its bounce budget. Beamsplitters spawn a reflected child
//! branch which is queued on an explicit work stack, so pathological splitter
//! grids never deepen the call stack.

use std::collections::HashSet;
use glam::DVec2;
use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::components::{Component, ComponentKind};
use crate::config::TraceConfig;
use crate::geometry::{point_list, Heading};
use crate::interactions::{resolve, Interaction};
use crate::intersection::{exit_point, nearest_hit};
use crate::setup::Setup;
use crate::units::Wavelength;

/// One completed branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub id: String,
    #[serde(with = "point_list")]
    pub path: Vec<DVec2>,
    /// Power the branch started with, not what is left at its end.
    pub intensity: f64,
    pub wavelength: Wavelength,
}

impl Ray {
    pub fn end(&self) -> Option<DVec2> {
        self.path.last().copied()
    }
}

/// Why a branch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited,
    Absorbed,
    Faded,
    BounceCap,
}

/// Components a branch has entered, keyed by arrival heading. Re-entering a
/// component on the same heading would repeat the branch's history exactly,
/// so those components are transparent to it.
#[derive(Debug, Clone, Default)]
struct VisitedSet(HashSet<(usize, Heading)>);

impl VisitedSet {
    fn contains(&self, index: usize, heading: Heading) -> bool {
        self.0.contains(&(index, heading))
    }

    fn insert(&mut self, index: usize, heading: Heading) {
        self.0.insert((index, heading));
    }
}

struct Branch {
    id: String,
    seq: usize,
    position: DVec2,
    direction: DVec2,
    intensity: f64,
    visited: VisitedSet,
}

pub struct RayTracer<'a> {
    setup: &'a Setup,
    config: &'a TraceConfig,
}

impl<'a> RayTracer<'a> {
    pub fn new(setup: &'a Setup, config: &'a TraceConfig) -> Self {
        Self { setup, config }
    }

    /// Trace every laser. Rays are ordered by laser position in the component
    /// list, then by branch creation order.
    pub fn trace(&self) -> Vec<Ray> {
        let lasers: Vec<&Component> = self.setup.lasers().collect();
        if lasers.is_empty() {
            debug!("no lasers in setup, nothing to trace");
            return Vec::new();
        }

        lasers
            .par_iter()
            .map(|laser| self.trace_laser(laser))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    fn trace_laser(&self, laser: &Component) -> Vec<Ray> {
        let (power, wavelength) = match laser.kind {
            ComponentKind::Laser { power, wavelength } => (power, wavelength),
            _ => return Vec::new(),
        };
        debug!("tracing {} at {:?}, power {}, {}", laser.id, laser.position, power, wavelength);

        let mut pending = vec![Branch {
            id: format!("ray-{}", laser.id),
            seq: 0,
            position: laser.position,
            direction: laser.normal(),
            intensity: power,
            visited: VisitedSet::default(),
        }];
        let mut next_seq = 1;
        let mut completed = Vec::new();

        while let Some(branch) = pending.pop() {
            let seq = branch.seq;
            if let Some(ray) = self.propagate(branch, wavelength, &mut pending, &mut next_seq) {
                completed.push((seq, ray));
            }
        }

        completed.sort_by_key(|(seq, _)| *seq);
        debug!("{} produced {} rays", laser.id, completed.len());
        completed.into_iter().map(|(_, ray)| ray).collect()
    }

    /// Run one branch to termination, queueing any reflected children.
    fn propagate(
        &self,
        branch: Branch,
        wavelength: Wavelength,
        pending: &mut Vec<Branch>,
        next_seq: &mut usize,
    ) -> Option<Ray> {
        let components = &self.setup.components;
        let Branch { id, mut position, mut direction, mut intensity, mut visited, .. } = branch;
        let initial_intensity = intensity;
        let mut path = vec![position];
        let mut termination = Termination::BounceCap;

        for bounce in 0..self.config.max_bounces {
            let hit = nearest_hit(components, position, direction, self.config, |index, heading| {
                visited.contains(index, heading)
            });
            let Some(hit) = hit else {
                path.push(exit_point(position, direction, &self.setup.grid_size));
                termination = Termination::Exited;
                break;
            };

            let at = hit.component.position;
            trace!("{} bounce {}: {} at {:?}", id, bounce, hit.component.id, at);
            path.push(at);
            visited.insert(hit.index, Heading::of(direction));

            match resolve(hit.component, direction, intensity, self.config) {
                Interaction::Continue(beam) => {
                    direction = beam.direction;
                    intensity = beam.intensity;
                }
                Interaction::Split { reflected, transmitted } => {
                    if reflected.intensity > self.config.intensity_floor {
                        let child_id = format!("{}-r{}", id, bounce);
                        debug!("{} splits at {}, spawning {}", id, hit.component.id, child_id);
                        pending.push(Branch {
                            id: child_id,
                            seq: *next_seq,
                            position: at,
                            direction: reflected.direction,
                            intensity: reflected.intensity,
                            visited: visited.clone(),
                        });
                        *next_seq += 1;
                    }
                    direction = transmitted.direction;
                    intensity = transmitted.intensity;
                }
                Interaction::Absorbed => {
                    termination = Termination::Absorbed;
                    break;
                }
            }

            position = at;
            if intensity < self.config.intensity_floor {
                termination = Termination::Faded;
                break;
            }
        }

        trace!("{} ended ({:?}) after {} points", id, termination, path.len());
        if path.len() < 2 {
            return None;
        }
        Some(Ray {
            id,
            path,
            intensity: initial_intensity,
            wavelength,
        })
    }
}

/// Trace a setup with the stock limits.
pub fn trace(setup: &Setup) -> Vec<Ray> {
    trace_with(setup, &TraceConfig::default())
}

pub fn trace_with(setup: &Setup, config: &TraceConfig) -> Vec<Ray> {
    RayTracer::new(setup, config).trace()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_ray;
    use crate::components::ComponentType;
    use crate::config::AnalysisConfig;

    fn laser(id: &str, x: f64, y: f64, rotation: f64) -> Component {
        Component::new(id, ComponentKind::defaults(ComponentType::Laser), x, y, rotation)
    }

    fn of_type(id: &str, t: ComponentType, x: f64, y: f64, rotation: f64) -> Component {
        Component::new(id, ComponentKind::defaults(t), x, y, rotation)
    }

    #[test]
    fn test_no_lasers_no_rays() {
        let setup = Setup::new(vec![of_type("m", ComponentType::Mirror, 5.0, 5.0, 0.0)]);
        assert!(trace(&setup).is_empty());
    }

    #[test]
    fn test_unobstructed_laser_exits_grid() {
        let setup = Setup::new(vec![laser("l", 5.0, 5.0, 0.0)]);
        let rays = trace(&setup);
        assert_eq!(rays.len(), 1);
        assert_eq!(rays[0].id, "ray-l");
        assert_eq!(rays[0].path, vec![DVec2::new(5.0, 5.0), DVec2::new(39.0, 5.0)]);
        assert_eq!(rays[0].wavelength, Wavelength::HENE);
    }

    #[test]
    fn test_detector_ends_branch() {
        let setup = Setup::new(vec![
            laser("l", 2.0, 5.0, 0.0),
            of_type("d", ComponentType::Detector, 10.0, 5.0, 180.0),
            of_type("m", ComponentType::Mirror, 20.0, 5.0, 180.0),
        ]);
        let rays = trace(&setup);
        assert_eq!(rays.len(), 1);
        assert_eq!(rays[0].path, vec![DVec2::new(2.0, 5.0), DVec2::new(10.0, 5.0)]);
    }

    #[test]
    fn test_split_spawns_child_with_reflected_power() {
        let setup = Setup::new(vec![
            Component::new(
                "l",
                ComponentKind::Laser { power: 2.0, wavelength: Wavelength(532.0) },
                2.0,
                10.0,
                0.0,
            ),
            Component::new(
                "bs",
                ComponentKind::Beamsplitter { reflectivity: 0.25, transmitivity: 0.75 },
                10.0,
                10.0,
                45.0,
            ),
        ]);
        let rays = trace(&setup);
        assert_eq!(rays.len(), 2);

        assert_eq!(rays[0].id, "ray-l");
        assert_eq!(rays[0].intensity, 2.0);
        assert_eq!(rays[0].path.len(), 3);
        assert_eq!(rays[0].path[2], DVec2::new(39.0, 10.0));

        assert_eq!(rays[1].id, "ray-l-r0");
        assert!((rays[1].intensity - 0.5).abs() < 1e-12);
        assert_eq!(rays[1].wavelength, Wavelength(532.0));
        assert_eq!(rays[1].path[0], DVec2::new(10.0, 10.0));
        let end = rays[1].end().unwrap();
        assert!((end - DVec2::new(10.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_child_can_reach_component_parent_enters_after_split() {
        let setup = Setup::new(vec![
            laser("l", 2.0, 10.0, 0.0),
            of_type("bs", ComponentType::Beamsplitter, 10.0, 10.0, 45.0),
            of_type("x", ComponentType::Lens, 20.0, 10.0, 0.0),
            of_type("m1", ComponentType::Mirror, 10.0, 3.0, 45.0),
            of_type("m2", ComponentType::Mirror, 20.0, 3.0, 135.0),
        ]);
        let rays = trace(&setup);
        assert_eq!(rays.len(), 2);

        let parent = &rays[0];
        assert_eq!(parent.path[..3], [DVec2::new(2.0, 10.0), DVec2::new(10.0, 10.0), DVec2::new(20.0, 10.0)]);

        let child = &rays[1];
        assert_eq!(child.id, "ray-l-r0");
        assert_eq!(
            child.path[..4],
            [DVec2::new(10.0, 10.0), DVec2::new(10.0, 3.0), DVec2::new(20.0, 3.0), DVec2::new(20.0, 10.0)]
        );

        let report = analyze_ray(child, &setup, &AnalysisConfig::default());
        let ids: Vec<&str> = report.interactions.iter().map(|i| i.component_id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "x"]);
    }

    #[test]
    fn test_weak_reflection_is_not_spawned() {
        let setup = Setup::new(vec![
            laser("l", 2.0, 10.0, 0.0),
            Component::new(
                "bs",
                ComponentKind::Beamsplitter { reflectivity: 0.005, transmitivity: 0.995 },
                10.0,
                10.0,
                45.0,
            ),
        ]);
        assert_eq!(trace(&setup).len(), 1);
    }

    #[test]
    fn test_faded_branch_stops_at_last_hit() {
        let setup = Setup::new(vec![
            laser("l", 2.0, 5.0, 0.0),
            Component::new(
                "dim",
                ComponentKind::Mirror { reflectivity: 0.005, roc: None },
                10.0,
                5.0,
                135.0,
            ),
            of_type("d", ComponentType::Detector, 10.0, 15.0, 270.0),
        ]);
        let rays = trace(&setup);
        assert_eq!(rays.len(), 1);
        assert_eq!(rays[0].path, vec![DVec2::new(2.0, 5.0), DVec2::new(10.0, 5.0)]);
    }

    #[test]
    fn test_facing_mirrors_do_not_loop() {
        let setup = Setup::new(vec![
            laser("l", 5.0, 5.0, 0.0),
            of_type("a", ComponentType::Mirror, 10.0, 5.0, 180.0),
            of_type("b", ComponentType::Mirror, 2.0, 5.0, 0.0),
        ]);
        let rays = trace(&setup);
        assert_eq!(rays.len(), 1);
        let expected = [
            DVec2::new(5.0, 5.0),
            DVec2::new(10.0, 5.0),
            DVec2::new(2.0, 5.0),
            DVec2::new(39.0, 5.0),
        ];
        assert_eq!(rays[0].path.len(), expected.len());
        for (got, want) in rays[0].path.iter().zip(expected) {
            assert!((*got - want).length() < 1e-9, "{:?} != {:?}", got, want);
        }
    }

    #[test]
    fn test_bounce_cap() {
        let mut components = vec![laser("l", 0.0, 3.0, 0.0)];
        for i in 1..=35 {
            components.push(of_type(&format!("lens-{}", i), ComponentType::Lens, i as f64, 3.0, 0.0));
        }
        let setup = Setup::new(components);
        let rays = trace(&setup);
        assert_eq!(rays.len(), 1);
        assert_eq!(rays[0].path.len(), 31);
        assert_eq!(*rays[0].path.last().unwrap(), DVec2::new(30.0, 3.0));
    }

    #[test]
    fn test_custom_bounce_budget() {
        let mut components = vec![laser("l", 0.0, 3.0, 0.0)];
        for i in 1..=5 {
            components.push(of_type(&format!("lens-{}", i), ComponentType::Lens, i as f64, 3.0, 0.0));
        }
        let setup = Setup::new(components);
        let config = TraceConfig { max_bounces: 2, ..TraceConfig::default() };
        let rays = trace_with(&setup, &config);
        assert_eq!(rays[0].path.len(), 3);
    }

    #[test]
    fn test_rays_ordered_by_laser() {
        let setup = Setup::new(vec![
            laser("b", 1.0, 1.0, 0.0),
            laser("a", 1.0, 3.0, 0.0),
            laser("c", 1.0, 5.0, 0.0),
        ]);
        let ids: Vec<String> = trace(&setup).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["ray-b", "ray-a", "ray-c"]);
    }
}
