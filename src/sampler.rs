//! Environment sampling.
//!
//! Turns raw spatial queries into a [`SensedEnvironment`], the immutable
//! snapshot the locomotion step reads for one tick. Nothing here is cached:
//! the world can change between ticks, so every tick samples afresh.

use avian3d::prelude::LayerMask;
use bevy_math::{Dir3, Vec3};

use crate::{
    CharacterController,
    backend::{RayHit, SpatialQueryProvider},
};

/// Where the probes start this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeOrigins {
    pub ground: Vec3,
    pub ceiling: Vec3,
    pub up: Dir3,
}

impl ProbeOrigins {
    /// Probe points of an upright character standing at `position`.
    pub fn upright(position: Vec3, cfg: &CharacterController) -> Self {
        Self {
            ground: position + cfg.ground_check_offset,
            ceiling: position + cfg.ceiling_check_offset,
            up: Dir3::Y,
        }
    }
}

/// What the character could feel around it at the start of a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SensedEnvironment<S> {
    pub grounded: bool,
    pub jump_pad: Option<RayHit<S>>,
    pub under_ceiling: bool,
}

impl<S> Default for SensedEnvironment<S> {
    fn default() -> Self {
        Self {
            grounded: false,
            jump_pad: None,
            under_ceiling: false,
        }
    }
}

impl<S> SensedEnvironment<S> {
    pub fn on_jump_pad(&self) -> bool {
        self.jump_pad.is_some()
    }
}

pub fn probe_grounded<Q: SpatialQueryProvider>(
    queries: &Q,
    point: Vec3,
    radius: f32,
    mask: LayerMask,
) -> bool {
    queries.overlap_sphere(point, radius, mask)
}

pub fn probe_jump_pad<Q: SpatialQueryProvider>(
    queries: &Q,
    point: Vec3,
    down: Dir3,
    radius: f32,
    mask: LayerMask,
) -> Option<RayHit<Q::Surface>> {
    queries.raycast(point, down, radius, mask)
}

pub fn probe_ceiling<Q: SpatialQueryProvider>(
    queries: &Q,
    point: Vec3,
    up: Dir3,
    distance: f32,
    mask: LayerMask,
) -> bool {
    queries.raycast(point, up, distance, mask).is_some()
}

/// Runs all three probes. The ceiling is classified with the ground mask.
pub fn sense<Q: SpatialQueryProvider>(
    queries: &Q,
    origins: &ProbeOrigins,
    cfg: &CharacterController,
) -> SensedEnvironment<Q::Surface> {
    SensedEnvironment {
        grounded: probe_grounded(queries, origins.ground, cfg.ground_distance, cfg.ground_mask),
        jump_pad: probe_jump_pad(
            queries,
            origins.ground,
            -origins.up,
            cfg.ground_distance,
            cfg.jump_pad_mask,
        ),
        under_ceiling: probe_ceiling(
            queries,
            origins.ceiling,
            origins.up,
            cfg.ceiling_distance,
            cfg.ground_mask,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[derive(Default)]
    struct RecordingQueries {
        floor_y: Option<f32>,
        pad_y: Option<f32>,
        roof_y: Option<f32>,
        rays: RefCell<Vec<(Vec3, Dir3, f32, LayerMask)>>,
    }

    const GROUND: LayerMask = LayerMask(0b01);
    const PAD: LayerMask = LayerMask(0b10);

    impl SpatialQueryProvider for RecordingQueries {
        type Surface = u32;

        fn overlap_sphere(&self, point: Vec3, radius: f32, mask: LayerMask) -> bool {
            mask == GROUND && self.floor_y.is_some_and(|y| point.y - y <= radius)
        }

        fn raycast(
            &self,
            origin: Vec3,
            direction: Dir3,
            max_distance: f32,
            mask: LayerMask,
        ) -> Option<RayHit<u32>> {
            self.rays
                .borrow_mut()
                .push((origin, direction, max_distance, mask));
            let target = if direction.y > 0.0 {
                self.roof_y.filter(|_| mask == GROUND)
            } else {
                self.pad_y.filter(|_| mask == PAD)
            }?;
            let distance = (target - origin.y).abs();
            (distance <= max_distance).then_some(RayHit {
                distance,
                audio: Some(7),
            })
        }
    }

    fn cfg() -> CharacterController {
        CharacterController {
            ground_mask: GROUND,
            jump_pad_mask: PAD,
            ..Default::default()
        }
    }

    #[test]
    fn open_air_senses_nothing() {
        let queries = RecordingQueries::default();
        let origins = ProbeOrigins::upright(Vec3::new(0.0, 10.0, 0.0), &cfg());
        let sensed = sense(&queries, &origins, &cfg());
        assert_eq!(sensed, SensedEnvironment::default());
    }

    #[test]
    fn floor_within_radius_is_ground() {
        let cfg = cfg();
        let queries = RecordingQueries {
            floor_y: Some(0.0),
            ..Default::default()
        };
        let feet = Vec3::Y * (cfg.ground_distance - 0.05);
        let origins = ProbeOrigins {
            ground: feet,
            ceiling: feet + Vec3::Y * 2.0,
            up: Dir3::Y,
        };
        let sensed = sense(&queries, &origins, &cfg);
        assert!(sensed.grounded);
        assert!(!sensed.on_jump_pad());
        assert!(!sensed.under_ceiling);
    }

    #[test]
    fn jump_pad_ray_points_down_and_keeps_audio_handle() {
        let cfg = cfg();
        let queries = RecordingQueries {
            pad_y: Some(0.0),
            ..Default::default()
        };
        let origins = ProbeOrigins {
            ground: Vec3::Y * 0.2,
            ceiling: Vec3::Y * 2.0,
            up: Dir3::Y,
        };
        let sensed = sense(&queries, &origins, &cfg);
        let hit = sensed.jump_pad.expect("pad below the feet");
        assert_eq!(hit.audio, Some(7));

        let rays = queries.rays.borrow();
        let (origin, direction, max_distance, mask) = rays[0];
        assert_eq!(origin, origins.ground);
        assert_eq!(direction, Dir3::NEG_Y);
        assert_eq!(max_distance, cfg.ground_distance);
        assert_eq!(mask, PAD);
    }

    #[test]
    fn ceiling_ray_uses_ground_mask_and_short_distance() {
        let cfg = cfg();
        let queries = RecordingQueries {
            roof_y: Some(2.005),
            ..Default::default()
        };
        let origins = ProbeOrigins {
            ground: Vec3::ZERO,
            ceiling: Vec3::Y * 2.0,
            up: Dir3::Y,
        };
        assert!(sense(&queries, &origins, &cfg).under_ceiling);

        let rays = queries.rays.borrow();
        let (_, direction, max_distance, mask) = rays[1];
        assert_eq!(direction, Dir3::Y);
        assert_eq!(max_distance, cfg.ceiling_distance);
        assert_eq!(mask, GROUND);
    }
}
