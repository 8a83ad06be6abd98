#![doc = include_str!("../readme.md")]

/// Everything you need to get started with `bevy_bonk`
pub mod prelude {
    pub(crate) use {
        avian3d::prelude::*,
        bevy_app::prelude::*,
        bevy_derive::{Deref, DerefMut},
        bevy_ecs::prelude::*,
        bevy_enhanced_input::prelude::*,
        bevy_math::prelude::*,
        bevy_reflect::prelude::*,
        bevy_time::prelude::*,
        bevy_transform::prelude::*,
        bevy_utils::prelude::*,
    };

    pub use crate::{
        BonkPlugin, BonkSystems, CharacterController, MovementHeading,
        backend::{ParticleCue, SoundCue},
        camera::{CharacterControllerCamera, CharacterControllerCameraOf},
        input::{Jump, Movement, Slam},
        locomotion::CharacterControllerState,
        presentation::{JumpPadAudio, LocomotionCue},
    };
}

use crate::{input::AccumulatedInput, prelude::*};
use bevy_ecs::{
    intern::Interned, lifecycle::HookContext,
    relationship::RelationshipSourceCollection as _, schedule::ScheduleLabel, world::DeferredWorld,
};

pub mod backend;
pub mod camera;
pub mod controller;
pub mod facing;
mod fixed_update_utils;
pub mod input;
mod kcc;
pub mod locomotion;
pub mod presentation;
pub mod sampler;

/// Also requires you to add [`PhysicsPlugins`] and [`EnhancedInputPlugin`] to work properly.
pub struct BonkPlugin {
    schedule: Interned<dyn ScheduleLabel>,
}

impl BonkPlugin {
    /// Create a new plugin in the given schedule. The default is [`FixedPostUpdate`].
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for BonkPlugin {
    fn default() -> Self {
        Self {
            schedule: FixedPostUpdate.intern(),
        }
    }
}

impl Plugin for BonkPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            self.schedule,
            BonkSystems::MoveCharacters.in_set(PhysicsSystems::First),
        )
        .add_plugins((
            input::plugin,
            presentation::plugin,
            kcc::plugin(self.schedule),
            fixed_update_utils::plugin,
        ));
    }
}

/// System set used by all systems of `bevy_bonk`.
#[derive(SystemSet, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BonkSystems {
    MoveCharacters,
}

/// Which way planar movement goes while the character is still turning.
#[derive(Clone, Copy, Reflect, Default, Debug, PartialEq, Eq)]
pub enum MovementHeading {
    /// Along the smoothed facing, so the character never moves sideways.
    #[default]
    Facing,
    /// Straight toward the input heading, ignoring the turn in progress.
    Target,
}

/// Per-character tuning. Fixed after spawn.
///
/// Gravity is signed: negative pulls down.
#[derive(Component, Clone, Reflect, Debug)]
#[reflect(Component)]
#[require(
    AccumulatedInput,
    CharacterControllerState,
    TranslationInterpolation,
    RigidBody = RigidBody::Kinematic,
    Collider = Collider::capsule(0.5, 1.0),
    CustomPositionIntegration,
    Transform,
    SpeculativeMargin::ZERO,
)]
#[component(on_add=CharacterController::on_add)]
pub struct CharacterController {
    pub speed: f32,
    pub gravity: f32,
    pub turn_smooth_time: f32,
    pub heading: MovementHeading,
    pub jump_height: f32,
    pub jump_pad_height: f32,
    /// Height the slam's downward impulse is derived from.
    pub slam_height: f32,
    pub ground_slam_time: f32,
    /// Vertical velocity the character is held at while standing.
    pub grounded_velocity: f32,
    /// Radius of the ground overlap and length of the jump pad ray.
    pub ground_distance: f32,
    pub ceiling_distance: f32,
    pub ground_check_offset: Vec3,
    pub ceiling_check_offset: Vec3,
    pub ground_mask: LayerMask,
    pub jump_pad_mask: LayerMask,
    /// Used for movement; probes combine it with their own mask.
    pub filter: SpatialQueryFilter,
    pub move_and_slide: MoveAndSlideConfig,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self {
            speed: 6.0,
            gravity: -9.81,
            turn_smooth_time: 0.1,
            heading: MovementHeading::default(),
            jump_height: 3.0,
            jump_pad_height: 10.0,
            slam_height: 20.0,
            ground_slam_time: 1.0,
            grounded_velocity: -2.0,
            ground_distance: 0.4,
            ceiling_distance: 0.01,
            // bottom and top of the default capsule
            ground_check_offset: Vec3::NEG_Y,
            ceiling_check_offset: Vec3::Y,
            ground_mask: LayerMask::ALL,
            jump_pad_mask: LayerMask::NONE,
            filter: SpatialQueryFilter::default(),
            move_and_slide: MoveAndSlideConfig {
                skin_width: 0.0075,
                ..default()
            },
        }
    }
}

impl CharacterController {
    pub fn on_add(mut world: DeferredWorld, ctx: HookContext) {
        let cooldown = {
            let Some(mut kcc) = world.get_mut::<Self>(ctx.entity) else {
                return;
            };
            kcc.filter.excluded_entities.add(ctx.entity);
            kcc.ground_slam_time
        };

        let Some(mut state) = world.get_mut::<CharacterControllerState>(ctx.entity) else {
            return;
        };
        *state = CharacterControllerState::spawned(cooldown);
    }

    /// Upward speed that peaks at `height` under this gravity.
    pub fn launch_speed(&self, height: f32) -> f32 {
        (height * -2.0 * self.gravity).sqrt()
    }
}
