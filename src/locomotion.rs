//! The per-tick motion state machine.
//!
//! [`step`] is a pure function of the configuration, the persisted
//! [`CharacterControllerState`], the sensed environment and the input. It never
//! moves anything itself: it reports what should happen as a [`TickOutput`],
//! which [`crate::controller::drive`] hands to the collaborators.
//!
//! Vertical rules run in a fixed order, and a later rule may overwrite the
//! vertical velocity an earlier one wrote in the same tick:
//!
//! 1. grounded: slam landing bounce, latch resets, hold-down velocity
//! 2. gravity, then the vertical displacement for this tick
//! 3. jump
//! 4. ground slam
//! 5. jump pad
//! 6. ceiling bonk
//!
//! Impulses from rules 3 to 6 therefore only show up in the next tick's
//! displacement.

use bevy_math::{Vec2, Vec3};
use tracing::{debug, warn};

use crate::{
    CharacterController, MovementHeading,
    backend::{InputAxis, InputButton, InputSource, ParticleCue, SoundCue},
    facing::{forward_for_yaw, heading_of, smooth_damp_angle},
    prelude::*,
    sampler::SensedEnvironment,
};

/// Planar input shorter than this neither turns nor moves the character.
pub const DEAD_ZONE: f32 = 0.1;

/// Reverb mix a jump pad's own audio is played with.
pub const JUMP_PAD_REVERB_ZONE_MIX: f32 = 1.0;

/// Everything about a character's motion that survives from one tick to the next.
#[derive(Component, Clone, Reflect, Default, Debug, PartialEq)]
#[reflect(Component)]
pub struct CharacterControllerState {
    /// Negative is falling.
    pub vertical_velocity: f32,
    /// Memory of the facing filter. Meaningless on its own.
    pub turn_smooth_velocity: f32,
    /// Set by a ceiling bonk. Only landing or a jump pad clears it.
    pub has_unstuck_ceiling: bool,
    /// Seconds until the ground slam is available again. Never negative.
    pub ground_slam_cooldown: f32,
    pub ground_slam_in_progress: bool,
    /// Readouts of the last tick. The step never reads them back.
    pub grounded: bool,
    pub on_jump_pad: bool,
    pub under_ceiling: bool,
}

impl CharacterControllerState {
    /// Fresh state for a newly spawned character. The slam starts on cooldown.
    pub fn spawned(ground_slam_time: f32) -> Self {
        Self {
            ground_slam_cooldown: ground_slam_time.max(0.0),
            ..Default::default()
        }
    }

    pub fn can_slam(&self) -> bool {
        self.ground_slam_cooldown <= 0.0
    }
}

/// Input for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocomotionInput {
    /// `x` is horizontal (right), `y` is vertical (forward).
    pub movement: Vec2,
    pub jump: bool,
    pub slam: bool,
    /// Heading of the camera in degrees.
    pub camera_yaw: f32,
}

impl LocomotionInput {
    pub fn read(source: &impl InputSource, camera_yaw: f32) -> Self {
        Self {
            movement: Vec2::new(
                source.axis(InputAxis::Horizontal),
                source.axis(InputAxis::Vertical),
            ),
            jump: source.button_edge_down(InputButton::Jump),
            slam: source.button_edge_down(InputButton::Slam),
            camera_yaw,
        }
    }
}

/// Something the presentation layer should play.
#[derive(Clone, Debug, PartialEq)]
pub enum Cue<S> {
    Sound(SoundCue),
    Particles(ParticleCue),
    /// Play the audio attached to a surface with the given reverb mix.
    SurfaceAudio { surface: S, reverb_zone_mix: f32 },
}

/// What one tick asks of the mover and the presentation sink.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutput<S> {
    /// Always issued, before anything else.
    pub vertical_displacement: Vec3,
    /// Issued after the cues and the orientation, outside the dead zone only.
    pub horizontal_displacement: Option<Vec3>,
    /// New yaw in degrees, outside the dead zone only.
    pub facing: Option<f32>,
    pub cues: Vec<Cue<S>>,
    /// Grounded as the rest of the tick saw it, including a jump pad's override.
    pub grounded: bool,
}

/// Advances `state` by `dt` seconds.
///
/// `facing_yaw` is the yaw the character is currently drawn with, in degrees.
pub fn step<S: Clone>(
    cfg: &CharacterController,
    state: &mut CharacterControllerState,
    facing_yaw: f32,
    sensed: &SensedEnvironment<S>,
    input: &LocomotionInput,
    dt: f32,
) -> TickOutput<S> {
    let mut cues = Vec::new();

    tick_cooldown(state, dt);

    let mut grounded = sensed.grounded;
    if grounded {
        land(cfg, state, &mut cues);
    }

    state.vertical_velocity += cfg.gravity * dt;
    validate_vertical_velocity(state);
    let vertical_displacement = Vec3::Y * (state.vertical_velocity * dt);

    if input.jump && grounded {
        state.vertical_velocity = cfg.launch_speed(cfg.jump_height);
    }

    if input.slam && !grounded && state.can_slam() {
        start_ground_slam(cfg, state, &mut cues);
    }

    if let Some(pad) = &sensed.jump_pad {
        grounded = true;
        state.has_unstuck_ceiling = false;
        state.vertical_velocity = cfg.launch_speed(cfg.jump_pad_height);
        debug!(velocity = state.vertical_velocity, "jump pad launch");
        if let Some(surface) = pad.audio.clone() {
            cues.push(Cue::SurfaceAudio {
                surface,
                reverb_zone_mix: JUMP_PAD_REVERB_ZONE_MIX,
            });
        }
    }

    // Latched until the next landing or jump pad: leaving the ceiling while
    // still airborne does not re-arm the bonk.
    if sensed.under_ceiling && !state.has_unstuck_ceiling {
        state.vertical_velocity = -state.vertical_velocity;
        state.has_unstuck_ceiling = true;
        debug!(velocity = state.vertical_velocity, "ceiling bonk");
        cues.push(Cue::Sound(SoundCue::Bonk));
        cues.push(Cue::Particles(ParticleCue::Bonk));
    }
    validate_vertical_velocity(state);

    state.grounded = grounded;
    state.on_jump_pad = sensed.on_jump_pad();
    state.under_ceiling = sensed.under_ceiling;

    let (facing, horizontal_displacement) =
        planar_motion(cfg, state, facing_yaw, input, dt).unzip();

    TickOutput {
        vertical_displacement,
        horizontal_displacement,
        facing,
        cues,
        grounded,
    }
}

fn tick_cooldown(state: &mut CharacterControllerState, dt: f32) {
    if state.ground_slam_cooldown > 0.0 {
        state.ground_slam_cooldown = (state.ground_slam_cooldown - dt).max(0.0);
    }
}

fn land<S>(
    cfg: &CharacterController,
    state: &mut CharacterControllerState,
    cues: &mut Vec<Cue<S>>,
) {
    if state.ground_slam_in_progress {
        // bounce back up, harder the faster we came down
        let impact = state.vertical_velocity.abs();
        state.vertical_velocity = (impact * -0.5 * cfg.gravity).sqrt();
        debug!(impact, bounce = state.vertical_velocity, "ground slam landed");
        cues.push(Cue::Sound(SoundCue::SlamLanded));
        cues.push(Cue::Particles(ParticleCue::SlamLanded));
    }
    state.ground_slam_in_progress = false;
    state.has_unstuck_ceiling = false;
    if state.vertical_velocity < 0.0 {
        state.vertical_velocity = cfg.grounded_velocity;
    }
}

fn start_ground_slam<S>(
    cfg: &CharacterController,
    state: &mut CharacterControllerState,
    cues: &mut Vec<Cue<S>>,
) {
    state.vertical_velocity = -cfg.launch_speed(cfg.slam_height);
    state.ground_slam_cooldown = cfg.ground_slam_time;
    state.ground_slam_in_progress = true;
    debug!(velocity = state.vertical_velocity, "ground slam");
    cues.push(Cue::Sound(SoundCue::GroundSlam));
}

/// Turns toward the input heading and returns the new yaw with this tick's
/// planar displacement, or `None` inside the dead zone.
fn planar_motion(
    cfg: &CharacterController,
    state: &mut CharacterControllerState,
    facing_yaw: f32,
    input: &LocomotionInput,
    dt: f32,
) -> Option<(f32, Vec3)> {
    if input.movement.length() < DEAD_ZONE {
        return None;
    }
    let target = heading_of(input.movement) + input.camera_yaw;
    let yaw = smooth_damp_angle(
        facing_yaw,
        target,
        &mut state.turn_smooth_velocity,
        cfg.turn_smooth_time,
        dt,
    );
    let heading = match cfg.heading {
        MovementHeading::Facing => yaw,
        MovementHeading::Target => target,
    };
    Some((yaw, forward_for_yaw(heading) * (cfg.speed * dt)))
}

fn validate_vertical_velocity(state: &mut CharacterControllerState) {
    if !state.vertical_velocity.is_finite() {
        warn!(
            "vertical velocity is not finite: {}, setting to 0",
            state.vertical_velocity
        );
        state.vertical_velocity = 0.0;
    }
}
