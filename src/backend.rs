//! Collaborator interfaces.
//!
//! The locomotion core never talks to an engine directly. Everything it needs
//! from the outside world goes through the four traits in this module, which
//! lets the same tick logic run inside Bevy (see the `kcc` module) or against
//! plain fakes in tests.

use avian3d::prelude::LayerMask;
use bevy_math::{Dir3, Vec3};

/// Answers spatial questions about the world around the character.
pub trait SpatialQueryProvider {
    /// Handle to the audio capability a hit surface may expose.
    type Surface: Clone;

    /// Is any collider on `mask` within `radius` of `point`?
    fn overlap_sphere(&self, point: Vec3, radius: f32, mask: LayerMask) -> bool;

    /// Casts a ray against colliders on `mask`, returning the closest hit.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit<Self::Surface>>;
}

/// Result of [`SpatialQueryProvider::raycast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit<S> {
    pub distance: f32,
    /// `None` when the hit surface has nothing to play.
    pub audio: Option<S>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputButton {
    Jump,
    Slam,
}

/// Abstracted player input.
pub trait InputSource {
    /// Continuous axis value in `[-1, 1]`.
    fn axis(&self, axis: InputAxis) -> f32;

    /// `true` on exactly one tick per physical press.
    fn button_edge_down(&self, button: InputButton) -> bool;
}

/// Moves the character against world collision. The only way position changes.
pub trait KinematicMover {
    fn move_by(&mut self, displacement: Vec3);
}

/// Discrete sound cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Bonk,
    GroundSlam,
    SlamLanded,
}

/// Discrete particle cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleCue {
    Bonk,
    SlamLanded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceAudioParam {
    ReverbZoneMix,
}

/// Fire-and-forget presentation, plus the orientation the character is drawn with.
pub trait PresentationSink<S> {
    fn play_cue(&mut self, cue: SoundCue);

    fn play_particles(&mut self, effect: ParticleCue);

    fn set_surface_audio_param(&mut self, surface: &S, param: SurfaceAudioParam, value: f32);

    fn play_surface_audio(&mut self, surface: &S);

    /// Current yaw in degrees.
    fn orientation(&self) -> f32;

    /// Yaw in degrees. Pitch and roll stay zero.
    fn set_orientation(&mut self, yaw: f32);
}
