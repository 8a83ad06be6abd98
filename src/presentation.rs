//! Bevy side of the presentation sink.
//!
//! The crate does not play audio or particles itself. Cues go out as
//! [`LocomotionCue`] messages for whatever audio and effects setup the game
//! uses, and the facing is written straight into the character's rotation.

use bevy_ecs::system::SystemParam;

use crate::{
    backend::{ParticleCue, PresentationSink, SoundCue, SurfaceAudioParam},
    facing::normalize_yaw,
    prelude::*,
};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<LocomotionCue>();
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub enum LocomotionCue {
    Sound { character: Entity, sound: SoundCue },
    Particles { character: Entity, effect: ParticleCue },
    /// The audio on a jump pad should play, with its current reverb mix.
    SurfaceAudio { character: Entity, surface: Entity },
}

/// Marks a jump pad surface as having its own sound.
#[derive(Component, Clone, Copy, Reflect, Default, Debug)]
#[reflect(Component)]
pub struct JumpPadAudio {
    pub reverb_zone_mix: f32,
}

#[derive(SystemParam)]
pub(crate) struct CueWriter<'w, 's> {
    cues: MessageWriter<'w, LocomotionCue>,
    pads: Query<'w, 's, &'static mut JumpPadAudio>,
}

/// Writes cues for one character during its tick.
pub(crate) struct MessageSink<'a, 'w, 's> {
    pub character: Entity,
    pub rotation: &'a mut Quat,
    pub writer: &'a mut CueWriter<'w, 's>,
}

impl PresentationSink<Entity> for MessageSink<'_, '_, '_> {
    fn play_cue(&mut self, sound: SoundCue) {
        self.writer.cues.write(LocomotionCue::Sound {
            character: self.character,
            sound,
        });
    }

    fn play_particles(&mut self, effect: ParticleCue) {
        self.writer.cues.write(LocomotionCue::Particles {
            character: self.character,
            effect,
        });
    }

    fn set_surface_audio_param(&mut self, surface: &Entity, param: SurfaceAudioParam, value: f32) {
        let Ok(mut audio) = self.writer.pads.get_mut(*surface) else {
            return;
        };
        match param {
            SurfaceAudioParam::ReverbZoneMix => audio.reverb_zone_mix = value,
        }
    }

    fn play_surface_audio(&mut self, surface: &Entity) {
        self.writer.cues.write(LocomotionCue::SurfaceAudio {
            character: self.character,
            surface: *surface,
        });
    }

    fn orientation(&self) -> f32 {
        let (yaw, _, _) = self.rotation.to_euler(EulerRot::YXZ);
        normalize_yaw(yaw.to_degrees())
    }

    fn set_orientation(&mut self, yaw: f32) {
        *self.rotation = Quat::from_rotation_y(yaw.to_radians());
    }
}
