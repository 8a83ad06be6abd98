//! Running a full tick against the collaborators.

use crate::{
    CharacterController,
    backend::{
        InputSource, KinematicMover, PresentationSink, SpatialQueryProvider, SurfaceAudioParam,
    },
    facing::normalize_yaw,
    locomotion::{CharacterControllerState, Cue, LocomotionInput, TickOutput, step},
    sampler::{ProbeOrigins, sense},
};

/// Samples, steps and applies one tick. Returns the step's output for inspection.
pub fn drive<Q, M, P>(
    cfg: &CharacterController,
    state: &mut CharacterControllerState,
    origins: &ProbeOrigins,
    queries: &Q,
    input: &LocomotionInput,
    mover: &mut M,
    sink: &mut P,
    dt: f32,
) -> TickOutput<Q::Surface>
where
    Q: SpatialQueryProvider,
    M: KinematicMover,
    P: PresentationSink<Q::Surface>,
{
    let sensed = sense(queries, origins, cfg);
    let facing_yaw = normalize_yaw(sink.orientation());
    let output = step(cfg, state, facing_yaw, &sensed, input, dt);
    apply(&output, mover, sink);
    output
}

/// Hands a tick's output to the mover and the sink, vertical move first.
pub fn apply<S, M, P>(output: &TickOutput<S>, mover: &mut M, sink: &mut P)
where
    M: KinematicMover,
    P: PresentationSink<S>,
{
    mover.move_by(output.vertical_displacement);

    for cue in &output.cues {
        match cue {
            Cue::Sound(sound) => sink.play_cue(*sound),
            Cue::Particles(effect) => sink.play_particles(*effect),
            Cue::SurfaceAudio {
                surface,
                reverb_zone_mix,
            } => {
                sink.set_surface_audio_param(
                    surface,
                    SurfaceAudioParam::ReverbZoneMix,
                    *reverb_zone_mix,
                );
                sink.play_surface_audio(surface);
            }
        }
    }

    if let Some(yaw) = output.facing {
        sink.set_orientation(yaw);
    }
    if let Some(displacement) = output.horizontal_displacement {
        mover.move_by(displacement);
    }
}

/// A single character with its collaborators injected up front.
///
/// The mover owns the character's position, so the probe origins are passed
/// in on every [`tick`](Self::tick).
pub struct LocomotionController<Q, I, M, P> {
    pub config: CharacterController,
    pub state: CharacterControllerState,
    pub queries: Q,
    pub input: I,
    pub mover: M,
    pub sink: P,
}

impl<Q, I, M, P> LocomotionController<Q, I, M, P>
where
    Q: SpatialQueryProvider,
    I: InputSource,
    M: KinematicMover,
    P: PresentationSink<Q::Surface>,
{
    pub fn new(config: CharacterController, queries: Q, input: I, mover: M, sink: P) -> Self {
        let state = CharacterControllerState::spawned(config.ground_slam_time);
        Self {
            config,
            state,
            queries,
            input,
            mover,
            sink,
        }
    }

    pub fn tick(
        &mut self,
        dt: f32,
        origins: &ProbeOrigins,
        camera_yaw: f32,
    ) -> TickOutput<Q::Surface> {
        let input = LocomotionInput::read(&self.input, camera_yaw);
        drive(
            &self.config,
            &mut self.state,
            origins,
            &self.queries,
            &input,
            &mut self.mover,
            &mut self.sink,
            dt,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ParticleCue, RayHit, SoundCue};
    use avian3d::prelude::LayerMask;
    use bevy_math::{Dir3, Vec3};

    #[derive(Debug, PartialEq)]
    enum Call {
        Move(Vec3),
        Sound(SoundCue),
        Particles(ParticleCue),
        Param(&'static str, f32),
        PlaySurface(&'static str),
        Orient(f32),
    }

    #[derive(Default)]
    struct Log {
        calls: Vec<Call>,
        yaw: f32,
    }

    impl KinematicMover for Log {
        fn move_by(&mut self, displacement: Vec3) {
            self.calls.push(Call::Move(displacement));
        }
    }

    impl PresentationSink<&'static str> for Log {
        fn play_cue(&mut self, cue: SoundCue) {
            self.calls.push(Call::Sound(cue));
        }

        fn play_particles(&mut self, effect: ParticleCue) {
            self.calls.push(Call::Particles(effect));
        }

        fn set_surface_audio_param(
            &mut self,
            surface: &&'static str,
            _param: SurfaceAudioParam,
            value: f32,
        ) {
            self.calls.push(Call::Param(*surface, value));
        }

        fn play_surface_audio(&mut self, surface: &&'static str) {
            self.calls.push(Call::PlaySurface(*surface));
        }

        fn orientation(&self) -> f32 {
            self.yaw
        }

        fn set_orientation(&mut self, yaw: f32) {
            self.yaw = yaw;
            self.calls.push(Call::Orient(yaw));
        }
    }

    struct PadAndRoof;

    impl SpatialQueryProvider for PadAndRoof {
        type Surface = &'static str;

        fn overlap_sphere(&self, _point: Vec3, _radius: f32, _mask: LayerMask) -> bool {
            false
        }

        fn raycast(
            &self,
            _origin: Vec3,
            _direction: Dir3,
            max_distance: f32,
            _mask: LayerMask,
        ) -> Option<RayHit<&'static str>> {
            Some(RayHit {
                distance: max_distance,
                audio: Some("pad"),
            })
        }
    }

    #[test]
    fn apply_runs_in_tick_order() {
        let cfg = CharacterController::default();
        let mut state = CharacterControllerState::default();
        let mut log = Log::default();
        let mut mover = Log::default();
        let input = LocomotionInput {
            movement: bevy_math::Vec2::Y,
            ..Default::default()
        };
        let origins = ProbeOrigins::upright(Vec3::ZERO, &cfg);
        let out = drive(
            &cfg, &mut state, &origins, &PadAndRoof, &input, &mut mover, &mut log, 0.1,
        );

        assert_eq!(mover.calls.len(), 2);
        assert_eq!(mover.calls[0], Call::Move(out.vertical_displacement));
        assert_eq!(
            mover.calls[1],
            Call::Move(out.horizontal_displacement.unwrap())
        );
        assert_eq!(
            log.calls,
            vec![
                Call::Param("pad", 1.0),
                Call::PlaySurface("pad"),
                Call::Sound(SoundCue::Bonk),
                Call::Particles(ParticleCue::Bonk),
                Call::Orient(0.0),
            ]
        );
    }

    #[test]
    fn facing_is_read_back_normalized() {
        let cfg = CharacterController::default();
        let mut state = CharacterControllerState::default();
        let mut sink = Log {
            yaw: -90.0,
            ..Default::default()
        };
        let mut mover = Log::default();
        let input = LocomotionInput {
            movement: bevy_math::Vec2::new(-1.0, 0.0),
            ..Default::default()
        };
        let origins = ProbeOrigins::upright(Vec3::ZERO, &cfg);
        let out = drive(
            &cfg, &mut state, &origins, &PadAndRoof, &input, &mut mover, &mut sink, 0.1,
        );
        // already facing -90, which reads back as 270
        let yaw = out.facing.unwrap();
        assert!((yaw - 270.0).abs() < 1.0e-3, "{yaw}");
    }
}
