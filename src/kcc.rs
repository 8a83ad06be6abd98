use bevy_ecs::{intern::Interned, schedule::ScheduleLabel, system::SystemParam};
use core::time::Duration;
use tracing::warn;

use crate::{
    backend::{KinematicMover, RayHit, SpatialQueryProvider},
    camera::camera_yaw,
    controller::drive,
    input::AccumulatedInput,
    locomotion::LocomotionInput,
    prelude::*,
    presentation::{CueWriter, JumpPadAudio, MessageSink},
    sampler::ProbeOrigins,
};

pub(super) fn plugin(schedule: Interned<dyn ScheduleLabel>) -> impl Fn(&mut App) {
    move |app: &mut App| {
        app.add_systems(schedule, run_kcc.in_set(BonkSystems::MoveCharacters));
    }
}

fn run_kcc(
    mut kccs: Query<(
        Entity,
        &CharacterController,
        &mut CharacterControllerState,
        &mut AccumulatedInput,
        &mut Transform,
        &Collider,
        Option<&CharacterControllerCamera>,
    )>,
    cams: Query<&Transform, Without<CharacterController>>,
    probes: Probes,
    mut cue_writer: CueWriter,
    move_and_slide: MoveAndSlide,
    time: Res<Time>,
) {
    for (entity, cfg, mut state, mut input, mut transform, collider, cam) in &mut kccs {
        let yaw = cam
            .and_then(|cam| cams.get(cam.get()).ok())
            .map(camera_yaw)
            .unwrap_or_default();
        let locomotion_input = LocomotionInput::read(&*input, yaw);
        input.consume_edges();

        let queries = AvianQueries {
            probes: &probes,
            filter: &cfg.filter,
        };
        let origins = ProbeOrigins::upright(transform.translation, cfg);

        let Transform {
            translation,
            rotation,
            ..
        } = &mut *transform;
        let mut mover = AvianMover {
            move_and_slide: &move_and_slide,
            collider,
            rotation: *rotation,
            translation,
            cfg,
            dt: time.delta(),
        };
        let mut sink = MessageSink {
            character: entity,
            rotation,
            writer: &mut cue_writer,
        };

        drive(
            cfg,
            &mut state,
            &origins,
            &queries,
            &locomotion_input,
            &mut mover,
            &mut sink,
            time.delta_secs(),
        );
    }
}

#[derive(SystemParam)]
struct Probes<'w, 's> {
    spatial_query: SpatialQuery<'w, 's>,
    audio: Query<'w, 's, (), With<JumpPadAudio>>,
    colliders: Query<'w, 's, &'static ColliderOf>,
}

/// Probes backed by Avian's spatial query pipeline.
struct AvianQueries<'a, 'w, 's> {
    probes: &'a Probes<'w, 's>,
    filter: &'a SpatialQueryFilter,
}

impl AvianQueries<'_, '_, '_> {
    fn masked(&self, mask: LayerMask) -> SpatialQueryFilter {
        self.filter.clone().with_mask(mask)
    }

    /// The hit collider's audio, or failing that its rigid body's.
    fn audio_of(&self, collider: Entity) -> Option<Entity> {
        if self.probes.audio.contains(collider) {
            return Some(collider);
        }
        let body = self.probes.colliders.get(collider).ok()?.body;
        self.probes.audio.contains(body).then_some(body)
    }
}

impl SpatialQueryProvider for AvianQueries<'_, '_, '_> {
    type Surface = Entity;

    fn overlap_sphere(&self, point: Vec3, radius: f32, mask: LayerMask) -> bool {
        !self
            .probes
            .spatial_query
            .shape_intersections(
                &Collider::sphere(radius),
                point,
                Quat::IDENTITY,
                &self.masked(mask),
            )
            .is_empty()
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit<Entity>> {
        let hit = self.probes.spatial_query.cast_ray(
            origin,
            direction,
            max_distance,
            true,
            &self.masked(mask),
        )?;
        Some(RayHit {
            distance: hit.distance,
            audio: self.audio_of(hit.entity),
        })
    }
}

/// Slides the character's collider through the world.
struct AvianMover<'a, 'w, 's> {
    move_and_slide: &'a MoveAndSlide<'w, 's>,
    collider: &'a Collider,
    rotation: Quat,
    translation: &'a mut Vec3,
    cfg: &'a CharacterController,
    dt: Duration,
}

impl KinematicMover for AvianMover<'_, '_, '_> {
    fn move_by(&mut self, displacement: Vec3) {
        let dt = self.dt.as_secs_f32();
        if dt <= 0.0 {
            warn!("cannot move a character over a zero-length tick");
            return;
        }

        let offset = self.move_and_slide.depenetrate(
            self.collider,
            *self.translation,
            self.rotation,
            &((&self.cfg.move_and_slide).into()),
            &self.cfg.filter,
        );
        *self.translation += offset;

        if displacement == Vec3::ZERO {
            return;
        }
        let out = self.move_and_slide.move_and_slide(
            self.collider,
            *self.translation,
            self.rotation,
            displacement / dt,
            self.dt,
            &self.cfg.move_and_slide,
            &self.cfg.filter,
            |_| true,
        );
        *self.translation = out.position;
    }
}
