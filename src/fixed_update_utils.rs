use crate::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<FixedStepRanThisFrame>()
        .add_systems(PreUpdate, |mut ran: ResMut<FixedStepRanThisFrame>| {
            **ran = false;
        })
        .add_systems(FixedPreUpdate, |mut ran: ResMut<FixedStepRanThisFrame>| {
            **ran = true;
        });
}

/// Whether at least one fixed step ran since the start of this frame.
#[derive(Resource, Debug, Deref, DerefMut, Default)]
pub(crate) struct FixedStepRanThisFrame(bool);

pub(crate) fn did_fixed_timestep_run_this_frame(ran: Res<FixedStepRanThisFrame>) -> bool {
    **ran
}
