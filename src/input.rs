use crate::{
    backend::{InputAxis, InputButton, InputSource},
    fixed_update_utils::did_fixed_timestep_run_this_frame,
    prelude::*,
};

pub(super) fn plugin(app: &mut App) {
    app.add_observer(apply_movement)
        .add_observer(apply_jump)
        .add_observer(apply_slam)
        .add_systems(
            RunFixedMainLoop,
            clear_movement
                .run_if(did_fixed_timestep_run_this_frame)
                .in_set(RunFixedMainLoopSystems::AfterFixedMainLoop),
        );
}

#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct Movement;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Jump;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Slam;

/// Input gathered between controller ticks.
///
/// Button presses stay latched until a tick consumes them, so a press is seen
/// by exactly one tick even when several fixed steps run in one frame or none
/// run at all.
#[derive(Component, Clone, Reflect, Default, Debug)]
#[reflect(Component)]
pub struct AccumulatedInput {
    /// The last move input since the last fixed update loop
    pub movement: Vec2,
    pub jump_pressed: bool,
    pub slam_pressed: bool,
}

impl AccumulatedInput {
    /// Clears the button edges once a tick has seen them.
    pub fn consume_edges(&mut self) {
        self.jump_pressed = false;
        self.slam_pressed = false;
    }
}

impl InputSource for AccumulatedInput {
    fn axis(&self, axis: InputAxis) -> f32 {
        match axis {
            // Bevy is right-handed: screen-right of a viewer facing +Z is -X.
            InputAxis::Horizontal => -self.movement.x,
            InputAxis::Vertical => self.movement.y,
        }
    }

    fn button_edge_down(&self, button: InputButton) -> bool {
        match button {
            InputButton::Jump => self.jump_pressed,
            InputButton::Slam => self.slam_pressed,
        }
    }
}

fn apply_movement(
    movement: On<Fire<Movement>>,
    mut accumulated_inputs: Query<&mut AccumulatedInput>,
) {
    if let Ok(mut accumulated_input) = accumulated_inputs.get_mut(movement.context) {
        accumulated_input.movement = movement.value;
    }
}

fn apply_jump(jump: On<Start<Jump>>, mut accumulated_inputs: Query<&mut AccumulatedInput>) {
    if let Ok(mut accumulated_input) = accumulated_inputs.get_mut(jump.context) {
        accumulated_input.jump_pressed = true;
    }
}

fn apply_slam(slam: On<Start<Slam>>, mut accumulated_inputs: Query<&mut AccumulatedInput>) {
    if let Ok(mut accumulated_input) = accumulated_inputs.get_mut(slam.context) {
        accumulated_input.slam_pressed = true;
    }
}

fn clear_movement(mut accumulated_inputs: Query<&mut AccumulatedInput>) {
    for mut accumulated_input in &mut accumulated_inputs {
        accumulated_input.movement = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_right_is_negative_x() {
        let input = AccumulatedInput {
            movement: Vec2::new(1.0, 0.5),
            ..default()
        };
        assert_eq!(input.axis(InputAxis::Horizontal), -1.0);
        assert_eq!(input.axis(InputAxis::Vertical), 0.5);
    }

    #[test]
    fn edges_last_until_consumed() {
        let mut input = AccumulatedInput {
            jump_pressed: true,
            slam_pressed: true,
            ..default()
        };
        assert!(input.button_edge_down(InputButton::Jump));
        assert!(input.button_edge_down(InputButton::Slam));
        input.consume_edges();
        assert!(!input.button_edge_down(InputButton::Jump));
        assert!(!input.button_edge_down(InputButton::Slam));
    }
}
