//! Links a camera to the character it looks at.
//!
//! The controller never moves the camera. It only reads which way the camera
//! looks, so that "forward" on the stick means "away from the camera".

use crate::{facing::yaw_of, prelude::*};

#[derive(Component, Clone, Copy)]
#[relationship(relationship_target = CharacterControllerCamera)]
pub struct CharacterControllerCameraOf(pub Entity);

#[derive(Component, Clone, Copy)]
#[relationship_target(relationship = CharacterControllerCameraOf)]
pub struct CharacterControllerCamera(Entity);

impl CharacterControllerCamera {
    pub fn get(self) -> Entity {
        self.0
    }
}

/// Yaw of the camera's viewing direction in degrees, ignoring pitch.
pub fn camera_yaw(camera: &Transform) -> f32 {
    yaw_of(*camera.forward())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_looking_down_z_has_yaw_zero() {
        let camera =
            Transform::from_xyz(0.0, 3.0, -8.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(camera_yaw(&camera).abs() < 1.0e-4);
    }

    #[test]
    fn camera_looking_down_x_has_yaw_ninety() {
        let camera = Transform::from_xyz(-8.0, 3.0, 0.0).looking_at(Vec3::ZERO, Vec3::Y);
        assert!((camera_yaw(&camera) - 90.0).abs() < 1.0e-3);
    }
}
