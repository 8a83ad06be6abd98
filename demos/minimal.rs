use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_bonk::prelude::*;
use bevy_enhanced_input::prelude::*;

fn main() -> AppExit {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PhysicsPlugins::default(),
            EnhancedInputPlugin,
            BonkPlugin::default(),
        ))
        .add_input_context::<PlayerInput>()
        .add_systems(Startup, setup)
        .add_systems(Update, (orbit_camera, log_cues))
        .run()
}

#[derive(Debug, PhysicsLayer, Default)]
enum Layer {
    #[default]
    Default,
    Ground,
    JumpPad,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Spawn the player
    let player = commands
        .spawn((
            CharacterController {
                // jump pads are solid ground too
                ground_mask: [Layer::Ground, Layer::JumpPad].into(),
                jump_pad_mask: Layer::JumpPad.into(),
                ..default()
            },
            CollisionLayers::new(Layer::Default, LayerMask::ALL),
            Transform::from_xyz(0.0, 3.0, 0.0),
            Mesh3d(meshes.add(Capsule3d::new(0.5, 1.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.9, 0.5, 0.2))),
            PlayerInput,
            actions!(PlayerInput[
                (
                    Action::<Movement>::new(),
                    DeadZone::default(),
                    Bindings::spawn((
                        Cardinal::wasd_keys(),
                        Axial::left_stick()
                    ))
                ),
                (
                    Action::<Jump>::new(),
                    bindings![KeyCode::Space, GamepadButton::South],
                ),
                (
                    Action::<Slam>::new(),
                    bindings![KeyCode::ShiftLeft, GamepadButton::East],
                ),
            ]),
        ))
        .with_child((
            // nose, so the facing is visible
            Transform::from_xyz(0.0, 0.5, 0.5),
            Mesh3d(meshes.add(Cuboid::new(0.2, 0.2, 0.4))),
            MeshMaterial3d(materials.add(Color::BLACK)),
        ))
        .id();

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 6.0, -10.0).looking_at(Vec3::ZERO, Vec3::Y),
        CharacterControllerCameraOf(player),
    ));

    commands.spawn((
        Transform::from_xyz(0.0, 1.0, 0.0).looking_at(vec3(1.0, -2.0, -2.0), Vec3::Y),
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
    ));

    let floor = Cuboid::new(60.0, 1.0, 60.0);
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(60.0, 1.0, 60.0),
        CollisionLayers::new(Layer::Ground, LayerMask::ALL),
        Transform::from_xyz(0.0, -0.5, 0.0),
        Mesh3d(meshes.add(floor)),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
    ));

    let pad = Cuboid::new(3.0, 0.2, 3.0);
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(3.0, 0.2, 3.0),
        CollisionLayers::new(Layer::JumpPad, LayerMask::ALL),
        JumpPadAudio::default(),
        Transform::from_xyz(6.0, 0.1, 6.0),
        Mesh3d(meshes.add(pad)),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.4, 0.9))),
    ));

    // a low roof to bonk against
    let roof = Cuboid::new(6.0, 0.5, 6.0);
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(6.0, 0.5, 6.0),
        CollisionLayers::new(Layer::Ground, LayerMask::ALL),
        Transform::from_xyz(-6.0, 4.5, -6.0),
        Mesh3d(meshes.add(roof)),
        MeshMaterial3d(materials.add(Color::srgb(0.6, 0.6, 0.6))),
    ));
}

#[derive(Component, Default)]
pub(crate) struct PlayerInput;

/// Keeps the camera behind the player. Q and E swing it around.
fn orbit_camera(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    players: Query<&Transform, With<CharacterController>>,
    mut cameras: Query<
        (&mut Transform, &CharacterControllerCameraOf),
        Without<CharacterController>,
    >,
    mut swing: Local<f32>,
) {
    if keys.pressed(KeyCode::KeyQ) {
        *swing -= 90.0 * time.delta_secs();
    }
    if keys.pressed(KeyCode::KeyE) {
        *swing += 90.0 * time.delta_secs();
    }
    for (mut camera, camera_of) in &mut cameras {
        let Ok(player) = players.get(camera_of.0) else {
            continue;
        };
        let behind = Quat::from_rotation_y(swing.to_radians()) * vec3(0.0, 4.0, -9.0);
        *camera = Transform::from_translation(player.translation + behind)
            .looking_at(player.translation + Vec3::Y, Vec3::Y);
    }
}

fn log_cues(mut cues: MessageReader<LocomotionCue>) {
    for cue in cues.read() {
        info!("{cue:?}");
    }
}
